pub mod access;
pub mod aggregator;
pub mod catalog;
pub mod commands;
pub mod filter;
pub mod http;
pub mod pack_info;
pub mod status;

pub use aggregator::{
    AggregationResult, CatalogError, CategorySet, ModCatalogAggregator, ModSummary,
    ProjectOutcome,
};
pub use catalog::{
    CatalogSource, DependencyRef, ProjectSummary, Release, ReleaseFile, ReleaseQuery,
};
pub use filter::filter;
pub use pack_info::PackInfo;
