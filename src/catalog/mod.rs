//! Catalog abstraction for mod-pack metadata.
//!
//! The aggregator only talks to a [`CatalogSource`]; [`ModrinthCatalog`]
//! is the HTTP-backed implementation.

mod modrinth;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use modrinth::{DEFAULT_API_URL, ModrinthCatalog};

/// Loader used when none is given.
pub const DEFAULT_LOADER: &str = "neoforge";

/// Selects the releases of a pack built for one loader and game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseQuery {
    pub pack_id: String,
    pub loader: String,
    pub game_version: String,
}

impl ReleaseQuery {
    pub fn new(
        pack_id: impl Into<String>,
        loader: impl Into<String>,
        game_version: impl Into<String>,
    ) -> Self {
        let pack_id: String = pack_id.into();
        Self {
            pack_id: pack_id.trim().to_string(),
            loader: loader.into(),
            game_version: game_version.into(),
        }
    }
}

impl fmt::Display for ReleaseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (loader {}, game version {})",
            self.pack_id, self.loader, self.game_version
        )
    }
}

/// One published version of a pack.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub pack_id: String,
    /// e.g. "2.5.0"
    pub version_number: String,
    pub date_published: Option<DateTime<Utc>>,
    pub files: Vec<ReleaseFile>,
    pub dependencies: Vec<DependencyRef>,
}

impl Release {
    /// The file flagged primary, else the first file.
    pub fn primary_file(&self) -> Option<&ReleaseFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub url: String,
    pub filename: String,
    pub primary: bool,
}

/// A dependency declared by a release.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyRef {
    /// Missing for loose files that are not a browsable project
    pub project_id: Option<String>,
    pub version_id: Option<String>,
    pub file_name: Option<String>,
    /// e.g. "required", "optional", "embedded"
    pub dependency_type: String,
}

impl DependencyRef {
    /// A required dependency on a project.
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            dependency_type: "required".to_string(),
            ..Default::default()
        }
    }
}

/// Metadata describing a single project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub download_count: u64,
    pub owner_label: String,
    pub icon_url: String,
    pub slug: String,
}

/// Trait for mod catalogs (Modrinth and compatible APIs).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Get the API base URL.
    fn api_url(&self) -> &str;

    /// Fetch the releases matching the query, in the order the catalog returns them.
    async fn list_releases(&self, query: &ReleaseQuery) -> Result<Vec<Release>>;

    /// Fetch the summary of one project.
    async fn get_project(&self, project_id: &str) -> Result<ProjectSummary>;
}
