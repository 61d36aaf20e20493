//! HTTP client module with JSON helpers and status classification.

mod client;
mod status;

pub use client::HttpClient;
pub use status::{HttpStatusError, check_status, classify_status};
