//! Modrinth catalog implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::http::HttpClient;

use super::{CatalogSource, DependencyRef, ProjectSummary, Release, ReleaseFile, ReleaseQuery};

/// Public Modrinth API v2.
pub const DEFAULT_API_URL: &str = "https://api.modrinth.com/v2";

/// Modrinth API response types (internal).
mod api {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Version {
        pub id: String,
        pub project_id: Option<String>,
        #[serde(default)]
        pub version_number: String,
        pub date_published: Option<DateTime<Utc>>,
        #[serde(default)]
        pub files: Vec<File>,
        #[serde(default)]
        pub dependencies: Vec<Dependency>,
    }

    #[derive(Deserialize, Debug)]
    pub struct File {
        pub url: String,
        #[serde(default)]
        pub filename: String,
        #[serde(default)]
        pub primary: bool,
    }

    #[derive(Deserialize, Debug)]
    pub struct Dependency {
        pub version_id: Option<String>,
        pub project_id: Option<String>,
        pub file_name: Option<String>,
        pub dependency_type: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Project {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub categories: Vec<String>,
        #[serde(default)]
        pub downloads: u64,
        #[serde(default)]
        pub team: String,
        pub icon_url: Option<String>,
        pub slug: String,
    }
}

/// Catalog backed by the Modrinth HTTP API.
pub struct ModrinthCatalog {
    http_client: HttpClient,
    api_url: String,
}

impl ModrinthCatalog {
    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CatalogSource for ModrinthCatalog {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn list_releases(&self, query: &ReleaseQuery) -> Result<Vec<Release>> {
        let url = format!("{}/project/{}/version", self.api_url, query.pack_id);
        // Modrinth filters take JSON string arrays
        let loaders = serde_json::to_string(&[query.loader.as_str()])?;
        let game_versions = serde_json::to_string(&[query.game_version.as_str()])?;
        debug!("Fetching releases for {} from {}...", query, url);

        let versions: Vec<api::Version> = self
            .http_client
            .get_json_with_query(
                &url,
                &[("loaders", &loaders), ("game_versions", &game_versions)],
            )
            .await
            .with_context(|| format!("Failed to fetch releases of {}", query.pack_id))?;

        Ok(versions
            .into_iter()
            .map(|v| {
                let mut release = Release::from(v);
                if release.pack_id.is_empty() {
                    release.pack_id = query.pack_id.clone();
                }
                release
            })
            .collect())
    }

    async fn get_project(&self, project_id: &str) -> Result<ProjectSummary> {
        let url = format!("{}/project/{}", self.api_url, project_id);
        debug!("Fetching project {} from {}...", project_id, url);
        let project: api::Project = self.http_client.get_json(&url).await?;
        Ok(project.into())
    }
}

impl From<api::Version> for Release {
    fn from(v: api::Version) -> Self {
        Release {
            id: v.id,
            pack_id: v.project_id.unwrap_or_default(),
            version_number: v.version_number,
            date_published: v.date_published,
            files: v.files.into_iter().map(|f| f.into()).collect(),
            dependencies: v.dependencies.into_iter().map(|d| d.into()).collect(),
        }
    }
}

impl From<api::File> for ReleaseFile {
    fn from(f: api::File) -> Self {
        ReleaseFile {
            url: f.url,
            filename: f.filename,
            primary: f.primary,
        }
    }
}

impl From<api::Dependency> for DependencyRef {
    fn from(d: api::Dependency) -> Self {
        DependencyRef {
            project_id: d.project_id,
            version_id: d.version_id,
            file_name: d.file_name,
            dependency_type: d.dependency_type,
        }
    }
}

impl From<api::Project> for ProjectSummary {
    fn from(p: api::Project) -> Self {
        ProjectSummary {
            id: p.id,
            title: p.title,
            description: p.description,
            categories: p.categories,
            download_count: p.downloads,
            owner_label: p.team,
            icon_url: p.icon_url.unwrap_or_default(),
            slug: p.slug,
        }
    }
}
