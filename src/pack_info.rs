//! Headline details of the pack's current release.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::Serialize;

use crate::aggregator::CatalogError;
use crate::catalog::{CatalogSource, ReleaseQuery};

/// Name shown when the catalog cannot be reached.
pub const DEFAULT_PACK_NAME: &str = "Custom Mod Pack";

/// Version shown when the catalog cannot be reached.
pub const DEFAULT_PACK_VERSION: &str = "v2.5";

/// Download link of the fallback info.
pub const NO_DOWNLOAD: &str = "#";

/// Publish date of the fallback info, or of a release without one.
pub const UNKNOWN_DATE: &str = "Unknown";

/// e.g. "Mar 5, 2024"
const DATE_FORMAT: &str = "%b %-d, %Y";

/// What the server advertises about its pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackInfo {
    pub name: String,
    pub version: String,
    pub download_url: String,
    pub publish_date: String,
}

impl PackInfo {
    /// Placeholder built from locally configured values.
    pub fn fallback(name: Option<&str>, version: Option<&str>) -> Self {
        Self {
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_PACK_NAME)
                .to_string(),
            version: version
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_PACK_VERSION)
                .to_string(),
            download_url: NO_DOWNLOAD.to_string(),
            publish_date: UNKNOWN_DATE.to_string(),
        }
    }
}

/// Fetch the first release matching the query and the pack's title.
#[tracing::instrument(skip(source))]
pub async fn latest_pack_info<S: CatalogSource>(
    source: &S,
    query: &ReleaseQuery,
) -> Result<PackInfo> {
    if query.pack_id.trim().is_empty() {
        return Err(CatalogError::Configuration("no pack identifier provided".to_string()).into());
    }

    let releases = source
        .list_releases(query)
        .await
        .map_err(CatalogError::Transport)?;
    let release = releases
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::NoReleaseFound {
            pack_id: query.pack_id.clone(),
            loader: query.loader.clone(),
            game_version: query.game_version.clone(),
        })?;

    let project = source
        .get_project(&query.pack_id)
        .await
        .with_context(|| format!("Failed to fetch modpack {}", query.pack_id))?;

    let Some(file) = release.primary_file() else {
        bail!("Release {} of {} has no files", release.id, query.pack_id);
    };
    debug!("Release {} ships {}", release.id, file.filename);

    Ok(PackInfo {
        name: project.title,
        version: release.version_number.clone(),
        download_url: file.url.clone(),
        publish_date: release
            .date_published
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
    })
}

/// Like [`latest_pack_info`], but any failure yields [`PackInfo::fallback`].
pub async fn pack_info_or_fallback<S: CatalogSource>(
    source: &S,
    query: &ReleaseQuery,
    fallback_name: Option<&str>,
    fallback_version: Option<&str>,
) -> PackInfo {
    match latest_pack_info(source, query).await {
        Ok(info) => info,
        Err(e) => {
            warn!("Error fetching modpack info: {:#}", e);
            PackInfo::fallback(fallback_name, fallback_version)
        }
    }
}
