use anyhow::Result;

use crate::catalog::{CatalogSource, DEFAULT_LOADER, ReleaseQuery};
use crate::pack_info::{PackInfo, pack_info_or_fallback};

/// Options of the `info` command.
#[derive(Debug, Clone)]
pub struct InfoOptions {
    pub pack_id: Option<String>,
    pub loader: String,
    pub game_version: Option<String>,
    /// Shown when the catalog cannot be reached
    pub pack_name: Option<String>,
    pub pack_version: Option<String>,
    pub json: bool,
}

impl Default for InfoOptions {
    fn default() -> Self {
        Self {
            pack_id: None,
            loader: DEFAULT_LOADER.to_string(),
            game_version: None,
            pack_name: None,
            pack_version: None,
            json: false,
        }
    }
}

/// Print the pack's latest release, or the configured fallback.
#[tracing::instrument(skip(source, options))]
pub async fn info<S: CatalogSource>(source: S, options: InfoOptions) -> Result<()> {
    let query = ReleaseQuery::new(
        options.pack_id.clone().unwrap_or_default(),
        options.loader.clone(),
        options.game_version.clone().unwrap_or_default(),
    );
    let info = pack_info_or_fallback(
        &source,
        &query,
        options.pack_name.as_deref(),
        options.pack_version.as_deref(),
    )
    .await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", render_info(&info));
    }
    Ok(())
}

pub(crate) fn render_info(info: &PackInfo) -> String {
    format!(
        "Modpack: {}\nVersion: {}\nReleased: {}\nDownload: {}\n",
        info.name, info.version, info.publish_date, info.download_url
    )
}
