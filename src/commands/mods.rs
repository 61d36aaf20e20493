use std::time::Duration;

use anyhow::{Result, anyhow};
use log::debug;
use serde::Serialize;

use crate::aggregator::{
    ALL_CATEGORY, AggregationResult, CatalogError, ModCatalogAggregator, ModSummary,
    ProjectOutcome,
};
use crate::catalog::{CatalogSource, ReleaseQuery};
use crate::filter::filter;

/// Options of the `mods` command.
#[derive(Debug, Clone)]
pub struct ModsOptions {
    pub pack_id: Option<String>,
    pub loader: String,
    pub game_version: Option<String>,
    pub search: String,
    pub category: String,
    /// 0 = unbounded
    pub concurrency: usize,
    pub json: bool,
}

impl Default for ModsOptions {
    fn default() -> Self {
        Self {
            pack_id: None,
            loader: crate::catalog::DEFAULT_LOADER.to_string(),
            game_version: None,
            search: String::new(),
            category: ALL_CATEGORY.to_string(),
            concurrency: 0,
            json: false,
        }
    }
}

/// Resolve the pack and print the filtered mod list.
#[tracing::instrument(skip(source, options, timeout))]
pub async fn mods<S: CatalogSource>(
    source: S,
    options: ModsOptions,
    timeout: Duration,
) -> Result<()> {
    let query = ReleaseQuery::new(
        options.pack_id.clone().unwrap_or_default(),
        options.loader.clone(),
        options.game_version.clone().unwrap_or_default(),
    );

    let aggregator = ModCatalogAggregator::new(source)
        .with_concurrency_limit(options.concurrency)
        .with_project_timeout(timeout);

    let result = aggregator.resolve(&query).await.map_err(|e| match e {
        CatalogError::Configuration(_) => {
            anyhow!("Modpack ID not provided. Use --pack or set PACKBOARD_PACK_ID.")
        }
        other => anyhow::Error::from(other).context("Error loading mods"),
    })?;
    debug!(
        "Resolved {} mods, {} failed",
        result.mods.len(),
        result.failures().count()
    );

    let shown = filter(&result.mods, &options.search, &options.category);
    if options.json {
        println!("{}", render_json(&result, &shown)?);
    } else {
        print!("{}", render_text(&result, &shown));
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    release: &'a str,
    total: usize,
    categories: &'a [String],
    mods: &'a [&'a ModSummary],
    failed: Vec<JsonFailure<'a>>,
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    project_id: &'a str,
    reason: &'a str,
}

pub(crate) fn render_json(result: &AggregationResult, shown: &[&ModSummary]) -> Result<String> {
    let failed = result
        .outcomes
        .iter()
        .filter_map(|o| match o {
            ProjectOutcome::Failed { project_id, reason } => Some(JsonFailure {
                project_id,
                reason,
            }),
            ProjectOutcome::Fetched(_) => None,
        })
        .collect();

    let report = JsonReport {
        release: &result.release_id,
        total: result.mods.len(),
        categories: result.categories.as_slice(),
        mods: shown,
        failed,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub(crate) fn render_text(result: &AggregationResult, shown: &[&ModSummary]) -> String {
    let mut out = format!(
        "Categories: {}\n\n",
        result.categories.as_slice().join(", ")
    );

    if shown.is_empty() {
        out.push_str("No mods found matching your criteria\n");
    }
    for m in shown {
        out.push_str(&format!(
            "{} [{}] by {} - {} downloads\n",
            m.name, m.category, m.author, m.downloads
        ));
        if !m.description.is_empty() {
            out.push_str(&format!("    {}\n", m.description));
        }
        out.push_str(&format!("    {}\n", m.page_url()));
    }

    out.push_str(&format!(
        "\nOur server runs {} carefully selected mods for the best experience",
        result.mods.len()
    ));
    let failed = result.failures().count();
    if failed > 0 {
        out.push_str(&format!(" ({} could not be loaded)", failed));
    }
    out.push('\n');
    out
}
