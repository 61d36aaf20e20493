//! Mod-catalog aggregation.
//!
//! Resolves the newest release of a pack, fans out to every dependency
//! project and collapses the results into [`ModSummary`] entries plus the
//! set of categories observed.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::{CatalogSource, ProjectSummary, Release, ReleaseQuery};

/// Synthetic category that matches every mod.
pub const ALL_CATEGORY: &str = "All";

/// Category used for projects that declare none.
pub const FALLBACK_CATEGORY: &str = "Utility";

/// Author shown when a project has no owner label.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Default per-project request timeout.
pub const DEFAULT_PROJECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Terminal failures of [`ModCatalogAggregator::resolve`].
#[derive(Debug)]
pub enum CatalogError {
    /// A required input is missing; nothing was requested.
    Configuration(String),
    /// The catalog answered, but no release matches the query.
    NoReleaseFound {
        pack_id: String,
        loader: String,
        game_version: String,
    },
    /// The release-list request itself failed.
    Transport(anyhow::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            CatalogError::NoReleaseFound {
                pack_id,
                loader,
                game_version,
            } => write!(
                f,
                "No versions found for modpack {} with loader {} and game version {}",
                pack_id, loader, game_version
            ),
            CatalogError::Transport(e) => write!(f, "Failed to fetch modpack versions: {:#}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Transport(e) => Some(&**e),
            _ => None,
        }
    }
}

/// A mod as presented to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub author: String,
    pub downloads: u64,
    pub image_url: String,
    pub slug: String,
}

impl ModSummary {
    /// Public project page on Modrinth.
    pub fn page_url(&self) -> String {
        format!("https://modrinth.com/mod/{}", self.slug)
    }
}

impl From<&ProjectSummary> for ModSummary {
    fn from(p: &ProjectSummary) -> Self {
        ModSummary {
            id: p.id.clone(),
            name: p.title.clone(),
            category: p
                .categories
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            description: p.description.clone(),
            author: if p.owner_label.is_empty() {
                UNKNOWN_AUTHOR.to_string()
            } else {
                p.owner_label.clone()
            },
            downloads: p.download_count,
            image_url: p.icon_url.clone(),
            slug: p.slug.clone(),
        }
    }
}

/// Sorted, deduplicated categories with [`ALL_CATEGORY`] pinned first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    /// Builds the set from every category string observed.
    pub fn collect<'a, I>(observed: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let unique: BTreeSet<&String> = observed
            .into_iter()
            .filter(|c| c.as_str() != ALL_CATEGORY)
            .collect();
        let mut categories = Vec::with_capacity(unique.len() + 1);
        categories.push(ALL_CATEGORY.to_string());
        categories.extend(unique.into_iter().cloned());
        Self(categories)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self(vec![ALL_CATEGORY.to_string()])
    }
}

/// Result of fetching one dependency project.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectOutcome {
    Fetched(ProjectSummary),
    Failed { project_id: String, reason: String },
}

impl ProjectOutcome {
    pub fn project_id(&self) -> &str {
        match self {
            ProjectOutcome::Fetched(p) => &p.id,
            ProjectOutcome::Failed { project_id, .. } => project_id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProjectOutcome::Failed { .. })
    }
}

/// Everything one `resolve()` call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    /// Release the mods were taken from
    pub release_id: String,
    pub mods: Vec<ModSummary>,
    pub categories: CategorySet,
    /// One entry per attempted project, in dependency order
    pub outcomes: Vec<ProjectOutcome>,
}

impl AggregationResult {
    /// Projects that were attempted but dropped.
    pub fn failures(&self) -> impl Iterator<Item = &ProjectOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Resolves a pack release into a list of mods.
pub struct ModCatalogAggregator<S: CatalogSource> {
    source: S,
    concurrency_limit: Option<usize>,
    project_timeout: Duration,
}

impl<S: CatalogSource> ModCatalogAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency_limit: None,
            project_timeout: DEFAULT_PROJECT_TIMEOUT,
        }
    }

    /// Caps the number of project requests in flight. `0` means unbounded.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = (limit > 0).then_some(limit);
        self
    }

    pub fn with_project_timeout(mut self, timeout: Duration) -> Self {
        self.project_timeout = timeout;
        self
    }

    /// Resolves the first matching release and every project it depends on.
    ///
    /// Failed project lookups are dropped from `mods` and `categories` and
    /// reported in `outcomes`; only failures before the fan-out are errors.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, query: &ReleaseQuery) -> Result<AggregationResult, CatalogError> {
        if query.pack_id.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "no pack identifier provided".to_string(),
            ));
        }

        let releases = self
            .source
            .list_releases(query)
            .await
            .map_err(CatalogError::Transport)?;
        debug!("Catalog returned {} release(s) for {}", releases.len(), query);

        // The catalog lists newest first; its ordering is trusted as is
        let release = releases
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NoReleaseFound {
                pack_id: query.pack_id.clone(),
                loader: query.loader.clone(),
                game_version: query.game_version.clone(),
            })?;

        let project_ids = dependency_project_ids(&release);
        info!(
            "Release {} of {} declares {} project dependencies",
            release.id,
            query.pack_id,
            project_ids.len()
        );

        let outcomes = self.fetch_projects(project_ids).await;
        Ok(aggregate(release.id, outcomes))
    }

    async fn fetch_projects(&self, project_ids: Vec<String>) -> Vec<ProjectOutcome> {
        let window = self
            .concurrency_limit
            .unwrap_or(project_ids.len())
            .max(1);

        stream::iter(project_ids)
            .map(|project_id| self.fetch_project(project_id))
            .buffered(window)
            .collect()
            .await
    }

    async fn fetch_project(&self, project_id: String) -> ProjectOutcome {
        let result =
            tokio::time::timeout(self.project_timeout, self.source.get_project(&project_id)).await;

        let reason = match result {
            Ok(Ok(project)) => return ProjectOutcome::Fetched(project),
            Ok(Err(e)) => format!("{:#}", e),
            Err(_) => format!("timed out after {:?}", self.project_timeout),
        };
        warn!("Failed to fetch project {}: {}", project_id, reason);
        ProjectOutcome::Failed { project_id, reason }
    }
}

/// Project ids of a release's dependencies, first occurrence wins.
fn dependency_project_ids(release: &Release) -> Vec<String> {
    let mut seen = HashSet::new();
    release
        .dependencies
        .iter()
        .filter_map(|dep| dep.project_id.as_deref())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

fn aggregate(release_id: String, outcomes: Vec<ProjectOutcome>) -> AggregationResult {
    let fetched: Vec<&ProjectSummary> = outcomes
        .iter()
        .filter_map(|o| match o {
            ProjectOutcome::Fetched(p) => Some(p),
            ProjectOutcome::Failed { .. } => None,
        })
        .collect();

    let mods = fetched.iter().map(|p| ModSummary::from(*p)).collect();
    let categories = CategorySet::collect(fetched.iter().flat_map(|p| p.categories.iter()));

    AggregationResult {
        release_id,
        mods,
        categories,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DependencyRef, MockCatalogSource};
    use anyhow::Result;
    use async_trait::async_trait;
    use mockall::predicate::eq;

    fn project(id: &str, title: &str, categories: &[&str]) -> ProjectSummary {
        ProjectSummary {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            download_count: 10,
            owner_label: "team".to_string(),
            icon_url: format!("https://cdn.example/{}.png", id),
            slug: title.to_lowercase().replace(' ', "-"),
        }
    }

    fn release(deps: Vec<DependencyRef>) -> Release {
        Release {
            id: "v1".to_string(),
            pack_id: "pack-1".to_string(),
            dependencies: deps,
            ..Default::default()
        }
    }

    fn loose_file() -> DependencyRef {
        DependencyRef {
            file_name: Some("loose.jar".to_string()),
            dependency_type: "embedded".to_string(),
            ..Default::default()
        }
    }

    fn query() -> ReleaseQuery {
        ReleaseQuery::new("pack-1", "neoforge", "1.20.1")
    }

    #[tokio::test]
    async fn test_resolve_empty_pack_id_makes_no_requests() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().never();
        source.expect_get_project().never();

        let aggregator = ModCatalogAggregator::new(source);
        let err = aggregator
            .resolve(&ReleaseQuery::new("  ", "neoforge", "1.20.1"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.to_string().contains("no pack identifier provided"));
    }

    #[tokio::test]
    async fn test_resolve_no_release_found() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_releases()
            .times(1)
            .returning(|_| Ok(vec![]));
        source.expect_get_project().never();

        let aggregator = ModCatalogAggregator::new(source);
        let err = aggregator.resolve(&query()).await.unwrap_err();

        match err {
            CatalogError::NoReleaseFound {
                pack_id,
                loader,
                game_version,
            } => {
                assert_eq!(pack_id, "pack-1");
                assert_eq!(loader, "neoforge");
                assert_eq!(game_version, "1.20.1");
            }
            other => panic!("Expected NoReleaseFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_transport_error() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_releases()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        source.expect_get_project().never();

        let aggregator = ModCatalogAggregator::new(source);
        let err = aggregator.resolve(&query()).await.unwrap_err();

        assert!(matches!(err, CatalogError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_resolve_without_project_dependencies() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_releases()
            .returning(|_| Ok(vec![release(vec![loose_file(), loose_file()])]));
        source.expect_get_project().never();

        let aggregator = ModCatalogAggregator::new(source);
        let result = aggregator.resolve(&query()).await.unwrap();

        assert!(result.mods.is_empty());
        assert_eq!(result.categories.as_slice(), &["All"]);
        assert!(result.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_uses_first_release_only() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().returning(|_| {
            Ok(vec![
                Release {
                    id: "newest".to_string(),
                    pack_id: "pack-1".to_string(),
                    dependencies: vec![DependencyRef::project("p1")],
                    ..Default::default()
                },
                Release {
                    id: "older".to_string(),
                    pack_id: "pack-1".to_string(),
                    dependencies: vec![DependencyRef::project("p9")],
                    ..Default::default()
                },
            ])
        });
        source
            .expect_get_project()
            .with(eq("p1"))
            .times(1)
            .returning(|_| Ok(project("p1", "Torch Lanterns", &["Tech"])));

        let aggregator = ModCatalogAggregator::new(source);
        let result = aggregator.resolve(&query()).await.unwrap();

        assert_eq!(result.release_id, "newest");
        assert_eq!(result.mods.len(), 1);
        assert_eq!(result.mods[0].id, "p1");
    }

    #[tokio::test]
    async fn test_resolve_partial_failure() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().returning(|_| {
            Ok(vec![release(vec![
                DependencyRef::project("p1"),
                DependencyRef::project("p2"),
                loose_file(),
            ])])
        });
        source
            .expect_get_project()
            .with(eq("p1"))
            .returning(|_| Ok(project("p1", "Torch Lanterns", &["Tech"])));
        source
            .expect_get_project()
            .with(eq("p2"))
            .returning(|_| Err(anyhow::anyhow!("Not found: p2")));

        let aggregator = ModCatalogAggregator::new(source);
        let result = aggregator.resolve(&query()).await.unwrap();

        assert_eq!(result.mods.len(), 1);
        assert_eq!(result.mods[0].id, "p1");
        assert_eq!(result.mods[0].category, "Tech");
        assert_eq!(result.categories.as_slice(), &["All", "Tech"]);

        assert_eq!(result.outcomes.len(), 2);
        let failures: Vec<_> = result.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].project_id(), "p2");
    }

    #[tokio::test]
    async fn test_resolve_categories_only_from_survivors() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().returning(|_| {
            Ok(vec![release(vec![
                DependencyRef::project("p1"),
                DependencyRef::project("p2"),
                DependencyRef::project("p3"),
            ])])
        });
        source
            .expect_get_project()
            .with(eq("p1"))
            .returning(|_| Ok(project("p1", "Zeta", &["magic", "Tech"])));
        source
            .expect_get_project()
            .with(eq("p2"))
            .returning(|_| Err(anyhow::anyhow!("HTTP 500")));
        source
            .expect_get_project()
            .with(eq("p3"))
            .returning(|_| Ok(project("p3", "Alpha", &["Tech", "adventure"])));

        let aggregator = ModCatalogAggregator::new(source);
        let result = aggregator.resolve(&query()).await.unwrap();

        // Dependency order, not alphabetical
        let names: Vec<_> = result.mods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        // Case preserved, byte-order sorted
        assert_eq!(
            result.categories.as_slice(),
            &["All", "Tech", "adventure", "magic"]
        );
    }

    #[tokio::test]
    async fn test_resolve_deduplicates_project_ids() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().returning(|_| {
            Ok(vec![release(vec![
                DependencyRef::project("p1"),
                DependencyRef::project("p2"),
                DependencyRef::project("p1"),
            ])])
        });
        source
            .expect_get_project()
            .with(eq("p1"))
            .times(1)
            .returning(|_| Ok(project("p1", "One", &["Tech"])));
        source
            .expect_get_project()
            .with(eq("p2"))
            .times(1)
            .returning(|_| Ok(project("p2", "Two", &[])));

        let aggregator = ModCatalogAggregator::new(source);
        let result = aggregator.resolve(&query()).await.unwrap();

        let ids: Vec<_> = result.mods.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(result.mods[1].category, "Utility");
        assert_eq!(result.categories.as_slice(), &["All", "Tech"]);
    }

    #[tokio::test]
    async fn test_resolve_with_concurrency_limit_keeps_order() {
        let mut source = MockCatalogSource::new();
        source.expect_list_releases().returning(|_| {
            Ok(vec![release(
                (1..=5).map(|i| DependencyRef::project(format!("p{}", i))).collect(),
            )])
        });
        source
            .expect_get_project()
            .times(5)
            .returning(|id| Ok(project(id, &format!("Mod {}", id), &["Tech"])));

        let aggregator = ModCatalogAggregator::new(source).with_concurrency_limit(2);
        let result = aggregator.resolve(&query()).await.unwrap();

        let ids: Vec<_> = result.mods.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3", "p4", "p5"]);
    }

    /// Source whose project lookups for `slow_id` never finish in time.
    struct SlowSource {
        slow_id: &'static str,
    }

    #[async_trait]
    impl CatalogSource for SlowSource {
        fn api_url(&self) -> &str {
            "http://slow.invalid"
        }

        async fn list_releases(&self, _query: &ReleaseQuery) -> Result<Vec<Release>> {
            Ok(vec![release(vec![
                DependencyRef::project("fast"),
                DependencyRef::project(self.slow_id),
            ])])
        }

        async fn get_project(&self, project_id: &str) -> Result<ProjectSummary> {
            if project_id == self.slow_id {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(project(project_id, project_id, &["Tech"]))
        }
    }

    #[tokio::test]
    async fn test_resolve_project_timeout_is_partial_failure() {
        let aggregator = ModCatalogAggregator::new(SlowSource { slow_id: "slow" })
            .with_project_timeout(Duration::from_millis(50));
        let result = aggregator.resolve(&query()).await.unwrap();

        assert_eq!(result.mods.len(), 1);
        assert_eq!(result.mods[0].id, "fast");
        match &result.outcomes[1] {
            ProjectOutcome::Failed { project_id, reason } => {
                assert_eq!(project_id, "slow");
                assert!(reason.contains("timed out"));
            }
            other => panic!("Expected timeout failure, got {:?}", other),
        }
    }

    #[test]
    fn test_mod_summary_category_collapse() {
        let m = ModSummary::from(&project("p1", "One", &["Tech", "Magic"]));
        assert_eq!(m.category, "Tech");

        let m = ModSummary::from(&project("p2", "Two", &[]));
        assert_eq!(m.category, "Utility");
    }

    #[test]
    fn test_mod_summary_fields() {
        let mut p = project("p1", "Torch Lanterns", &["decoration"]);
        p.owner_label = String::new();
        let m = ModSummary::from(&p);

        assert_eq!(m.name, "Torch Lanterns");
        assert_eq!(m.author, "Unknown");
        assert_eq!(m.downloads, 10);
        assert_eq!(m.image_url, "https://cdn.example/p1.png");
        assert_eq!(m.page_url(), "https://modrinth.com/mod/torch-lanterns");
    }

    #[test]
    fn test_category_set_collect() {
        let observed = vec![
            "Tech".to_string(),
            "magic".to_string(),
            "Tech".to_string(),
            "All".to_string(),
        ];
        let set = CategorySet::collect(&observed);
        assert_eq!(set.as_slice(), &["All", "Tech", "magic"]);
    }

    #[test]
    fn test_category_set_default() {
        assert_eq!(CategorySet::default().as_slice(), &["All"]);
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NoReleaseFound {
            pack_id: "pack-1".into(),
            loader: "neoforge".into(),
            game_version: "1.20.1".into(),
        };
        assert_eq!(
            err.to_string(),
            "No versions found for modpack pack-1 with loader neoforge and game version 1.20.1"
        );
    }
}
