//! One purge run: extract, parse, count, dispatch
//!
//! Categories are processed in enumeration order. An export that cannot be
//! read skips its own category only; the counters of the others are untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::application::batch_config::BatchConfiguration;
use crate::application::dispatch_engine::{DispatchEngine, DispatchReport};
use crate::application::progress_sink::ProgressSink;
use crate::application::target_parser::parse_listing;
use crate::domain::{
    DeletionCategory, ListingSource, ProgressCounters, PurgeError, PurgeResult, RawReference,
    RemoteDeleteClient, Tally, WorkItem,
};

/// Export directory per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    directories: BTreeMap<DeletionCategory, PathBuf>,
}

impl RunPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, category: DeletionCategory, directory: impl Into<PathBuf>) -> Self {
        self.directories.insert(category, directory.into());
        self
    }

    /// At least one of the two paths is required.
    pub fn from_paths(comments: Option<PathBuf>, likes: Option<PathBuf>) -> PurgeResult<Self> {
        let mut plan = Self::new();
        if let Some(dir) = comments {
            plan = plan.with(DeletionCategory::Comment, dir);
        }
        if let Some(dir) = likes {
            plan = plan.with(DeletionCategory::Reaction, dir);
        }
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> PurgeResult<()> {
        if self.directories.is_empty() {
            return Err(PurgeError::configuration(
                "paths",
                "no export path given; pass --comments-path and/or --likes-path",
            ));
        }
        Ok(())
    }

    pub fn directories(&self) -> impl Iterator<Item = (DeletionCategory, &Path)> {
        self.directories
            .iter()
            .map(|(category, dir)| (*category, dir.as_path()))
    }
}

#[derive(Debug, Clone)]
pub struct SkippedCategory {
    pub category: DeletionCategory,
    pub error: PurgeError,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub dispatch: DispatchReport,
    pub skipped: Vec<SkippedCategory>,
    pub categories: Vec<(DeletionCategory, Tally)>,
    pub total: Tally,
}

impl RunReport {
    /// Every scanned reference was settled exactly once
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total.is_finished() && self.categories.iter().all(|(_, tally)| tally.is_finished())
    }
}

pub struct DeletionRun {
    plan: RunPlan,
    config: BatchConfiguration,
    listing_source: Arc<dyn ListingSource>,
    client: Arc<dyn RemoteDeleteClient>,
    sink: Arc<dyn ProgressSink>,
    cancellation: CancellationToken,
}

impl DeletionRun {
    pub fn new(
        plan: RunPlan,
        config: BatchConfiguration,
        listing_source: Arc<dyn ListingSource>,
        client: Arc<dyn RemoteDeleteClient>,
        sink: Arc<dyn ProgressSink>,
    ) -> PurgeResult<Self> {
        plan.validate()?;
        Ok(Self {
            plan,
            config,
            listing_source,
            client,
            sink,
            cancellation: CancellationToken::new(),
        })
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub async fn execute(self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("purge_run", run_id = %run_id);
        self.execute_inner(run_id).instrument(span).await
    }

    async fn execute_inner(self, run_id: Uuid) -> RunReport {
        let counters = Arc::new(ProgressCounters::new());
        let mut skipped = Vec::new();
        let mut work: Vec<WorkItem> = Vec::new();

        for (category, directory) in self.plan.directories() {
            match self.extract(directory).await {
                Ok(references) => {
                    info!(
                        "Found {} {} references in {}",
                        references.len(),
                        category,
                        directory.display()
                    );
                    let listing = parse_listing(category, references, &counters);
                    info!(
                        "{} {} targets, {} unrecognised",
                        listing.targets().len(),
                        category,
                        listing.unparseable_count()
                    );
                    work.extend(listing.items);
                }
                Err(e) => {
                    error!("Skipping {}: {}", category, e);
                    self.sink
                        .write_line(&format!("[{}] export skipped: {}", category.label(), e));
                    skipped.push(SkippedCategory { category, error: e });
                }
            }
        }

        let engine = DispatchEngine::new(
            Arc::clone(&self.client),
            Arc::clone(&counters),
            Arc::clone(&self.sink),
            self.config,
        )
        .with_cancellation(self.cancellation.clone());
        let dispatch = engine.dispatch(work).await;

        let (categories, total) = counters.snapshot_all();
        info!(
            "Run finished: {}/{} settled, {} categories skipped",
            total.completed,
            total.expected,
            skipped.len()
        );

        RunReport {
            run_id,
            dispatch,
            skipped,
            categories,
            total,
        }
    }

    /// Page parsing is blocking work; keep it off the async workers.
    async fn extract(&self, directory: &Path) -> PurgeResult<Vec<RawReference>> {
        let source = Arc::clone(&self.listing_source);
        let dir = directory.to_path_buf();
        tokio::task::spawn_blocking(move || source.extract(&dir))
            .await
            .map_err(|e| {
                PurgeError::malformed_export(directory, format!("extraction task failed: {e}"))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::batch_config::Pacing;
    use crate::application::progress_sink::MemorySink;
    use crate::domain::ApiError;
    use crate::test_utils::ScriptedClient;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Serves canned references per directory; unknown directories are malformed.
    struct CannedListings(HashMap<PathBuf, Vec<&'static str>>);

    impl ListingSource for CannedListings {
        fn extract(&self, directory: &Path) -> PurgeResult<Vec<RawReference>> {
            self.0
                .get(directory)
                .map(|hrefs| hrefs.iter().copied().map(RawReference::from).collect())
                .ok_or_else(|| PurgeError::malformed_export(directory, "unreadable"))
        }
    }

    fn no_pause(max_tasks: usize) -> BatchConfiguration {
        BatchConfiguration::new(max_tasks, Pacing::Fixed(Duration::ZERO)).unwrap()
    }

    #[test]
    fn empty_plan_is_a_configuration_error() {
        let err = RunPlan::from_paths(None, None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn plan_lists_comments_before_likes() {
        let plan = RunPlan::from_paths(Some("c".into()), Some("l".into())).unwrap();
        let order: Vec<_> = plan.directories().map(|(c, _)| c).collect();
        assert_eq!(order, vec![DeletionCategory::Comment, DeletionCategory::Reaction]);
    }

    #[test]
    fn report_with_an_open_category_is_not_balanced() {
        let report = RunReport {
            run_id: Uuid::nil(),
            dispatch: DispatchReport::default(),
            skipped: Vec::new(),
            categories: vec![
                (DeletionCategory::Comment, Tally { completed: 2, expected: 2 }),
                (DeletionCategory::Reaction, Tally { completed: 1, expected: 2 }),
            ],
            total: Tally { completed: 3, expected: 4 },
        };
        assert!(!report.is_balanced());
    }

    #[tokio::test]
    async fn run_balances_counters_across_categories() {
        let listings = CannedListings(HashMap::from([
            (
                PathBuf::from("comments"),
                vec![
                    "https://vk.com/wall1_2?reply=3",
                    "https://vk.com/wall-4_5?reply=6",
                ],
            ),
            (
                PathBuf::from("likes"),
                vec!["https://vk.com/wall7_8", "https://vk.com/feed", "https://vk.com/photo9_10"],
            ),
        ]));
        let client = Arc::new(ScriptedClient::new().respond("3", Err(ApiError::new(15, "Access denied").into())));
        let sink = Arc::new(MemorySink::new());
        let plan = RunPlan::new()
            .with(DeletionCategory::Comment, "comments")
            .with(DeletionCategory::Reaction, "likes");

        let run = DeletionRun::new(plan, no_pause(2), Arc::new(listings), client.clone(), sink.clone()).unwrap();
        let report = run.execute().await;

        assert!(report.is_balanced());
        assert_eq!(report.total, Tally { completed: 5, expected: 5 });
        assert_eq!(report.dispatch.attempted, 4);
        assert_eq!(report.dispatch.unparseable, 1);
        assert_eq!(client.calls().len(), 4);
        assert_eq!(sink.lines().len(), 5);
    }

    #[tokio::test]
    async fn malformed_export_skips_only_its_category() {
        let listings = CannedListings(HashMap::from([(
            PathBuf::from("comments"),
            vec!["https://vk.com/wall1_2?reply=3"],
        )]));
        let client = Arc::new(ScriptedClient::new());
        let sink = Arc::new(MemorySink::new());
        let plan = RunPlan::new()
            .with(DeletionCategory::Comment, "comments")
            .with(DeletionCategory::Reaction, "missing");

        let run = DeletionRun::new(plan, no_pause(1), Arc::new(listings), client, sink.clone()).unwrap();
        let report = run.execute().await;

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].category, DeletionCategory::Reaction);
        assert_eq!(report.categories, vec![(DeletionCategory::Comment, Tally { completed: 1, expected: 1 })]);
        assert!(report.is_balanced());
        assert!(sink.lines().iter().any(|l| l.starts_with("[Like] export skipped: Malformed export missing")));
    }
}
