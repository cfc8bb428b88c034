//! Barrier-batched dispatch of deletion targets
//!
//! Work items are admitted in order. Once `max_concurrent_tasks` attempts are
//! in flight the engine waits for all of them, pauses, and only then admits
//! the next batch, so a slow attempt holds back the whole next batch. There
//! is no pause after the last batch.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::batch_config::BatchConfiguration;
use crate::application::outcome::{AttemptOutcome, render_progress_line};
use crate::application::progress_sink::ProgressSink;
use crate::domain::{
    DeletionCategory, DeletionTarget, ProgressCounters, RemoteDeleteClient, WorkItem,
};

/// What a dispatch pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Remote delete attempts launched
    pub attempted: usize,
    /// References settled without a remote call
    pub unparseable: usize,
    pub batches: usize,
    pub pauses: usize,
    /// Submission stopped early on interrupt
    pub cancelled: bool,
}

pub struct DispatchEngine {
    client: Arc<dyn RemoteDeleteClient>,
    counters: Arc<ProgressCounters>,
    sink: Arc<dyn ProgressSink>,
    config: BatchConfiguration,
    cancellation: CancellationToken,
}

impl DispatchEngine {
    pub fn new(
        client: Arc<dyn RemoteDeleteClient>,
        counters: Arc<ProgressCounters>,
        sink: Arc<dyn ProgressSink>,
        config: BatchConfiguration,
    ) -> Self {
        Self {
            client,
            counters,
            sink,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Stop admitting work once `token` is cancelled. In-flight attempts are awaited.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn counters(&self) -> &Arc<ProgressCounters> {
        &self.counters
    }

    /// Drive every work item through exactly one settlement.
    pub async fn dispatch(&self, work: Vec<WorkItem>) -> DispatchReport {
        let cap = self.config.max_concurrent_tasks();
        let mut in_flight: Vec<JoinHandle<()>> = Vec::with_capacity(cap.min(work.len()));
        let mut report = DispatchReport::default();

        info!("Dispatching {} work items, up to {} at a time", work.len(), cap);

        for item in work {
            if self.cancellation.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let target = match item {
                WorkItem::Delete(target) => target,
                WorkItem::Unparseable {
                    category,
                    reference,
                } => {
                    settle(
                        &self.counters,
                        self.sink.as_ref(),
                        category,
                        &AttemptOutcome::Unparseable,
                        reference.as_str(),
                    );
                    report.unparseable += 1;
                    continue;
                }
            };

            if in_flight.len() == cap {
                join_batch(&mut in_flight).await;
                report.batches += 1;

                if !self.pause().await {
                    report.cancelled = true;
                    break;
                }
                report.pauses += 1;
            }

            in_flight.push(tokio::spawn(run_attempt(
                Arc::clone(&self.client),
                Arc::clone(&self.counters),
                Arc::clone(&self.sink),
                target,
            )));
            report.attempted += 1;
        }

        if !in_flight.is_empty() {
            join_batch(&mut in_flight).await;
            report.batches += 1;
        }

        if report.cancelled {
            warn!(
                "Dispatch interrupted after {} attempts; remaining items were not submitted",
                report.attempted
            );
        }
        info!(
            "Dispatch finished: {} attempts in {} batches, {} unparseable",
            report.attempted, report.batches, report.unparseable
        );
        report
    }

    /// Sleep before the next batch. Returns `false` if interrupted.
    async fn pause(&self) -> bool {
        let delay = self.config.pacing().next_delay();
        if delay.is_zero() {
            return !self.cancellation.is_cancelled();
        }

        debug!("Pausing {:?} before next batch", delay);
        tokio::select! {
            () = sleep(delay) => true,
            () = self.cancellation.cancelled() => false,
        }
    }
}

async fn join_batch(in_flight: &mut Vec<JoinHandle<()>>) {
    for result in join_all(in_flight.drain(..)).await {
        if let Err(e) = result {
            error!("Delete task did not complete: {}", e);
        }
    }
}

async fn run_attempt(
    client: Arc<dyn RemoteDeleteClient>,
    counters: Arc<ProgressCounters>,
    sink: Arc<dyn ProgressSink>,
    target: DeletionTarget,
) {
    let call = async {
        match &target {
            DeletionTarget::Comment(comment) => {
                client.delete_comment(&comment.owner_id, &comment.item_id).await
            }
            DeletionTarget::Reaction(reaction) => {
                client
                    .delete_reaction(&reaction.kind, &reaction.owner_id, &reaction.item_id)
                    .await
            }
        }
    };

    let outcome = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => AttemptOutcome::from(result),
        Err(payload) => AttemptOutcome::Failed {
            kind: "panic".to_string(),
            message: panic_message(payload.as_ref()),
        },
    };

    settle(
        &counters,
        sink.as_ref(),
        target.category(),
        &outcome,
        target.source_reference(),
    );
}

/// Count the item as completed and emit its progress line.
fn settle(
    counters: &ProgressCounters,
    sink: &dyn ProgressSink,
    category: DeletionCategory,
    outcome: &AttemptOutcome,
    reference: &str,
) {
    let snapshot = counters.record_completion(category);
    debug!(
        category = %category,
        outcome = outcome.label(),
        reference,
        "Deletion attempt settled"
    );
    sink.write_line(&render_progress_line(&snapshot, outcome, reference));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "delete call panicked".to_string())
}
