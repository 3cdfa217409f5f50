//! Batch sync executor.
//!
//! Drives one sync pass: takes the dispatchable queue prefix, partitions it
//! into quality-sized chunks, and pushes each action through its remote
//! applier with retry bookkeeping. Chunks run strictly in order with a fixed
//! delay between them; actions within a chunk run strictly in order.
//!
//! Individual action failures never abort the pass; the executor always
//! proceeds to the next action. After each outcome the queue is persisted,
//! so a crash mid-pass never resurrects an applied action.

use crate::engine::{now_ms, EngineInner};
use crate::events::EngineEvent;
use outbox_core::BatchPlan;
use outbox_types::{
    ApplyError, ConflictResolution, ConflictStrategy, PendingAction, SyncProgress,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one action dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    /// Applied remotely, removed from the queue.
    Applied,
    /// Transient or pre-ceiling conflict failure; stays queued.
    Failed,
    /// Reached the retry ceiling with a conflict-class failure; flagged.
    Flagged,
    /// Permanent failure; dropped from the queue.
    Dropped,
    /// The action left the queue (or was flagged) after the plan was built.
    Skipped,
}

/// Tally of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PassSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Applied => {
                self.attempted += 1;
                self.succeeded += 1;
            }
            DispatchOutcome::Failed | DispatchOutcome::Flagged | DispatchOutcome::Dropped => {
                self.attempted += 1;
                self.failed += 1;
            }
            DispatchOutcome::Skipped => {}
        }
    }

    /// Human-readable summary when the pass had failures.
    pub(crate) fn failure_message(&self) -> Option<String> {
        if self.failed > 0 {
            Some(format!(
                "{} of {} actions failed",
                self.failed, self.attempted
            ))
        } else {
            None
        }
    }
}

/// Run one sync pass to completion.
pub(crate) async fn run_pass(inner: &Arc<EngineInner>) -> PassSummary {
    let quality = inner.observer.quality();
    let plan = {
        let queue = inner.queue.lock().await;
        BatchPlan::build(&queue.peek_batch(queue.len()), quality)
    };

    let mut summary = PassSummary::default();
    if plan.is_empty() {
        return summary;
    }

    let total = plan.total;
    let chunk_count = plan.chunks.len();
    debug!(total, chunks = chunk_count, %quality, "sync pass starting");
    inner.progress_tx.send_replace(SyncProgress {
        completed: 0,
        total,
        current: None,
    });

    for (index, chunk) in plan.chunks.into_iter().enumerate() {
        for action in chunk {
            inner.progress_tx.send_replace(SyncProgress {
                completed: summary.attempted,
                total,
                current: Some(action.action_type.to_string()),
            });

            let outcome = dispatch(inner, &action).await;
            summary.record(outcome);
        }

        // pause() lets the dispatched chunk run to completion, then the
        // remaining chunks wait for resume
        if inner.is_paused() {
            debug!("pass interrupted by pause after chunk {}", index);
            break;
        }

        if index + 1 < chunk_count {
            tokio::time::sleep(inner.config.inter_batch_delay()).await;
        }
    }

    inner.progress_tx.send_replace(SyncProgress {
        completed: summary.attempted,
        total,
        current: None,
    });

    if summary.attempted > 0 {
        *inner.last_sync.lock().expect("last_sync lock poisoned") = Some(now_ms());
    }

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "sync pass finished"
    );
    let _ = inner.events_tx.send(EngineEvent::PassFinished {
        attempted: summary.attempted,
        succeeded: summary.succeeded,
        failed: summary.failed,
    });

    summary
}

/// Dispatch a single action to its remote applier and apply the outcome to
/// the queue. Used by both the batch pass and `retry_failed_action`.
pub(crate) async fn dispatch(inner: &Arc<EngineInner>, action: &PendingAction) -> DispatchOutcome {
    // The plan is a snapshot; the action may have been removed or flagged
    // since (clear_pending, resolve_conflict).
    {
        let queue = inner.queue.lock().await;
        match queue.get(&action.id) {
            Some(current) if !current.conflict_flag => {}
            _ => return DispatchOutcome::Skipped,
        }
    }

    let Some(applier) = inner.appliers.get(action.action_type) else {
        warn!(id = %action.id, action_type = %action.action_type, "no applier registered, dropping action");
        return drop_action(inner, action, "unsupported action type".to_string()).await;
    };

    let result = match tokio::time::timeout(inner.config.apply_timeout(), applier.apply(action))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(ApplyError::Transient("applier exceeded time budget".into())),
    };

    match result {
        Ok(()) => {
            if let Err(e) = inner
                .mutate_queue(|queue| {
                    queue.remove(&action.id);
                    Ok(())
                })
                .await
            {
                // The action was applied remotely but the removal could not
                // be persisted; it stays queued and the applier must treat
                // the repeat as idempotent.
                error!(id = %action.id, error = %e, "failed to persist removal of applied action");
                return DispatchOutcome::Failed;
            }
            debug!(id = %action.id, action_type = %action.action_type, "action applied");
            let _ = inner.events_tx.send(EngineEvent::ActionApplied {
                id: action.id,
                action_type: action.action_type,
            });
            DispatchOutcome::Applied
        }
        Err(ApplyError::Permanent(message)) => {
            warn!(id = %action.id, error = %message, "permanent failure, dropping action");
            drop_action(inner, action, message).await
        }
        Err(ApplyError::Transient(message)) => {
            debug!(id = %action.id, error = %message, "transient failure");
            if let Err(e) = inner
                .mutate_queue(|queue| {
                    queue
                        .requeue(&action.id, |a| a.record_failure(message))
                        .map_err(Into::into)
                })
                .await
            {
                error!(id = %action.id, error = %e, "failed to persist retry bookkeeping");
            }
            DispatchOutcome::Failed
        }
        Err(ApplyError::Conflict {
            kind,
            server_snapshot,
        }) => {
            let ceiling = inner.config.retry.max_attempts;
            let mut flagged = false;
            let persist = inner
                .mutate_queue(|queue| {
                    queue
                        .requeue(&action.id, |a| {
                            a.record_failure(format!("conflict: {:?}", kind));
                            if a.retry_count >= ceiling {
                                a.conflict_flag = true;
                                flagged = true;
                            }
                        })
                        .map_err(Into::into)
                })
                .await;
            if let Err(e) = persist {
                error!(id = %action.id, error = %e, "failed to persist conflict bookkeeping");
                return DispatchOutcome::Failed;
            }

            if flagged {
                warn!(id = %action.id, ?kind, "retry ceiling reached, flagging for conflict resolution");
                let _ = inner.events_tx.send(EngineEvent::ConflictDetected {
                    resolution: ConflictResolution {
                        action_id: action.id,
                        server_snapshot,
                        local_snapshot: action.payload.clone(),
                        kind,
                        strategy: ConflictStrategy::AskUser,
                    },
                });
                DispatchOutcome::Flagged
            } else {
                DispatchOutcome::Failed
            }
        }
    }
}

async fn drop_action(
    inner: &Arc<EngineInner>,
    action: &PendingAction,
    error: String,
) -> DispatchOutcome {
    if let Err(e) = inner
        .mutate_queue(|queue| {
            queue.remove(&action.id);
            Ok(())
        })
        .await
    {
        error!(id = %action.id, error = %e, "failed to persist drop of unrecoverable action");
        return DispatchOutcome::Failed;
    }
    let _ = inner.events_tx.send(EngineEvent::ActionDropped {
        id: action.id,
        action_type: action.action_type,
        error,
    });
    DispatchOutcome::Dropped
}
