//! The in-memory pending-action queue.
//!
//! This module provides a priority-ordered queue over [`PendingAction`]s with:
//! - Total ordering by `(priority desc, enqueued_at asc)`
//! - Non-destructive batch peeking (flagged actions excluded)
//! - Atomic per-action mutation via closures
//! - Max size limits to prevent unbounded memory growth
//!
//! The queue holds no I/O. `outbox-engine` wraps every structural change
//! with a synchronous persist and rolls the change back if the persist fails.

use outbox_types::{ActionId, PendingAction};
use thiserror::Error;

/// Error type for queue operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Queue is at capacity.
    #[error("queue full (capacity: {capacity})")]
    Full {
        /// Configured maximum number of queued actions.
        capacity: usize,
    },

    /// No queued action has the given id.
    #[error("action not found: {0}")]
    NotFound(ActionId),
}

/// Priority-ordered queue of pending actions.
///
/// Kept sorted at all times: every insert and mutation restores the total
/// order `(priority desc, enqueued_at asc)`.
#[derive(Debug, Clone)]
pub struct ActionQueue {
    actions: Vec<PendingAction>,
    max_size: usize,
}

impl ActionQueue {
    /// Create an empty queue with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            actions: Vec::new(),
            max_size,
        }
    }

    /// Rebuild a queue from a persisted snapshot.
    ///
    /// The snapshot is re-sorted on load so a hand-edited or older-format
    /// file still satisfies the ordering invariant. A snapshot larger than
    /// the cap is kept whole: the cap bounds new enqueues only, persisted
    /// actions are never discarded on load.
    pub fn from_snapshot(mut actions: Vec<PendingAction>, max_size: usize) -> Self {
        actions.sort_by_key(|a| a.order_key());
        Self { actions, max_size }
    }

    /// Number of queued actions (including flagged ones).
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Add an action to the queue.
    ///
    /// Returns an error if the queue is at capacity.
    pub fn enqueue(&mut self, action: PendingAction) -> Result<(), QueueError> {
        if self.actions.len() >= self.max_size {
            return Err(QueueError::Full {
                capacity: self.max_size,
            });
        }
        let key = action.order_key();
        let pos = self
            .actions
            .partition_point(|existing| existing.order_key() <= key);
        self.actions.insert(pos, action);
        Ok(())
    }

    /// Return up to `n` actions in queue order without removing them.
    ///
    /// Conflict-flagged actions are excluded: they do not participate in
    /// automatic batches until resolved.
    pub fn peek_batch(&self, n: usize) -> Vec<PendingAction> {
        self.actions
            .iter()
            .filter(|a| !a.conflict_flag)
            .take(n)
            .cloned()
            .collect()
    }

    /// All queued actions in order, flagged ones included.
    pub fn actions(&self) -> &[PendingAction] {
        &self.actions
    }

    /// Look up an action by id.
    pub fn get(&self, id: &ActionId) -> Option<&PendingAction> {
        self.actions.iter().find(|a| a.id == *id)
    }

    /// Remove an action by id, returning it if present.
    pub fn remove(&mut self, id: &ActionId) -> Option<PendingAction> {
        let pos = self.actions.iter().position(|a| a.id == *id)?;
        Some(self.actions.remove(pos))
    }

    /// Apply a mutation to one action atomically, then restore ordering.
    pub fn requeue<F>(&mut self, id: &ActionId, mutation: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut PendingAction),
    {
        let pos = self
            .actions
            .iter()
            .position(|a| a.id == *id)
            .ok_or(QueueError::NotFound(*id))?;
        mutation(&mut self.actions[pos]);
        self.actions.sort_by_key(|a| a.order_key());
        Ok(())
    }

    /// Remove all actions.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Clone the full queue contents for persistence.
    pub fn snapshot(&self) -> Vec<PendingAction> {
        self.actions.clone()
    }

    /// Restore the queue from a previously taken snapshot (rollback path).
    pub fn restore(&mut self, snapshot: Vec<PendingAction>) {
        self.actions = snapshot;
    }

    /// Actions that have failed at least once and are still queued.
    pub fn failed_count(&self) -> usize {
        self.actions.iter().filter(|a| a.retry_count > 0).count()
    }

    /// Actions flagged for conflict resolution.
    pub fn conflict_count(&self) -> usize {
        self.actions.iter().filter(|a| a.conflict_flag).count()
    }

    /// Mean retry count across all queued actions (0.0 when empty).
    pub fn average_retry_count(&self) -> f64 {
        if self.actions.is_empty() {
            return 0.0;
        }
        let total: u64 = self.actions.iter().map(|a| u64::from(a.retry_count)).sum();
        total as f64 / self.actions.len() as f64
    }
}
