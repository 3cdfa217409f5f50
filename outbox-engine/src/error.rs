//! Error types for the sync engine.

use outbox_types::{ActionId, StoreError};
use thiserror::Error;

/// Errors surfaced by [`SyncEngine`](crate::SyncEngine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Queue persistence failed. The triggering in-memory mutation was
    /// rolled back.
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),

    /// The queue is at capacity.
    #[error("queue full (capacity: {capacity})")]
    QueueFull {
        /// Configured maximum number of queued actions.
        capacity: usize,
    },

    /// No queued action has the given id.
    #[error("action not found: {0}")]
    UnknownAction(ActionId),

    /// The action is not flagged for conflict resolution.
    #[error("action not flagged for conflict resolution: {0}")]
    NotFlagged(ActionId),

    /// The local snapshot sink rejected a server snapshot.
    #[error("applying server snapshot failed: {0}")]
    SnapshotApply(String),
}

impl From<outbox_core::QueueError> for EngineError {
    fn from(e: outbox_core::QueueError) -> Self {
        match e {
            outbox_core::QueueError::Full { capacity } => Self::QueueFull { capacity },
            outbox_core::QueueError::NotFound(id) => Self::UnknownAction(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn queue_full_display() {
        let err = EngineError::QueueFull { capacity: 1000 };
        assert_eq!(err.to_string(), "queue full (capacity: 1000)");
    }
}
