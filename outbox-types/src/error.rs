//! Error types at the collaborator boundaries.

use crate::ConflictKind;
use thiserror::Error;

/// Outcome of a failed remote application attempt.
///
/// The remote applier must report exactly one of these; it must never hang
/// indefinitely from the executor's point of view (the executor imposes its
/// own upper bound and treats exceeding it as [`ApplyError::Transient`]).
#[derive(Debug, Clone, Error)]
pub enum ApplyError {
    /// The request failed for a reason expected to clear on its own
    /// (timeout, 5xx, DNS failure). Retried by the next sync pass.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The server's state has diverged from the queued mutation
    /// (409-class, version mismatch, "already deleted").
    #[error("conflict ({kind:?})")]
    Conflict {
        /// What kind of divergence the server reported.
        kind: ConflictKind,
        /// The server's authoritative state, if it exists.
        server_snapshot: Option<Vec<u8>>,
    },

    /// The action can never succeed (malformed payload, unsupported type).
    /// Dropped from the queue immediately, never retried.
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl ApplyError {
    /// Whether this failure is conflict-class.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Persistence failures from the queue store.
///
/// Fatal for the triggering call: the engine rolls back the in-memory
/// mutation so memory never diverges from the last persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("queue store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored snapshot could not be decoded.
    #[error("queue store corrupt: {0}")]
    Corrupt(String),

    /// The snapshot could not be encoded.
    #[error("queue snapshot encoding failed: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_conflict() {
        let err = ApplyError::Conflict {
            kind: ConflictKind::Modified,
            server_snapshot: None,
        };
        assert!(err.is_conflict());
        assert!(!ApplyError::Transient("timeout".into()).is_conflict());
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApplyError>();
        assert_send_sync::<StoreError>();
    }

    #[test]
    fn transient_display() {
        let err = ApplyError::Transient("connection reset".into());
        assert_eq!(err.to_string(), "transient failure: connection reset");
    }
}
