//! Discrete engine events for the application layer.
//!
//! Published through a `tokio::sync::broadcast` channel so the UI layer can
//! observe per-action outcomes without polling statistics.

use outbox_types::{ActionId, ActionType, ConflictResolution};

/// A discrete outcome the application may want to react to.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The action was applied remotely and removed from the queue.
    ActionApplied {
        /// The applied action.
        id: ActionId,
        /// Its action type.
        action_type: ActionType,
    },
    /// The action failed permanently and was dropped from the queue.
    ActionDropped {
        /// The dropped action.
        id: ActionId,
        /// Its action type.
        action_type: ActionType,
        /// Why it could never succeed.
        error: String,
    },
    /// An action reached the retry ceiling with a conflict-class failure.
    ///
    /// The embedded resolution is pre-filled with the applier's conflict
    /// report and the `AskUser` strategy; the application calls back with
    /// one of the other strategies via
    /// [`SyncEngine::resolve_conflict`](crate::SyncEngine::resolve_conflict).
    ConflictDetected {
        /// Pre-filled resolution request.
        resolution: ConflictResolution,
    },
    /// A `UseServer` resolution pushed the server's state into local storage.
    ServerSnapshotApplied {
        /// The discarded action.
        id: ActionId,
        /// Its action type.
        action_type: ActionType,
    },
    /// A sync pass finished.
    PassFinished {
        /// Actions dispatched in this pass.
        attempted: usize,
        /// Actions applied and removed.
        succeeded: usize,
        /// Actions that failed (transient, conflict, or dropped).
        failed: usize,
    },
}
