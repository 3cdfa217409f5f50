//! Conflict descriptors and resolution requests.

use crate::ActionId;
use serde::{Deserialize, Serialize};

/// How the server's state diverged from the queued local mutation.
///
/// Supplied by the remote applier's error payload; the engine never infers
/// the kind on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The server-side record was modified since the local mutation was made.
    Modified,
    /// The server-side record no longer exists.
    DeletedRemotely,
    /// A record with the same identity was created on another device.
    CreatedElsewhere,
}

/// The caller's chosen way out of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Keep the local mutation: reset bookkeeping and re-queue it.
    UseLocal,
    /// Discard the local mutation and apply the server's state locally.
    UseServer,
    /// Merge local and server state, then re-queue the merged mutation.
    Merge,
    /// Defer: leave the action flagged for the UI layer to decide.
    AskUser,
}

/// A resolution request for one flagged action.
///
/// Produced when an action is flagged, consumed by the conflict resolver.
/// Always terminates in the action being re-queued, replaced by server data,
/// merged and re-queued, or left flagged pending external input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
    /// The flagged action this resolution applies to.
    pub action_id: ActionId,
    /// The server's authoritative state, if it exists.
    ///
    /// `None` for [`ConflictKind::DeletedRemotely`].
    pub server_snapshot: Option<Vec<u8>>,
    /// The local payload at the time the conflict was detected.
    pub local_snapshot: Vec<u8>,
    /// What kind of divergence the applier reported.
    pub kind: ConflictKind,
    /// The chosen resolution strategy.
    pub strategy: ConflictStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_json_roundtrip() {
        let resolution = ConflictResolution {
            action_id: ActionId::new(),
            server_snapshot: Some(vec![1, 2]),
            local_snapshot: vec![3, 4],
            kind: ConflictKind::Modified,
            strategy: ConflictStrategy::Merge,
        };
        let json = serde_json::to_string(&resolution).unwrap();
        let restored: ConflictResolution = serde_json::from_str(&json).unwrap();
        assert_eq!(resolution, restored);
    }

    #[test]
    fn deleted_remotely_has_no_server_snapshot() {
        let resolution = ConflictResolution {
            action_id: ActionId::new(),
            server_snapshot: None,
            local_snapshot: vec![],
            kind: ConflictKind::DeletedRemotely,
            strategy: ConflictStrategy::UseLocal,
        };
        assert!(resolution.server_snapshot.is_none());
    }
}
