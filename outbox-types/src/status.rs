//! Observable engine state: status, progress, and statistics.

use crate::ConnectionQuality;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide sync status. Exactly one value is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state", content = "message")]
pub enum SyncStatus {
    /// No pass in flight, scheduling active.
    #[default]
    Idle,
    /// A sync pass is currently draining the queue.
    Syncing,
    /// Scheduling suspended by the caller.
    Paused,
    /// The last pass ended with failures. Informational, not blocking:
    /// future passes are still scheduled.
    Error(String),
}

impl SyncStatus {
    /// Whether a sync pass is currently running.
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing)
    }

    /// Whether scheduling is suspended.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
            Self::Paused => write!(f, "paused"),
            Self::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Progress of the in-flight sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyncProgress {
    /// Actions dispatched so far in this pass.
    pub completed: usize,
    /// Total actions eligible for this pass.
    pub total: usize,
    /// Human-readable label of the action currently being applied.
    pub current: Option<String>,
}

/// A point-in-time summary of engine state for dashboards and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatistics {
    /// Actions waiting in the queue (including flagged ones).
    pub pending_count: usize,
    /// Actions that have failed at least once and are still queued.
    pub failed_count: usize,
    /// Actions flagged for conflict resolution.
    pub conflict_count: usize,
    /// End time of the last pass that dispatched at least one action,
    /// milliseconds since the Unix epoch.
    pub last_sync_time: Option<u64>,
    /// Current network quality tier.
    pub quality: ConnectionQuality,
    /// Mean retry count across all queued actions.
    pub average_retry_count: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_idle() {
        assert_eq!(SyncStatus::default(), SyncStatus::Idle);
    }

    #[test]
    fn status_predicates() {
        assert!(SyncStatus::Syncing.is_syncing());
        assert!(!SyncStatus::Idle.is_syncing());
        assert!(SyncStatus::Paused.is_paused());
        assert!(!SyncStatus::Error("x".into()).is_paused());
    }

    #[test]
    fn error_status_displays_message() {
        let status = SyncStatus::Error("2 of 5 actions failed".into());
        assert_eq!(status.to_string(), "error: 2 of 5 actions failed");
    }

    #[test]
    fn status_json_roundtrip() {
        let status = SyncStatus::Error("partial failure".into());
        let json = serde_json::to_string(&status).unwrap();
        let restored: SyncStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, restored);
    }
}
