//! Remote appliers and the per-action-type registry.
//!
//! A remote applier performs the actual network call for one action type
//! and reports success, transient failure, conflict, or permanent failure.
//! The engine treats payloads as opaque bytes; only the applier registered
//! for an action type interprets them.

mod mock;

pub use mock::{MockApplier, MockSink};

use async_trait::async_trait;
use outbox_types::{ActionType, ApplyError, PendingAction};
use std::collections::HashMap;
use std::sync::Arc;

/// Performs the remote operation for one action type.
///
/// Appliers own their request timeouts, but the executor imposes its own
/// upper bound and treats exceeding it as a transient failure, so a hung
/// applier can never stall a sync pass forever.
#[async_trait]
pub trait RemoteApplier: Send + Sync {
    /// Apply the action against the remote service.
    async fn apply(&self, action: &PendingAction) -> Result<(), ApplyError>;
}

/// Receives authoritative server state for `UseServer` resolutions.
///
/// Implemented by the local data layer; the engine calls it when a conflict
/// is resolved by discarding the local mutation.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Apply the server's state to local storage, bypassing the queue.
    ///
    /// `snapshot` is `None` when the record was deleted remotely, in which
    /// case the local record should be removed.
    async fn apply_server(
        &self,
        action_type: ActionType,
        snapshot: Option<&[u8]>,
    ) -> Result<(), String>;
}

/// Maps each action type to its remote applier.
#[derive(Default, Clone)]
pub struct ApplierRegistry {
    appliers: HashMap<ActionType, Arc<dyn RemoteApplier>>,
}

impl ApplierRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an applier for an action type, replacing any previous one.
    pub fn register(mut self, action_type: ActionType, applier: Arc<dyn RemoteApplier>) -> Self {
        self.appliers.insert(action_type, applier);
        self
    }

    /// Look up the applier for an action type.
    pub fn get(&self, action_type: ActionType) -> Option<Arc<dyn RemoteApplier>> {
        self.appliers.get(&action_type).cloned()
    }

    /// Whether an applier is registered for the given type.
    pub fn supports(&self, action_type: ActionType) -> bool {
        self.appliers.contains_key(&action_type)
    }
}

impl std::fmt::Debug for ApplierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplierRegistry")
            .field("action_types", &self.appliers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup() {
        let applier = Arc::new(MockApplier::new());
        let registry =
            ApplierRegistry::new().register(ActionType::CreateReminder, applier.clone());

        assert!(registry.supports(ActionType::CreateReminder));
        assert!(!registry.supports(ActionType::SendEmail));
        assert!(registry.get(ActionType::CreateReminder).is_some());
        assert!(registry.get(ActionType::SendEmail).is_none());
    }

    #[test]
    fn register_replaces_previous() {
        let first = Arc::new(MockApplier::new());
        let second = Arc::new(MockApplier::new());
        let registry = ApplierRegistry::new()
            .register(ActionType::SendEmail, first)
            .register(ActionType::SendEmail, second.clone());

        // Still exactly one applier for the type
        assert!(registry.supports(ActionType::SendEmail));
    }
}
