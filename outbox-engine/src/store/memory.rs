//! In-memory queue store for testing.
//!
//! Allows forcing save failures and inspecting persisted snapshots,
//! including simulated crash-and-reload.

use super::QueueStore;
use async_trait::async_trait;
use outbox_types::{PendingAction, StoreError};
use std::sync::{Arc, Mutex};

/// In-memory queue store.
///
/// Cloning shares state, so a test can hold one handle while the engine
/// holds another.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    snapshot: Vec<PendingAction>,
    save_count: usize,
    fail_next_save: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a snapshot (simulates a restart).
    pub fn with_snapshot(actions: Vec<PendingAction>) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().snapshot = actions;
        store
    }

    /// Cause the next `save()` to fail with the given error.
    pub fn fail_next_save(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_save = Some(error.to_string());
    }

    /// The most recently persisted snapshot.
    pub fn persisted(&self) -> Vec<PendingAction> {
        self.inner.lock().unwrap().snapshot.clone()
    }

    /// How many times `save()` has succeeded.
    pub fn save_count(&self) -> usize {
        self.inner.lock().unwrap().save_count
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn load(&self) -> Result<Vec<PendingAction>, StoreError> {
        Ok(self.inner.lock().unwrap().snapshot.clone())
    }

    async fn save(&self, actions: &[PendingAction]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_save.take() {
            return Err(StoreError::Io(std::io::Error::other(error)));
        }

        inner.snapshot = actions.to_vec();
        inner.save_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbox_types::{ActionType, Priority};

    fn make_action() -> PendingAction {
        PendingAction::new(ActionType::SendEmail, vec![], Priority::Urgent, 0)
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let actions = vec![make_action()];

        store.save(&actions).await.unwrap();
        assert_eq!(store.load().await.unwrap(), actions);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn forced_save_failure() {
        let store = MemoryStore::new();
        store.save(&[make_action()]).await.unwrap();
        store.fail_next_save("disk full");

        let result = store.save(&[]).await;
        assert!(matches!(result, Err(StoreError::Io(_))));

        // Failed save must not touch the snapshot
        assert_eq!(store.persisted().len(), 1);

        // Next save works
        store.save(&[]).await.unwrap();
        assert!(store.persisted().is_empty());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store1 = MemoryStore::new();
        let store2 = store1.clone();

        store1.save(&[make_action()]).await.unwrap();
        assert_eq!(store2.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn with_snapshot_simulates_restart() {
        let actions = vec![make_action(), make_action()];
        let store = MemoryStore::with_snapshot(actions.clone());
        assert_eq!(store.load().await.unwrap(), actions);
    }
}
