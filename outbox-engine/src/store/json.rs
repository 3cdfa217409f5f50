//! JSON file-backed queue store.

use super::QueueStore;
use async_trait::async_trait;
use outbox_types::{PendingAction, StoreError};
use std::path::{Path, PathBuf};

/// Queue store backed by a single JSON file.
///
/// Saves write to a sibling temp file and rename over the target, so a
/// crash mid-save leaves either the old snapshot or the new one, never a
/// truncated file. A missing file loads as an empty queue.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given file path.
    ///
    /// The file is created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl QueueStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<PendingAction>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, actions: &[PendingAction]) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(actions).map_err(|e| StoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbox_types::{ActionType, Priority};

    fn make_action(enqueued_at: u64) -> PendingAction {
        PendingAction::new(
            ActionType::CreateReminder,
            vec![1, 2, 3],
            Priority::Normal,
            enqueued_at,
        )
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("queue.json"));

        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("queue.json"));
        let actions = vec![make_action(1), make_action(2)];

        store.save(&actions).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, actions);
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("queue.json"));

        store.save(&[make_action(1), make_action(2)]).await.unwrap();
        store.save(&[make_action(3)]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].enqueued_at, 3);
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("queue.json"));

        store.save(&[make_action(1)]).await.unwrap();

        assert!(!store.temp_path().exists());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_reports_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let store = JsonFileStore::new(path);
        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/queue.json"));

        store.save(&[make_action(1)]).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }
}
