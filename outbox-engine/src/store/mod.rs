//! Durable storage for the pending-action queue.
//!
//! The store holds a single serialized collection of [`PendingAction`]
//! records; no index files, no per-record addressing. Both operations are
//! atomic from the caller's perspective: a crash mid-save never leaves a
//! half-written snapshot behind.
//!
//! The engine persists the full queue after every structural change and
//! rolls the in-memory mutation back if the save fails, so memory never
//! diverges from the last persisted state.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use outbox_types::{PendingAction, StoreError};

/// Persistent storage for the pending-action queue.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Load the persisted queue. A store that has never been written
    /// loads as an empty queue.
    async fn load(&self) -> Result<Vec<PendingAction>, StoreError>;

    /// Replace the persisted queue with the given snapshot, all-or-nothing.
    async fn save(&self, actions: &[PendingAction]) -> Result<(), StoreError>;
}
