//! # outbox-engine
//!
//! Offline-first synchronization engine: accepts locally-originated
//! mutations while the remote service is unreachable, stores them durably in
//! priority order, and replays them once connectivity of sufficient quality
//! is available.
//!
//! The engine is built from injected collaborators:
//! - [`QueueStore`] - durable storage for the pending-action queue
//! - [`NetworkObserver`] - connectivity and quality-tier monitoring
//! - [`RemoteApplier`] (one per [`ActionType`](outbox_types::ActionType)) -
//!   the actual network call for each mutation kind
//! - [`SnapshotSink`] - receives server state for `UseServer` conflict
//!   resolutions
//!
//! Pure decision logic (ordering, scheduling transitions, batch planning,
//! merge policy) lives in `outbox-core`; this crate interprets it and
//! performs the I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod applier;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod network;
pub mod store;

mod executor;

pub use applier::{ApplierRegistry, MockApplier, MockSink, RemoteApplier, SnapshotSink};
pub use config::{ConfigError, EngineConfig};
pub use engine::SyncEngine;
pub use error::EngineError;
pub use events::EngineEvent;
pub use network::{MockObserver, NetworkObserver};
pub use store::{JsonFileStore, MemoryStore, QueueStore};
