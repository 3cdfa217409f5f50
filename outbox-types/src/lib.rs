//! # outbox-types
//!
//! Shared data types for the outbox-sync offline-first synchronization engine.
//!
//! This crate provides the foundational types used across all outbox crates:
//! - [`ActionId`] - Identity type for queued actions
//! - [`PendingAction`], [`ActionType`], [`Priority`] - The queued mutation model
//! - [`ConnectionQuality`], [`TransportClass`] - Network quality classification
//! - [`SyncStatus`], [`SyncProgress`], [`SyncStatistics`] - Observable engine state
//! - [`ConflictResolution`], [`ConflictKind`], [`ConflictStrategy`] - Conflict handling
//! - [`ApplyError`], [`StoreError`] - Error types at the collaborator boundaries

#![warn(missing_docs)]
#![warn(clippy::all)]

mod action;
mod conflict;
mod error;
mod ids;
mod quality;
mod status;

pub use action::{ActionType, PendingAction, Priority};
pub use conflict::{ConflictKind, ConflictResolution, ConflictStrategy};
pub use error::{ApplyError, StoreError};
pub use ids::ActionId;
pub use quality::{ConnectionQuality, TransportClass};
pub use status::{SyncProgress, SyncStatistics, SyncStatus};
