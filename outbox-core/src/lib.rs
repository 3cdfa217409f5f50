//! # outbox-core
//!
//! Pure logic for outbox-sync (no I/O, instant tests).
//!
//! This crate implements the queue ordering, scheduling state machine,
//! batch planning, and conflict resolution algorithms without any network
//! or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (network calls, queue persistence, timers) is performed by
//! `outbox-engine`, which interprets the actions produced by these modules.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod planner;
pub mod queue;
pub mod resolve;
pub mod scheduler;

pub use planner::BatchPlan;
pub use queue::{ActionQueue, QueueError};
pub use resolve::{merge_payloads, resolve, ResolutionOutcome};
pub use scheduler::{SchedulerAction, SchedulerEvent, SchedulerState};
