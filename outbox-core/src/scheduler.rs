//! Scheduling state machine for outbox-sync.
//!
//! This module provides a pure, side-effect-free state machine for the sync
//! scheduler. The state machine takes events as input and produces a new
//! state plus a list of actions to execute.
//!
//! The actual I/O (running a pass, arming timers) is performed by
//! outbox-engine, not by this module. This enables instant unit testing
//! without timers or network mocks.
//!
//! Entry into `Syncing` is single-flight: a trigger that arrives while a
//! pass is running is a no-op.

use outbox_types::SyncStatus;

/// Scheduler state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No pass in flight, timer armed.
    #[default]
    Idle,
    /// A sync pass is running.
    Syncing,
    /// Scheduling suspended by the caller.
    Paused,
}

impl SchedulerState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (outbox-engine)
    /// is responsible for executing the returned actions.
    ///
    /// `eligible` on trigger events means: the current quality tier allows
    /// syncing AND the queue has dispatchable actions. The engine computes
    /// it so the machine stays free of queue and network knowledge.
    pub fn on_event(self, event: SchedulerEvent) -> (Self, Vec<SchedulerAction>) {
        match (self, event) {
            // Triggers from Idle
            (Self::Idle, SchedulerEvent::TimerTick { eligible: true })
            | (Self::Idle, SchedulerEvent::QualityChanged { eligible: true }) => (
                Self::Syncing,
                vec![
                    SchedulerAction::StartPass,
                    SchedulerAction::EmitStatus(SyncStatus::Syncing),
                ],
            ),
            (Self::Idle, SchedulerEvent::TimerTick { eligible: false })
            | (Self::Idle, SchedulerEvent::QualityChanged { eligible: false }) => {
                (Self::Idle, vec![])
            }

            // Pass outcomes
            (Self::Syncing, SchedulerEvent::PassCompleted) => (
                Self::Idle,
                vec![SchedulerAction::EmitStatus(SyncStatus::Idle)],
            ),
            (Self::Syncing, SchedulerEvent::PassFailed { message }) => (
                Self::Idle,
                vec![SchedulerAction::EmitStatus(SyncStatus::Error(message))],
            ),

            // Pause is a unilateral demand from any state. An in-flight
            // chunk still runs to completion; only scheduling stops.
            (Self::Paused, SchedulerEvent::PauseRequested) => (Self::Paused, vec![]),
            (_, SchedulerEvent::PauseRequested) => (
                Self::Paused,
                vec![
                    SchedulerAction::CancelTimer,
                    SchedulerAction::EmitStatus(SyncStatus::Paused),
                ],
            ),

            // Resume re-arms the timer and attempts an immediate pass if
            // conditions allow. Resume while already active is a no-op
            // (no duplicate timers).
            (Self::Paused, SchedulerEvent::ResumeRequested { eligible: true }) => (
                Self::Syncing,
                vec![
                    SchedulerAction::RestartTimer,
                    SchedulerAction::StartPass,
                    SchedulerAction::EmitStatus(SyncStatus::Syncing),
                ],
            ),
            (Self::Paused, SchedulerEvent::ResumeRequested { eligible: false }) => (
                Self::Idle,
                vec![
                    SchedulerAction::RestartTimer,
                    SchedulerAction::EmitStatus(SyncStatus::Idle),
                ],
            ),
            (state, SchedulerEvent::ResumeRequested { .. }) => (state, vec![]),

            // Single-flight: triggers while Syncing are no-ops; triggers
            // while Paused are ignored.
            (state, _) => (state, vec![]),
        }
    }

    /// Whether a pass is currently running.
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing)
    }

    /// Whether scheduling is suspended.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

/// Events that drive the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The periodic timer fired.
    TimerTick {
        /// Quality allows syncing and the queue has dispatchable actions.
        eligible: bool,
    },
    /// The network observer reported a quality transition.
    QualityChanged {
        /// Quality allows syncing and the queue has dispatchable actions.
        eligible: bool,
    },
    /// The caller requested a pause.
    PauseRequested,
    /// The caller requested a resume.
    ResumeRequested {
        /// Quality allows syncing and the queue has dispatchable actions.
        eligible: bool,
    },
    /// The in-flight pass finished with every action accounted for.
    PassCompleted,
    /// The in-flight pass ended with failures (soft failure: the queue
    /// remains usable and future passes are still scheduled).
    PassFailed {
        /// Human-readable summary, e.g. "2 of 5 actions failed".
        message: String,
    },
}

/// Actions to be executed by outbox-engine.
///
/// These are instructions, not side effects. The engine interprets them
/// and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerAction {
    /// Run a sync pass now.
    StartPass,
    /// Stop the periodic timer.
    CancelTimer,
    /// Re-arm the periodic timer.
    RestartTimer,
    /// Publish a status value to observers.
    EmitStatus(SyncStatus),
}
