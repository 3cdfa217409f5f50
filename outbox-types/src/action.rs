//! The queued mutation model: action types, priorities, and pending actions.

use crate::ActionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of mutations the engine knows how to route.
///
/// Each variant has exactly one remote applier registered for it. The payload
/// format for each type is owned by that applier, not by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new reminder.
    CreateReminder,
    /// Update an existing reminder.
    UpdateReminder,
    /// Delete a reminder.
    DeleteReminder,
    /// Create a new calendar event.
    CreateEvent,
    /// Update an existing calendar event.
    UpdateEvent,
    /// Delete a calendar event.
    DeleteEvent,
    /// Send an email.
    SendEmail,
    /// Update user preferences.
    UpdatePreferences,
    /// Log an analytics event.
    LogAnalyticsEvent,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionType::CreateReminder => "create-reminder",
            ActionType::UpdateReminder => "update-reminder",
            ActionType::DeleteReminder => "delete-reminder",
            ActionType::CreateEvent => "create-event",
            ActionType::UpdateEvent => "update-event",
            ActionType::DeleteEvent => "delete-event",
            ActionType::SendEmail => "send-email",
            ActionType::UpdatePreferences => "update-preferences",
            ActionType::LogAnalyticsEvent => "log-analytics-event",
        };
        write!(f, "{}", label)
    }
}

/// Dispatch priority of a queued action.
///
/// Higher priorities are dequeued first. The derived `Ord` relies on the
/// variants being declared lowest-first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work (analytics, logging).
    Low,
    /// Normal user mutations.
    #[default]
    Normal,
    /// User-visible, time-sensitive mutations.
    High,
    /// Must go out in the next pass (e.g. outgoing email).
    Urgent,
}

/// A single queued mutation awaiting remote application.
///
/// The payload is opaque to the engine; only the remote applier registered
/// for `action_type` interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Unique identifier, assigned at enqueue time.
    pub id: ActionId,
    /// Which remote applier handles this action.
    pub action_type: ActionType,
    /// Opaque serialized payload.
    pub payload: Vec<u8>,
    /// Enqueue timestamp in milliseconds since the Unix epoch.
    ///
    /// Used for ordering within a priority tier and for staleness decisions.
    pub enqueued_at: u64,
    /// Dispatch priority.
    pub priority: Priority,
    /// Number of failed application attempts so far.
    pub retry_count: u32,
    /// Diagnostic from the most recent failure, cleared on success or
    /// manual retry.
    pub last_error: Option<String>,
    /// Set once the applier has reported a conflict at the retry ceiling.
    /// Flagged actions are excluded from automatic batches.
    pub conflict_flag: bool,
}

impl PendingAction {
    /// Create a new pending action with fresh bookkeeping.
    pub fn new(
        action_type: ActionType,
        payload: Vec<u8>,
        priority: Priority,
        enqueued_at: u64,
    ) -> Self {
        Self {
            id: ActionId::new(),
            action_type,
            payload,
            enqueued_at,
            priority,
            retry_count: 0,
            last_error: None,
            conflict_flag: false,
        }
    }

    /// The total-order key: priority descending, then enqueue time ascending.
    pub fn order_key(&self) -> (std::cmp::Reverse<Priority>, u64) {
        (std::cmp::Reverse(self.priority), self.enqueued_at)
    }

    /// Record a failed attempt.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(error.into());
    }

    /// Reset retry bookkeeping (manual retry or conflict resolution).
    pub fn reset_bookkeeping(&mut self) {
        self.retry_count = 0;
        self.last_error = None;
        self.conflict_flag = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn order_key_sorts_priority_desc_then_time_asc() {
        let urgent = PendingAction::new(ActionType::SendEmail, vec![], Priority::Urgent, 300);
        let normal_old = PendingAction::new(ActionType::CreateEvent, vec![], Priority::Normal, 100);
        let normal_new = PendingAction::new(ActionType::CreateEvent, vec![], Priority::Normal, 200);

        let mut actions = vec![normal_new.clone(), urgent.clone(), normal_old.clone()];
        actions.sort_by_key(|a| a.order_key());

        assert_eq!(actions[0].id, urgent.id);
        assert_eq!(actions[1].id, normal_old.id);
        assert_eq!(actions[2].id, normal_new.id);
    }

    #[test]
    fn record_failure_increments_and_sets_error() {
        let mut action = PendingAction::new(ActionType::CreateReminder, vec![1], Priority::Normal, 0);
        action.record_failure("timeout");
        action.record_failure("timeout");

        assert_eq!(action.retry_count, 2);
        assert_eq!(action.last_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn reset_bookkeeping_clears_everything() {
        let mut action = PendingAction::new(ActionType::CreateReminder, vec![1], Priority::Normal, 0);
        action.record_failure("conflict");
        action.conflict_flag = true;

        action.reset_bookkeeping();

        assert_eq!(action.retry_count, 0);
        assert!(action.last_error.is_none());
        assert!(!action.conflict_flag);
    }

    #[test]
    fn pending_action_json_roundtrip() {
        let action = PendingAction::new(ActionType::UpdatePreferences, vec![1, 2, 3], Priority::High, 42);
        let json = serde_json::to_string(&action).unwrap();
        let restored: PendingAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, restored);
    }

    #[test]
    fn action_type_labels() {
        assert_eq!(ActionType::SendEmail.to_string(), "send-email");
        assert_eq!(ActionType::LogAnalyticsEvent.to_string(), "log-analytics-event");
    }
}
