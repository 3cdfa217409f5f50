//! Identity types for outbox-sync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a queued action.
///
/// UUID v4 format (16 bytes). Assigned at enqueue time and stable for the
/// action's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(uuid::Uuid);

impl ActionId {
    /// Create a new random ActionId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create an ActionId from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        uuid::Uuid::from_slice(bytes).ok().map(Self)
    }

    /// Get the raw bytes of this ActionId.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_id_is_uuid_v4() {
        let id = ActionId::new();
        assert_eq!(id.as_bytes().len(), 16);
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn action_id_roundtrip() {
        let original = ActionId::new();
        let bytes = original.as_bytes();
        let restored = ActionId::from_bytes(bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn action_id_from_invalid_length_fails() {
        assert!(ActionId::from_bytes(&[0u8; 8]).is_none());
        assert!(ActionId::from_bytes(&[0u8; 32]).is_none());
    }

    #[test]
    fn action_ids_are_unique() {
        assert_ne!(ActionId::new(), ActionId::new());
    }
}
