//! Conflict resolution strategies.
//!
//! Given a resolution request for a flagged action, this module decides what
//! the engine should do: re-queue the local mutation, replace local state
//! with the server's, re-queue a merged payload, or leave the action flagged
//! for the UI layer. The decision is pure; outbox-engine performs the queue
//! and persistence work.
//!
//! The default merge policy operates on JSON object payloads: local field
//! values win, gaps are filled from the server. Action types with non-JSON
//! payloads fall back to the local payload unchanged. Type-specific merge
//! policies belong to the caller, which can compute its own merged payload
//! and resolve with `UseLocal` semantics instead.

use outbox_types::{ConflictResolution, ConflictStrategy};

/// What the engine must do to carry out a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Replace the action's payload, reset bookkeeping, and leave it queued
    /// for the next pass.
    Requeue {
        /// The payload to carry forward (local or merged).
        payload: Vec<u8>,
    },
    /// Remove the action from the queue and hand the server snapshot to the
    /// local state layer. The local change is discarded.
    ApplyServer {
        /// The server's authoritative state; `None` when the record was
        /// deleted remotely.
        snapshot: Option<Vec<u8>>,
    },
    /// Leave the action flagged. The UI layer must call back with one of
    /// the other three strategies.
    Deferred,
}

/// Decide the outcome for a resolution request.
pub fn resolve(resolution: &ConflictResolution) -> ResolutionOutcome {
    match resolution.strategy {
        ConflictStrategy::UseLocal => ResolutionOutcome::Requeue {
            payload: resolution.local_snapshot.clone(),
        },
        ConflictStrategy::UseServer => ResolutionOutcome::ApplyServer {
            snapshot: resolution.server_snapshot.clone(),
        },
        ConflictStrategy::Merge => ResolutionOutcome::Requeue {
            payload: merge_payloads(
                &resolution.local_snapshot,
                resolution.server_snapshot.as_deref(),
            ),
        },
        ConflictStrategy::AskUser => ResolutionOutcome::Deferred,
    }
}

/// Default merge policy: prefer local field values, fill gaps from server.
///
/// Both payloads must decode as JSON objects for field-level merging;
/// otherwise the local payload wins wholesale.
pub fn merge_payloads(local: &[u8], server: Option<&[u8]>) -> Vec<u8> {
    let Some(server) = server else {
        return local.to_vec();
    };

    let local_value: Option<serde_json::Value> = serde_json::from_slice(local).ok();
    let server_value: Option<serde_json::Value> = serde_json::from_slice(server).ok();

    match (local_value, server_value) {
        (Some(serde_json::Value::Object(local_map)), Some(serde_json::Value::Object(mut merged))) => {
            // Server map as the base, local entries overwrite.
            for (key, value) in local_map {
                merged.insert(key, value);
            }
            serde_json::to_vec(&serde_json::Value::Object(merged))
                .unwrap_or_else(|_| local.to_vec())
        }
        _ => local.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbox_types::{ActionId, ConflictKind};

    fn make_resolution(strategy: ConflictStrategy) -> ConflictResolution {
        ConflictResolution {
            action_id: ActionId::new(),
            server_snapshot: Some(br#"{"title":"server","location":"office"}"#.to_vec()),
            local_snapshot: br#"{"title":"local"}"#.to_vec(),
            kind: ConflictKind::Modified,
            strategy,
        }
    }

    #[test]
    fn use_local_requeues_local_payload() {
        let resolution = make_resolution(ConflictStrategy::UseLocal);
        let outcome = resolve(&resolution);

        assert_eq!(
            outcome,
            ResolutionOutcome::Requeue {
                payload: resolution.local_snapshot.clone()
            }
        );
    }

    #[test]
    fn use_server_discards_local() {
        let resolution = make_resolution(ConflictStrategy::UseServer);
        let outcome = resolve(&resolution);

        assert_eq!(
            outcome,
            ResolutionOutcome::ApplyServer {
                snapshot: resolution.server_snapshot.clone()
            }
        );
    }

    #[test]
    fn use_server_with_remote_deletion_has_no_snapshot() {
        let mut resolution = make_resolution(ConflictStrategy::UseServer);
        resolution.server_snapshot = None;
        resolution.kind = ConflictKind::DeletedRemotely;

        let outcome = resolve(&resolution);
        assert_eq!(outcome, ResolutionOutcome::ApplyServer { snapshot: None });
    }

    #[test]
    fn ask_user_defers() {
        let outcome = resolve(&make_resolution(ConflictStrategy::AskUser));
        assert_eq!(outcome, ResolutionOutcome::Deferred);
    }

    #[test]
    fn merge_prefers_local_fields_fills_gaps_from_server() {
        let merged = merge_payloads(
            br#"{"title":"local"}"#,
            Some(br#"{"title":"server","location":"office"}"#),
        );

        let value: serde_json::Value = serde_json::from_slice(&merged).unwrap();
        assert_eq!(value["title"], "local");
        assert_eq!(value["location"], "office");
    }

    #[test]
    fn merge_without_server_keeps_local() {
        let local = br#"{"title":"local"}"#;
        assert_eq!(merge_payloads(local, None), local.to_vec());
    }

    #[test]
    fn merge_non_json_payloads_keeps_local() {
        let local = &[0xde, 0xad][..];
        let merged = merge_payloads(local, Some(br#"{"a":1}"#));
        assert_eq!(merged, local.to_vec());
    }

    #[test]
    fn merge_strategy_produces_merged_requeue() {
        let resolution = make_resolution(ConflictStrategy::Merge);
        let outcome = resolve(&resolution);

        match outcome {
            ResolutionOutcome::Requeue { payload } => {
                let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
                assert_eq!(value["title"], "local");
                assert_eq!(value["location"], "office");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
