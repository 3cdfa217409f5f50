//! Mock applier and snapshot sink for testing.
//!
//! Allows scripting outcomes and capturing applied actions for verification.

use super::{RemoteApplier, SnapshotSink};
use async_trait::async_trait;
use outbox_types::{ActionId, ActionType, ApplyError, PendingAction};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock remote applier driven by the test.
///
/// Outcomes are scripted with [`push_result`](Self::push_result); once the
/// script runs out, calls succeed. Cloning shares state.
#[derive(Debug, Default)]
pub struct MockApplier {
    inner: Arc<Mutex<MockApplierInner>>,
}

#[derive(Debug, Default)]
struct MockApplierInner {
    applied: Vec<ActionId>,
    script: VecDeque<Result<(), ApplyError>>,
    always: Option<ApplyError>,
    delay: Option<Duration>,
}

impl MockApplier {
    /// Create an applier that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an applier that fails every call with the given error.
    pub fn always_failing(error: ApplyError) -> Self {
        let applier = Self::new();
        applier.inner.lock().unwrap().always = Some(error);
        applier
    }

    /// Script the outcome of the next unscripted call (FIFO).
    pub fn push_result(&self, result: Result<(), ApplyError>) {
        self.inner.lock().unwrap().script.push_back(result);
    }

    /// Delay every call by the given duration (for timeout tests).
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    /// Ids of all actions this applier was called with.
    pub fn calls(&self) -> Vec<ActionId> {
        self.inner.lock().unwrap().applied.clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().applied.len()
    }
}

impl Clone for MockApplier {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RemoteApplier for MockApplier {
    async fn apply(&self, action: &PendingAction) -> Result<(), ApplyError> {
        let (result, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.applied.push(action.id);
            let result = if let Some(error) = &inner.always {
                Err(error.clone())
            } else {
                inner.script.pop_front().unwrap_or(Ok(()))
            };
            (result, inner.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

/// Mock snapshot sink capturing server snapshots applied locally.
#[derive(Debug, Default)]
pub struct MockSink {
    inner: Arc<Mutex<MockSinkInner>>,
}

#[derive(Debug, Default)]
struct MockSinkInner {
    applied: Vec<(ActionType, Option<Vec<u8>>)>,
    fail_next: Option<String>,
}

impl MockSink {
    /// Create a sink that accepts every snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cause the next `apply_server()` to fail with the given error.
    pub fn fail_next(&self, error: &str) {
        self.inner.lock().unwrap().fail_next = Some(error.to_string());
    }

    /// All snapshots applied so far.
    pub fn applied(&self) -> Vec<(ActionType, Option<Vec<u8>>)> {
        self.inner.lock().unwrap().applied.clone()
    }
}

impl Clone for MockSink {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl SnapshotSink for MockSink {
    async fn apply_server(
        &self,
        action_type: ActionType,
        snapshot: Option<&[u8]>,
    ) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        inner.applied.push((action_type, snapshot.map(|s| s.to_vec())));
        Ok(())
    }
}
