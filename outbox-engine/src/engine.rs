//! SyncEngine - the main interface for outbox-sync.
//!
//! This module provides [`SyncEngine`], the primary API for applications
//! to queue mutations while offline and replay them against the remote
//! service once connectivity of sufficient quality is available.
//!
//! # Architecture
//!
//! SyncEngine uses pure logic (from outbox-core) for queue ordering,
//! scheduling transitions, batch planning, and conflict resolution, and
//! interprets the resulting actions to perform actual I/O via the injected
//! collaborators.
//!
//! ```text
//! Application → SyncEngine → RemoteApplier registry → Network
//!                   ↓               ↓
//!              outbox-core     QueueStore (disk)
//! ```
//!
//! There is exactly one logical instance per process: construct it once at
//! startup with its dependencies and hand clones of the handle to callers.
//! All queue mutations are serialized through the engine's internal lock;
//! the network observer and the periodic timer only ever trigger work, they
//! never mutate the queue directly.
//!
//! # Example
//!
//! ```ignore
//! use outbox_engine::{ApplierRegistry, EngineConfig, JsonFileStore, SyncEngine};
//!
//! let registry = ApplierRegistry::new()
//!     .register(ActionType::CreateReminder, Arc::new(ReminderApplier::new(api)));
//! let engine = SyncEngine::new(
//!     EngineConfig::default(),
//!     Arc::new(JsonFileStore::new("outbox.json")),
//!     Arc::new(observer),
//!     registry,
//!     Arc::new(local_store),
//! ).await?;
//! engine.start();
//!
//! let id = engine.queue_action(ActionType::CreateReminder, payload, Priority::Normal).await?;
//! ```

use crate::applier::{ApplierRegistry, SnapshotSink};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::executor::{self, PassSummary};
use crate::network::NetworkObserver;
use crate::store::QueueStore;
use outbox_core::{
    resolve, ActionQueue, ResolutionOutcome, SchedulerAction, SchedulerEvent, SchedulerState,
};
use outbox_types::{
    ActionId, ActionType, ConflictResolution, PendingAction, Priority, SyncProgress,
    SyncStatistics, SyncStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, watch, Mutex as TokioMutex, Notify};
use tracing::{debug, info, warn};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Shared engine state. One instance per process, behind an [`Arc`].
pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) queue: TokioMutex<ActionQueue>,
    pub(crate) store: Arc<dyn QueueStore>,
    pub(crate) appliers: ApplierRegistry,
    pub(crate) sink: Arc<dyn SnapshotSink>,
    pub(crate) observer: Arc<dyn NetworkObserver>,
    state: std::sync::Mutex<SchedulerState>,
    status_tx: watch::Sender<SyncStatus>,
    pending_tx: watch::Sender<usize>,
    pub(crate) progress_tx: watch::Sender<SyncProgress>,
    pub(crate) events_tx: broadcast::Sender<EngineEvent>,
    pub(crate) last_sync: std::sync::Mutex<Option<u64>>,
    timer_reset: Notify,
    pass_active: AtomicBool,
}

impl EngineInner {
    /// Apply a queue mutation, persist the result, and roll back on
    /// persistence failure. The only path through which the queue changes.
    pub(crate) async fn mutate_queue<R>(
        &self,
        mutation: impl FnOnce(&mut ActionQueue) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut queue = self.queue.lock().await;
        let snapshot = queue.snapshot();

        let result = mutation(&mut queue)?;

        if let Err(e) = self.store.save(&queue.snapshot()).await {
            queue.restore(snapshot);
            return Err(EngineError::Store(e));
        }

        self.pending_tx.send_replace(queue.len());
        Ok(result)
    }

    /// Feed an event through the scheduler state machine and execute the
    /// non-pass actions. Returns true when a pass should start.
    fn apply_scheduler_event(&self, event: SchedulerEvent) -> bool {
        let actions = {
            let mut state = self.state.lock().expect("scheduler state lock poisoned");
            let (new_state, actions) = state.on_event(event);
            *state = new_state;
            actions
        };

        let mut start_pass = false;
        for action in actions {
            match action {
                SchedulerAction::StartPass => start_pass = true,
                SchedulerAction::EmitStatus(status) => {
                    self.status_tx.send_replace(status);
                }
                SchedulerAction::CancelTimer | SchedulerAction::RestartTimer => {
                    self.timer_reset.notify_one();
                }
            }
        }
        start_pass
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.state
            .lock()
            .expect("scheduler state lock poisoned")
            .is_paused()
    }

    /// Quality allows syncing and the queue has dispatchable actions.
    async fn eligible(&self) -> bool {
        if !self.observer.quality().should_sync() {
            return false;
        }
        let queue = self.queue.lock().await;
        !queue.peek_batch(1).is_empty()
    }

    /// Run a pass and feed its outcome back into the state machine.
    ///
    /// At most one pass drains the queue at a time. The scheduler state
    /// alone cannot guarantee that: a pause followed by a resume while a
    /// pass is still draining its chunk re-enters `Syncing` and requests a
    /// start, and the draining pass would then race a second one over the
    /// same actions. The in-flight guard drops such start requests; the
    /// draining pass already covers the queued work and settles the state
    /// machine when it finishes.
    async fn run_pass_to_completion(self: &Arc<Self>) {
        if self.pass_active.swap(true, Ordering::SeqCst) {
            debug!("pass already in flight, dropping start request");
            return;
        }
        let summary: PassSummary = executor::run_pass(self).await;
        let event = match summary.failure_message() {
            Some(message) => SchedulerEvent::PassFailed { message },
            None => SchedulerEvent::PassCompleted,
        };
        self.apply_scheduler_event(event);
        self.pass_active.store(false, Ordering::SeqCst);
    }

    /// Handle a timer or quality trigger.
    async fn handle_trigger(self: &Arc<Self>, event_for: fn(bool) -> SchedulerEvent) {
        let eligible = self.eligible().await;
        if self.apply_scheduler_event(event_for(eligible)) {
            self.run_pass_to_completion().await;
        }
    }
}

/// The offline-first sync engine.
///
/// Cheap to clone; all clones share the same queue and scheduler.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// Create an engine, loading the persisted queue from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be loaded.
    pub async fn new(
        config: EngineConfig,
        store: Arc<dyn QueueStore>,
        observer: Arc<dyn NetworkObserver>,
        appliers: ApplierRegistry,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, EngineError> {
        let persisted = store.load().await?;
        let queue = ActionQueue::from_snapshot(persisted, config.queue.max_size);
        info!(pending = queue.len(), "sync engine starting with persisted queue");

        let (status_tx, _) = watch::channel(SyncStatus::Idle);
        let (pending_tx, _) = watch::channel(queue.len());
        let (progress_tx, _) = watch::channel(SyncProgress::default());
        let (events_tx, _) = broadcast::channel(64);

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                queue: TokioMutex::new(queue),
                store,
                appliers,
                sink,
                observer,
                state: std::sync::Mutex::new(SchedulerState::new()),
                status_tx,
                pending_tx,
                progress_tx,
                events_tx,
                last_sync: std::sync::Mutex::new(None),
                timer_reset: Notify::new(),
                pass_active: AtomicBool::new(false),
            }),
        })
    }

    /// Start the scheduler: a periodic timer plus immediate reaction to
    /// quality transitions. Passes run on this task, one at a time.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(inner.config.sync_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; consume
            // it so the first scheduled pass happens one interval from now.
            interval.tick().await;

            let mut quality_rx = inner.observer.subscribe();

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        inner
                            .handle_trigger(|eligible| SchedulerEvent::TimerTick { eligible })
                            .await;
                    }
                    changed = quality_rx.changed() => {
                        if changed.is_err() {
                            // Observer dropped; nothing left to react to.
                            break;
                        }
                        inner
                            .handle_trigger(|eligible| SchedulerEvent::QualityChanged { eligible })
                            .await;
                    }
                    _ = inner.timer_reset.notified() => {
                        interval = tokio::time::interval(inner.config.sync_interval());
                        interval.tick().await;
                    }
                }
            }
        })
    }

    /// Queue a mutation for remote application.
    ///
    /// The action is persisted before this returns; a crash immediately
    /// afterwards does not lose it.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or persistence fails (in which
    /// case the action is not queued).
    pub async fn queue_action(
        &self,
        action_type: ActionType,
        payload: Vec<u8>,
        priority: Priority,
    ) -> Result<ActionId, EngineError> {
        let action = PendingAction::new(action_type, payload, priority, now_ms());
        let id = action.id;

        self.inner
            .mutate_queue(move |queue| queue.enqueue(action).map_err(Into::into))
            .await?;

        debug!(%id, %action_type, ?priority, "action queued");
        Ok(id)
    }

    /// Suspend scheduling. An in-flight chunk runs to completion; remaining
    /// chunks wait for [`resume`](Self::resume).
    pub fn pause(&self) {
        self.inner.apply_scheduler_event(SchedulerEvent::PauseRequested);
        info!("sync paused");
    }

    /// Re-arm the scheduler and attempt an immediate pass if conditions
    /// allow. Calling resume while already active is a no-op.
    pub async fn resume(&self) {
        let eligible = self.inner.eligible().await;
        if self
            .inner
            .apply_scheduler_event(SchedulerEvent::ResumeRequested { eligible })
        {
            info!("sync resumed, starting immediate pass");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.run_pass_to_completion().await;
            });
        }
    }

    /// Remove every queued action.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the queue is left unchanged.
    pub async fn clear_pending(&self) -> Result<(), EngineError> {
        self.inner
            .mutate_queue(|queue| {
                queue.clear();
                Ok(())
            })
            .await?;
        info!("pending actions cleared");
        Ok(())
    }

    /// Reset a failed or flagged action and re-attempt it immediately,
    /// independent of the batch cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is unknown or persistence fails.
    pub async fn retry_failed_action(&self, id: ActionId) -> Result<(), EngineError> {
        self.inner
            .mutate_queue(|queue| {
                queue
                    .requeue(&id, |action| action.reset_bookkeeping())
                    .map_err(Into::into)
            })
            .await?;

        let action = {
            let queue = self.inner.queue.lock().await;
            queue.get(&id).cloned()
        };
        if let Some(action) = action {
            debug!(%id, "manual retry dispatching immediately");
            executor::dispatch(&self.inner, &action).await;
        }
        Ok(())
    }

    /// Carry out a conflict resolution for a flagged action.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is unknown, not flagged, the local
    /// snapshot sink rejects the server state, or persistence fails.
    pub async fn resolve_conflict(
        &self,
        resolution: ConflictResolution,
    ) -> Result<(), EngineError> {
        let id = resolution.action_id;
        let action_type = {
            let queue = self.inner.queue.lock().await;
            let action = queue.get(&id).ok_or(EngineError::UnknownAction(id))?;
            if !action.conflict_flag {
                return Err(EngineError::NotFlagged(id));
            }
            action.action_type
        };

        match resolve(&resolution) {
            ResolutionOutcome::Requeue { payload } => {
                self.inner
                    .mutate_queue(|queue| {
                        queue
                            .requeue(&id, |action| {
                                action.payload = payload;
                                action.reset_bookkeeping();
                            })
                            .map_err(Into::into)
                    })
                    .await?;
                debug!(%id, strategy = ?resolution.strategy, "conflict resolved, action re-queued");
            }
            ResolutionOutcome::ApplyServer { snapshot } => {
                self.inner
                    .sink
                    .apply_server(action_type, snapshot.as_deref())
                    .await
                    .map_err(EngineError::SnapshotApply)?;
                self.inner
                    .mutate_queue(|queue| {
                        queue.remove(&id);
                        Ok(())
                    })
                    .await?;
                let _ = self.inner.events_tx.send(EngineEvent::ServerSnapshotApplied {
                    id,
                    action_type,
                });
                debug!(%id, "conflict resolved with server state, local change discarded");
            }
            ResolutionOutcome::Deferred => {
                warn!(%id, "conflict resolution deferred to the user");
            }
        }
        Ok(())
    }

    /// A point-in-time summary of engine state.
    pub async fn statistics(&self) -> SyncStatistics {
        let queue = self.inner.queue.lock().await;
        SyncStatistics {
            pending_count: queue.len(),
            failed_count: queue.failed_count(),
            conflict_count: queue.conflict_count(),
            last_sync_time: *self
                .inner
                .last_sync
                .lock()
                .expect("last_sync lock poisoned"),
            quality: self.inner.observer.quality(),
            average_retry_count: queue.average_retry_count(),
        }
    }

    /// Subscribe to sync status transitions.
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Subscribe to the pending-action count.
    pub fn pending_count(&self) -> watch::Receiver<usize> {
        self.inner.pending_tx.subscribe()
    }

    /// Subscribe to in-flight pass progress.
    pub fn progress(&self) -> watch::Receiver<SyncProgress> {
        self.inner.progress_tx.subscribe()
    }

    /// Subscribe to discrete engine events.
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events_tx.subscribe()
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("appliers", &self.inner.appliers)
            .finish()
    }
}
