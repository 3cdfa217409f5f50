//! Mock network observer for testing.
//!
//! Allows driving the observed transport through transitions and verifying
//! the engine's reaction.

use super::NetworkObserver;
use outbox_types::{ConnectionQuality, TransportClass};
use tokio::sync::watch;

/// Mock network observer driven by the test.
#[derive(Debug)]
pub struct MockObserver {
    tx: watch::Sender<ConnectionQuality>,
}

impl MockObserver {
    /// Create an observer reporting the given transport.
    pub fn new(transport: TransportClass) -> Self {
        let quality = ConnectionQuality::classify(transport);
        let (tx, _) = watch::channel(quality);
        Self { tx }
    }

    /// Create an observer that starts offline.
    pub fn offline() -> Self {
        Self::new(TransportClass::Offline)
    }

    /// Simulate a transport change. Subscribers see the new tier.
    pub fn set_transport(&self, transport: TransportClass) {
        let quality = ConnectionQuality::classify(transport);
        // send_replace so the update sticks even with no active receivers
        self.tx.send_replace(quality);
    }
}

impl Default for MockObserver {
    fn default() -> Self {
        Self::new(TransportClass::Wifi)
    }
}

impl NetworkObserver for MockObserver {
    fn is_connected(&self) -> bool {
        *self.tx.borrow() != ConnectionQuality::Unknown
    }

    fn quality(&self) -> ConnectionQuality {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectionQuality> {
        self.tx.subscribe()
    }
}
