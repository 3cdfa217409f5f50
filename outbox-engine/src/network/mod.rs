//! Network observation for outbox-sync.
//!
//! The observer reports whether the device is connected and which quality
//! tier the current transport maps to, and publishes every tier transition
//! through a watch channel. The scheduler reacts to those transitions
//! immediately instead of waiting for the next timer tick.
//!
//! Classification is a transport-class heuristic (see
//! [`ConnectionQuality::classify`]), not a measured-bandwidth test. A
//! future observer that measures round-trip latency only has to keep the
//! same monotonic tier mapping.

mod mock;

pub use mock::MockObserver;

use outbox_types::ConnectionQuality;
use tokio::sync::watch;

/// Source of connectivity and quality information.
pub trait NetworkObserver: Send + Sync {
    /// Whether the device currently has any connectivity.
    fn is_connected(&self) -> bool;

    /// The current quality tier.
    fn quality(&self) -> ConnectionQuality;

    /// Subscribe to quality transitions.
    ///
    /// The receiver yields the new tier on every change; the current value
    /// is available immediately via `borrow()`.
    fn subscribe(&self) -> watch::Receiver<ConnectionQuality>;
}
