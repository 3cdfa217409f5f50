//! Network quality classification.
//!
//! The engine never measures bandwidth. It maps a coarse transport class to
//! a quality tier, and each tier carries two derived policies: whether
//! automatic syncing should run at all, and how many actions may be
//! dispatched per chunk. The mapping is deliberately monotonic so a future
//! latency-measuring observer can slot in without changing the tier contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of the underlying network transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportClass {
    /// Wired local-area connection.
    Ethernet,
    /// Wireless local-area connection.
    Wifi,
    /// Cellular data connection.
    Cellular,
    /// Connected, but the transport is unrecognized (VPN, tethering, ...).
    Other,
    /// No connectivity.
    Offline,
}

/// A quality tier derived from the current transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionQuality {
    /// Connectivity state is not known (includes disconnected).
    #[default]
    Unknown,
    /// Connected but barely usable.
    Poor,
    /// Usable, keep batches small.
    Fair,
    /// Healthy connection.
    Good,
    /// Wired or local-area connection.
    Excellent,
}

impl ConnectionQuality {
    /// Classify a transport into a quality tier.
    ///
    /// Wired/local-area → excellent, cellular → good, anything else while
    /// connected → fair, disconnected → unknown.
    pub fn classify(transport: TransportClass) -> Self {
        match transport {
            TransportClass::Ethernet | TransportClass::Wifi => Self::Excellent,
            TransportClass::Cellular => Self::Good,
            TransportClass::Other => Self::Fair,
            TransportClass::Offline => Self::Unknown,
        }
    }

    /// Whether automatic sync passes should run at this tier.
    pub fn should_sync(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Poor)
    }

    /// Maximum number of actions dispatched per chunk at this tier.
    pub fn batch_size(&self) -> usize {
        match self {
            Self::Unknown | Self::Poor => 1,
            Self::Fair => 3,
            Self::Good => 5,
            Self::Excellent => 10,
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_policy() {
        assert_eq!(
            ConnectionQuality::classify(TransportClass::Ethernet),
            ConnectionQuality::Excellent
        );
        assert_eq!(
            ConnectionQuality::classify(TransportClass::Wifi),
            ConnectionQuality::Excellent
        );
        assert_eq!(
            ConnectionQuality::classify(TransportClass::Cellular),
            ConnectionQuality::Good
        );
        assert_eq!(
            ConnectionQuality::classify(TransportClass::Other),
            ConnectionQuality::Fair
        );
        assert_eq!(
            ConnectionQuality::classify(TransportClass::Offline),
            ConnectionQuality::Unknown
        );
    }

    #[test]
    fn unknown_and_poor_suppress_sync() {
        assert!(!ConnectionQuality::Unknown.should_sync());
        assert!(!ConnectionQuality::Poor.should_sync());
        assert!(ConnectionQuality::Fair.should_sync());
        assert!(ConnectionQuality::Good.should_sync());
        assert!(ConnectionQuality::Excellent.should_sync());
    }

    #[test]
    fn batch_sizes_per_tier() {
        assert_eq!(ConnectionQuality::Unknown.batch_size(), 1);
        assert_eq!(ConnectionQuality::Poor.batch_size(), 1);
        assert_eq!(ConnectionQuality::Fair.batch_size(), 3);
        assert_eq!(ConnectionQuality::Good.batch_size(), 5);
        assert_eq!(ConnectionQuality::Excellent.batch_size(), 10);
    }

    #[test]
    fn batch_size_is_monotonic_in_tier() {
        let tiers = [
            ConnectionQuality::Unknown,
            ConnectionQuality::Poor,
            ConnectionQuality::Fair,
            ConnectionQuality::Good,
            ConnectionQuality::Excellent,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].batch_size() <= pair[1].batch_size());
        }
    }
}
