//! Time sources for event timestamping
//!
//! The controller never reads a clock directly. It is handed a
//! [`TimeSource`] at construction and stamps every report with it, which
//! keeps the tick path deterministic under test ([`FixedTime`]) while the
//! deployed system uses the host clock ([`SystemTime`]) or a flight
//! controller tick counter behind the same trait.

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// Source of time for report and event timestamps
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// System wall clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for deterministic tests
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a source pinned at the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Pin the source to a new timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the pinned timestamp by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
