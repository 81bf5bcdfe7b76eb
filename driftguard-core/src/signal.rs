//! RSSI classification against a link-quality threshold
//!
//! A single sample is classified as [`SignalClass::Strong`] or
//! [`SignalClass::Weak`]; an absent sample is always Weak - losing the
//! telemetry that carries RSSI is itself a sign the link is gone, never
//! an error. The monitor is a pure function of its inputs: hysteresis
//! (holding a classification for N ticks before acting on it) belongs to
//! the controller, which owns the tick counter.

use crate::constants::DEFAULT_RSSI_THRESHOLD_DBM;

/// Link strength classification for one RSSI sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    /// Sample present and at or above the threshold
    Strong,
    /// Sample absent or below the threshold
    Weak,
}

/// Classifies RSSI samples against a fixed threshold
///
/// ## Example
///
/// ```rust
/// use driftguard_core::signal::{SignalMonitor, SignalClass};
///
/// let monitor = SignalMonitor::default(); // -90 dBm
/// assert_eq!(monitor.classify(Some(-72.0)), SignalClass::Strong);
/// assert_eq!(monitor.classify(Some(-95.5)), SignalClass::Weak);
/// assert_eq!(monitor.classify(None), SignalClass::Weak);
/// ```
#[derive(Debug, Clone)]
pub struct SignalMonitor {
    /// Threshold in dBm; samples at or above it are Strong
    threshold_dbm: f32,
}

impl Default for SignalMonitor {
    fn default() -> Self {
        Self {
            threshold_dbm: DEFAULT_RSSI_THRESHOLD_DBM,
        }
    }
}

impl SignalMonitor {
    /// Create a monitor with a custom threshold in dBm
    pub fn new(threshold_dbm: f32) -> Self {
        Self { threshold_dbm }
    }

    /// Configured threshold in dBm
    pub fn threshold(&self) -> f32 {
        self.threshold_dbm
    }

    /// Classify a single sample; `None` means no signal and is Weak
    ///
    /// A NaN sample compares false against the threshold and lands on
    /// Weak, but callers should have rejected it as invalid input before
    /// getting here.
    pub fn classify(&self, sample: Option<f32>) -> SignalClass {
        match sample {
            Some(rssi) if rssi >= self.threshold_dbm => SignalClass::Strong,
            _ => SignalClass::Weak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_at_and_above_threshold() {
        let monitor = SignalMonitor::default();

        assert_eq!(monitor.classify(Some(-90.0)), SignalClass::Strong);
        assert_eq!(monitor.classify(Some(-50.0)), SignalClass::Strong);
        assert_eq!(monitor.classify(Some(0.0)), SignalClass::Strong);
    }

    #[test]
    fn weak_below_threshold() {
        let monitor = SignalMonitor::default();

        assert_eq!(monitor.classify(Some(-90.1)), SignalClass::Weak);
        assert_eq!(monitor.classify(Some(-120.0)), SignalClass::Weak);
    }

    #[test]
    fn absent_sample_is_weak() {
        let monitor = SignalMonitor::default();
        assert_eq!(monitor.classify(None), SignalClass::Weak);
    }

    #[test]
    fn custom_threshold() {
        let monitor = SignalMonitor::new(-80.0);

        // -85 is strong against -90 but weak against -80
        assert_eq!(monitor.classify(Some(-85.0)), SignalClass::Weak);
        assert_eq!(monitor.classify(Some(-79.0)), SignalClass::Strong);
    }
}
