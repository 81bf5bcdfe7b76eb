//! Shared constants for signal classification and integration
//!
//! Defaults follow the conventions of consumer radio links: RSSI is a
//! signed dBm-like figure where -90 dBm is the edge of a usable link.

/// Default RSSI threshold in dBm below which the link is considered weak
pub const DEFAULT_RSSI_THRESHOLD_DBM: f32 = -90.0;

/// Default number of consecutive ticks a classification must hold before
/// a mode transition is honored (0 = transition immediately)
pub const DEFAULT_HYSTERESIS_TICKS: u32 = 0;

/// Full turn in radians, the exclusive upper bound for orientation
pub const TWO_PI: f32 = 2.0 * core::f32::consts::PI;
