//! Error Types for Navigation and Integration Failures
//!
//! ## Design Philosophy
//!
//! The error system follows the same rules as the rest of the engine:
//!
//! 1. **Small Size**: Variants carry a few floats or a `&'static str` at
//!    most, since errors are returned from the tick path every cycle.
//!
//! 2. **No Heap Allocation**: No `String` anywhere - all context is inline,
//!    which keeps memory usage deterministic on flight controllers.
//!
//! 3. **Copy Semantics**: Errors implement `Copy` so callers can stash or
//!    forward them without move gymnastics.
//!
//! ## Error Categories
//!
//! - [`InvalidInput`]: the caller handed the engine a sample it must not
//!   integrate - a non-positive or non-finite `dt`, or a NaN/infinite
//!   acceleration, angular velocity, RSSI, or position fix. These are
//!   always surfaced to the control loop and never silently coerced;
//!   integrating garbage once can poison the dead-reckoned state for the
//!   rest of the session.
//!
//! - [`ConfigError`]: the controller was constructed with an unusable
//!   configuration. Raised once at construction, never retried.
//!
//! - [`SinkError`]: the event sink could not record a report. This category
//!   is deliberately *not* propagated out of `tick` - losing a navigation
//!   update is worse than losing a log line, so the controller downgrades
//!   it to the `reporting_degraded` flag on the tick output.

use thiserror_no_std::Error;

/// Result type for tick and integration operations
pub type NavResult<T> = Result<T, InvalidInput>;

/// Rejected control input - kept small for the hot path
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidInput {
    /// Time step is zero, negative, or non-finite
    #[error("dt {dt} is not a positive finite time step")]
    NonPositiveDt {
        /// The offending time step in seconds
        dt: f32,
    },

    /// A numeric field is NaN or infinite
    #[error("field '{field}' is not finite")]
    NonFinite {
        /// Name of the offending input field
        field: &'static str,
    },
}

/// Invalid controller configuration, detected at construction
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// RSSI threshold is NaN or infinite
    #[error("threshold {value} dBm is not finite")]
    NonFiniteThreshold {
        /// The configured threshold value
        value: f32,
    },

    /// Initial kinematic state contains a NaN or infinite component
    #[error("initial state field '{field}' is not finite")]
    NonFiniteInitial {
        /// Name of the offending component
        field: &'static str,
    },
}

/// Event sink failure - downgraded to a flag by the controller
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SinkError {
    /// Sink backend is unreachable or erroring
    #[error("sink unavailable: {reason}")]
    Unavailable {
        /// Backend-specific failure description
        reason: &'static str,
    },

    /// Bounded sink is out of capacity and configured not to overwrite
    #[error("sink full")]
    Full,
}

#[cfg(feature = "defmt")]
impl defmt::Format for InvalidInput {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonPositiveDt { dt } =>
                defmt::write!(fmt, "dt {} not positive finite", dt),
            Self::NonFinite { field } =>
                defmt::write!(fmt, "field '{}' not finite", field),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Unavailable { reason } =>
                defmt::write!(fmt, "sink unavailable: {}", reason),
            Self::Full => defmt::write!(fmt, "sink full"),
        }
    }
}
