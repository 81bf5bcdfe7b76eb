//! Fallback navigation engine for Driftguard
//!
//! Decides, tick by tick, whether a drone should navigate from its
//! signal-derived position fix or dead-reckon from inertial samples,
//! and keeps the kinematic state continuous across the switch.
//!
//! Key constraints:
//! - Runs on small flight controllers (no heap in the tick path)
//! - One tick per control cycle, bounded time, no internal blocking
//! - Deterministic: identical inputs produce identical outputs
//!
//! ```no_run
//! use driftguard_core::{ControllerConfig, FallbackController, ControlInput};
//! use driftguard_core::events::MemorySink;
//! use driftguard_core::time::FixedTime;
//!
//! let mut ctl = FallbackController::new(
//!     ControllerConfig::default(),
//!     MemorySink::<32>::new(),
//!     FixedTime::new(0),
//! ).unwrap();
//!
//! let out = ctl.tick(ControlInput {
//!     rssi: Some(-72.0),
//!     dt: 0.02,
//!     ..ControlInput::default()
//! }).unwrap();
//! assert!(out.event.is_none()); // strong signal, no mode change
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod events;
pub mod inertial;
pub mod signal;
pub mod time;

// Public API
pub use config::ControllerConfig;
pub use controller::{ControlInput, FallbackController, TickOutput};
pub use errors::{ConfigError, InvalidInput, NavResult};
pub use events::{EventSink, ModeChangeEvent, ModeChangeReason, NavigationMode, Report};
pub use inertial::{InertialIntegrator, KinematicState};
pub use signal::{SignalClass, SignalMonitor};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
