//! Controller configuration
//!
//! Validated once at construction; a controller never runs with a
//! configuration it could not check. `hysteresis_ticks` is unsigned, so
//! the one illegal value the original design worried about (a negative
//! deadband) is unrepresentable.

use crate::{
    constants::{DEFAULT_HYSTERESIS_TICKS, DEFAULT_RSSI_THRESHOLD_DBM},
    errors::ConfigError,
    inertial::KinematicState,
};

/// Configuration for a [`FallbackController`](crate::FallbackController)
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// RSSI threshold in dBm; samples at or above it classify Strong
    pub threshold_dbm: f32,

    /// Consecutive ticks an opposing classification must hold before a
    /// transition is honored; 0 means transition immediately
    pub hysteresis_ticks: u32,

    /// Kinematic state at session start
    pub initial: KinematicState,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            threshold_dbm: DEFAULT_RSSI_THRESHOLD_DBM,
            hysteresis_ticks: DEFAULT_HYSTERESIS_TICKS,
            initial: KinematicState::default(),
        }
    }
}

impl ControllerConfig {
    /// Preset with a deadband for links that flap around the threshold
    ///
    /// Three ticks of sustained change before switching trades a little
    /// reaction latency for not thrashing the navigation source.
    pub fn conservative() -> Self {
        Self {
            hysteresis_ticks: 3,
            ..Self::default()
        }
    }

    /// Set the RSSI threshold in dBm
    pub fn with_threshold(mut self, threshold_dbm: f32) -> Self {
        self.threshold_dbm = threshold_dbm;
        self
    }

    /// Set the hysteresis deadband in ticks
    pub fn with_hysteresis(mut self, ticks: u32) -> Self {
        self.hysteresis_ticks = ticks;
        self
    }

    /// Set the session-start kinematic state
    pub fn with_initial(mut self, initial: KinematicState) -> Self {
        self.initial = initial;
        self
    }

    /// Check the configuration for non-finite numerics
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold_dbm.is_finite() {
            return Err(ConfigError::NonFiniteThreshold {
                value: self.threshold_dbm,
            });
        }
        if let Err(field) = self.initial.check_finite() {
            return Err(ConfigError::NonFiniteInitial { field });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold_dbm, -90.0);
        assert_eq!(config.hysteresis_ticks, 0);
    }

    #[test]
    fn rejects_non_finite_threshold() {
        let config = ControllerConfig::default().with_threshold(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteThreshold { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_initial_state() {
        let config = ControllerConfig::default().with_initial(KinematicState {
            vy: f32::INFINITY,
            ..KinematicState::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteInitial { field: "vy" })
        ));
    }

    #[test]
    fn conservative_preset_has_deadband() {
        let config = ControllerConfig::conservative();
        assert_eq!(config.hysteresis_ticks, 3);
        assert!(config.validate().is_ok());
    }
}
