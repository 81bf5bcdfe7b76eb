//! Inertial Dead-Reckoning Integrator
//!
//! ## Overview
//!
//! Advances a 2D kinematic state (position, velocity, heading) from
//! accelerometer and gyro samples while the drone has no usable signal
//! fix. Integration is semi-implicit Euler:
//!
//! ```text
//! v' = v + a·dt
//! p' = p + v'·dt
//! θ' = (θ + ω·dt) mod 2π
//! ```
//!
//! Semi-implicit (velocity first, then position with the *new* velocity)
//! is the standard choice for fixed-step kinematics: unlike explicit
//! Euler it does not pump energy into the estimate as steps accumulate.
//!
//! ## Sample dropout
//!
//! IMU samples can be late or missing for a tick. A missing acceleration
//! or angular velocity reuses the last-known value (zero if none was ever
//! supplied) - the step still advances with elapsed time, because a drone
//! that stops integrating while airborne silently teleports when samples
//! resume.
//!
//! ## Mode synchronization
//!
//! While the drone navigates from its signal fix the integrator is not
//! stepped; instead [`InertialIntegrator::sync_to`] mirrors the
//! externally-reported state each tick so that a future fallback starts
//! from a continuous position.
//!
//! ## Validation
//!
//! Every step validates `dt > 0` and finiteness of all numeric inputs,
//! failing with [`InvalidInput`] instead of clamping. One NaN folded into
//! the state would corrupt every subsequent estimate of the session.

use crate::{
    constants::TWO_PI,
    errors::{InvalidInput, NavResult},
};

/// 2D kinematic snapshot: position, velocity, heading
///
/// Orientation is radians in `[0, 2π)`, maintained by wrap-around
/// (never clamped) after every update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KinematicState {
    /// Position east of origin (m)
    pub x: f32,
    /// Position north of origin (m)
    pub y: f32,
    /// Velocity east (m/s)
    pub vx: f32,
    /// Velocity north (m/s)
    pub vy: f32,
    /// Heading in radians, `[0, 2π)`
    pub orientation: f32,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            orientation: 0.0,
        }
    }
}

impl KinematicState {
    /// Check every component for NaN/infinity
    ///
    /// Returns the name of the first non-finite component.
    pub fn check_finite(&self) -> Result<(), &'static str> {
        let fields = [
            (self.x, "x"),
            (self.y, "y"),
            (self.vx, "vx"),
            (self.vy, "vy"),
            (self.orientation, "orientation"),
        ];
        for (value, name) in fields {
            if !value.is_finite() {
                return Err(name);
            }
        }
        Ok(())
    }
}

/// Wrap an angle into `[0, 2π)`
///
/// Handles any finite input including multiple full revolutions in
/// either direction. Uses `libm` so it works without std.
pub fn wrap_angle(theta: f32) -> f32 {
    let mut wrapped = theta - TWO_PI * libm::floorf(theta / TWO_PI);
    // Division rounding can land a hair outside [0, 2π) on either side
    if wrapped < 0.0 {
        wrapped += TWO_PI;
    }
    if wrapped >= TWO_PI {
        wrapped = 0.0;
    }
    wrapped
}

/// Validate a time step: strictly positive and finite
pub(crate) fn check_dt(dt: f32) -> NavResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(InvalidInput::NonPositiveDt { dt });
    }
    Ok(())
}

/// Dead-reckoning integrator owning the kinematic state
///
/// The state is exclusively owned here; callers get copies via
/// [`InertialIntegrator::state`] and feed external fixes back in through
/// [`InertialIntegrator::sync_to`].
#[derive(Debug, Clone)]
pub struct InertialIntegrator {
    state: KinematicState,
    /// Last-known acceleration, reused when a tick has no IMU sample
    last_accel: (f32, f32),
    /// Last-known angular velocity, same dropout rule as acceleration
    last_angular_velocity: f32,
}

impl InertialIntegrator {
    /// Create an integrator starting from the given state
    pub fn new(initial: KinematicState) -> Self {
        Self {
            state: initial,
            last_accel: (0.0, 0.0),
            last_angular_velocity: 0.0,
        }
    }

    /// Snapshot of the current kinematic state
    pub fn state(&self) -> KinematicState {
        self.state
    }

    /// Overwrite internal state with an externally-reported fix
    ///
    /// Called every tick in Normal mode so that a transition to fallback
    /// continues from the last reported position instead of a stale one.
    pub fn sync_to(&mut self, state: KinematicState) {
        self.state = state;
        self.state.orientation = wrap_angle(state.orientation);
    }

    /// Advance position and velocity by one semi-implicit Euler step
    ///
    /// `accel = None` reuses the last-known acceleration; the step always
    /// advances with elapsed time. Returns the updated state snapshot.
    pub fn step(&mut self, accel: Option<(f32, f32)>, dt: f32) -> NavResult<KinematicState> {
        check_dt(dt)?;

        if let Some((ax, ay)) = accel {
            if !ax.is_finite() {
                return Err(InvalidInput::NonFinite { field: "acceleration.x" });
            }
            if !ay.is_finite() {
                return Err(InvalidInput::NonFinite { field: "acceleration.y" });
            }
            self.last_accel = (ax, ay);
        }

        let (ax, ay) = self.last_accel;
        self.state.vx += ax * dt;
        self.state.vy += ay * dt;
        self.state.x += self.state.vx * dt;
        self.state.y += self.state.vy * dt;

        Ok(self.state)
    }

    /// Advance heading by one step, wrapping into `[0, 2π)`
    ///
    /// `angular_velocity = None` reuses the last-known rate. Returns the
    /// updated orientation.
    pub fn step_orientation(&mut self, angular_velocity: Option<f32>, dt: f32) -> NavResult<f32> {
        check_dt(dt)?;

        if let Some(omega) = angular_velocity {
            if !omega.is_finite() {
                return Err(InvalidInput::NonFinite { field: "angular_velocity" });
            }
            self.last_angular_velocity = omega;
        }

        let theta = self.state.orientation + self.last_angular_velocity * dt;
        self.state.orientation = wrap_angle(theta);

        Ok(self.state.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TWO_PI;
    use proptest::prelude::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn single_euler_step() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        let state = integrator.step(Some((0.1, 0.2)), 0.1).unwrap();
        assert!((state.vx - 0.01).abs() < EPS);
        assert!((state.vy - 0.02).abs() < EPS);
        assert!((state.x - 0.001).abs() < EPS);
        assert!((state.y - 0.002).abs() < EPS);
    }

    #[test]
    fn ten_euler_steps() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        let mut state = KinematicState::default();
        for _ in 0..10 {
            state = integrator.step(Some((0.1, 0.2)), 0.1).unwrap();
        }

        // v = a·t; p = sum of semi-implicit increments = a·dt²·(1+..+10)
        assert!((state.vx - 0.1).abs() < 1e-5);
        assert!((state.vy - 0.2).abs() < 1e-5);
        assert!((state.x - 0.055).abs() < 1e-5);
        assert!((state.y - 0.11).abs() < 1e-5);
    }

    #[test]
    fn missing_accel_reuses_last_known() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        integrator.step(Some((1.0, 0.0)), 1.0).unwrap();
        // No sample this tick: still accelerating at 1 m/s²
        let state = integrator.step(None, 1.0).unwrap();
        assert!((state.vx - 2.0).abs() < EPS);
    }

    #[test]
    fn missing_accel_with_no_history_is_zero() {
        let mut integrator = InertialIntegrator::new(KinematicState {
            vx: 3.0,
            ..KinematicState::default()
        });

        // Never saw an accel sample: coasts at constant velocity
        let state = integrator.step(None, 2.0).unwrap();
        assert!((state.vx - 3.0).abs() < EPS);
        assert!((state.x - 6.0).abs() < EPS);
    }

    #[test]
    fn rejects_bad_dt() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = integrator.step(Some((0.0, 0.0)), dt);
            assert!(matches!(result, Err(InvalidInput::NonPositiveDt { .. })));
        }
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        assert!(matches!(
            integrator.step(Some((f32::NAN, 0.0)), 0.1),
            Err(InvalidInput::NonFinite { field: "acceleration.x" })
        ));
        assert!(matches!(
            integrator.step_orientation(Some(f32::INFINITY), 0.1),
            Err(InvalidInput::NonFinite { field: "angular_velocity" })
        ));
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());
        integrator.step(Some((1.0, 1.0)), 1.0).unwrap();
        let before = integrator.state();

        let _ = integrator.step(Some((f32::NAN, 0.0)), 1.0);
        assert_eq!(integrator.state(), before);
    }

    #[test]
    fn orientation_wraps_forward() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        // 1.5 full turns
        let theta = integrator
            .step_orientation(Some(3.0 * core::f32::consts::PI), 1.0)
            .unwrap();
        assert!((theta - core::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn orientation_wraps_backward() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        let theta = integrator
            .step_orientation(Some(-core::f32::consts::FRAC_PI_2), 1.0)
            .unwrap();
        assert!((theta - 1.5 * core::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn sync_overwrites_state() {
        let mut integrator = InertialIntegrator::new(KinematicState::default());

        let fix = KinematicState {
            x: 10.0,
            y: -4.0,
            vx: 1.0,
            vy: 0.5,
            orientation: 1.0,
        };
        integrator.sync_to(fix);
        assert_eq!(integrator.state(), fix);
    }

    proptest! {
        #[test]
        fn wrapped_angle_always_in_range(theta in -1000.0f32..1000.0) {
            let wrapped = wrap_angle(theta);
            prop_assert!((0.0..TWO_PI).contains(&wrapped));
        }

        #[test]
        fn orientation_in_range_after_any_step(
            omega in -100.0f32..100.0,
            dt in 0.001f32..10.0,
        ) {
            let mut integrator = InertialIntegrator::new(KinematicState::default());
            let theta = integrator.step_orientation(Some(omega), dt).unwrap();
            prop_assert!((0.0..TWO_PI).contains(&theta));
        }
    }
}
