//! Fallback Controller State Machine
//!
//! ## Overview
//!
//! Owns the navigation mode and drives one control tick at a time:
//! classify the RSSI sample, honor a mode transition once it clears the
//! hysteresis deadband, advance or synchronize the kinematic state, and
//! report the result to the event sink.
//!
//! ## Transition table
//!
//! | Current  | Classification (post-hysteresis) | Next     | Event            |
//! |----------|----------------------------------|----------|------------------|
//! | Normal   | Weak                             | Fallback | signal_lost      |
//! | Normal   | Strong                           | Normal   | -                |
//! | Fallback | Strong                           | Normal   | signal_recovered |
//! | Fallback | Weak                             | Fallback | -                |
//!
//! Events are edge-triggered: holding a classification while already in
//! the matching mode never re-fires.
//!
//! ## Continuity
//!
//! The kinematic state is never reset by a transition. In Normal mode the
//! integrator mirrors the externally-reported fix each tick; the tick
//! that switches to Fallback reports that carried-over state unchanged,
//! and dead-reckoning drives its evolution from the next tick on.
//!
//! ## Concurrency
//!
//! None inside. `tick` is a synchronous critical section driven by the
//! caller's control loop; a multi-threaded host wraps the controller in
//! its own mutual exclusion. Nothing here blocks - sink I/O is required
//! to be non-blocking by the [`EventSink`] contract.

use crate::{
    config::ControllerConfig,
    errors::{ConfigError, InvalidInput, NavResult},
    events::{EventSink, ModeChangeEvent, ModeChangeReason, NavigationMode, Report},
    inertial::{check_dt, InertialIntegrator, KinematicState},
    signal::{SignalClass, SignalMonitor},
    time::{TimeSource, Timestamp},
};

/// Per-tick payload from the control loop
///
/// The default value carries `dt = 0.0`, which fails validation: callers
/// must always supply the elapsed time explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlInput {
    /// RSSI sample in dBm; `None` means no signal was observed
    pub rssi: Option<f32>,
    /// Accelerometer sample (m/s²); `None` reuses the last-known value
    pub acceleration: Option<(f32, f32)>,
    /// Gyro sample (rad/s); `None` reuses the last-known value
    pub angular_velocity: Option<f32>,
    /// Externally-reported kinematic fix from the signal-based source,
    /// mirrored into the integrator while in Normal mode
    pub fix: Option<KinematicState>,
    /// Elapsed time since the previous tick in seconds; must be positive
    pub dt: f32,
}

impl ControlInput {
    /// Validate every numeric field before any state is touched
    pub fn validate(&self) -> NavResult<()> {
        check_dt(self.dt)?;
        if let Some(rssi) = self.rssi {
            if !rssi.is_finite() {
                return Err(InvalidInput::NonFinite { field: "rssi" });
            }
        }
        if let Some((ax, ay)) = self.acceleration {
            if !ax.is_finite() {
                return Err(InvalidInput::NonFinite { field: "acceleration.x" });
            }
            if !ay.is_finite() {
                return Err(InvalidInput::NonFinite { field: "acceleration.y" });
            }
        }
        if let Some(omega) = self.angular_velocity {
            if !omega.is_finite() {
                return Err(InvalidInput::NonFinite { field: "angular_velocity" });
            }
        }
        if let Some(fix) = &self.fix {
            if fix.check_finite().is_err() {
                return Err(InvalidInput::NonFinite { field: "fix" });
            }
        }
        Ok(())
    }
}

/// Result of one control tick
#[derive(Debug, Clone, Copy)]
pub struct TickOutput {
    /// Navigation mode after this tick
    pub mode: NavigationMode,
    /// Kinematic snapshot after this tick
    pub kinematics: KinematicState,
    /// Mode transition honored this tick, if any
    pub event: Option<ModeChangeEvent>,
    /// Set when the event sink failed to record; navigation still advanced
    pub reporting_degraded: bool,
}

/// RSSI-gated fallback navigation state machine
///
/// Created once per session with an injected sink and time source;
/// lives for the session, no terminal state.
pub struct FallbackController<S: EventSink, T: TimeSource> {
    monitor: SignalMonitor,
    integrator: InertialIntegrator,
    mode: NavigationMode,
    hysteresis_ticks: u32,
    /// Consecutive ticks the classification has opposed the current mode
    opposing_streak: u32,
    sink: S,
    time: T,
}

impl<S: EventSink, T: TimeSource> FallbackController<S, T> {
    /// Construct a controller, validating the configuration once
    pub fn new(config: ControllerConfig, sink: S, time: T) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            monitor: SignalMonitor::new(config.threshold_dbm),
            integrator: InertialIntegrator::new(config.initial),
            mode: NavigationMode::Normal,
            hysteresis_ticks: config.hysteresis_ticks,
            opposing_streak: 0,
            sink,
            time,
        })
    }

    /// Current mode without side effects
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Read-only view of mode and kinematics
    pub fn current_status(&self) -> (NavigationMode, KinematicState) {
        (self.mode, self.integrator.state())
    }

    /// Borrow the injected sink (for draining test/memory sinks)
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process one control tick
    ///
    /// Fails with [`InvalidInput`] before touching any state; sink
    /// failures never fail the tick and surface as `reporting_degraded`.
    pub fn tick(&mut self, input: ControlInput) -> NavResult<TickOutput> {
        input.validate()?;

        let now = self.time.now();
        let class = self.monitor.classify(input.rssi);
        let event = self.evaluate_transition(class, now);

        match self.mode {
            NavigationMode::Normal => {
                // Mirror the external fix so a later fallback starts
                // from the last reported position, not a stale one
                if let Some(fix) = input.fix {
                    self.integrator.sync_to(fix);
                }
            }
            NavigationMode::Fallback => {
                // The switching tick reports the carried-over state;
                // dead-reckoning takes over from the next tick
                if event.is_none() {
                    self.integrator.step(input.acceleration, input.dt)?;
                    self.integrator
                        .step_orientation(input.angular_velocity, input.dt)?;
                }
            }
        }

        let kinematics = self.integrator.state();
        let mut degraded = false;

        if let Some(event) = event {
            degraded |= self.record(&Report::ModeChange(event));
        }
        degraded |= self.record(&Report::Status {
            mode: self.mode,
            kinematics,
            timestamp: now,
        });

        Ok(TickOutput {
            mode: self.mode,
            kinematics,
            event,
            reporting_degraded: degraded,
        })
    }

    /// Administrative mode override
    ///
    /// Emits a `manual`-reason event (best-effort to the sink) when the
    /// mode actually changes; forcing the current mode is a no-op.
    pub fn force_mode(&mut self, mode: NavigationMode) -> Option<ModeChangeEvent> {
        if mode == self.mode {
            return None;
        }
        let event = ModeChangeEvent {
            from: self.mode,
            to: mode,
            reason: ModeChangeReason::Manual,
            timestamp: self.time.now(),
        };
        self.mode = mode;
        self.opposing_streak = 0;
        self.record(&Report::ModeChange(event));
        Some(event)
    }

    /// Apply the hysteresis deadband and transition when it clears
    ///
    /// The opposing classification must hold for
    /// `max(hysteresis_ticks, 1)` consecutive ticks; any tick matching
    /// the current mode resets the streak.
    fn evaluate_transition(
        &mut self,
        class: SignalClass,
        now: Timestamp,
    ) -> Option<ModeChangeEvent> {
        let desired = match class {
            SignalClass::Strong => NavigationMode::Normal,
            SignalClass::Weak => NavigationMode::Fallback,
        };

        if desired == self.mode {
            self.opposing_streak = 0;
            return None;
        }

        self.opposing_streak += 1;
        if self.opposing_streak < self.hysteresis_ticks.max(1) {
            return None;
        }

        let event = ModeChangeEvent {
            from: self.mode,
            to: desired,
            reason: match desired {
                NavigationMode::Fallback => ModeChangeReason::SignalLost,
                NavigationMode::Normal => ModeChangeReason::SignalRecovered,
            },
            timestamp: now,
        };
        self.mode = desired;
        self.opposing_streak = 0;
        Some(event)
    }

    /// Record a report, downgrading sink failure to a flag
    fn record(&mut self, report: &Report) -> bool {
        match self.sink.record(report) {
            Ok(()) => false,
            Err(_err) => {
                #[cfg(feature = "log")]
                log::warn!("event sink failed, navigation unaffected: {}", _err);
                true
            }
        }
    }
}
