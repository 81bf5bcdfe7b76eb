//! Navigation Events and the Sink Boundary
//!
//! ## Overview
//!
//! Everything the controller wants the outside world to know travels as a
//! [`Report`]: a per-tick status snapshot, or a mode-change event when the
//! state machine actually transitions. Reports flow to an [`EventSink`]
//! injected at construction - the engine has no ambient logger and no
//! file handles of its own, so durability and format stay the sink's
//! problem.
//!
//! ## Delivery semantics
//!
//! Recording is append-only and best-effort. The controller never retries
//! and never fails a tick over a sink error; it flags the tick as
//! `reporting_degraded` and keeps flying. Sinks must not block: a slow
//! backend is expected to buffer or drop, not stall the control loop.
//!
//! ## Provided sinks
//!
//! - [`MemorySink`]: fixed-capacity ring, newest-wins, no_std friendly
//! - [`FileSink`]: append-only JSON Lines file (std)
//! - [`LogSink`]: forwards to the `log` facade (std)
//! - [`NullSink`]: discards everything

use core::fmt;

use crate::{errors::SinkError, inertial::KinematicState, time::Timestamp};

/// Which process drives position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationMode {
    /// Signal-derived positioning; integrator mirrors the external fix
    Normal,
    /// Inertial dead-reckoning; integrator owns the state evolution
    Fallback,
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationMode::Normal => write!(f, "normal"),
            NavigationMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Why a mode transition fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeChangeReason {
    /// Classification went Weak past the hysteresis deadband
    SignalLost,
    /// Classification went Strong past the hysteresis deadband
    SignalRecovered,
    /// Administrative override via `force_mode`
    Manual,
}

impl ModeChangeReason {
    /// Stable text form used in logs and the event file
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModeChangeReason::SignalLost => "signal_lost",
            ModeChangeReason::SignalRecovered => "signal_recovered",
            ModeChangeReason::Manual => "manual",
        }
    }
}

/// Edge-triggered record of a single mode transition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChangeEvent {
    /// Mode before the transition
    pub from: NavigationMode,
    /// Mode after the transition
    pub to: NavigationMode,
    /// What crossed the boundary
    pub reason: ModeChangeReason,
    /// When the transition was honored (ms)
    pub timestamp: Timestamp,
}

/// One record on the sink boundary
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Report {
    /// Per-tick snapshot of mode and kinematics
    Status {
        /// Navigation mode after this tick
        mode: NavigationMode,
        /// Kinematic snapshot after this tick
        kinematics: KinematicState,
        /// When the tick was processed (ms)
        timestamp: Timestamp,
    },
    /// A mode transition fired this tick
    ModeChange(ModeChangeEvent),
}

impl Report {
    /// Timestamp of the report
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Report::Status { timestamp, .. } => *timestamp,
            Report::ModeChange(event) => event.timestamp,
        }
    }
}

/// Append-only capability for navigation reports
///
/// Implementations must be non-blocking and may drop records under
/// pressure; the controller treats any error as `reporting_degraded`
/// and moves on.
pub trait EventSink {
    /// Record a single report, best-effort
    fn record(&mut self, report: &Report) -> Result<(), SinkError>;
}

/// Fixed-capacity in-memory sink, oldest records overwritten when full
///
/// The capacity is a const generic so the buffer lives inline with no
/// heap allocation, same as the rest of the engine state.
#[derive(Debug, Default)]
pub struct MemorySink<const N: usize> {
    records: heapless::Deque<Report, N>,
}

impl<const N: usize> MemorySink<N> {
    /// Create an empty sink
    pub fn new() -> Self {
        Self {
            records: heapless::Deque::new(),
        }
    }

    /// Number of buffered reports
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the sink holds no reports
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate buffered reports, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.records.iter()
    }

    /// Most recent report, if any
    pub fn last(&self) -> Option<&Report> {
        self.records.back()
    }
}

impl<const N: usize> EventSink for MemorySink<N> {
    fn record(&mut self, report: &Report) -> Result<(), SinkError> {
        if self.records.is_full() {
            self.records.pop_front();
        }
        // Cannot fail: we just made room
        let _ = self.records.push_back(*report);
        Ok(())
    }
}

/// Sink that discards every report
#[derive(Debug, Default, Clone)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _report: &Report) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that forwards reports to the `log` facade
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[cfg(feature = "std")]
impl EventSink for LogSink {
    fn record(&mut self, report: &Report) -> Result<(), SinkError> {
        match report {
            Report::Status {
                mode,
                kinematics,
                timestamp,
            } => {
                log::debug!(
                    "status t={}ms mode={} pos=({:.3}, {:.3}) vel=({:.3}, {:.3}) heading={:.3}",
                    timestamp,
                    mode,
                    kinematics.x,
                    kinematics.y,
                    kinematics.vx,
                    kinematics.vy,
                    kinematics.orientation,
                );
            }
            Report::ModeChange(event) => {
                log::info!(
                    "mode change t={}ms {} -> {} ({})",
                    event.timestamp,
                    event.from,
                    event.to,
                    event.reason.as_str(),
                );
            }
        }
        Ok(())
    }
}

/// Append-only JSON Lines event log
///
/// One serialized [`Report`] per line. Durability is best-effort: the
/// file is opened in append mode and each record is written immediately,
/// but no fsync is performed per line.
#[cfg(feature = "std")]
pub struct FileSink {
    file: std::fs::File,
}

#[cfg(feature = "std")]
impl FileSink {
    /// Open (creating if needed) the event log at `path` for appending
    pub fn append(path: &str) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self { file })
    }
}

#[cfg(feature = "std")]
impl EventSink for FileSink {
    fn record(&mut self, report: &Report) -> Result<(), SinkError> {
        use std::io::Write;

        let line = serde_json::to_string(report).map_err(|_| SinkError::Unavailable {
            reason: "serialize failed",
        })?;
        writeln!(self.file, "{}", line).map_err(|_| SinkError::Unavailable {
            reason: "event log write failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(timestamp: Timestamp) -> Report {
        Report::Status {
            mode: NavigationMode::Normal,
            kinematics: KinematicState::default(),
            timestamp,
        }
    }

    #[test]
    fn memory_sink_keeps_newest() {
        let mut sink = MemorySink::<3>::new();

        for t in 0..5 {
            sink.record(&status(t)).unwrap();
        }

        assert_eq!(sink.len(), 3);
        let timestamps: heapless::Vec<Timestamp, 3> =
            sink.iter().map(|r| r.timestamp()).collect();
        assert_eq!(&timestamps[..], &[2, 3, 4]);
    }

    #[test]
    fn reason_text_is_stable() {
        assert_eq!(ModeChangeReason::SignalLost.as_str(), "signal_lost");
        assert_eq!(ModeChangeReason::SignalRecovered.as_str(), "signal_recovered");
        assert_eq!(ModeChangeReason::Manual.as_str(), "manual");
    }

    #[cfg(feature = "std")]
    #[test]
    fn file_sink_appends_json_lines() {
        let dir = std::env::temp_dir();
        let path = dir.join("driftguard_sink_test.jsonl");
        let path = path.to_str().unwrap();
        let _ = std::fs::remove_file(path);

        {
            let mut sink = FileSink::append(path).unwrap();
            sink.record(&status(1)).unwrap();
            sink.record(&status(2)).unwrap();
        }

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: Report = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.timestamp(), 2);

        let _ = std::fs::remove_file(path);
    }
}
