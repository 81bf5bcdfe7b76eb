//! Driftguard command surface
//!
//! Thin boundary around the engine: `start` drives a session from a CSV
//! tick file into an append-only event log, `status` renders the most
//! recent status report, `stop` flushes a final status marker. Every
//! failure is caught here, logged, and mapped to a non-zero exit code;
//! the engine itself never terminates the process.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use driftguard_core::{
    events::{EventSink, FileSink, Report},
    time::{SystemTime, TimeSource},
    ControlInput, ControllerConfig, FallbackController, KinematicState, NavigationMode,
};

#[derive(Parser)]
#[command(name = "driftguard", version, about = "Drone fallback navigation control")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a navigation session from a tick file
    Start {
        /// CSV tick file: rssi,ax,ay,omega,dt (empty field = no sample)
        #[arg(long)]
        input: PathBuf,
        /// Append-only event log (JSON Lines)
        #[arg(long, default_value = "driftguard_events.jsonl")]
        log: PathBuf,
        /// RSSI threshold in dBm
        #[arg(long, default_value_t = -90.0, allow_hyphen_values = true)]
        threshold: f32,
        /// Hysteresis deadband in ticks
        #[arg(long, default_value_t = 0)]
        hysteresis: u32,
    },
    /// Flush a final status marker and end the session
    Stop {
        /// Event log written by `start`
        #[arg(long, default_value = "driftguard_events.jsonl")]
        log: PathBuf,
    },
    /// Render the most recent status report
    Status {
        /// Event log written by `start`
        #[arg(long, default_value = "driftguard_events.jsonl")]
        log: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Start {
            input,
            log,
            threshold,
            hysteresis,
        } => start(&input, &log, threshold, hysteresis),
        Commands::Stop { log } => stop(&log),
        Commands::Status { log } => status(&log),
    }
}

fn start(input: &Path, log_path: &Path, threshold: f32, hysteresis: u32) -> Result<()> {
    let sink = open_sink(log_path)?;
    let config = ControllerConfig::default()
        .with_threshold(threshold)
        .with_hysteresis(hysteresis);
    let mut controller = FallbackController::new(config, sink, SystemTime)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    log::info!("session started (threshold {} dBm)", threshold);

    let ticks = std::fs::read_to_string(input)
        .with_context(|| format!("reading tick file {}", input.display()))?;

    let mut degraded = false;
    for (lineno, line) in ticks.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tick = parse_tick(line).with_context(|| format!("tick file line {}", lineno + 1))?;
        let out = controller
            .tick(tick)
            .map_err(|e| anyhow::anyhow!("tick rejected at line {}: {}", lineno + 1, e))?;

        if let Some(event) = out.event {
            log::info!(
                "mode change: {} -> {} ({})",
                event.from,
                event.to,
                event.reason.as_str()
            );
        }
        degraded |= out.reporting_degraded;
    }

    if degraded {
        log::warn!("one or more reports were lost; event log is incomplete");
    }

    let (mode, kinematics) = controller.current_status();
    println!("{}", render_status(mode, kinematics));
    Ok(())
}

fn stop(log_path: &Path) -> Result<()> {
    let (mode, kinematics, _) = last_status(log_path)?;

    // Flush a final snapshot so the log ends with the closing state
    let mut sink = open_sink(log_path)?;
    let report = Report::Status {
        mode,
        kinematics,
        timestamp: SystemTime.now(),
    };
    sink.record(&report)
        .map_err(|e| anyhow::anyhow!("writing final status: {}", e))?;

    log::info!("session stopped");
    println!("session stopped in {} mode", mode);
    Ok(())
}

fn status(log_path: &Path) -> Result<()> {
    let (mode, kinematics, timestamp) = last_status(log_path)?;
    println!("{} (as of t={}ms)", render_status(mode, kinematics), timestamp);
    Ok(())
}

fn open_sink(log_path: &Path) -> Result<FileSink> {
    let path = log_path
        .to_str()
        .with_context(|| format!("non-UTF-8 log path {}", log_path.display()))?;
    FileSink::append(path).with_context(|| format!("opening event log {}", log_path.display()))
}

/// Parse one CSV tick row: `rssi,ax,ay,omega,dt`, empty field = absent
fn parse_tick(line: &str) -> Result<ControlInput> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 5 {
        bail!("expected 5 fields (rssi,ax,ay,omega,dt), got {}", fields.len());
    }

    let rssi = parse_optional(fields[0]).context("rssi")?;
    let ax = parse_optional(fields[1]).context("ax")?;
    let ay = parse_optional(fields[2]).context("ay")?;
    let angular_velocity = parse_optional(fields[3]).context("omega")?;
    let dt: f32 = fields[4].parse().context("dt")?;

    let acceleration = match (ax, ay) {
        (Some(ax), Some(ay)) => Some((ax, ay)),
        (None, None) => None,
        _ => bail!("ax and ay must both be present or both be empty"),
    };

    Ok(ControlInput {
        rssi,
        acceleration,
        angular_velocity,
        fix: None,
        dt,
    })
}

fn parse_optional(field: &str) -> Result<Option<f32>> {
    if field.is_empty() {
        return Ok(None);
    }
    Ok(Some(field.parse()?))
}

/// Most recent status report in the event log
fn last_status(log_path: &Path) -> Result<(NavigationMode, KinematicState, u64)> {
    let contents = std::fs::read_to_string(log_path)
        .with_context(|| format!("reading event log {}", log_path.display()))?;

    let mut last = None;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let report: Report =
            serde_json::from_str(line).with_context(|| "malformed event log line")?;
        if let Report::Status {
            mode,
            kinematics,
            timestamp,
        } = report
        {
            last = Some((mode, kinematics, timestamp));
        }
    }

    last.with_context(|| format!("no status reports in {}", log_path.display()))
}

fn render_status(mode: NavigationMode, k: KinematicState) -> String {
    format!(
        "mode={} pos=({:.3}, {:.3}) vel=({:.3}, {:.3}) heading={:.3}rad",
        mode, k.x, k.y, k.vx, k.vy, k.orientation
    )
}
