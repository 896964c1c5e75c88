//! # Steer Torque
//!
//! Closed-loop run of the lateral torque controller against the steering
//! plant simulator.
//!
//! Loads the controller TOML, opens the live-tuning store (`params_dir`,
//! or an in-memory store when unset), performs RT setup and ticks the
//! controller at `control_rate_hz` until `--ticks` ticks have run or
//! Ctrl-C is received.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use steer_common::config::{ConfigError, LogLevel};
use steer_common::lateral::config::ControllerConfig;
use steer_control::config::{load_config, param_store};
use steer_control::cycle::{CycleRunner, Scenario, rt_setup};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Lateral torque controller, closed-loop simulation
#[derive(Parser, Debug)]
#[command(name = "steer_control")]
#[command(version)]
#[command(about = "Lateral torque steering controller with live re-tuning")]
struct Args {
    /// Path to controller configuration TOML.
    #[arg(default_value = "config/controller.toml")]
    config: PathBuf,

    /// Ticks to run (0 = until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Vehicle speed [m/s].
    #[arg(long, default_value_t = 20.0)]
    speed: f64,

    /// Desired path curvature [1/m].
    #[arg(long, default_value_t = 0.002, allow_negative_numbers = true)]
    curvature: f64,

    /// CPU core to pin the RT thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);

    let log_level = match &loaded {
        Ok(config) => config.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, log_level);

    info!("steer_control v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));

    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("steer_control shutdown complete");
}

fn run(args: &Args, config: &ControllerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !args.speed.is_finite() || !args.curvature.is_finite() {
        return Err(Box::new(ConfigError::ValidationError(
            "--speed and --curvature must be finite".to_string(),
        )));
    }

    let _span = tracing::info_span!("service", name = %config.shared.service_name).entered();
    info!(
        rate_hz = config.control_rate_hz,
        kp = config.torque.kp,
        ki = config.torque.ki,
        kf = config.torque.kf,
        friction = config.torque.friction,
        params_dir = config.params_dir.as_deref().unwrap_or("<memory>"),
        "config OK"
    );

    rt_setup(args.cpu_core, args.rt_priority)?;

    let mut runner = CycleRunner::new(
        config,
        param_store(config),
        Scenario {
            desired_curvature: args.curvature,
            speed: args.speed,
            ticks: args.ticks,
        },
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    runner.run(&running)?;
    Ok(())
}

/// Setup tracing subscriber. `--verbose` overrides the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug.as_str()
    } else {
        log_level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
