//! Paced control cycle: read plant → controller tick → actuate plant.
//!
//! ## RT Setup
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` to lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` to pin to a CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Pacing
//! With `rt`, absolute-time sleep on `CLOCK_MONOTONIC` and any overrun
//! aborts the loop. Without it, `std::thread::sleep` for the remainder of
//! the period and overruns are only counted.

use std::sync::atomic::{AtomicBool, Ordering};

use steer_common::lateral::config::ControllerConfig;
use steer_common::lateral::control::TorqueCommand;
use steer_common::lateral::state::{Calibration, ControlInput};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::control::torque::LatControlTorque;
use crate::control::vehicle_model::VehicleModel;
use crate::sim::SteeringSimulator;
use crate::tuning::ParamStore;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of overruns detected.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or cycle execution.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// Tick took longer than the control period.
    #[error("cycle overrun: {actual_ns}ns > {budget_ns}ns budget")]
    CycleOverrun { actual_ns: i64, budget_ns: i64 },
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop does not page-fault on it.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 targets the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence. Call once before [`CycleRunner::run`].
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    debug!(cpu_core, rt_priority, rt = cfg!(feature = "rt"), "RT setup done");
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Constant driving scenario for the closed-loop run.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Desired path curvature [1/m].
    pub desired_curvature: f64,
    /// Vehicle speed [m/s].
    pub speed: f64,
    /// Ticks to run, 0 for unbounded.
    pub ticks: u64,
}

/// Drives the torque controller against the steering plant.
pub struct CycleRunner<S> {
    controller: LatControlTorque<S>,
    model: VehicleModel,
    plant: SteeringSimulator,
    scenario: Scenario,
    /// Tick period [s].
    dt: f64,
    /// Tick period [ns].
    cycle_time_ns: i64,
    /// Diagnostics log interval [ticks].
    report_interval: u64,
    stats: CycleStats,
    last: TorqueCommand,
}

impl<S: ParamStore> CycleRunner<S> {
    pub fn new(config: &ControllerConfig, store: S, scenario: Scenario) -> Self {
        let model = VehicleModel::new(&config.vehicle);
        Self {
            controller: LatControlTorque::new(&config.torque, config.control_rate_hz, store),
            model,
            plant: SteeringSimulator::new(model, scenario.speed),
            scenario,
            dt: config.dt(),
            cycle_time_ns: 1_000_000_000 / i64::from(config.control_rate_hz),
            report_interval: u64::from(config.control_rate_hz),
            stats: CycleStats::new(),
            last: TorqueCommand::inactive(),
        }
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn controller(&self) -> &LatControlTorque<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LatControlTorque<S> {
        &mut self.controller
    }

    pub fn plant(&self) -> &SteeringSimulator {
        &self.plant
    }

    pub fn plant_mut(&mut self) -> &mut SteeringSimulator {
        &mut self.plant
    }

    pub fn last_command(&self) -> &TorqueCommand {
        &self.last
    }

    /// One unpaced tick: sample plant, run controller, actuate plant.
    pub fn step(&mut self) -> TorqueCommand {
        let input = ControlInput {
            active: true,
            vehicle: self.plant.vehicle_state(),
            calibration: Calibration::default(),
            desired_curvature: self.scenario.desired_curvature,
            desired_curvature_rate: 0.0,
            yaw_rate: Some(self.plant.yaw_rate()),
        };
        let cmd = self.controller.update(&input, &self.model);
        self.plant.step(cmd.torque, self.dt);
        self.last = cmd;
        cmd
    }

    fn done(&self, running: &AtomicBool) -> bool {
        !running.load(Ordering::Relaxed)
            || (self.scenario.ticks != 0 && self.stats.cycle_count >= self.scenario.ticks)
    }

    fn report(&self) {
        if self.report_interval == 0 || self.stats.cycle_count % self.report_interval != 0 {
            return;
        }
        let s = &self.last.state;
        info!(
            tick = self.stats.cycle_count,
            torque = self.last.torque,
            error = s.error,
            p = s.p,
            i = s.i,
            f = s.f,
            saturated = s.saturated,
            curvature = self.plant.curvature(),
            "lateral"
        );
    }

    /// Run paced ticks until the scenario's tick count is reached or
    /// `running` is cleared.
    ///
    /// # Errors
    /// With the `rt` feature, returns `CycleError::CycleOverrun` on the
    /// first overrun.
    pub fn run(&mut self, running: &AtomicBool) -> Result<&CycleStats, CycleError> {
        info!(
            rate_hz = self.report_interval,
            ticks = self.scenario.ticks,
            speed = self.scenario.speed,
            desired_curvature = self.scenario.desired_curvature,
            "control loop started"
        );

        #[cfg(feature = "rt")]
        self.run_rt_loop(running)?;

        #[cfg(not(feature = "rt"))]
        self.run_sim_loop(running);

        info!(
            cycles = self.stats.cycle_count,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            overruns = self.stats.overruns,
            "control loop stopped"
        );
        Ok(&self.stats)
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")));
        let mut next_wake = now()?;

        while !self.done(running) {
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);

            let cycle_start = now()?;
            let wake_latency_ns = timespec_diff_ns(&cycle_start, &next_wake).abs();

            self.step();

            let duration_ns = timespec_diff_ns(&now()?, &cycle_start);
            self.stats.record(duration_ns, wake_latency_ns);
            self.report();

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                return Err(CycleError::CycleOverrun {
                    actual_ns: duration_ns,
                    budget_ns: self.cycle_time_ns,
                });
            }

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool) {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.cycle_time_ns as u64);

        while !self.done(running) {
            let cycle_start = Instant::now();

            self.step();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);
            self.report();

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                warn!(duration_ns, budget_ns = self.cycle_time_ns, "cycle overrun");
            }

            if let Some(remaining) = period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let total = ts.tv_nsec() + ns;
    let secs = ts.tv_sec() + total.div_euclid(1_000_000_000);
    let nanos = total.rem_euclid(1_000_000_000);
    TimeSpec::new(secs, nanos)
}

/// `a - b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
