//! Integration tests for live re-tuning through the file-backed store.
//!
//! Verifies the full reload pipeline:
//! - Enable flag polled every 100 ticks, values reloaded every 300 enabled ticks.
//! - Reloaded gains and friction reach the controller; the integrator restarts.
//! - A malformed or missing value skips the reload and keeps the old gains.
//! - A disabled flag or an absent store directory never reloads.

use std::fs;
use std::path::Path;

use steer_common::consts::{
    LIVE_TUNE_POLL_INTERVAL, LIVE_TUNE_RELOAD_INTERVAL, PARAM_FRICTION, PARAM_LIVE_TUNE_ENABLE,
    PARAM_TORQUE_KF, PARAM_TORQUE_KI, PARAM_TORQUE_KP,
};
use steer_common::lateral::config::{TorqueTuningConfig, VehicleModelConfig};
use steer_common::lateral::control::TorqueGains;
use steer_common::lateral::state::{ControlInput, VehicleState};
use steer_control::control::torque::LatControlTorque;
use steer_control::control::vehicle_model::VehicleModel;
use steer_control::tuning::FileParamStore;
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

/// Tick on which the first reload lands.
const FIRST_RELOAD_TICK: u32 = LIVE_TUNE_POLL_INTERVAL + LIVE_TUNE_RELOAD_INTERVAL - 1;

fn initial_config() -> TorqueTuningConfig {
    TorqueTuningConfig {
        kp: 0.01,
        ki: 1.0,
        kf: 0.0,
        friction: 0.0,
        ..Default::default()
    }
}

fn write_params(dir: &Path, kp: &str, ki: &str, kf: &str, friction: &str) {
    fs::write(dir.join(PARAM_TORQUE_KP), kp).unwrap();
    fs::write(dir.join(PARAM_TORQUE_KI), ki).unwrap();
    fs::write(dir.join(PARAM_TORQUE_KF), kf).unwrap();
    fs::write(dir.join(PARAM_FRICTION), friction).unwrap();
}

fn set_enabled(dir: &Path, enabled: bool) {
    fs::write(dir.join(PARAM_LIVE_TUNE_ENABLE), if enabled { "1" } else { "0" }).unwrap();
}

fn input() -> ControlInput {
    ControlInput {
        active: true,
        vehicle: VehicleState {
            v_ego: 20.0,
            ..Default::default()
        },
        desired_curvature: 0.001,
        ..Default::default()
    }
}

fn vm() -> VehicleModel {
    VehicleModel::new(&VehicleModelConfig::default())
}

fn run(ctl: &mut LatControlTorque<FileParamStore>, ticks: u32) {
    let vm = vm();
    let input = input();
    for _ in 0..ticks {
        ctl.update(&input, &vm);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn reload_applies_gains_and_restarts_integrator() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20\n", "50\n", "500\n", "80\n");
    set_enabled(dir.path(), true);

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    run(&mut ctl, FIRST_RELOAD_TICK - 1);

    assert!(ctl.live_tune_enabled());
    assert_eq!(ctl.gains(), initial_config().gains());
    // Constant error of 0.6 has wound the integrator up to the limit.
    assert!(ctl.pid().integral() > 0.9);

    run(&mut ctl, 1);
    assert_eq!(
        ctl.gains(),
        TorqueGains {
            kp: 2.0,
            ki: 0.05,
            kf: 0.5,
        }
    );
    assert_eq!(ctl.friction(), 0.08);
    // New kp alone saturates, so the restarted integrator stays at zero.
    assert_eq!(ctl.pid().integral(), 0.0);
}

#[test]
fn malformed_value_keeps_previous_gains() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20", "abc", "500", "80");
    set_enabled(dir.path(), true);

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    run(&mut ctl, FIRST_RELOAD_TICK);
    assert_eq!(ctl.gains(), initial_config().gains());
    assert_eq!(ctl.friction(), 0.0);

    // Fixed value is picked up one reload interval later.
    fs::write(dir.path().join(PARAM_TORQUE_KI), "50").unwrap();
    run(&mut ctl, LIVE_TUNE_RELOAD_INTERVAL - 1);
    assert_eq!(ctl.gains(), initial_config().gains());
    run(&mut ctl, 1);
    assert_eq!(ctl.gains().ki, 0.05);
}

#[test]
fn missing_value_keeps_previous_gains() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20", "50", "500", "80");
    fs::remove_file(dir.path().join(PARAM_FRICTION)).unwrap();
    set_enabled(dir.path(), true);

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    run(&mut ctl, FIRST_RELOAD_TICK + 10);
    assert_eq!(ctl.gains(), initial_config().gains());
    assert_eq!(ctl.tuning().retune_counter(), 10);
}

#[test]
fn disabled_flag_never_reloads() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20", "50", "500", "80");
    set_enabled(dir.path(), false);

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    run(&mut ctl, 3 * FIRST_RELOAD_TICK);
    assert!(!ctl.live_tune_enabled());
    assert_eq!(ctl.gains(), initial_config().gains());
    assert_eq!(ctl.tuning().retune_counter(), 0);
}

#[test]
fn enabling_mid_run_starts_reload_cadence() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20", "50", "500", "80");

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    run(&mut ctl, 2 * LIVE_TUNE_POLL_INTERVAL);
    assert!(!ctl.live_tune_enabled());

    set_enabled(dir.path(), true);
    run(&mut ctl, LIVE_TUNE_POLL_INTERVAL + LIVE_TUNE_RELOAD_INTERVAL - 2);
    assert_eq!(ctl.gains(), initial_config().gains());
    run(&mut ctl, 1);
    assert_eq!(ctl.gains().kp, 2.0);
}

#[test]
fn absent_store_directory_stays_disabled() {
    let dir = TempDir::new().unwrap();
    let store = FileParamStore::new(dir.path().join("does-not-exist"));

    let mut ctl = LatControlTorque::new(&initial_config(), 100, store);
    run(&mut ctl, 2 * FIRST_RELOAD_TICK);
    assert!(!ctl.live_tune_enabled());
    assert_eq!(ctl.gains(), initial_config().gains());
}

#[test]
fn reload_continues_while_inactive() {
    let dir = TempDir::new().unwrap();
    write_params(dir.path(), "20", "50", "500", "80");
    set_enabled(dir.path(), true);

    let mut ctl = LatControlTorque::new(&initial_config(), 100, FileParamStore::new(dir.path()));
    let vm = vm();
    let parked = ControlInput {
        active: false,
        ..input()
    };
    for _ in 0..FIRST_RELOAD_TICK {
        let cmd = ctl.update(&parked, &vm);
        assert_eq!(cmd.torque, 0.0);
    }
    assert_eq!(ctl.gains().kp, 2.0);
}
