//! Integration tests for activation gating and reset behaviour.
//!
//! - Below the minimum steer speed, or when inactive, the torque is exactly
//!   zero and the diagnostics report inactive.
//! - Gating clears the integrator and the error-rate history, so re-entry
//!   starts from a clean state.

use steer_common::consts::{ERROR_RATE_FRAME, MIN_STEER_SPEED};
use steer_common::lateral::config::{TorqueTuningConfig, VehicleModelConfig};
use steer_common::lateral::control::TorqueCommand;
use steer_common::lateral::state::{ControlInput, VehicleState};
use steer_control::control::pid::PidCore;
use steer_control::control::torque::LatControlTorque;
use steer_control::control::vehicle_model::VehicleModel;
use steer_control::tuning::MemoryParamStore;

// ─── Helpers ────────────────────────────────────────────────────────

fn controller() -> LatControlTorque<MemoryParamStore> {
    let config = TorqueTuningConfig {
        kp: 0.1,
        ki: 0.5,
        kf: 1.0,
        friction: 0.05,
        ..Default::default()
    };
    LatControlTorque::new(&config, 100, MemoryParamStore::new())
}

fn vm() -> VehicleModel {
    VehicleModel::new(&VehicleModelConfig::default())
}

fn input(speed: f64, active: bool) -> ControlInput {
    ControlInput {
        active,
        vehicle: VehicleState {
            v_ego: speed,
            steering_angle_deg: -2.0,
            ..Default::default()
        },
        desired_curvature: 0.002,
        desired_curvature_rate: 0.0005,
        ..Default::default()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn standstill_outputs_exact_zero() {
    let mut ctl = controller();
    let vm = vm();
    for _ in 0..50 {
        let cmd = ctl.update(&input(0.0, true), &vm);
        assert_eq!(cmd, TorqueCommand::inactive());
        assert!(cmd.torque.is_sign_positive());
    }
}

#[test]
fn speed_threshold_is_inclusive_of_min_speed() {
    let mut ctl = controller();
    let vm = vm();
    let below = ctl.update(&input(MIN_STEER_SPEED - 1e-6, true), &vm);
    assert!(!below.state.active);

    let at = ctl.update(&input(MIN_STEER_SPEED, true), &vm);
    assert!(at.state.active);
}

#[test]
fn inactive_at_speed_outputs_zero() {
    let mut ctl = controller();
    let cmd = ctl.update(&input(25.0, false), &vm());
    assert_eq!(cmd.torque, 0.0);
    assert_eq!(cmd.angle_deg, 0.0);
    assert!(!cmd.state.active);
    assert!(!cmd.state.saturated);
}

#[test]
fn gating_clears_integrator_and_history() {
    let mut ctl = controller();
    let vm = vm();
    for _ in 0..100 {
        ctl.update(&input(20.0, true), &vm);
    }
    assert_ne!(ctl.pid().terms().i, 0.0);
    assert_eq!(ctl.error_history_len(), ERROR_RATE_FRAME);

    ctl.update(&input(20.0, false), &vm);
    assert_eq!(ctl.pid().terms().i, 0.0);
    assert_eq!(ctl.error_history_len(), 0);
}

#[test]
fn reentry_matches_fresh_controller() {
    let vm = vm();
    let mut used = controller();
    for _ in 0..200 {
        used.update(&input(20.0, true), &vm);
    }
    used.update(&input(0.1, true), &vm);

    // Saturation hysteresis survives gating; the control path does not.
    let mut fresh = controller();
    for _ in 0..ERROR_RATE_FRAME + 3 {
        let a = used.update(&input(20.0, true), &vm);
        let b = fresh.update(&input(20.0, true), &vm);
        assert_eq!(
            (a.torque, a.state.error, a.state.p, a.state.i, a.state.f),
            (b.torque, b.state.error, b.state.p, b.state.i, b.state.f)
        );
    }
}

#[test]
fn explicit_reset_matches_fresh_controller() {
    let vm = vm();
    let mut used = controller();
    for _ in 0..200 {
        used.update(&input(20.0, true), &vm);
    }
    used.reset();
    used.reset();

    let mut fresh = controller();
    for _ in 0..20 {
        assert_eq!(
            used.update(&input(20.0, true), &vm),
            fresh.update(&input(20.0, true), &vm)
        );
    }
}

#[test]
fn outputs_are_finite_and_bounded() {
    let mut ctl = controller();
    let vm = vm();
    for step in 0..2_000 {
        let speed = 0.1 + (step % 400) as f64 * 0.1;
        let mut inp = input(speed, step % 700 < 650);
        inp.desired_curvature = ((step as f64) * 0.01).sin() * 0.02;
        inp.vehicle.steering_pressed = step % 300 < 20;
        let cmd = ctl.update(&inp, &vm);
        assert!(cmd.is_finite());
        assert!(cmd.torque.abs() <= ctl.steer_max());
        assert_eq!(cmd.torque, cmd.state.output);
    }
}
