//! Integration tests for closed-loop curvature tracking.
//!
//! Drives the controller against the steering plant and checks that the
//! vehicle settles on the desired curvature, plus the sign conventions of
//! the published torque, friction offset and saturation reporting.

use steer_common::lateral::config::{ControllerConfig, TorqueTuningConfig, VehicleModelConfig};
use steer_common::lateral::state::{Calibration, ControlInput, VehicleState};
use steer_control::config::load_config_from_str;
use steer_control::control::torque::LatControlTorque;
use steer_control::control::vehicle_model::VehicleModel;
use steer_control::cycle::{CycleRunner, Scenario};
use steer_control::tuning::MemoryParamStore;

// ─── Helpers ────────────────────────────────────────────────────────

fn config(use_steering_angle: bool) -> ControllerConfig {
    load_config_from_str(&format!(
        r#"
control_rate_hz = 100

[torque]
kp = 1.0
ki = 0.1
kf = 0.0
use_steering_angle = {use_steering_angle}

[vehicle]
wheelbase = 2.7
steer_ratio = 15.0
slip_factor = -0.0005
"#
    ))
    .unwrap()
}

fn settle(config: &ControllerConfig, desired_curvature: f64, speed: f64) -> f64 {
    let mut runner = CycleRunner::new(
        config,
        MemoryParamStore::new(),
        Scenario {
            desired_curvature,
            speed,
            ticks: 0,
        },
    );
    for _ in 0..800 {
        let cmd = runner.step();
        assert!(cmd.is_finite());
    }
    runner.plant().curvature()
}

fn open_loop(torque: TorqueTuningConfig) -> LatControlTorque<MemoryParamStore> {
    LatControlTorque::new(&torque, 100, MemoryParamStore::new())
}

fn straight(speed: f64, desired_curvature: f64) -> ControlInput {
    ControlInput {
        active: true,
        vehicle: VehicleState {
            v_ego: speed,
            ..Default::default()
        },
        calibration: Calibration::default(),
        desired_curvature,
        ..Default::default()
    }
}

fn vm() -> VehicleModel {
    VehicleModel::new(&VehicleModelConfig::default())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn settles_on_left_and_right_curves() {
    let cfg = config(true);
    for target in [0.002, -0.003] {
        let reached = settle(&cfg, target, 20.0);
        assert!(
            (reached - target).abs() < 1e-4,
            "target {target}, reached {reached}"
        );
    }
}

#[test]
fn settles_in_yaw_rate_mode() {
    let reached = settle(&config(false), 0.0015, 15.0);
    assert!((reached - 0.0015).abs() < 1e-4, "reached {reached}");
}

#[test]
fn under_curving_yields_negative_torque() {
    let mut ctl = open_loop(TorqueTuningConfig {
        kp: 0.5,
        ki: 0.0,
        kf: 0.0,
        ..Default::default()
    });
    let cmd = ctl.update(&straight(20.0, 0.001), &vm());
    assert!(cmd.state.error > 0.0);
    assert!(cmd.torque < 0.0);
    assert_eq!(cmd.torque, cmd.state.output);
}

#[test]
fn friction_follows_desired_jerk() {
    let torque = TorqueTuningConfig {
        kp: 0.0,
        ki: 0.0,
        kf: 0.0,
        friction: 0.1,
        ..Default::default()
    };
    let vm = vm();

    let mut input = straight(20.0, 0.0);
    input.desired_curvature_rate = 0.001; // jerk 0.4, past threshold
    let left = open_loop(torque).update(&input, &vm);
    assert!((left.torque + 0.1).abs() < 1e-12);

    input.desired_curvature_rate = -0.00025; // jerk −0.1, half threshold
    let right = open_loop(torque).update(&input, &vm);
    assert!((right.torque - 0.05).abs() < 1e-12);
}

#[test]
fn road_roll_shifts_feedforward() {
    let torque = TorqueTuningConfig {
        kp: 0.0,
        ki: 0.0,
        kf: 0.1,
        ..Default::default()
    };
    let mut input = straight(20.0, 0.0);
    input.calibration.roll = 0.1;
    let cmd = open_loop(torque).update(&input, &vm());
    // f = kf · (0 − roll · g), output negated
    assert!((cmd.state.f + 0.1 * 0.1 * 9.81).abs() < 1e-12);
    assert!((cmd.torque - 0.1 * 0.1 * 9.81).abs() < 1e-12);
}

#[test]
fn sustained_saturation_is_reported_after_timer() {
    let mut ctl = open_loop(TorqueTuningConfig {
        steer_limit_timer: 1.0,
        ..Default::default()
    });
    let vm = vm();
    let input = straight(20.0, 0.05);

    for tick in 0..90 {
        let cmd = ctl.update(&input, &vm);
        assert_eq!(cmd.torque, -1.0);
        assert!(!cmd.state.saturated, "saturated early at tick {tick}");
    }
    let reported = (0..20).any(|_| ctl.update(&input, &vm).state.saturated);
    assert!(reported);
}

#[test]
fn driver_override_suppresses_saturation() {
    let mut ctl = open_loop(TorqueTuningConfig {
        steer_limit_timer: 0.2,
        ..Default::default()
    });
    let vm = vm();
    let mut input = straight(20.0, 0.05);
    input.vehicle.steering_pressed = true;
    for _ in 0..200 {
        assert!(!ctl.update(&input, &vm).state.saturated);
    }
}

#[test]
fn low_speed_saturation_not_reported() {
    let mut ctl = open_loop(TorqueTuningConfig {
        steer_limit_timer: 0.2,
        ..Default::default()
    });
    let vm = vm();
    let input = straight(5.0, 0.5);
    for _ in 0..200 {
        let cmd = ctl.update(&input, &vm);
        assert!(cmd.state.active);
        assert!(!cmd.state.saturated);
    }
}
