//! Steering plant simulator.
//!
//! First-order model: the steering wheel angle moves at a rate
//! proportional to the commanded torque, capped at the actuator's maximum
//! rate. The vehicle then follows the curvature that angle produces through
//! the [`VehicleModel`]. Good enough to close the loop in tests and in the
//! simulation binary.

use steer_common::lateral::state::VehicleState;
use tracing::trace;

use crate::control::vehicle_model::{CurvatureModel, VehicleModel};

/// Steering wheel rate at full torque [deg/s].
pub const DEFAULT_MAX_STEER_RATE_DEG_S: f64 = 100.0;

/// Closed-loop steering plant.
#[derive(Debug, Clone)]
pub struct SteeringSimulator {
    model: VehicleModel,
    /// Vehicle speed [m/s].
    speed: f64,
    /// Steering wheel angle [deg].
    angle_deg: f64,
    /// Steering wheel rate at |torque| = 1 [deg/s].
    max_rate_deg_s: f64,
    /// Driver torque flag, set externally.
    steering_pressed: bool,
    /// Last step hit the actuator rate limit.
    rate_limited: bool,
}

impl SteeringSimulator {
    pub fn new(model: VehicleModel, speed: f64) -> Self {
        Self {
            model,
            speed,
            angle_deg: 0.0,
            max_rate_deg_s: DEFAULT_MAX_STEER_RATE_DEG_S,
            steering_pressed: false,
            rate_limited: false,
        }
    }

    pub fn with_max_rate(mut self, max_rate_deg_s: f64) -> Self {
        self.max_rate_deg_s = max_rate_deg_s.abs();
        self
    }

    /// Advance the plant by `dt` [s] under `torque` (positive to the left).
    ///
    /// Positive torque winds the wheel toward negative angles, matching the
    /// controller's convention that actual curvature is the negated
    /// geometric curvature of the wheel angle.
    pub fn step(&mut self, torque: f64, dt: f64) -> VehicleState {
        let demand = torque.clamp(-1.0, 1.0);
        self.rate_limited = demand.abs() >= 1.0;
        self.angle_deg += demand * self.max_rate_deg_s * dt;
        trace!(angle_deg = self.angle_deg, torque, "plant step");
        self.vehicle_state()
    }

    /// Car state as seen by the controller.
    pub fn vehicle_state(&self) -> VehicleState {
        VehicleState {
            v_ego: self.speed,
            steering_angle_deg: self.angle_deg,
            steering_pressed: self.steering_pressed,
            steering_rate_limited: self.rate_limited,
        }
    }

    /// Curvature the vehicle is driving [1/m], controller sign convention.
    pub fn curvature(&self) -> f64 {
        -self
            .model
            .curvature_from_angle(self.angle_deg.to_radians(), self.speed, 0.0)
    }

    /// Yaw rate [rad/s].
    pub fn yaw_rate(&self) -> f64 {
        self.curvature() * self.speed
    }

    #[inline]
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    pub fn set_steering_pressed(&mut self, pressed: bool) {
        self.steering_pressed = pressed;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
