//! Steering geometry.
//!
//! Steady-state single-track (bicycle) model mapping road-wheel angle to
//! path curvature, with an understeer slip factor and a road-roll term:
//!
//! ```text
//! κ = sa / (sR · L) / (1 − sf · u²)  +  g · roll / (1/sf − u²)
//! ```

use steer_common::consts::GRAVITY;
use steer_common::lateral::config::VehicleModelConfig;

/// Converts a steering wheel angle into path curvature.
pub trait CurvatureModel {
    /// Curvature [1/m] for steering wheel angle `angle_rad` at `speed` [m/s]
    /// on a road with `roll` [rad].
    fn curvature_from_angle(&self, angle_rad: f64, speed: f64, roll: f64) -> f64;
}

/// Slip factors below this are treated as neutral steer.
const NEUTRAL_SLIP_FACTOR: f64 = 1e-6;

/// Single-track vehicle model.
#[derive(Debug, Clone, Copy)]
pub struct VehicleModel {
    wheelbase: f64,
    steer_ratio: f64,
    slip_factor: f64,
}

impl VehicleModel {
    pub fn new(config: &VehicleModelConfig) -> Self {
        Self {
            wheelbase: config.wheelbase,
            steer_ratio: config.steer_ratio,
            slip_factor: config.slip_factor,
        }
    }

    /// Curvature per road-wheel radian at speed `u`.
    #[inline]
    pub fn curvature_factor(&self, u: f64) -> f64 {
        1.0 / (1.0 - self.slip_factor * u * u) / self.wheelbase
    }

    /// Curvature induced by road roll at speed `u`.
    #[inline]
    pub fn roll_compensation(&self, roll: f64, u: f64) -> f64 {
        if self.slip_factor.abs() < NEUTRAL_SLIP_FACTOR {
            0.0
        } else {
            GRAVITY * roll / (1.0 / self.slip_factor - u * u)
        }
    }

    /// Steering wheel angle [rad] that produces `curvature` at speed `u`.
    pub fn angle_from_curvature(&self, curvature: f64, u: f64, roll: f64) -> f64 {
        (curvature - self.roll_compensation(roll, u)) * self.steer_ratio / self.curvature_factor(u)
    }
}

impl CurvatureModel for VehicleModel {
    #[inline]
    fn curvature_from_angle(&self, angle_rad: f64, speed: f64, roll: f64) -> f64 {
        self.curvature_factor(speed) * angle_rad / self.steer_ratio
            + self.roll_compensation(roll, speed)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
