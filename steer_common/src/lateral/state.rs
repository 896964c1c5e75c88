//! Per-tick inputs to the lateral controller.

use serde::{Deserialize, Serialize};

/// Subset of the car state consumed by the lateral controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Vehicle speed [m/s].
    pub v_ego: f64,
    /// Measured steering wheel angle [deg].
    pub steering_angle_deg: f64,
    /// Driver is applying torque to the wheel.
    pub steering_pressed: bool,
    /// Actuator reported the steering rate limit active.
    pub steering_rate_limited: bool,
}

/// Online calibration estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Steering angle sensor offset [deg].
    pub angle_offset_deg: f64,
    /// Road roll [rad], positive when banked to the right.
    pub roll: f64,
}

/// Everything the torque controller needs for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Lateral control requested by the supervisor.
    pub active: bool,
    pub vehicle: VehicleState,
    pub calibration: Calibration,
    /// Desired path curvature [1/m].
    pub desired_curvature: f64,
    /// Desired path curvature rate [1/(m·s)].
    pub desired_curvature_rate: f64,
    /// Calibrated yaw rate [rad/s], when the localizer provides one.
    pub yaw_rate: Option<f64>,
}

impl ControlInput {
    /// Steering angle corrected by the calibration offset [rad].
    #[inline]
    pub fn corrected_steering_angle_rad(&self) -> f64 {
        (self.vehicle.steering_angle_deg - self.calibration.angle_offset_deg).to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_angle_removes_offset() {
        let input = ControlInput {
            vehicle: VehicleState {
                steering_angle_deg: 7.0,
                ..Default::default()
            },
            calibration: Calibration {
                angle_offset_deg: 2.0,
                roll: 0.0,
            },
            ..Default::default()
        };
        assert!((input.corrected_steering_angle_rad() - 5.0_f64.to_radians()).abs() < 1e-15);
    }

    #[test]
    fn default_input_is_inactive() {
        let input = ControlInput::default();
        assert!(!input.active);
        assert!(input.yaw_rate.is_none());
    }
}
