//! Base lateral-controller capabilities: speed gate and saturation tracking.
//!
//! Saturation is reported only after the output has been pinned at the
//! limit for a sustained time at speed, with the driver hands-off and the
//! actuator not rate limited. The counter rises by `dt` per saturated tick
//! and falls by `dt` otherwise, clamped to `[0, steer_limit_timer]`.

use steer_common::consts::{MIN_STEER_SPEED, SATURATION_EPSILON, SATURATION_MIN_SPEED};
use steer_common::lateral::state::VehicleState;

/// Capabilities shared by all lateral controllers.
pub trait LatControlBase {
    /// Speed [m/s] below which the controller is inactive.
    fn min_steer_speed(&self) -> f64;

    /// Clear internal state.
    fn reset(&mut self);

    /// Feed this tick's raw saturation and return the debounced flag.
    fn check_saturation(&mut self, saturated: bool, vehicle: &VehicleState) -> bool;
}

/// Hysteresis counter for output saturation.
#[derive(Debug, Clone)]
pub struct SaturationTracker {
    sat_count: f64,
    sat_count_rate: f64,
    sat_limit: f64,
}

impl SaturationTracker {
    /// `steer_limit_timer` [s] of sustained saturation at `rate_hz` ticks.
    pub fn new(steer_limit_timer: f64, rate_hz: u32) -> Self {
        Self {
            sat_count: 0.0,
            sat_count_rate: 1.0 / f64::from(rate_hz.max(1)),
            sat_limit: steer_limit_timer.max(0.0),
        }
    }

    #[inline]
    pub fn count(&self) -> f64 {
        self.sat_count
    }
}

impl LatControlBase for SaturationTracker {
    #[inline]
    fn min_steer_speed(&self) -> f64 {
        MIN_STEER_SPEED
    }

    fn reset(&mut self) {
        self.sat_count = 0.0;
    }

    fn check_saturation(&mut self, saturated: bool, vehicle: &VehicleState) -> bool {
        if saturated
            && vehicle.v_ego > SATURATION_MIN_SPEED
            && !vehicle.steering_rate_limited
            && !vehicle.steering_pressed
        {
            self.sat_count += self.sat_count_rate;
        } else {
            self.sat_count -= self.sat_count_rate;
        }
        self.sat_count = self.sat_count.clamp(0.0, self.sat_limit);
        self.sat_count > self.sat_limit - SATURATION_EPSILON
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
