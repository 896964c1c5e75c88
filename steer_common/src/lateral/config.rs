//! Configuration structures for the torque controller.
//!
//! All config types use `serde::Deserialize` for TOML loading.
//! Optional fields use `#[serde(default)]`; `validate()` checks bounds and
//! returns a human-readable message on failure.

use serde::{Deserialize, Serialize};

use crate::config::SharedConfig;
use crate::consts::{
    CONTROL_RATE_HZ, CONTROL_RATE_HZ_MAX, CONTROL_RATE_HZ_MIN, STEER_LIMIT_TIMER_DEFAULT,
    STEER_MAX_DEFAULT, STEER_MAX_LIMIT,
};

use super::control::TorqueGains;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level controller configuration.
///
/// ```toml
/// control_rate_hz = 100
/// params_dir = "/data/params/d"
///
/// [torque]
/// kp = 1.0
/// ki = 0.1
/// kf = 1.0
/// friction = 0.05
///
/// [vehicle]
/// wheelbase = 2.7
/// steer_ratio = 15.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    /// Control tick rate [Hz] (default: 100).
    #[serde(default = "default_control_rate")]
    pub control_rate_hz: u32,

    /// Directory of the persisted key/value store used for live tuning.
    /// `None` runs with an empty in-memory store.
    #[serde(default)]
    pub params_dir: Option<String>,

    pub torque: TorqueTuningConfig,

    pub vehicle: VehicleModelConfig,
}

fn default_control_rate() -> u32 {
    CONTROL_RATE_HZ
}

impl ControllerConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), String> {
        if !(CONTROL_RATE_HZ_MIN..=CONTROL_RATE_HZ_MAX).contains(&self.control_rate_hz) {
            return Err(format!(
                "control_rate_hz {} out of range [{}, {}]",
                self.control_rate_hz, CONTROL_RATE_HZ_MIN, CONTROL_RATE_HZ_MAX
            ));
        }
        if let Some(dir) = &self.params_dir {
            if dir.is_empty() {
                return Err("params_dir cannot be empty".to_string());
            }
        }
        self.torque.validate()?;
        self.vehicle.validate()
    }

    /// Tick period [s].
    #[inline]
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.control_rate_hz)
    }
}

// ─── Torque Tuning ──────────────────────────────────────────────────

/// Initial gains and limits of the torque controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TorqueTuningConfig {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Feedforward gain.
    pub kf: f64,
    /// Derivative gain on the error rate (default: 0, not live-tunable).
    #[serde(default)]
    pub kd: f64,
    /// Friction compensation magnitude.
    #[serde(default)]
    pub friction: f64,
    /// Measure curvature from the steering angle instead of the yaw rate.
    #[serde(default = "default_true")]
    pub use_steering_angle: bool,
    /// Normalized steer-torque limit (default: 1.0).
    #[serde(default = "default_steer_max")]
    pub steer_max: f64,
    /// Time the output must stay saturated before it is reported [s].
    #[serde(default = "default_steer_limit_timer")]
    pub steer_limit_timer: f64,
}

/// True if `steer_max` is a usable normalized torque limit.
#[inline]
pub fn valid_steer_max(steer_max: f64) -> bool {
    steer_max > 0.0 && steer_max <= STEER_MAX_LIMIT
}

fn default_true() -> bool {
    true
}
fn default_steer_max() -> f64 {
    STEER_MAX_DEFAULT
}
fn default_steer_limit_timer() -> f64 {
    STEER_LIMIT_TIMER_DEFAULT
}

impl Default for TorqueTuningConfig {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.1,
            kf: 1.0,
            kd: 0.0,
            friction: 0.0,
            use_steering_angle: true,
            steer_max: STEER_MAX_DEFAULT,
            steer_limit_timer: STEER_LIMIT_TIMER_DEFAULT,
        }
    }
}

impl TorqueTuningConfig {
    /// Initial gain set.
    #[inline]
    pub fn gains(&self) -> TorqueGains {
        TorqueGains {
            kp: self.kp,
            ki: self.ki,
            kf: self.kf,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kf", self.kf),
            ("kd", self.kd),
            ("friction", self.friction),
            ("steer_limit_timer", self.steer_limit_timer),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("torque.{name} must be finite and >= 0, got {value}"));
            }
        }
        if !valid_steer_max(self.steer_max) {
            return Err(format!(
                "torque.steer_max must be in (0, {STEER_MAX_LIMIT}], got {}",
                self.steer_max
            ));
        }
        Ok(())
    }
}

// ─── Vehicle Model ──────────────────────────────────────────────────

/// Steady-state single-track vehicle parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleModelConfig {
    /// Distance between front and rear axle [m].
    pub wheelbase: f64,
    /// Steering wheel angle / road wheel angle.
    pub steer_ratio: f64,
    /// Understeer slip factor [s²/m²] (default: 0 = neutral steer).
    #[serde(default)]
    pub slip_factor: f64,
}

impl Default for VehicleModelConfig {
    fn default() -> Self {
        Self {
            wheelbase: 2.7,
            steer_ratio: 15.0,
            slip_factor: 0.0,
        }
    }
}

impl VehicleModelConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.wheelbase.is_finite() || self.wheelbase <= 0.0 {
            return Err(format!(
                "vehicle.wheelbase must be finite and > 0, got {}",
                self.wheelbase
            ));
        }
        if !self.steer_ratio.is_finite() || self.steer_ratio <= 0.0 {
            return Err(format!(
                "vehicle.steer_ratio must be finite and > 0, got {}",
                self.steer_ratio
            ));
        }
        // Oversteer (sf > 0) has a pole at u = 1/√sf within driving speeds.
        if !self.slip_factor.is_finite() || self.slip_factor > 0.0 {
            return Err(format!(
                "vehicle.slip_factor must be finite and <= 0, got {}",
                self.slip_factor
            ));
        }
        Ok(())
    }
}
