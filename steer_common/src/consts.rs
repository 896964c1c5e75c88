//! Constants for the lateral torque controller.
//!
//! Single source of truth for control-law constants, tick cadences and the
//! key names of the persisted tuning store.

use static_assertions::const_assert;

use crate::fixed::Fixed;

// ─── Control Law ────────────────────────────────────────────────────

/// Weight of curvature relative to lateral acceleration in the blended error.
pub const CURVATURE_SCALE: f64 = 200.0;

/// Lateral jerk [m/s³] at which friction compensation reaches full magnitude.
pub const JERK_THRESHOLD: f64 = 0.2;

/// Gravitational acceleration [m/s²].
pub const GRAVITY: f64 = 9.81;

/// Length of the error history used for the error-rate estimate [ticks].
pub const ERROR_RATE_FRAME: usize = 5;

/// Below this speed [m/s] the controller is inactive.
pub const MIN_STEER_SPEED: f64 = 0.3;

/// Margin to the steer limit under which the output counts as saturated.
pub const SATURATION_EPSILON: f64 = 1e-3;

/// Saturation only accumulates above this speed [m/s].
pub const SATURATION_MIN_SPEED: f64 = 10.0;

/// Default normalized steer-torque limit.
pub const STEER_MAX_DEFAULT: f64 = 1.0;

/// Largest allowed steer-torque limit (full scale).
pub const STEER_MAX_LIMIT: f64 = 1.0;

/// Default time the output may stay saturated before it is reported [s].
pub const STEER_LIMIT_TIMER_DEFAULT: f64 = 1.0;

/// Integrator unwind rate while the driver overrides [1/s].
pub const I_UNWIND_RATE: f64 = 0.3;

// ─── Tick Cadence ───────────────────────────────────────────────────

/// Default control rate [Hz].
pub const CONTROL_RATE_HZ: u32 = 100;

/// Valid control rate bounds [Hz].
pub const CONTROL_RATE_HZ_MIN: u32 = 1;
pub const CONTROL_RATE_HZ_MAX: u32 = 1000;

/// Ticks between reads of the live-tune enable flag.
pub const LIVE_TUNE_POLL_INTERVAL: u32 = 100;

/// Ticks of enabled live-tune between gain reloads.
pub const LIVE_TUNE_RELOAD_INTERVAL: u32 = 300;

const_assert!(ERROR_RATE_FRAME > 0);
const_assert!(STEER_MAX_DEFAULT > 0.0 && STEER_MAX_DEFAULT <= STEER_MAX_LIMIT);
const_assert!(LIVE_TUNE_POLL_INTERVAL > 0);
const_assert!(LIVE_TUNE_RELOAD_INTERVAL > 0);
const_assert!(CONTROL_RATE_HZ >= CONTROL_RATE_HZ_MIN && CONTROL_RATE_HZ <= CONTROL_RATE_HZ_MAX);

// ─── Persisted Store ────────────────────────────────────────────────

/// Boolean key enabling live re-tuning.
pub const PARAM_LIVE_TUNE_ENABLE: &str = "OpkrLiveTunePanelEnable";

/// Proportional gain, stored in units of 0.1.
pub const PARAM_TORQUE_KP: &str = "TorqKp";
/// Integral gain, stored in units of 0.001.
pub const PARAM_TORQUE_KI: &str = "TorqKi";
/// Feedforward gain, stored in units of 0.001.
pub const PARAM_TORQUE_KF: &str = "TorqKf";
/// Friction coefficient, stored in units of 0.001.
pub const PARAM_FRICTION: &str = "friction";

/// Scale applied to the stored `TorqKp` value (0.1).
pub const KP_SCALE: Fixed = Fixed::new(1, 1);
/// Scale applied to the stored `TorqKi` value (0.001).
pub const KI_SCALE: Fixed = Fixed::new(1, 3);
/// Scale applied to the stored `TorqKf` value (0.001).
pub const KF_SCALE: Fixed = Fixed::new(1, 3);
/// Scale applied to the stored `friction` value (0.001).
pub const FRICTION_SCALE: Fixed = Fixed::new(1, 3);
