//! Prelude module for common re-exports.
//!
//! ```rust
//! use steer_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::lateral::config::{ControllerConfig, TorqueTuningConfig, VehicleModelConfig};

// ─── Control Types ──────────────────────────────────────────────────
pub use crate::fixed::{Fixed, FixedParseError};
pub use crate::lateral::control::{LateralTorqueState, TorqueCommand, TorqueGains};
pub use crate::lateral::state::{Calibration, ControlInput, VehicleState};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{CONTROL_RATE_HZ, ERROR_RATE_FRAME, MIN_STEER_SPEED};
