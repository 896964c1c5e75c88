//! Lateral control types.
//!
//! - [`state`]: per-tick vehicle state, calibration and controller input.
//! - [`control`]: gains, diagnostics record and controller output.
//! - [`config`]: TOML configuration of the torque controller.

pub mod config;
pub mod control;
pub mod state;
