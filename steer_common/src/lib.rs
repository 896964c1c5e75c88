//! Steer Common Library
//!
//! Shared constants, data types and configuration loading for the lateral
//! torque controller workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Control constants and persisted-store key names
//! - [`config`] - Configuration loading traits and types
//! - [`fixed`] - Fixed-point decimal values read from the tuning store
//! - [`lateral`] - Vehicle state, controller input/output and tuning config
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use steer_common::prelude::*;
//!
//! let gains = TorqueGains { kp: 1.0, ki: 0.1, kf: 1.0 };
//! assert!(gains.is_finite());
//! ```

pub mod config;
pub mod consts;
pub mod fixed;
pub mod lateral;
pub mod prelude;
