//! Control engine root.
//!
//! The torque loop in [`torque`] composes the leaf components. Collaborators
//! it does not own the logic of (PID core, vehicle geometry, saturation
//! tracking) sit behind traits with a reference implementation each.

pub mod error_rate;
pub mod friction;
pub mod pid;
pub mod saturation;
pub mod torque;
pub mod vehicle_model;
