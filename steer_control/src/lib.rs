//! # Lateral Torque Controller
//!
//! Computes, once per control tick, the normalized steering torque that makes
//! the vehicle track a desired path curvature.
//!
//! ## Control Law
//!
//! 1. **Gate**: below the minimum steer speed or when inactive the output is
//!    zero and all dynamic state is cleared.
//! 2. **Error**: lateral acceleration plus a fixed multiple of curvature,
//!    desired minus actual.
//! 3. **PID**: proportional/integral on the error, derivative on a
//!    windowed error rate, feedforward on desired lateral acceleration less
//!    the road-roll bias.
//! 4. **Friction**: jerk-driven offset added after the PID.
//!
//! ## Live Tuning
//!
//! Gains and friction can be reloaded from a persisted key/value store while
//! the loop runs, at a fixed tick cadence. Bad values skip the reload.
//!
//! ## Zero-Allocation Tick
//!
//! The error history is a fixed-capacity ring. The only I/O on the tick path
//! is the periodic store read.

pub mod config;
pub mod control;
pub mod cycle;
pub mod sim;
pub mod tuning;
