//! Controller gains, diagnostics and output types.

use serde::{Deserialize, Serialize};

/// Torque controller gain set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TorqueGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Feedforward gain.
    pub kf: f64,
}

impl TorqueGains {
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kf.is_finite()
    }
}

/// Diagnostics published every tick.
///
/// All fields are zero/false while the controller is inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LateralTorqueState {
    pub active: bool,
    /// Blended acceleration/curvature error.
    pub error: f64,
    /// Proportional term.
    pub p: f64,
    /// Integral term.
    pub i: f64,
    /// Feedforward term.
    pub f: f64,
    /// Published torque (same sign as [`TorqueCommand::torque`]).
    pub output: f64,
    /// Saturation as reported by the saturation tracker.
    pub saturated: bool,
}

/// Output of one controller tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TorqueCommand {
    /// Normalized steer torque, positive to the left.
    pub torque: f64,
    /// Angle command slot. Unused in torque mode, always 0.0.
    pub angle_deg: f64,
    pub state: LateralTorqueState,
}

impl TorqueCommand {
    /// Zero torque with inactive diagnostics.
    pub const fn inactive() -> Self {
        Self {
            torque: 0.0,
            angle_deg: 0.0,
            state: LateralTorqueState {
                active: false,
                error: 0.0,
                p: 0.0,
                i: 0.0,
                f: 0.0,
                output: 0.0,
                saturated: false,
            },
        }
    }

    /// `(torque, angle, diagnostics)` triple.
    #[inline]
    pub fn into_parts(self) -> (f64, f64, LateralTorqueState) {
        (self.torque, self.angle_deg, self.state)
    }

    /// Returns true if torque and all diagnostic terms are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.torque.is_finite()
            && self.state.error.is_finite()
            && self.state.p.is_finite()
            && self.state.i.is_finite()
            && self.state.f.is_finite()
            && self.state.output.is_finite()
    }
}
