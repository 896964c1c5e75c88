//! Steering friction compensation.
//!
//! Static friction in the steering column resists small torque changes.
//! An offset in the direction of the commanded lateral jerk is added on top
//! of the PID output:
//! ```text
//! offset = interp(jerk, [-J, +J], [-friction, +friction])
//! ```
//! Linear between the breakpoints, held at ±friction outside them.

use steer_common::consts::JERK_THRESHOLD;

/// Piecewise-linear interpolation of `x` over breakpoints `xp` → `fp`.
///
/// `xp` must be sorted ascending and the same length as `fp`. Values outside
/// the breakpoint range clamp to the first/last entry of `fp`. Returns 0.0
/// for empty tables.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    for k in 1..n {
        if x < xp[k] {
            let (x0, x1) = (xp[k - 1], xp[k]);
            let (y0, y1) = (fp[k - 1], fp[k]);
            if x1 == x0 {
                return y1;
            }
            return y0 + (x - x0) * (y1 - y0) / (x1 - x0);
        }
    }
    fp[n - 1]
}

/// Friction offset for the desired lateral jerk [m/s³].
#[inline]
pub fn friction_compensation(lateral_jerk: f64, friction: f64) -> f64 {
    interp(
        lateral_jerk,
        &[-JERK_THRESHOLD, JERK_THRESHOLD],
        &[-friction, friction],
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
