//! PID core used by the torque loop.
//!
//! [`PidCore`] is the capability the loop needs: one update per tick, the
//! last terms for diagnostics, integrator reset, gain and limit mutation.
//! [`PiController`] is the reference implementation:
//!
//! ```text
//! p = kp·e    d = kd·ė    f = kf·ff
//! i += ki·e·dt            (conditional, see below)
//! u = clamp(p + i + d + f, neg_limit, pos_limit)
//! ```
//!
//! Anti-windup is conditional integration: the new integral is accepted only
//! if it keeps the unclamped output inside the limits, or moves the integral
//! toward the sign of the error. While the driver overrides, the integral
//! unwinds toward zero instead of accumulating.

use steer_common::consts::I_UNWIND_RATE;
use steer_common::lateral::config::TorqueTuningConfig;
use steer_common::lateral::control::TorqueGains;

/// Terms of the most recent update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub f: f64,
}

/// PID capability consumed by the torque loop.
pub trait PidCore {
    /// Run one tick and return the clamped output.
    fn update(
        &mut self,
        error: f64,
        error_rate: f64,
        driver_override: bool,
        feedforward: f64,
        speed: f64,
    ) -> f64;

    /// Zero the integrator and the last terms.
    fn reset(&mut self);

    /// Replace kp/ki/kf. The integrator is left untouched.
    fn set_gains(&mut self, gains: &TorqueGains);

    /// Replace the output limits.
    fn set_limits(&mut self, neg_limit: f64, pos_limit: f64);

    fn terms(&self) -> PidTerms;
}

/// Reference PI(D) controller with conditional integration.
#[derive(Debug, Clone)]
pub struct PiController {
    gains: TorqueGains,
    kd: f64,
    pos_limit: f64,
    neg_limit: f64,
    /// Integration step [s].
    i_rate: f64,
    /// Integral decrement per tick while overridden.
    i_unwind_rate: f64,
    terms: PidTerms,
    /// Speed passed with the last update [m/s].
    speed: f64,
    /// Last clamped output.
    control: f64,
}

impl PiController {
    /// Create a controller ticking at `rate_hz` with output in `±limit`.
    pub fn new(gains: TorqueGains, kd: f64, rate_hz: f64, limit: f64) -> Self {
        let rate_hz = if rate_hz > 0.0 { rate_hz } else { 1.0 };
        Self {
            gains,
            kd,
            pos_limit: limit.abs(),
            neg_limit: -limit.abs(),
            i_rate: 1.0 / rate_hz,
            i_unwind_rate: I_UNWIND_RATE / rate_hz,
            terms: PidTerms::default(),
            speed: 0.0,
            control: 0.0,
        }
    }

    /// Build from the `[torque]` config section.
    pub fn from_config(config: &TorqueTuningConfig, rate_hz: u32) -> Self {
        Self::new(config.gains(), config.kd, f64::from(rate_hz), config.steer_max)
    }

    #[inline]
    pub fn gains(&self) -> TorqueGains {
        self.gains
    }

    #[inline]
    pub fn limits(&self) -> (f64, f64) {
        (self.neg_limit, self.pos_limit)
    }

    /// Integrator value.
    #[inline]
    pub fn integral(&self) -> f64 {
        self.terms.i
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn control(&self) -> f64 {
        self.control
    }

    #[inline]
    fn clip(&self, value: f64) -> f64 {
        value.max(self.neg_limit).min(self.pos_limit)
    }
}

impl PidCore for PiController {
    fn update(
        &mut self,
        error: f64,
        error_rate: f64,
        driver_override: bool,
        feedforward: f64,
        speed: f64,
    ) -> f64 {
        self.speed = speed;

        // A non-finite input would pin the clip at a limit; command nothing
        // and leave the integrator as it was.
        if !(error.is_finite() && error_rate.is_finite() && feedforward.is_finite()) {
            self.control = 0.0;
            return self.control;
        }

        let p = error * self.gains.kp;
        let f = feedforward * self.gains.kf;
        let d = error_rate * self.kd;
        let mut i = self.terms.i;

        if driver_override {
            // Unwind toward zero without crossing it.
            if i.abs() <= self.i_unwind_rate {
                i = 0.0;
            } else {
                i -= self.i_unwind_rate * i.signum();
            }
        } else {
            let candidate = i + error * self.gains.ki * self.i_rate;
            let control = p + candidate + d + f;
            let within_pos = control <= self.pos_limit || candidate < 0.0;
            let within_neg = control >= self.neg_limit || candidate > 0.0;
            if (error >= 0.0 && within_pos) || (error <= 0.0 && within_neg) {
                i = candidate;
            }
        }

        let sum = p + i + d + f;
        if !sum.is_finite() {
            self.control = 0.0;
            return self.control;
        }

        self.terms = PidTerms { p, i, d, f };
        self.control = self.clip(sum);
        self.control
    }

    fn reset(&mut self) {
        self.terms = PidTerms::default();
        self.control = 0.0;
    }

    fn set_gains(&mut self, gains: &TorqueGains) {
        self.gains = *gains;
    }

    fn set_limits(&mut self, neg_limit: f64, pos_limit: f64) {
        let (lo, hi) = if neg_limit <= pos_limit {
            (neg_limit, pos_limit)
        } else {
            (pos_limit, neg_limit)
        };
        self.neg_limit = lo;
        self.pos_limit = hi;
    }

    #[inline]
    fn terms(&self) -> PidTerms {
        self.terms
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
