//! Torque-mode lateral controller.
//!
//! Per tick:
//! 1. Live-tune side effect (may replace gains and friction).
//! 2. Gate on speed and `active`; when gated, zero output and clear
//!    integrator and error history.
//! 3. Actual curvature from steering geometry or yaw rate.
//! 4. Blended error `(a_des + C·κ_des) − (a_act + C·κ_act)` with `a = κ·v²`.
//! 5. Feedforward `a_des − g·roll`. A non-finite error, feedforward or
//!    desired jerk withholds torque for the tick; PID and error history are
//!    left untouched.
//! 6. Error rate, PID update, friction offset from desired lateral jerk.
//! 7. Saturation check, clamp to ±steer_max, flip sign for output.

use tracing::{info, warn};

use steer_common::consts::{CURVATURE_SCALE, GRAVITY, SATURATION_EPSILON};
use steer_common::lateral::config::{TorqueTuningConfig, valid_steer_max};
use steer_common::lateral::control::{LateralTorqueState, TorqueCommand, TorqueGains};
use steer_common::lateral::state::ControlInput;

use crate::tuning::{LiveTune, ParamStore, TuningError, TuningLoader};

use super::error_rate::ErrorRateFilter;
use super::friction::friction_compensation;
use super::pid::{PiController, PidCore};
use super::saturation::{LatControlBase, SaturationTracker};
use super::vehicle_model::CurvatureModel;

/// Torque controller state, exclusively owned by one control loop.
#[derive(Debug)]
pub struct LatControlTorque<S, P = PiController, B = SaturationTracker> {
    pid: P,
    base: B,
    tuning: TuningLoader<S>,
    errors: ErrorRateFilter,
    gains: TorqueGains,
    friction: f64,
    use_steering_angle: bool,
    steer_max: f64,
}

impl<S: ParamStore> LatControlTorque<S> {
    /// Build with the reference PID core and saturation tracker.
    pub fn new(config: &TorqueTuningConfig, rate_hz: u32, store: S) -> Self {
        Self::with_parts(
            config,
            PiController::from_config(config, rate_hz),
            SaturationTracker::new(config.steer_limit_timer, rate_hz),
            store,
        )
    }
}

impl<S: ParamStore, P: PidCore, B: LatControlBase> LatControlTorque<S, P, B> {
    /// Build from explicit collaborators.
    pub fn with_parts(config: &TorqueTuningConfig, mut pid: P, base: B, store: S) -> Self {
        let gains = config.gains();
        pid.set_gains(&gains);
        pid.set_limits(-config.steer_max, config.steer_max);
        pid.reset();

        Self {
            pid,
            base,
            tuning: TuningLoader::new(store),
            errors: ErrorRateFilter::new(),
            gains,
            friction: config.friction,
            use_steering_angle: config.use_steering_angle,
            steer_max: config.steer_max,
        }
    }

    /// Clear saturation tracking, integrator and error history.
    pub fn reset(&mut self) {
        self.base.reset();
        self.pid.reset();
        self.errors.clear();
    }

    /// Run one control tick.
    pub fn update<M: CurvatureModel + ?Sized>(
        &mut self,
        input: &ControlInput,
        vm: &M,
    ) -> TorqueCommand {
        if let Some(tune) = self.tuning.tick() {
            self.apply_live_tune(tune);
        }

        let v_ego = input.vehicle.v_ego;
        if v_ego < self.base.min_steer_speed() || !input.active {
            self.pid.reset();
            self.errors.clear();
            return TorqueCommand::inactive();
        }

        let actual_curvature = self.actual_curvature(input, vm);
        let v2 = v_ego * v_ego;
        let desired_lateral_accel = input.desired_curvature * v2;
        let desired_lateral_jerk = input.desired_curvature_rate * v2;
        let actual_lateral_accel = actual_curvature * v2;

        let setpoint = desired_lateral_accel + CURVATURE_SCALE * input.desired_curvature;
        let measurement = actual_lateral_accel + CURVATURE_SCALE * actual_curvature;
        let error = setpoint - measurement;
        let ff = desired_lateral_accel - input.calibration.roll * GRAVITY;
        if !(error.is_finite() && ff.is_finite() && desired_lateral_jerk.is_finite()) {
            warn!(
                error,
                ff,
                jerk = desired_lateral_jerk,
                v_ego,
                "non-finite control input, torque withheld"
            );
            return TorqueCommand::inactive();
        }

        let error_rate = self.errors.push(error);
        let mut output = self.pid.update(
            error,
            error_rate,
            input.vehicle.steering_pressed,
            ff,
            v_ego,
        );
        output += friction_compensation(desired_lateral_jerk, self.friction);

        let saturated = self.base.check_saturation(
            self.steer_max - output.abs() < SATURATION_EPSILON,
            &input.vehicle,
        );
        let output = output.max(-self.steer_max).min(self.steer_max);

        let terms = self.pid.terms();
        TorqueCommand {
            torque: -output,
            angle_deg: 0.0,
            state: LateralTorqueState {
                active: true,
                error,
                p: terms.p,
                i: terms.i,
                f: terms.f,
                output: -output,
                saturated,
            },
        }
    }

    /// Curvature the vehicle is currently driving [1/m].
    ///
    /// Yaw-rate mode falls back to steering geometry when no sample is
    /// available. Only called above the minimum steer speed.
    fn actual_curvature<M: CurvatureModel + ?Sized>(&self, input: &ControlInput, vm: &M) -> f64 {
        match input.yaw_rate {
            Some(yaw_rate) if !self.use_steering_angle => yaw_rate / input.vehicle.v_ego,
            _ => -vm.curvature_from_angle(
                input.corrected_steering_angle_rad(),
                input.vehicle.v_ego,
                input.calibration.roll,
            ),
        }
    }

    /// Replace gains and friction. The integrator restarts from zero so the
    /// old integral is not reinterpreted under the new ki.
    fn apply_live_tune(&mut self, tune: LiveTune) {
        self.set_gains(tune.gains);
        self.friction = tune.friction;
        info!(
            kp = tune.gains.kp,
            ki = tune.gains.ki,
            kf = tune.gains.kf,
            friction = tune.friction,
            "live tune applied"
        );
    }

    /// Replace the gain set and reset the integrator.
    pub fn set_gains(&mut self, gains: TorqueGains) {
        self.gains = gains;
        self.pid.set_gains(&gains);
        self.pid.reset();
    }

    /// Replace the output limit (applies to PID core and final clamp).
    ///
    /// Limits outside `(0, 1]` are rejected and the current limit is kept.
    pub fn set_steer_max(&mut self, steer_max: f64) -> Result<(), TuningError> {
        if !valid_steer_max(steer_max) {
            return Err(TuningError::OutOfRange {
                key: "steer_max".to_string(),
                value: steer_max.to_string(),
            });
        }
        self.steer_max = steer_max;
        self.pid.set_limits(-steer_max, steer_max);
        Ok(())
    }

    #[inline]
    pub fn gains(&self) -> TorqueGains {
        self.gains
    }

    #[inline]
    pub fn friction(&self) -> f64 {
        self.friction
    }

    #[inline]
    pub fn steer_max(&self) -> f64 {
        self.steer_max
    }

    #[inline]
    pub fn live_tune_enabled(&self) -> bool {
        self.tuning.enabled()
    }

    #[inline]
    pub fn error_history_len(&self) -> usize {
        self.errors.len()
    }

    pub fn pid(&self) -> &P {
        &self.pid
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn tuning(&self) -> &TuningLoader<S> {
        &self.tuning
    }

    pub fn tuning_mut(&mut self) -> &mut TuningLoader<S> {
        &mut self.tuning
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
