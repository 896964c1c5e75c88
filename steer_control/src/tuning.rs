//! Live re-tuning from the persisted key/value store.
//!
//! Two tick counters drive the loader:
//! - **poll**: every [`LIVE_TUNE_POLL_INTERVAL`] ticks the enable flag is
//!   re-read.
//! - **retune**: advances only while enabled; every
//!   [`LIVE_TUNE_RELOAD_INTERVAL`] ticks the four scaled values are read and
//!   returned as a [`LiveTune`].
//!
//! A reload is all-or-nothing: if any value is missing, unreadable, not a
//! decimal number or negative, nothing is returned and the caller keeps its
//! current gains. The retune counter restarts either way.

pub mod store;

use thiserror::Error;
use tracing::{debug, info, warn};

use steer_common::consts::{
    FRICTION_SCALE, KF_SCALE, KI_SCALE, KP_SCALE, LIVE_TUNE_POLL_INTERVAL,
    LIVE_TUNE_RELOAD_INTERVAL, PARAM_FRICTION, PARAM_LIVE_TUNE_ENABLE, PARAM_TORQUE_KF,
    PARAM_TORQUE_KI, PARAM_TORQUE_KP,
};
use steer_common::fixed::{Fixed, FixedParseError};
use steer_common::lateral::control::TorqueGains;

pub use store::{ConfiguredStore, FileParamStore, MemoryParamStore};

// ─── Error Type ─────────────────────────────────────────────────────

/// Why a tuning value could not be read.
#[derive(Debug, Error)]
pub enum TuningError {
    /// Store I/O failed.
    #[error("param {key}: store read failed: {source}")]
    Store {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key has no value.
    #[error("param {key}: unavailable")]
    Missing { key: String },

    /// Value exceeds the store's size limit.
    #[error("param {key}: value longer than {limit} bytes")]
    TooLong { key: String, limit: u64 },

    /// Value is not UTF-8 text.
    #[error("param {key}: value is not valid UTF-8")]
    Encoding { key: String },

    /// Value is not a decimal number.
    #[error("param {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: FixedParseError,
    },

    /// Value parsed but is unusable.
    #[error("param {key}: value {value} out of range")]
    OutOfRange { key: String, value: String },
}

// ─── Store Capability ───────────────────────────────────────────────

/// Read-only view of a persisted key/value store.
///
/// Implementors provide [`ParamStore::get`]; typed accessors are derived.
pub trait ParamStore {
    /// Raw text for `key`, `Ok(None)` when the key is unset.
    fn get(&self, key: &str) -> Result<Option<String>, TuningError>;

    /// Boolean flag: true iff the value is `"1"`. Unset reads as false.
    fn get_bool(&self, key: &str) -> Result<bool, TuningError> {
        Ok(self.get(key)?.is_some_and(|v| v.trim() == "1"))
    }

    /// Non-negative decimal value.
    fn get_fixed(&self, key: &str) -> Result<Fixed, TuningError> {
        let raw = self.get(key)?.ok_or_else(|| TuningError::Missing {
            key: key.to_string(),
        })?;
        let value: Fixed = raw.parse().map_err(|source| TuningError::Parse {
            key: key.to_string(),
            source,
        })?;
        if value.is_negative() {
            return Err(TuningError::OutOfRange {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// Decimal value multiplied by `scale`, converted to `f64`.
    fn get_scaled(&self, key: &str, scale: Fixed) -> Result<f64, TuningError> {
        let value = self.get_fixed(key)?;
        let scaled = value
            .checked_mul(scale)
            .ok_or_else(|| TuningError::OutOfRange {
                key: key.to_string(),
                value: value.to_string(),
            })?;
        Ok(scaled.to_f64())
    }
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Gain set and friction read from the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveTune {
    pub gains: TorqueGains,
    pub friction: f64,
}

/// Read all four tuning values. Fails on the first bad one.
pub fn read_live_tune<S: ParamStore + ?Sized>(store: &S) -> Result<LiveTune, TuningError> {
    let kp = store.get_scaled(PARAM_TORQUE_KP, KP_SCALE)?;
    let ki = store.get_scaled(PARAM_TORQUE_KI, KI_SCALE)?;
    let kf = store.get_scaled(PARAM_TORQUE_KF, KF_SCALE)?;
    let friction = store.get_scaled(PARAM_FRICTION, FRICTION_SCALE)?;
    Ok(LiveTune {
        gains: TorqueGains { kp, ki, kf },
        friction,
    })
}

/// Tick-driven poller of the live-tune flag and values.
#[derive(Debug)]
pub struct TuningLoader<S> {
    store: S,
    enabled: bool,
    poll_counter: u32,
    retune_counter: u32,
}

impl<S: ParamStore> TuningLoader<S> {
    /// Live tuning starts disabled until the first poll.
    pub fn new(store: S) -> Self {
        Self {
            store,
            enabled: false,
            poll_counter: 0,
            retune_counter: 0,
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn poll_counter(&self) -> u32 {
        self.poll_counter
    }

    #[inline]
    pub fn retune_counter(&self) -> u32 {
        self.retune_counter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Advance one tick. Returns new values on a successful reload.
    pub fn tick(&mut self) -> Option<LiveTune> {
        self.poll_counter += 1;
        if self.poll_counter >= LIVE_TUNE_POLL_INTERVAL {
            self.poll_counter = 0;
            self.poll_enable_flag();
        }

        if !self.enabled {
            return None;
        }

        self.retune_counter += 1;
        if self.retune_counter < LIVE_TUNE_RELOAD_INTERVAL {
            return None;
        }
        self.retune_counter = 0;

        match read_live_tune(&self.store) {
            Ok(tune) => {
                debug!(?tune, "live tune values read");
                Some(tune)
            }
            Err(e) => {
                warn!("live tune reload skipped, keeping current gains: {e}");
                None
            }
        }
    }

    fn poll_enable_flag(&mut self) {
        let enabled = match self.store.get_bool(PARAM_LIVE_TUNE_ENABLE) {
            Ok(v) => v,
            Err(e) => {
                warn!("live tune flag unreadable, treating as disabled: {e}");
                false
            }
        };
        if enabled != self.enabled {
            info!(enabled, "live tune {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
