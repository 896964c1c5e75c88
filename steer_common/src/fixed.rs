//! Fixed-point decimal values.
//!
//! Tuning values arrive from the persisted store as decimal text in scaled
//! integer units (e.g. `"15"` meaning `15 × 0.1`). They are parsed into an
//! integer mantissa and a base-10 exponent, multiplied by their scale factor
//! exactly, and converted to `f64` once at the end.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum number of fractional digits a [`Fixed`] can carry.
pub const MAX_SCALE: u32 = 18;

const POW10: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// Error returned when decimal text cannot be parsed into a [`Fixed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedParseError {
    /// Value was empty or whitespace only.
    #[error("empty decimal value")]
    Empty,

    /// Value contained something other than a sign, digits and one point.
    #[error("invalid character {0:?} in decimal value")]
    InvalidChar(char),

    /// More fractional digits than [`MAX_SCALE`].
    #[error("decimal value has more than {} fractional digits", MAX_SCALE)]
    TooPrecise,

    /// Mantissa does not fit in 64 bits.
    #[error("decimal value out of range")]
    Overflow,
}

/// A decimal number `mantissa × 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    mantissa: i64,
    scale: u32,
}

impl Fixed {
    /// Zero.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create `mantissa × 10^-scale`.
    ///
    /// `scale` is capped at [`MAX_SCALE`].
    pub const fn new(mantissa: i64, scale: u32) -> Self {
        let scale = if scale > MAX_SCALE { MAX_SCALE } else { scale };
        Self { mantissa, scale }
    }

    #[inline]
    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// Number of fractional digits.
    #[inline]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Exact product, or `None` if the result does not fit.
    ///
    /// Trailing zeros are stripped when the combined scale would exceed
    /// [`MAX_SCALE`].
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let mut mantissa = self.mantissa.checked_mul(rhs.mantissa)?;
        let mut scale = self.scale + rhs.scale;
        while scale > MAX_SCALE && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        if scale > MAX_SCALE {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// Nearest `f64` to the decimal value.
    ///
    /// Both operands of the final division are exact in `f64` for mantissas
    /// below 2^53, so the result is correctly rounded.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.mantissa as f64 / POW10[self.scale as usize] as f64
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Fixed {
    type Err = FixedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(FixedParseError::Empty),
        };

        let mut mantissa: i64 = 0;
        let mut scale: u32 = 0;
        let mut seen_point = false;
        let mut seen_digit = false;

        for c in digits.chars() {
            match c {
                '0'..='9' => {
                    seen_digit = true;
                    let d = i64::from(c as u8 - b'0');
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(d))
                        .ok_or(FixedParseError::Overflow)?;
                    if seen_point {
                        scale += 1;
                        if scale > MAX_SCALE {
                            return Err(FixedParseError::TooPrecise);
                        }
                    }
                }
                '.' if !seen_point => seen_point = true,
                other => return Err(FixedParseError::InvalidChar(other)),
            }
        }

        if !seen_digit {
            return Err(FixedParseError::Empty);
        }

        Ok(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let div = POW10[self.scale as usize];
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / div as u64,
            abs % div as u64,
            width = self.scale as usize
        )
    }
}
