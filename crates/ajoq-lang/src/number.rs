use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A double-precision number with the host runtime's equality and text rules.
///
/// Equality is numeric (`+0 == -0`, `NaN != NaN`); use [`Number::same_value_zero`]
/// for membership tests where `NaN` must find itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number(f64);

/// Represents a Not-a-Number (NaN) value.
pub const NAN: Number = Number(f64::NAN);

impl Number {
    /// Creates a new `Number` from an `f64` value.
    pub fn new(value: f64) -> Self {
        Number(value)
    }

    /// Returns the underlying `f64` value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns `true` if the number has no fractional part.
    pub fn is_int(&self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0
    }

    /// Converts to a signed 32-bit integer the way bitwise operators do:
    /// non-finite values become 0 and everything else wraps modulo 2^32.
    pub fn to_int32(self) -> i32 {
        if !self.0.is_finite() {
            return 0;
        }

        let truncated = self.0.trunc();
        let modulo = truncated.rem_euclid(4_294_967_296.0);
        modulo as u32 as i32
    }

    /// Equality that treats `NaN` as equal to itself, used for set membership.
    pub fn same_value_zero(&self, other: &Self) -> bool {
        (self.0.is_nan() && other.0.is_nan()) || self.0 == other.0
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // +0 and -0 share a hash, and every NaN payload hashes alike.
        let bits = if self.0 == 0.0 {
            0u64
        } else if self.0.is_nan() {
            f64::NAN.to_bits()
        } else {
            self.0.to_bits()
        };
        bits.hash(state);
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value as f64)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number(value as f64)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number(value as f64)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number(value as f64)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number(value as f64)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            write!(f, "NaN")
        } else if self.0.is_infinite() {
            write!(f, "{}Infinity", if self.0 < 0.0 { "-" } else { "" })
        } else if self.0 == 0.0 {
            write!(f, "0")
        } else if (1e-6..1e21).contains(&self.0.abs()) {
            write!(f, "{}", self.0)
        } else {
            // Exponent form always carries a sign: 1e+21, 1e-7.
            let text = format!("{:e}", self.0);
            match text.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    write!(f, "{mantissa}e+{exponent}")
                }
                _ => write!(f, "{text}"),
            }
        }
    }
}
