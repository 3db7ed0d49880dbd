//! Fixed-point decimal with six fractional digits
//!
//! Equipment values and weights are stored as `Fixed6` so that sums, stage
//! percentages and unit conversions are reproducible across platforms.
//! Multiplication and division truncate toward zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

const SCALE: i64 = 1_000_000;
const FRACTION_DIGITS: usize = 6;

/// A signed decimal stored as an integer count of millionths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "FixedRepr", into = "String")]
pub struct Fixed6(i64);

/// Accepts both `"12.5"` and `12.5` on input.
#[derive(Deserialize)]
#[serde(untagged)]
enum FixedRepr {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<FixedRepr> for Fixed6 {
    fn from(repr: FixedRepr) -> Self {
        match repr {
            FixedRepr::Text(text) => Fixed6::parse_lenient(&text),
            FixedRepr::Integer(value) => Fixed6::from_int(value),
            FixedRepr::Float(value) => Fixed6::from_f64(value),
        }
    }
}

impl From<Fixed6> for String {
    fn from(value: Fixed6) -> Self {
        value.to_string()
    }
}

impl Fixed6 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);

    pub const fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(SCALE))
    }

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Rounds to the nearest millionth. Non-finite input becomes zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let scaled = (value * SCALE as f64).round();
        if scaled >= i64::MAX as f64 {
            Self(i64::MAX)
        } else if scaled <= i64::MIN as f64 {
            Self(i64::MIN)
        } else {
            Self(scaled as i64)
        }
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Integer part, truncated toward zero.
    pub fn to_int(self) -> i64 {
        self.0 / SCALE
    }

    pub fn trunc(self) -> Self {
        Self(self.0 / SCALE * SCALE)
    }

    pub fn ceil(self) -> Self {
        let truncated = self.trunc();
        if self.0 > truncated.0 {
            Self(truncated.0 + SCALE)
        } else {
            truncated
        }
    }

    pub fn floor(self) -> Self {
        let truncated = self.trunc();
        if self.0 < truncated.0 {
            Self(truncated.0 - SCALE)
        } else {
            truncated
        }
    }

    /// Rounds half away from zero.
    pub fn round(self) -> Self {
        let truncated = self.trunc();
        let remainder = self.0 - truncated.0;
        if remainder >= SCALE / 2 {
            Self(truncated.0 + SCALE)
        } else if remainder <= -(SCALE / 2) {
            Self(truncated.0 - SCALE)
        } else {
            truncated
        }
    }

    /// Lenient decimal parse: grouping commas and surrounding whitespace are
    /// ignored, anything else that is not a plain decimal yields zero.
    pub fn parse_lenient(text: &str) -> Self {
        Self::parse_strict(text).unwrap_or(Self::ZERO)
    }

    fn parse_strict(text: &str) -> Option<Self> {
        let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
        let (negative, digits) = match cleaned.as_bytes().first() {
            Some(b'-') => (true, &cleaned[1..]),
            Some(b'+') => (false, &cleaned[1..]),
            _ => (false, cleaned.as_str()),
        };
        if digits.is_empty() {
            return None;
        }

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut fraction_value: i64 = 0;
        for (i, digit) in fraction.bytes().take(FRACTION_DIGITS).enumerate() {
            fraction_value += i64::from(digit - b'0') * 10_i64.pow((FRACTION_DIGITS - 1 - i) as u32);
        }

        let raw = whole_value.checked_mul(SCALE)?.checked_add(fraction_value)?;
        Some(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Fixed6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE as u64;
        let whole = magnitude / scale;
        let fraction = magnitude % scale;
        if self.0 < 0 {
            write!(f, "-")?;
        }
        if fraction == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:06}", fraction);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

impl Add for Fixed6 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed6 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed6 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed6 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Fixed6 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let product = i128::from(self.0) * i128::from(rhs.0) / i128::from(SCALE);
        Self(clamp_i128(product))
    }
}

impl Div for Fixed6 {
    type Output = Self;

    /// Division by zero yields zero.
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return Self::ZERO;
        }
        let quotient = i128::from(self.0) * i128::from(SCALE) / i128::from(rhs.0);
        Self(clamp_i128(quotient))
    }
}

impl Neg for Fixed6 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl From<i32> for Fixed6 {
    fn from(value: i32) -> Self {
        Self::from_int(i64::from(value))
    }
}

impl From<u32> for Fixed6 {
    fn from(value: u32) -> Self {
        Self::from_int(i64::from(value))
    }
}

impl std::iter::Sum for Fixed6 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

fn clamp_i128(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
