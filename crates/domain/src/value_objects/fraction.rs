use serde::{Deserialize, Serialize};
use std::fmt;

use super::Fixed6;

/// A numerator/denominator pair used by weight multipliers such as `x1/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fraction {
    pub numerator: Fixed6,
    pub denominator: Fixed6,
}

impl Fraction {
    /// A zero denominator is replaced by one.
    pub fn new(numerator: Fixed6, denominator: Fixed6) -> Self {
        let denominator = if denominator.is_zero() {
            Fixed6::ONE
        } else {
            denominator
        };
        Self {
            numerator,
            denominator,
        }
    }

    pub fn whole(value: Fixed6) -> Self {
        Self::new(value, Fixed6::ONE)
    }

    pub fn value(&self) -> Fixed6 {
        self.numerator / self.denominator
    }

    /// Parses `"3"`, `"1/2"` or `"2.5/3"`; malformed parts become zero.
    pub fn parse_lenient(text: &str) -> Self {
        match text.split_once('/') {
            Some((numerator, denominator)) => Self::new(
                Fixed6::parse_lenient(numerator),
                Fixed6::parse_lenient(denominator),
            ),
            None => Self::whole(Fixed6::parse_lenient(text)),
        }
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::whole(Fixed6::ONE)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == Fixed6::ONE {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}
