//! Weights with units
//!
//! Conversions go through pounds. GURPS Metric conversion (`2 lb = 1 kg`) is
//! a separate, deliberately inexact mapping used only when the sheet asks for
//! simple metric conversions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Fixed6;
use crate::error::DomainError;

/// Weight units understood by the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Oz,
    #[default]
    Lb,
    /// Short ton
    Tn,
    /// Long ton
    Lt,
    /// Metric tonne
    T,
    Kg,
    G,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 7] = [
        WeightUnit::Oz,
        WeightUnit::Lb,
        WeightUnit::Tn,
        WeightUnit::Lt,
        WeightUnit::T,
        WeightUnit::Kg,
        WeightUnit::G,
    ];

    pub fn is_metric(self) -> bool {
        matches!(self, WeightUnit::T | WeightUnit::Kg | WeightUnit::G)
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            WeightUnit::Oz => "oz",
            WeightUnit::Lb => "lb",
            WeightUnit::Tn => "tn",
            WeightUnit::Lt => "lt",
            WeightUnit::T => "t",
            WeightUnit::Kg => "kg",
            WeightUnit::G => "g",
        }
    }

    /// Size of one unit expressed in pounds.
    fn pounds_per_unit(self) -> Fixed6 {
        match self {
            WeightUnit::Oz => Fixed6::from_raw(62_500),
            WeightUnit::Lb => Fixed6::ONE,
            WeightUnit::Tn => Fixed6::from_int(2000),
            WeightUnit::Lt => Fixed6::from_int(2240),
            WeightUnit::T => Fixed6::from_int(2205),
            WeightUnit::Kg => Fixed6::from_raw(2_205_000),
            WeightUnit::G => Fixed6::from_raw(2_205),
        }
    }

    /// Converts `value`, expressed in `from`, into this unit.
    pub fn convert(self, from: WeightUnit, value: Fixed6) -> Fixed6 {
        if self == from {
            return value;
        }
        value * from.pounds_per_unit() / self.pounds_per_unit()
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for WeightUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        WeightUnit::ALL
            .into_iter()
            .find(|unit| unit.abbreviation() == lowered)
            .ok_or_else(|| DomainError::parse(format!("Unknown weight unit: {}", s)))
    }
}

/// A weight value paired with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    pub value: Fixed6,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn new(value: Fixed6, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    pub fn zero(unit: WeightUnit) -> Self {
        Self::new(Fixed6::ZERO, unit)
    }

    pub fn pounds(value: i64) -> Self {
        Self::new(Fixed6::from_int(value), WeightUnit::Lb)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn convert_to(&self, unit: WeightUnit) -> Self {
        Self::new(unit.convert(self.unit, self.value), unit)
    }

    /// The weight in pounds, used when comparing weights of mixed units.
    pub fn normalized(&self) -> Fixed6 {
        WeightUnit::Lb.convert(self.unit, self.value)
    }

    /// Adds `other` after converting it into this weight's unit.
    pub fn add(&mut self, other: Weight) {
        self.value += self.unit.convert(other.unit, other.value);
    }

    /// Subtracts `other` after converting it into this weight's unit.
    pub fn subtract(&mut self, other: Weight) {
        self.value -= self.unit.convert(other.unit, other.value);
    }

    pub fn scaled(&self, factor: Fixed6) -> Self {
        Self::new(self.value * factor, self.unit)
    }

    /// Clamps negative weights to zero.
    pub fn clamped_non_negative(&self) -> Self {
        if self.value.is_negative() {
            Self::zero(self.unit)
        } else {
            *self
        }
    }

    /// GURPS Metric: imperial units become their rough metric counterparts.
    pub fn to_gurps_metric(&self) -> Self {
        match self.unit {
            WeightUnit::Lb => Self::new(self.value / Fixed6::from_int(2), WeightUnit::Kg),
            WeightUnit::Lt | WeightUnit::Tn => Self::new(self.value, WeightUnit::T),
            WeightUnit::Oz => Self::new(self.value * Fixed6::from_int(30), WeightUnit::G),
            _ => *self,
        }
    }

    /// GURPS Metric: metric units become their rough imperial counterparts.
    pub fn to_gurps_imperial(&self) -> Self {
        match self.unit {
            WeightUnit::G => Self::new(self.value / Fixed6::from_int(30), WeightUnit::Oz),
            WeightUnit::Kg => Self::new(self.value * Fixed6::from_int(2), WeightUnit::Lb),
            WeightUnit::T => Self::new(self.value, WeightUnit::Lt),
            _ => *self,
        }
    }

    /// Parses text such as `"2.5 kg"` or `"+3 lb"`. A missing or unknown unit
    /// falls back to `default_unit`, and a malformed number becomes zero.
    pub fn parse_lenient(text: &str, default_unit: WeightUnit) -> Self {
        let trimmed = text.trim();
        let split_at = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split_at);
        let unit = unit.parse().unwrap_or(default_unit);
        Self::new(Fixed6::parse_lenient(number), unit)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::zero(WeightUnit::Lb)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(text: &str) -> Fixed6 {
        Fixed6::parse_lenient(text)
    }

    #[test]
    fn converts_between_units() {
        assert_eq!(WeightUnit::Oz.convert(WeightUnit::Lb, fx("2")), fx("32"));
        assert_eq!(WeightUnit::Lb.convert(WeightUnit::Tn, fx("1")), fx("2000"));
        assert_eq!(WeightUnit::Lb.convert(WeightUnit::Kg, fx("10")), fx("22.05"));
    }

    #[test]
    fn add_converts_into_receiver_units() {
        let mut weight = Weight::pounds(1);
        weight.add(Weight::new(fx("8"), WeightUnit::Oz));
        assert_eq!(weight, Weight::new(fx("1.5"), WeightUnit::Lb));
    }

    #[test]
    fn gurps_metric_conversions() {
        assert_eq!(
            Weight::pounds(10).to_gurps_metric(),
            Weight::new(fx("5"), WeightUnit::Kg)
        );
        assert_eq!(
            Weight::new(fx("2"), WeightUnit::Oz).to_gurps_metric(),
            Weight::new(fx("60"), WeightUnit::G)
        );
        assert_eq!(
            Weight::new(fx("3"), WeightUnit::Kg).to_gurps_imperial(),
            Weight::pounds(6)
        );
        assert_eq!(
            Weight::new(fx("1"), WeightUnit::T).to_gurps_imperial(),
            Weight::new(fx("1"), WeightUnit::Lt)
        );
    }

    #[test]
    fn parse_falls_back_to_default_unit() {
        assert_eq!(
            Weight::parse_lenient("2.5 kg", WeightUnit::Lb),
            Weight::new(fx("2.5"), WeightUnit::Kg)
        );
        assert_eq!(
            Weight::parse_lenient("4", WeightUnit::Oz),
            Weight::new(fx("4"), WeightUnit::Oz)
        );
        assert_eq!(
            Weight::parse_lenient("heavy", WeightUnit::Lb),
            Weight::zero(WeightUnit::Lb)
        );
    }

    #[test]
    fn negative_weights_clamp_to_zero() {
        let weight = Weight::new(fx("-1"), WeightUnit::Kg);
        assert_eq!(weight.clamped_non_negative(), Weight::zero(WeightUnit::Kg));
    }
}
