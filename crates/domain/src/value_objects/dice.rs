//! Damage dice value objects and parsing
//!
//! Supports the sheet's damage notation: "1d-2", "2d+1", "3d", "2d6+3".
//! Thrust and swing damage are always expressed in six-sided dice.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a dice expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The expression string is empty
    #[error("Empty dice expression")]
    Empty,
    /// Invalid format - expected NdS or Nd+M
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
}

/// A dice expression like "2d+1"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dice {
    /// Number of dice to roll
    pub count: i32,
    /// Size of each die
    pub sides: i32,
    /// Flat adds after rolling
    pub modifier: i32,
}

impl Dice {
    pub const DEFAULT_SIDES: i32 = 6;

    /// Six-sided dice with adds
    pub fn new(count: i32, modifier: i32) -> Self {
        Self {
            count,
            sides: Self::DEFAULT_SIDES,
            modifier,
        }
    }

    pub fn with_sides(count: i32, sides: i32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    pub fn add_modifier(&mut self, amount: i32) {
        self.modifier += amount;
    }

    /// Converts large adds into extra dice: every +7 becomes +2d, then +4 or
    /// more becomes +1d, and a leftover +3 becomes +1d-1.
    pub fn with_adds_as_dice(&self) -> Self {
        if self.sides != Self::DEFAULT_SIDES || self.modifier <= 0 {
            return *self;
        }
        let mut count = self.count;
        let mut adds = self.modifier;
        count += 2 * (adds / 7);
        adds %= 7;
        count += adds / 4;
        adds %= 4;
        if adds == 3 {
            count += 1;
            adds = -1;
        }
        Self::with_sides(count, self.sides, adds)
    }

    /// Parse an expression such as "2d+1", "1d-3", "3d6" or "2d6+2".
    ///
    /// The die size defaults to six when omitted.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        let count_str = &input[..d_pos];
        let count: i32 = if count_str.is_empty() {
            1
        } else {
            count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };

        let after_d = &input[d_pos + 1..];
        let sign_pos = after_d.find(['+', '-']);
        let (sides_str, modifier_str) = match sign_pos {
            Some(pos) => after_d.split_at(pos),
            None => (after_d, ""),
        };

        let sides: i32 = if sides_str.is_empty() {
            Self::DEFAULT_SIDES
        } else {
            sides_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", sides_str))
            })?
        };

        let modifier: i32 = if modifier_str.is_empty() {
            0
        } else {
            modifier_str.trim_start_matches('+').parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid modifier: '{}'", modifier_str))
            })?
        };

        Ok(Self::with_sides(count, sides, modifier))
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.count)?;
        if self.sides != Self::DEFAULT_SIDES {
            write!(f, "{}", self.sides)?;
        }
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)
        } else {
            Ok(())
        }
    }
}
