//! Value objects - immutable numeric and configuration types
//!
//! Everything here is `Copy` or cheaply cloned, compared by value, and free of
//! identity. Parsing of user-entered text is lenient: malformed numbers become
//! zero rather than errors.

mod dice;
mod encumbrance;
mod fixed;
mod fraction;
mod settings;
mod weight;

pub use dice::{Dice, DiceParseError};
pub use encumbrance::Encumbrance;
pub use fixed::Fixed6;
pub use fraction::Fraction;
pub use settings::{SheetSettings, DEFAULT_BLOCK_LAYOUT};
pub use weight::{Weight, WeightUnit};
