//! Sheet rules - pure calculations over rows and attribute values
//!
//! Nothing here holds state. The engine's recompute stages call these
//! functions in order and cache what they return.

pub mod aggregate;
pub mod attributes;
pub mod cost;
pub mod equipment_value;
pub mod equipment_weight;
pub mod extended;

pub use aggregate::{bucket_traits, skill_points, spell_points, trait_adjusted_points, TraitPointTotals};
pub use cost::{adjusted_points, CostBasis};
pub use equipment_value::adjusted_value;
pub use equipment_weight::adjusted_weight;
pub use extended::{extended_totals, ExtendedTotals};
