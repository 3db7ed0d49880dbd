//! Sheet settings value object
//!
//! House-rule switches that change how derived values are computed. Every
//! field carries a serde default so that documents written before a switch
//! existed load with the rule turned off.

use serde::{Deserialize, Serialize};

use super::WeightUnit;

/// Block names in the order the current layout uses when a document has none.
pub const DEFAULT_BLOCK_LAYOUT: [&str; 8] = [
    "reactions conditional_modifiers",
    "melee",
    "ranged",
    "advantages skills",
    "spells",
    "equipment",
    "other_equipment",
    "notes",
];

/// Configurable sheet rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetSettings {
    /// Units used for weights entered without an explicit unit
    #[serde(default)]
    pub default_weight_units: WeightUnit,

    /// Sheet block ordering; not interpreted by the calculations
    #[serde(default = "default_block_layout")]
    pub block_layout: Vec<String>,

    // ============================================================================
    // Attribute rules
    // ============================================================================
    /// Will and Perception start at 10 rather than IQ
    #[serde(default)]
    pub base_will_and_per_on_10: bool,

    /// Know Your Own Strength (Pyramid 3/83)
    #[serde(default)]
    pub use_know_your_own_strength: bool,

    // ============================================================================
    // Damage rules
    // ============================================================================
    #[serde(default)]
    pub use_reduced_swing: bool,

    #[serde(default)]
    pub use_thrust_equals_swing_minus_2: bool,

    /// Show large damage adds as extra dice
    #[serde(default)]
    pub use_modifying_dice_plus_adds: bool,

    // ============================================================================
    // Units
    // ============================================================================
    /// Treat 1 kg as 2 lb when mixing metric and imperial weights
    #[serde(default)]
    pub use_simple_metric_conversions: bool,
}

fn default_block_layout() -> Vec<String> {
    DEFAULT_BLOCK_LAYOUT.iter().map(|s| s.to_string()).collect()
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            default_weight_units: WeightUnit::Lb,
            block_layout: default_block_layout(),
            base_will_and_per_on_10: false,
            use_know_your_own_strength: false,
            use_reduced_swing: false,
            use_thrust_equals_swing_minus_2: false,
            use_modifying_dice_plus_adds: false,
            use_simple_metric_conversions: false,
        }
    }
}

impl SheetSettings {
    /// True when weights should be computed with GURPS Metric in kilograms.
    pub fn uses_simple_metric_kilograms(&self) -> bool {
        self.use_simple_metric_conversions && self.default_weight_units.is_metric()
    }

    pub fn with_default_weight_units(mut self, units: WeightUnit) -> Self {
        self.default_weight_units = units;
        self
    }

    pub fn with_know_your_own_strength(mut self, enabled: bool) -> Self {
        self.use_know_your_own_strength = enabled;
        self
    }

    pub fn with_reduced_swing(mut self, enabled: bool) -> Self {
        self.use_reduced_swing = enabled;
        self
    }

    pub fn with_thrust_equals_swing_minus_2(mut self, enabled: bool) -> Self {
        self.use_thrust_equals_swing_minus_2 = enabled;
        self
    }

    pub fn with_simple_metric_conversions(mut self, enabled: bool) -> Self {
        self.use_simple_metric_conversions = enabled;
        self
    }

    pub fn with_base_will_and_per_on_10(mut self, enabled: bool) -> Self {
        self.base_will_and_per_on_10 = enabled;
        self
    }
}
