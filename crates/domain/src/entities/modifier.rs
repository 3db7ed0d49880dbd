//! Trait and equipment modifiers
//!
//! Modifiers are plain data attached to a row. The cost, value and weight
//! pipelines in [`crate::rules`] read them; a disabled modifier is skipped
//! by every pipeline and contributes no features.

use serde::{Deserialize, Serialize};

use super::feature::Feature;
use crate::value_objects::{Fixed6, Fraction, Weight, WeightUnit};

// =============================================================================
// Trait modifiers
// =============================================================================

/// Which part of a leveled trait's cost a modifier touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affects {
    #[default]
    Total,
    BaseOnly,
    LevelsOnly,
}

impl Affects {
    pub fn touches_base(self) -> bool {
        matches!(self, Affects::Total | Affects::BaseOnly)
    }

    pub fn touches_levels(self) -> bool {
        matches!(self, Affects::Total | Affects::LevelsOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum CostAdjustment {
    /// Signed percentage: enhancement when positive, limitation otherwise
    Percentage(i32),
    FlatPoints(i32),
    Multiplier(f64),
}

impl Default for CostAdjustment {
    fn default() -> Self {
        CostAdjustment::Percentage(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitModifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub affects: Affects,
    #[serde(default)]
    pub cost: CostAdjustment,
    /// Modifier levels; zero when the modifier is not leveled
    #[serde(default)]
    pub levels: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
}

fn default_enabled() -> bool {
    true
}

impl TraitModifier {
    pub fn new(name: impl Into<String>, cost: CostAdjustment) -> Self {
        Self {
            name: name.into(),
            reference: String::new(),
            enabled: true,
            affects: Affects::Total,
            cost,
            levels: 0,
            features: Vec::new(),
        }
    }

    pub fn percentage(name: impl Into<String>, percentage: i32) -> Self {
        Self::new(name, CostAdjustment::Percentage(percentage))
    }

    pub fn with_affects(mut self, affects: Affects) -> Self {
        self.affects = affects;
        self
    }

    pub fn with_levels(mut self, levels: i32) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn is_leveled(&self) -> bool {
        self.levels > 0
    }

    /// The adjustment with leveled percentages and flat points multiplied out.
    pub fn effective_cost(&self) -> CostAdjustment {
        match self.cost {
            CostAdjustment::Percentage(amount) if self.is_leveled() => {
                CostAdjustment::Percentage(amount.saturating_mul(self.levels))
            }
            CostAdjustment::FlatPoints(amount) if self.is_leveled() => {
                CostAdjustment::FlatPoints(amount.saturating_mul(self.levels))
            }
            other => other,
        }
    }
}

// =============================================================================
// Equipment modifiers
// =============================================================================

/// Pipeline stage at which an equipment modifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierStage {
    #[default]
    Original,
    Base,
    FinalBase,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum ValueAdjustment {
    Addition(Fixed6),
    Percentage(Fixed6),
    Multiplier(Fixed6),
}

impl Default for ValueAdjustment {
    fn default() -> Self {
        ValueAdjustment::Addition(Fixed6::ZERO)
    }
}

impl ValueAdjustment {
    /// Reads `"+5"`, `"-20%"` or `"x1.5"`. Malformed numbers become zero and a
    /// non-positive multiplier becomes one.
    pub fn parse_lenient(text: &str) -> Self {
        let text = text.trim();
        if let Some(rest) = strip_multiplier_prefix(text) {
            let amount = Fixed6::parse_lenient(rest);
            if amount.is_negative() || amount.is_zero() {
                return ValueAdjustment::Multiplier(Fixed6::ONE);
            }
            return ValueAdjustment::Multiplier(amount);
        }
        if let Some(rest) = text.strip_suffix('%') {
            return ValueAdjustment::Percentage(Fixed6::parse_lenient(rest));
        }
        ValueAdjustment::Addition(Fixed6::parse_lenient(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum WeightAdjustment {
    Addition(Weight),
    Percentage(Fixed6),
    Multiplier(Fraction),
    PercentageMultiplier(Fraction),
}

impl Default for WeightAdjustment {
    fn default() -> Self {
        WeightAdjustment::Addition(Weight::default())
    }
}

impl WeightAdjustment {
    /// Reads `"+2 lb"`, `"+10%"`, `"x1/2"` or `"x50%"`. Additions without a
    /// unit use `default_unit`.
    pub fn parse_lenient(text: &str, default_unit: WeightUnit) -> Self {
        let text = text.trim();
        if let Some(rest) = strip_multiplier_prefix(text) {
            let (rest, percent) = match rest.trim().strip_suffix('%') {
                Some(stripped) => (stripped, true),
                None => (rest, false),
            };
            let mut fraction = Fraction::parse_lenient(rest);
            if fraction.value().is_negative() || fraction.value().is_zero() {
                fraction = if percent {
                    Fraction::whole(Fixed6::from_int(100))
                } else {
                    Fraction::default()
                };
            }
            return if percent {
                WeightAdjustment::PercentageMultiplier(fraction)
            } else {
                WeightAdjustment::Multiplier(fraction)
            };
        }
        if let Some(rest) = text.strip_suffix('%') {
            return WeightAdjustment::Percentage(Fixed6::parse_lenient(rest));
        }
        WeightAdjustment::Addition(Weight::parse_lenient(text, default_unit))
    }
}

fn strip_multiplier_prefix(text: &str) -> Option<&str> {
    text.strip_prefix('x').or_else(|| text.strip_prefix('X'))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentModifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub value_stage: ModifierStage,
    #[serde(default)]
    pub value_adjustment: ValueAdjustment,
    #[serde(default)]
    pub weight_stage: ModifierStage,
    #[serde(default)]
    pub weight_adjustment: WeightAdjustment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
}

impl EquipmentModifier {
    /// A modifier with no value or weight effect.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: String::new(),
            enabled: true,
            value_stage: ModifierStage::Original,
            value_adjustment: ValueAdjustment::default(),
            weight_stage: ModifierStage::Original,
            weight_adjustment: WeightAdjustment::default(),
            features: Vec::new(),
        }
    }

    pub fn with_value(mut self, stage: ModifierStage, adjustment: ValueAdjustment) -> Self {
        self.value_stage = stage;
        self.value_adjustment = adjustment;
        self
    }

    pub fn with_weight(mut self, stage: ModifierStage, adjustment: WeightAdjustment) -> Self {
        self.weight_stage = stage;
        self.weight_adjustment = adjustment;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leveled_modifiers_multiply_their_amount() {
        let modifier = TraitModifier::percentage("Extra Range", 10).with_levels(3);
        assert_eq!(modifier.effective_cost(), CostAdjustment::Percentage(30));

        let flat = TraitModifier::new("Bonus", CostAdjustment::FlatPoints(2));
        assert_eq!(flat.effective_cost(), CostAdjustment::FlatPoints(2));

        let multiplier =
            TraitModifier::new("Twice", CostAdjustment::Multiplier(2.0)).with_levels(4);
        assert_eq!(multiplier.effective_cost(), CostAdjustment::Multiplier(2.0));
    }

    #[test]
    fn value_adjustment_text_forms() {
        assert_eq!(
            ValueAdjustment::parse_lenient("+5"),
            ValueAdjustment::Addition(Fixed6::from_int(5))
        );
        assert_eq!(
            ValueAdjustment::parse_lenient("-20%"),
            ValueAdjustment::Percentage(Fixed6::from_int(-20))
        );
        assert_eq!(
            ValueAdjustment::parse_lenient("x1.5"),
            ValueAdjustment::Multiplier(Fixed6::from_f64(1.5))
        );
        assert_eq!(
            ValueAdjustment::parse_lenient("x-2"),
            ValueAdjustment::Multiplier(Fixed6::ONE)
        );
        assert_eq!(
            ValueAdjustment::parse_lenient("garbage"),
            ValueAdjustment::Addition(Fixed6::ZERO)
        );
    }

    #[test]
    fn weight_adjustment_text_forms() {
        assert_eq!(
            WeightAdjustment::parse_lenient("+2 kg", WeightUnit::Lb),
            WeightAdjustment::Addition(Weight::new(Fixed6::from_int(2), WeightUnit::Kg))
        );
        assert_eq!(
            WeightAdjustment::parse_lenient("+3", WeightUnit::Lb),
            WeightAdjustment::Addition(Weight::pounds(3))
        );
        assert_eq!(
            WeightAdjustment::parse_lenient("x1/2", WeightUnit::Lb),
            WeightAdjustment::Multiplier(Fraction::new(Fixed6::ONE, Fixed6::from_int(2)))
        );
        assert_eq!(
            WeightAdjustment::parse_lenient("x50%", WeightUnit::Lb),
            WeightAdjustment::PercentageMultiplier(Fraction::whole(Fixed6::from_int(50)))
        );
        assert_eq!(
            WeightAdjustment::parse_lenient("+10%", WeightUnit::Lb),
            WeightAdjustment::Percentage(Fixed6::from_int(10))
        );
    }

    #[test]
    fn modifiers_default_to_enabled_when_deserialized() {
        let modifier: TraitModifier = serde_json::from_str(
            r#"{"name":"Costs Fatigue","cost":{"kind":"percentage","amount":-5}}"#,
        )
        .expect("deserialize");
        assert!(modifier.enabled);
        assert_eq!(modifier.affects, Affects::Total);
        assert_eq!(modifier.cost, CostAdjustment::Percentage(-5));
    }
}
