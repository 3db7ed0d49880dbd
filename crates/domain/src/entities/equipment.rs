//! Equipment rows
//!
//! Extended totals (value and weight including contents) are derived on
//! every recompute and kept in the sheet cache rather than on the row, so
//! a loaded document always serializes back to the same fields.

use serde::{Deserialize, Serialize};

use super::data_row::{DataRow, RowPayload};
use super::modifier::EquipmentModifier;
use crate::value_objects::{Fixed6, Weight};

pub type EquipmentRow = DataRow<EquipmentData>;

fn default_quantity() -> u32 {
    1
}

fn default_equipped() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentData {
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tech_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub legality_class: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub uses: i32,
    #[serde(default)]
    pub max_uses: i32,
    /// Unit value before modifiers
    #[serde(default)]
    pub value: Fixed6,
    /// Unit weight before modifiers
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub weight_ignored_for_skills: bool,
    #[serde(default = "default_equipped")]
    pub equipped: bool,
    #[serde(default)]
    pub container: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<EquipmentModifier>,
}

impl EquipmentData {
    pub fn new(description: impl Into<String>, value: Fixed6, weight: Weight) -> Self {
        Self {
            description: description.into(),
            reference: String::new(),
            tech_level: String::new(),
            legality_class: String::new(),
            quantity: 1,
            uses: 0,
            max_uses: 0,
            value,
            weight,
            weight_ignored_for_skills: false,
            equipped: true,
            container: false,
            modifiers: Vec::new(),
        }
    }

    pub fn container(description: impl Into<String>, value: Fixed6, weight: Weight) -> Self {
        Self {
            container: true,
            ..Self::new(description, value, weight)
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_modifier(mut self, modifier: EquipmentModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_weight_ignored_for_skills(mut self, ignored: bool) -> Self {
        self.weight_ignored_for_skills = ignored;
        self
    }

    // =========================================================================
    // Field setters, each reporting whether anything changed
    // =========================================================================

    pub fn set_quantity(&mut self, quantity: u32) -> bool {
        replace(&mut self.quantity, quantity)
    }

    pub fn set_value(&mut self, value: Fixed6) -> bool {
        replace(&mut self.value, value)
    }

    pub fn set_weight(&mut self, weight: Weight) -> bool {
        replace(&mut self.weight, weight)
    }

    /// Uses are clamped to `0..=max_uses`.
    pub fn set_uses(&mut self, uses: i32) -> bool {
        let uses = uses.clamp(0, self.max_uses.max(0));
        replace(&mut self.uses, uses)
    }

    /// Lowering the maximum also lowers the current uses.
    pub fn set_max_uses(&mut self, max_uses: i32) -> bool {
        let max_uses = max_uses.max(0);
        let mut changed = replace(&mut self.max_uses, max_uses);
        if self.uses > max_uses {
            self.uses = max_uses;
            changed = true;
        }
        changed
    }

    pub fn set_equipped(&mut self, equipped: bool) -> bool {
        replace(&mut self.equipped, equipped)
    }

    pub fn set_weight_ignored_for_skills(&mut self, ignored: bool) -> bool {
        replace(&mut self.weight_ignored_for_skills, ignored)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl RowPayload for EquipmentData {
    fn is_container(&self) -> bool {
        self.container
    }
}
