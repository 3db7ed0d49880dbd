//! Character document aggregate
//!
//! The document owns everything a user edits: settings, profile, attribute
//! bases, the point total and the six row lists. It holds no derived
//! values. Mutations report whether anything changed and leave recomputing
//! to the caller.
//!
//! Entry points that take a row id search the list they name. Equipment
//! entry points search the carried list first, then other equipment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    EquipmentRow, NoteRow, RowTree, SkillRow, SpellRow, TraitRow,
};
use crate::error::DomainError;
use crate::ids::RowId;
use crate::value_objects::{Fixed6, SheetSettings, Weight};

/// Newest document schema this build reads and writes.
pub const CURRENT_VERSION: u32 = 5;

/// Oldest schema accepted; earlier documents keep all equipment in one list.
pub const MIN_VERSION: u32 = 4;

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_total_points() -> i32 {
    150
}

// ============================================================================
// Profile and attribute bases
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub player: String,
    /// Size modifier without bonuses from features
    #[serde(default, alias = "sm")]
    pub size_modifier: i32,
}

/// Values the user edits directly; everything else is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBases {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub health: i32,
    #[serde(default)]
    pub will_adj: i32,
    #[serde(default)]
    pub perception_adj: i32,
    /// Basic speed adjustment, normally in quarter steps
    #[serde(default)]
    pub speed_adj: f64,
    #[serde(default)]
    pub move_adj: i32,
    #[serde(default)]
    pub hit_points_adj: i32,
    #[serde(default)]
    pub fatigue_points_adj: i32,
    #[serde(default)]
    pub hit_points_damage: i32,
    #[serde(default)]
    pub fatigue_points_damage: i32,
}

impl Default for AttributeBases {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            health: 10,
            will_adj: 0,
            perception_adj: 0,
            speed_adj: 0.0,
            move_adj: 0,
            hit_points_adj: 0,
            fatigue_points_adj: 0,
            hit_points_damage: 0,
            fatigue_points_damage: 0,
        }
    }
}

/// Attribute bases addressable through [`CharacterDocument::set_attribute_base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseAttribute {
    Strength,
    Dexterity,
    Intelligence,
    Health,
    Will,
    Perception,
    BasicSpeed,
    BasicMove,
    HitPoints,
    FatiguePoints,
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub settings: SheetSettings,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub attributes: AttributeBases,
    #[serde(default = "default_total_points")]
    pub total_points: i32,
    #[serde(default)]
    pub traits: RowTree<TraitRow>,
    #[serde(default)]
    pub skills: RowTree<SkillRow>,
    #[serde(default)]
    pub spells: RowTree<SpellRow>,
    /// Carried equipment
    #[serde(default)]
    pub equipment: RowTree<EquipmentRow>,
    #[serde(default)]
    pub other_equipment: RowTree<EquipmentRow>,
    #[serde(default)]
    pub notes: RowTree<NoteRow>,
}

impl CharacterDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: CURRENT_VERSION,
            created: now,
            modified: now,
            settings: SheetSettings::default(),
            profile: Profile::default(),
            attributes: AttributeBases::default(),
            total_points: default_total_points(),
            traits: RowTree::new(),
            skills: RowTree::new(),
            spells: RowTree::new(),
            equipment: RowTree::new(),
            other_equipment: RowTree::new(),
            notes: RowTree::new(),
        }
    }

    pub fn with_settings(mut self, settings: SheetSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.profile.name = name.into();
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeBases) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_total_points(mut self, total_points: i32) -> Self {
        self.total_points = total_points;
        self
    }

    // =========================================================================
    // Loading and saving
    // =========================================================================

    pub fn check_version(&self) -> Result<(), DomainError> {
        if self.version > CURRENT_VERSION {
            return Err(DomainError::SchemaTooNew {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }
        if self.version < MIN_VERSION {
            return Err(DomainError::SchemaTooOld {
                found: self.version,
                minimum: MIN_VERSION,
            });
        }
        Ok(())
    }

    /// Parses a document and rejects schema versions outside the supported range.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let document: Self = serde_json::from_str(json)?;
        document.check_version()?;
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn mark_modified(&mut self, now: DateTime<Utc>) {
        self.modified = now;
    }

    // =========================================================================
    // Equipment entry points
    // =========================================================================

    pub fn equipment_row(&self, id: RowId) -> Option<&EquipmentRow> {
        self.equipment
            .get(id)
            .or_else(|| self.other_equipment.get(id))
    }

    fn equipment_row_mut(&mut self, id: RowId) -> Result<&mut EquipmentRow, DomainError> {
        if self.equipment.contains(id) {
            return self
                .equipment
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("Equipment", id.to_string()));
        }
        self.other_equipment
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Equipment", id.to_string()))
    }

    pub fn set_quantity(&mut self, id: RowId, quantity: u32) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_quantity(quantity))
    }

    pub fn set_value(&mut self, id: RowId, value: Fixed6) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_value(value))
    }

    pub fn set_weight(&mut self, id: RowId, weight: Weight) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_weight(weight))
    }

    pub fn set_uses(&mut self, id: RowId, uses: i32) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_uses(uses))
    }

    pub fn set_max_uses(&mut self, id: RowId, max_uses: i32) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_max_uses(max_uses))
    }

    pub fn set_equipped(&mut self, id: RowId, equipped: bool) -> Result<bool, DomainError> {
        Ok(self.equipment_row_mut(id)?.data.set_equipped(equipped))
    }

    pub fn set_weight_ignored_for_skills(
        &mut self,
        id: RowId,
        ignored: bool,
    ) -> Result<bool, DomainError> {
        Ok(self
            .equipment_row_mut(id)?
            .data
            .set_weight_ignored_for_skills(ignored))
    }

    pub fn set_equipment_modifier_enabled(
        &mut self,
        id: RowId,
        modifier_index: usize,
        enabled: bool,
    ) -> Result<bool, DomainError> {
        let row = self.equipment_row_mut(id)?;
        let modifier = row.data.modifiers.get_mut(modifier_index).ok_or_else(|| {
            DomainError::not_found("EquipmentModifier", format!("{id}#{modifier_index}"))
        })?;
        Ok(replace(&mut modifier.enabled, enabled))
    }

    // =========================================================================
    // Trait entry points
    // =========================================================================

    fn trait_row_mut(&mut self, id: RowId) -> Result<&mut TraitRow, DomainError> {
        self.traits
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Trait", id.to_string()))
    }

    pub fn set_trait_disabled(&mut self, id: RowId, disabled: bool) -> Result<bool, DomainError> {
        Ok(self.trait_row_mut(id)?.set_disabled(disabled))
    }

    /// Sets the level count; `-1` turns leveling off and clears any half level.
    pub fn set_trait_levels(
        &mut self,
        id: RowId,
        levels: i32,
        half_level: bool,
    ) -> Result<bool, DomainError> {
        let row = self.trait_row_mut(id)?;
        if half_level && !row.data.allow_half_levels {
            return Err(DomainError::validation(format!(
                "{} does not allow half levels",
                row.data.name
            )));
        }
        let mut changed = row.data.set_levels(levels);
        let half_level = half_level && row.data.is_leveled();
        changed |= replace(&mut row.data.half_level, half_level);
        Ok(changed)
    }

    pub fn set_trait_modifier_enabled(
        &mut self,
        id: RowId,
        modifier_index: usize,
        enabled: bool,
    ) -> Result<bool, DomainError> {
        let row = self.trait_row_mut(id)?;
        let modifier = row.data.modifiers.get_mut(modifier_index).ok_or_else(|| {
            DomainError::not_found("TraitModifier", format!("{id}#{modifier_index}"))
        })?;
        Ok(replace(&mut modifier.enabled, enabled))
    }

    // =========================================================================
    // Attribute and point entry points
    // =========================================================================

    /// Integer attributes truncate `value`; basic speed keeps the fraction.
    pub fn set_attribute_base(
        &mut self,
        attribute: BaseAttribute,
        value: f64,
    ) -> Result<bool, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::validation(format!(
                "{attribute:?} must be a finite number"
            )));
        }
        let bases = &mut self.attributes;
        let whole = value as i32;
        let changed = match attribute {
            BaseAttribute::Strength => replace(&mut bases.strength, whole),
            BaseAttribute::Dexterity => replace(&mut bases.dexterity, whole),
            BaseAttribute::Intelligence => replace(&mut bases.intelligence, whole),
            BaseAttribute::Health => replace(&mut bases.health, whole),
            BaseAttribute::Will => replace(&mut bases.will_adj, whole),
            BaseAttribute::Perception => replace(&mut bases.perception_adj, whole),
            BaseAttribute::BasicSpeed => replace(&mut bases.speed_adj, value),
            BaseAttribute::BasicMove => replace(&mut bases.move_adj, whole),
            BaseAttribute::HitPoints => replace(&mut bases.hit_points_adj, whole),
            BaseAttribute::FatiguePoints => replace(&mut bases.fatigue_points_adj, whole),
        };
        Ok(changed)
    }

    pub fn set_total_points(&mut self, total_points: i32) -> Result<bool, DomainError> {
        Ok(replace(&mut self.total_points, total_points))
    }

    /// Moves the point total so that `spent + unspent` matches; spent points
    /// come from the last recompute.
    pub fn set_unspent_points(&mut self, unspent: i32, spent: i32) -> Result<bool, DomainError> {
        Ok(replace(&mut self.total_points, spent + unspent))
    }

    pub fn set_hit_points_damage(&mut self, damage: i32) -> Result<bool, DomainError> {
        Ok(replace(&mut self.attributes.hit_points_damage, damage))
    }

    pub fn set_fatigue_points_damage(&mut self, damage: i32) -> Result<bool, DomainError> {
        Ok(replace(&mut self.attributes.fatigue_points_damage, damage))
    }

    /// `size` is the total the user wants to see; feature bonuses are
    /// subtracted before storing.
    pub fn set_size_modifier(&mut self, size: i32, bonus: i32) -> Result<bool, DomainError> {
        Ok(replace(&mut self.profile.size_modifier, size - bonus))
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
