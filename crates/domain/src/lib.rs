//! SheetForge domain: row trees, sheet entities, value objects and the
//! pure point, value and weight rules.
//!
//! This crate performs no I/O and keeps no derived state. The engine crate
//! builds the bonus index and caches derived totals on top of it.

extern crate self as sheetforge_domain;

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod rules;
pub mod value_objects;

pub use aggregates::{
    AttributeBases, BaseAttribute, CharacterDocument, Profile, CURRENT_VERSION, MIN_VERSION,
};

pub use entities::{
    clone_subtree, content_hash, is_effectively_disabled, Affects, AttributeBonus,
    AttributeLimitation, BonusAttribute, ContainedWeightReduction, ContainerType, CostAdjustment,
    CostReduction, DataRow, DetachedRow, DrBonus, EquipmentData, EquipmentModifier, EquipmentRow,
    Feature, LeveledAmount, ModifierStage, NoteData, NoteRow, NumericCompare, NumericCriteria,
    Prereq, PrereqList, Provenance, ReactionBonus, RowPayload, RowTree, SelfControlRoll,
    SkillBonus, SkillData, SkillDefault, SkillPointBonus, SkillRow, SkillSelection, SpellBonus,
    SpellData, SpellPointBonus, SpellRow, StringCompare, StringCriteria, TraitData,
    TraitModifier, TraitRow, TreeItem, ValueAdjustment, WeaponBonus, WeaponSelection,
    WeightAdjustment, WeightReduction,
};

pub use error::DomainError;

pub use ids::RowId;

pub use value_objects::{
    Dice, DiceParseError, Encumbrance, Fixed6, Fraction, SheetSettings, Weight, WeightUnit,
};
