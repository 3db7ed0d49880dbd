//! Domain entities - rows with identity and the tree that holds them

mod criteria;
mod data_row;
mod equipment;
mod feature;
mod modifier;
mod note;
mod prereq;
mod row_tree;
mod skill;
mod spell;
mod trait_row;

pub use criteria::{NumericCompare, NumericCriteria, StringCompare, StringCriteria};
pub use data_row::{
    clone_subtree, content_hash, is_effectively_disabled, DataRow, Provenance, RowPayload,
    SkillDefault,
};
pub use equipment::{EquipmentData, EquipmentRow};
pub use feature::{
    AttributeBonus, AttributeLimitation, BonusAttribute, ContainedWeightReduction, CostReduction,
    DrBonus, Feature, LeveledAmount, ReactionBonus, SkillBonus, SkillPointBonus, SkillSelection,
    SpellBonus, SpellPointBonus, WeaponBonus, WeaponSelection, WeightReduction,
    CONTAINED_WEIGHT_REDUCTION_KEY, REACTION_KEY, SKILL_NAME_KEY, SKILL_POINTS_KEY,
    SKILL_WEAPON_NAME_KEY, SPELL_COLLEGE_KEY, SPELL_COLLEGE_POINTS_KEY, SPELL_NAME_KEY,
    SPELL_POINTS_KEY, WEAPON_NAME_KEY, WEAPON_SKILL_KEY,
};
pub use modifier::{
    Affects, CostAdjustment, EquipmentModifier, ModifierStage, TraitModifier, ValueAdjustment,
    WeightAdjustment,
};
pub use note::{NoteData, NoteRow};
pub use prereq::{Prereq, PrereqList};
pub use row_tree::{DetachedRow, RowTree, TreeItem};
pub use skill::{SkillData, SkillRow};
pub use spell::{SpellData, SpellRow};
pub use trait_row::{ContainerType, SelfControlRoll, TraitData, TraitRow};
