//! Features: numeric effects a row grants to the character
//!
//! Each feature kind is one variant of the closed [`Feature`] enum. Every
//! feature exposes a lowercase key; the bonus index groups features by key
//! and the queries pick out the variants they care about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::criteria::{NumericCriteria, StringCriteria};
use crate::value_objects::Weight;

pub const ATTRIBUTE_PREFIX: &str = "attr.";
pub const HIT_LOCATION_PREFIX: &str = "hit_location.";
pub const REACTION_KEY: &str = "reaction";
pub const SKILL_NAME_KEY: &str = "skill.name";
pub const SKILL_WEAPON_NAME_KEY: &str = "skill.weapon_name";
pub const SKILL_THIS_WEAPON_KEY: &str = "skill.this_weapon";
pub const SKILL_POINTS_KEY: &str = "skill.points";
pub const SPELL_NAME_KEY: &str = "spell.name";
pub const SPELL_COLLEGE_KEY: &str = "spell.college";
pub const SPELL_POINTS_KEY: &str = "spell.points";
pub const SPELL_COLLEGE_POINTS_KEY: &str = "spell.college.points";
pub const WEAPON_SKILL_KEY: &str = "weapon.skill";
pub const WEAPON_NAME_KEY: &str = "weapon.name";
pub const WEAPON_THIS_KEY: &str = "weapon.this";
pub const CONTAINED_WEIGHT_REDUCTION_KEY: &str = "equipment.contained_weight_reduction";

/// Attributes that bonuses and cost reductions can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusAttribute {
    St,
    Dx,
    Iq,
    Ht,
    Will,
    FrightCheck,
    Per,
    Vision,
    Hearing,
    TasteSmell,
    Touch,
    Dodge,
    Parry,
    Block,
    Speed,
    Move,
    Fp,
    Hp,
    Sm,
}

impl BonusAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            BonusAttribute::St => "st",
            BonusAttribute::Dx => "dx",
            BonusAttribute::Iq => "iq",
            BonusAttribute::Ht => "ht",
            BonusAttribute::Will => "will",
            BonusAttribute::FrightCheck => "fright_check",
            BonusAttribute::Per => "per",
            BonusAttribute::Vision => "vision",
            BonusAttribute::Hearing => "hearing",
            BonusAttribute::TasteSmell => "taste_smell",
            BonusAttribute::Touch => "touch",
            BonusAttribute::Dodge => "dodge",
            BonusAttribute::Parry => "parry",
            BonusAttribute::Block => "block",
            BonusAttribute::Speed => "speed",
            BonusAttribute::Move => "move",
            BonusAttribute::Fp => "fp",
            BonusAttribute::Hp => "hp",
            BonusAttribute::Sm => "sm",
        }
    }

    /// Basic speed is the only attribute with fractional bonuses.
    pub fn is_integer_only(self) -> bool {
        self != BonusAttribute::Speed
    }

    /// Index key for plain bonuses to this attribute.
    pub fn key(self) -> String {
        format!("{}{}", ATTRIBUTE_PREFIX, self.as_str())
    }

    /// Index key for bonuses restricted to lifting or striking.
    pub fn limited_key(self, limitation: AttributeLimitation) -> String {
        match limitation.suffix() {
            Some(suffix) => format!("{}.{}", self.key(), suffix),
            None => self.key(),
        }
    }
}

impl fmt::Display for BonusAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restricts an ST bonus to one use of strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeLimitation {
    #[default]
    None,
    StrikingOnly,
    LiftingOnly,
}

impl AttributeLimitation {
    fn suffix(self) -> Option<&'static str> {
        match self {
            AttributeLimitation::None => None,
            AttributeLimitation::StrikingOnly => Some("striking_only"),
            AttributeLimitation::LiftingOnly => Some("lifting_only"),
        }
    }
}

/// A bonus amount, optionally multiplied by the owner's level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeveledAmount {
    pub amount: f64,
    #[serde(default)]
    pub per_level: bool,
}

impl LeveledAmount {
    pub fn flat(amount: f64) -> Self {
        Self {
            amount,
            per_level: false,
        }
    }

    pub fn per_level(amount: f64) -> Self {
        Self {
            amount,
            per_level: true,
        }
    }

    /// Truncated amount, multiplied by `level` when per-level.
    pub fn integer_adjusted(&self, level: i32) -> i32 {
        let amount = self.amount as i32;
        if self.per_level {
            amount * level
        } else {
            amount
        }
    }

    pub fn adjusted(&self, level: i32) -> f64 {
        if self.per_level {
            self.amount * f64::from(level)
        } else {
            self.amount
        }
    }
}

// =============================================================================
// Feature kinds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBonus {
    pub attribute: BonusAttribute,
    #[serde(default)]
    pub limitation: AttributeLimitation,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrBonus {
    pub location: String,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBonus {
    #[serde(default)]
    pub situation: String,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSelection {
    #[default]
    SkillsWithName,
    WeaponsWithName,
    ThisWeapon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillBonus {
    #[serde(default)]
    pub selection: SkillSelection,
    #[serde(default)]
    pub name: StringCriteria,
    #[serde(default)]
    pub specialization: StringCriteria,
    #[serde(default)]
    pub category: StringCriteria,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPointBonus {
    #[serde(default)]
    pub name: StringCriteria,
    #[serde(default)]
    pub specialization: StringCriteria,
    #[serde(default)]
    pub category: StringCriteria,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellBonus {
    /// Match against the spell's college instead of its name
    #[serde(default)]
    pub match_college: bool,
    #[serde(default)]
    pub name: StringCriteria,
    #[serde(default)]
    pub category: StringCriteria,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellPointBonus {
    #[serde(default)]
    pub match_college: bool,
    #[serde(default)]
    pub name: StringCriteria,
    #[serde(default)]
    pub category: StringCriteria,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSelection {
    #[default]
    WeaponsWithRequiredSkill,
    WeaponsWithName,
    ThisWeapon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponBonus {
    #[serde(default)]
    pub selection: WeaponSelection,
    #[serde(default)]
    pub name: StringCriteria,
    #[serde(default)]
    pub specialization: StringCriteria,
    /// Relative skill level the wielder must have
    #[serde(default = "NumericCriteria::any")]
    pub level: NumericCriteria,
    #[serde(default)]
    pub category: StringCriteria,
    pub amount: LeveledAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReduction {
    pub attribute: BonusAttribute,
    /// Percentage off the attribute's point cost
    pub percentage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WeightReduction {
    Percentage(i32),
    Weight(Weight),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainedWeightReduction {
    pub reduction: WeightReduction,
}

/// A numeric effect granted by a row or one of its modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    AttributeBonus(AttributeBonus),
    DrBonus(DrBonus),
    ReactionBonus(ReactionBonus),
    SkillBonus(SkillBonus),
    SkillPointBonus(SkillPointBonus),
    SpellBonus(SpellBonus),
    SpellPointBonus(SpellPointBonus),
    WeaponBonus(WeaponBonus),
    CostReduction(CostReduction),
    ContainedWeightReduction(ContainedWeightReduction),
}

impl Feature {
    /// Lowercase index key.
    pub fn key(&self) -> String {
        match self {
            Feature::AttributeBonus(bonus) => bonus.attribute.limited_key(bonus.limitation),
            Feature::DrBonus(bonus) => {
                format!("{}{}", HIT_LOCATION_PREFIX, bonus.location.to_lowercase())
            }
            Feature::ReactionBonus(_) => REACTION_KEY.to_string(),
            Feature::SkillBonus(bonus) => match bonus.selection {
                SkillSelection::SkillsWithName => SKILL_NAME_KEY,
                SkillSelection::WeaponsWithName => SKILL_WEAPON_NAME_KEY,
                SkillSelection::ThisWeapon => SKILL_THIS_WEAPON_KEY,
            }
            .to_string(),
            Feature::SkillPointBonus(_) => SKILL_POINTS_KEY.to_string(),
            Feature::SpellBonus(bonus) => if bonus.match_college {
                SPELL_COLLEGE_KEY
            } else {
                SPELL_NAME_KEY
            }
            .to_string(),
            Feature::SpellPointBonus(bonus) => if bonus.match_college {
                SPELL_COLLEGE_POINTS_KEY
            } else {
                SPELL_POINTS_KEY
            }
            .to_string(),
            Feature::WeaponBonus(bonus) => match bonus.selection {
                WeaponSelection::WeaponsWithRequiredSkill => WEAPON_SKILL_KEY,
                WeaponSelection::WeaponsWithName => WEAPON_NAME_KEY,
                WeaponSelection::ThisWeapon => WEAPON_THIS_KEY,
            }
            .to_string(),
            Feature::CostReduction(reduction) => reduction.attribute.key(),
            Feature::ContainedWeightReduction(_) => CONTAINED_WEIGHT_REDUCTION_KEY.to_string(),
        }
    }

    /// The bonus amount, for the kinds that carry one.
    pub fn amount(&self) -> Option<&LeveledAmount> {
        match self {
            Feature::AttributeBonus(b) => Some(&b.amount),
            Feature::DrBonus(b) => Some(&b.amount),
            Feature::ReactionBonus(b) => Some(&b.amount),
            Feature::SkillBonus(b) => Some(&b.amount),
            Feature::SkillPointBonus(b) => Some(&b.amount),
            Feature::SpellBonus(b) => Some(&b.amount),
            Feature::SpellPointBonus(b) => Some(&b.amount),
            Feature::WeaponBonus(b) => Some(&b.amount),
            Feature::CostReduction(_) | Feature::ContainedWeightReduction(_) => None,
        }
    }

    pub fn is_weapon_bonus(&self) -> bool {
        matches!(self, Feature::WeaponBonus(_))
    }

    pub fn attribute_bonus(attribute: BonusAttribute, amount: f64) -> Self {
        Feature::AttributeBonus(AttributeBonus {
            attribute,
            limitation: AttributeLimitation::None,
            amount: LeveledAmount::flat(amount),
        })
    }

    pub fn cost_reduction(attribute: BonusAttribute, percentage: i32) -> Self {
        Feature::CostReduction(CostReduction {
            attribute,
            percentage,
        })
    }
}

/// Category check shared by the qualified bonus kinds.
pub(crate) fn categories_match(criteria: &StringCriteria, categories: &BTreeSet<String>) -> bool {
    criteria.matches_any_of(categories)
}

impl SkillBonus {
    pub fn matches(&self, name: &str, specialization: &str, categories: &BTreeSet<String>) -> bool {
        self.name.matches(name)
            && self.specialization.matches(specialization)
            && categories_match(&self.category, categories)
    }
}

impl SkillPointBonus {
    pub fn matches(&self, name: &str, specialization: &str, categories: &BTreeSet<String>) -> bool {
        self.name.matches(name)
            && self.specialization.matches(specialization)
            && categories_match(&self.category, categories)
    }
}

impl SpellBonus {
    pub fn matches(&self, qualifier: &str, categories: &BTreeSet<String>) -> bool {
        self.name.matches(qualifier) && categories_match(&self.category, categories)
    }
}

impl SpellPointBonus {
    pub fn matches(&self, qualifier: &str, categories: &BTreeSet<String>) -> bool {
        self.name.matches(qualifier) && categories_match(&self.category, categories)
    }
}

impl WeaponBonus {
    pub fn matches(&self, name: &str, specialization: &str, categories: &BTreeSet<String>) -> bool {
        self.name.matches(name)
            && self.specialization.matches(specialization)
            && categories_match(&self.category, categories)
    }
}
