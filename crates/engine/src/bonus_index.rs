//! Bonus index
//!
//! Every feature on every row of the six lists, plus the features of each
//! enabled modifier, keyed by its lowercase target key. Rows are indexed
//! whether or not they are disabled; only a modifier's own enabled flag
//! keeps its features out.
//!
//! Per-level amounts are scaled by the level recorded at indexing time: a
//! trait's level count for the trait's own features, a modifier's level
//! count for the modifier's features, and zero everywhere else.

use std::collections::{BTreeSet, HashMap};

use sheetforge_domain::entities::{
    BonusAttribute, DataRow, Feature, RowPayload, RowTree, SkillBonus, SkillSelection, WeaponBonus,
    WeaponSelection,
};
use sheetforge_domain::rules::attributes::MAX_COST_REDUCTION;
use sheetforge_domain::CharacterDocument;

use crate::infrastructure::ports::SkillLookup;

/// A feature with the level its per-level amount is scaled by.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFeature {
    pub feature: Feature,
    pub level: i32,
}

/// A matched bonus together with its indexing level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeveledBonus<'a, T> {
    pub bonus: &'a T,
    pub level: i32,
}

impl LeveledBonus<'_, WeaponBonus> {
    pub fn integer_amount(&self) -> i32 {
        self.bonus.amount.integer_adjusted(self.level)
    }
}

impl LeveledBonus<'_, SkillBonus> {
    pub fn integer_amount(&self) -> i32 {
        self.bonus.amount.integer_adjusted(self.level)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusIndex {
    features: HashMap<String, Vec<IndexedFeature>>,
}

impl BonusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(document: &CharacterDocument) -> Self {
        let mut index = Self::new();

        for row in document.traits.iter() {
            index.extend(&row.features, row.data.feature_level());
            for modifier in row.data.modifiers.iter().filter(|m| m.enabled) {
                index.extend(&modifier.features, modifier.levels.max(0));
            }
        }
        for tree in [&document.equipment, &document.other_equipment] {
            for row in tree.iter() {
                index.extend(&row.features, 0);
                for modifier in row.data.modifiers.iter().filter(|m| m.enabled) {
                    index.extend(&modifier.features, 0);
                }
            }
        }
        index.extend_plain(&document.skills);
        index.extend_plain(&document.spells);
        index.extend_plain(&document.notes);
        index
    }

    fn extend_plain<P: RowPayload>(&mut self, tree: &RowTree<DataRow<P>>) {
        for row in tree.iter() {
            self.extend(&row.features, 0);
        }
    }

    fn extend(&mut self, features: &[Feature], level: i32) {
        for feature in features {
            self.insert(feature.clone(), level);
        }
    }

    pub fn insert(&mut self, feature: Feature, level: i32) {
        self.features
            .entry(feature.key().to_lowercase())
            .or_default()
            .push(IndexedFeature { feature, level });
    }

    /// Number of indexed features across all keys.
    pub fn len(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features_for(&self, key: &str) -> &[IndexedFeature] {
        self.features
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // =========================================================================
    // Plain bonuses
    // =========================================================================

    /// Sum of truncated bonus amounts under `key`, weapon bonuses excluded.
    pub fn integer_bonus_for(&self, key: &str) -> i32 {
        self.features_for(key)
            .iter()
            .filter(|entry| !entry.feature.is_weapon_bonus())
            .filter_map(|entry| entry.feature.amount().map(|a| a.integer_adjusted(entry.level)))
            .sum()
    }

    /// Like [`integer_bonus_for`](Self::integer_bonus_for) without truncation.
    pub fn fractional_bonus_for(&self, key: &str) -> f64 {
        self.features_for(key)
            .iter()
            .filter(|entry| !entry.feature.is_weapon_bonus())
            .filter_map(|entry| entry.feature.amount().map(|a| a.adjusted(entry.level)))
            .sum()
    }

    /// Plain bonus to `attribute`, truncated unless the attribute takes
    /// fractional bonuses.
    pub fn attribute_bonus_for(&self, attribute: BonusAttribute) -> f64 {
        let key = attribute.key();
        if attribute.is_integer_only() {
            f64::from(self.integer_bonus_for(&key))
        } else {
            self.fractional_bonus_for(&key)
        }
    }

    pub fn cost_reduction_for(&self, key: &str) -> i32 {
        let total: i32 = self
            .features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::CostReduction(reduction) => Some(reduction.percentage),
                _ => None,
            })
            .sum();
        total.min(MAX_COST_REDUCTION)
    }

    // =========================================================================
    // Qualified bonuses
    // =========================================================================

    pub fn skill_compared_bonus_for(
        &self,
        key: &str,
        name: &str,
        specialization: &str,
        categories: &BTreeSet<String>,
    ) -> i32 {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::SkillBonus(bonus) if bonus.matches(name, specialization, categories) => {
                    Some(bonus.amount.integer_adjusted(entry.level))
                }
                _ => None,
            })
            .sum()
    }

    pub fn skill_point_bonus_for(
        &self,
        key: &str,
        name: &str,
        specialization: &str,
        categories: &BTreeSet<String>,
    ) -> i32 {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::SkillPointBonus(bonus)
                    if bonus.matches(name, specialization, categories) =>
                {
                    Some(bonus.amount.integer_adjusted(entry.level))
                }
                _ => None,
            })
            .sum()
    }

    pub fn spell_compared_bonus_for(
        &self,
        key: &str,
        qualifier: &str,
        categories: &BTreeSet<String>,
    ) -> i32 {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::SpellBonus(bonus) if bonus.matches(qualifier, categories) => {
                    Some(bonus.amount.integer_adjusted(entry.level))
                }
                _ => None,
            })
            .sum()
    }

    pub fn spell_point_bonus_for(
        &self,
        key: &str,
        qualifier: &str,
        categories: &BTreeSet<String>,
    ) -> i32 {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::SpellPointBonus(bonus) if bonus.matches(qualifier, categories) => {
                    Some(bonus.amount.integer_adjusted(entry.level))
                }
                _ => None,
            })
            .sum()
    }

    // =========================================================================
    // Weapon bonuses
    // =========================================================================

    /// Weapon bonuses selecting weapons by name.
    pub fn named_weapon_bonuses_for(
        &self,
        key: &str,
        name: &str,
        usage: &str,
        categories: &BTreeSet<String>,
    ) -> Vec<LeveledBonus<'_, WeaponBonus>> {
        self.weapon_bonuses(key)
            .filter(|b| b.bonus.selection == WeaponSelection::WeaponsWithName)
            .filter(|b| b.bonus.matches(name, usage, categories))
            .collect()
    }

    /// Skill bonuses selecting weapons by name.
    pub fn named_weapon_skill_bonuses_for(
        &self,
        key: &str,
        name: &str,
        usage: &str,
        categories: &BTreeSet<String>,
    ) -> Vec<LeveledBonus<'_, SkillBonus>> {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::SkillBonus(bonus)
                    if bonus.selection == SkillSelection::WeaponsWithName
                        && bonus.matches(name, usage, categories) =>
                {
                    Some(LeveledBonus {
                        bonus,
                        level: entry.level,
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Weapon bonuses whose level criteria accept the best relative level
    /// among the matching skills. Nothing matches when no skill does.
    pub fn weapon_compared_bonuses_for(
        &self,
        key: &str,
        name: &str,
        specialization: &str,
        categories: &BTreeSet<String>,
        skills: &dyn SkillLookup,
    ) -> Vec<LeveledBonus<'_, WeaponBonus>> {
        let Some(best) = skills.relative_levels(name, specialization).into_iter().max() else {
            return Vec::new();
        };
        self.weapon_bonuses(key)
            .filter(|b| b.bonus.matches(name, specialization, categories))
            .filter(|b| b.bonus.level.matches(best))
            .collect()
    }

    fn weapon_bonuses<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = LeveledBonus<'a, WeaponBonus>> + 'a {
        self.features_for(key)
            .iter()
            .filter_map(|entry| match &entry.feature {
                Feature::WeaponBonus(bonus) => Some(LeveledBonus {
                    bonus,
                    level: entry.level,
                }),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSkillLookup;
    use chrono::Utc;
    use mockall::predicate::eq;
    use sheetforge_domain::entities::{
        AttributeBonus, AttributeLimitation, BonusAttribute, EquipmentData, EquipmentModifier,
        LeveledAmount, NoteData, NoteRow, NumericCompare, NumericCriteria, SkillPointBonus,
        SpellBonus, StringCriteria, TraitData, TraitModifier, TraitRow, WEAPON_NAME_KEY,
        WEAPON_SKILL_KEY,
    };
    use sheetforge_domain::{EquipmentRow, Fixed6, Weight};

    fn strength_bonus(amount: LeveledAmount) -> Feature {
        Feature::AttributeBonus(AttributeBonus {
            attribute: BonusAttribute::St,
            limitation: AttributeLimitation::None,
            amount,
        })
    }

    fn weapon_bonus(selection: WeaponSelection, name: &str, level: NumericCriteria) -> Feature {
        Feature::WeaponBonus(WeaponBonus {
            selection,
            name: StringCriteria::is(name),
            specialization: StringCriteria::any(),
            level,
            category: StringCriteria::any(),
            amount: LeveledAmount::flat(2.0),
        })
    }

    fn index_of(features: Vec<Feature>) -> BonusIndex {
        let mut index = BonusIndex::new();
        for feature in features {
            index.insert(feature, 0);
        }
        index
    }

    fn strength_key() -> String {
        BonusAttribute::St.key()
    }

    #[test]
    fn missing_keys_are_zero_or_empty() {
        let index = BonusIndex::new();
        assert_eq!(index.integer_bonus_for("attr.st"), 0);
        assert_eq!(index.fractional_bonus_for("attr.speed"), 0.0);
        assert_eq!(index.cost_reduction_for("attr.st"), 0);
        assert!(index
            .named_weapon_bonuses_for(WEAPON_NAME_KEY, "Sword", "", &BTreeSet::new())
            .is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn per_level_amounts_use_the_trait_level() {
        let mut doc = CharacterDocument::new(Utc::now());
        let lifting = TraitRow::new(TraitData::new("Super Strength", 0).with_levels(3, 10))
            .with_feature(strength_bonus(LeveledAmount::per_level(2.0)));
        doc.traits = RowTree::from_detached(vec![lifting.detached()]).expect("traits");

        let index = BonusIndex::build(&doc);
        assert_eq!(index.integer_bonus_for(&strength_key()), 6);
        assert_eq!(index.integer_bonus_for("ATTR.ST"), 6);
    }

    #[test]
    fn disabled_modifiers_are_skipped_but_disabled_rows_are_not() {
        let mut doc = CharacterDocument::new(Utc::now());
        let trait_row = TraitRow::new(
            TraitData::new("Gifted", 5).with_modifier(
                TraitModifier::percentage("Extra", 10)
                    .with_enabled(false)
                    .with_feature(Feature::attribute_bonus(BonusAttribute::Dx, 1.0)),
            ),
        )
        .with_feature(Feature::attribute_bonus(BonusAttribute::Iq, 1.0))
        .with_disabled(true);
        doc.traits = RowTree::from_detached(vec![trait_row.detached()]).expect("traits");

        let belt = EquipmentRow::new(
            EquipmentData::new("Belt", Fixed6::ZERO, Weight::pounds(1)).with_modifier(
                EquipmentModifier::new("Enchanted")
                    .with_feature(Feature::attribute_bonus(BonusAttribute::St, 2.0)),
            ),
        );
        doc.other_equipment = RowTree::from_detached(vec![belt.detached()]).expect("equipment");
        doc.notes = RowTree::from_detached(vec![NoteRow::new(NoteData::new("Blessed"))
            .with_feature(Feature::attribute_bonus(BonusAttribute::Will, 1.0))
            .detached()])
        .expect("notes");

        let index = BonusIndex::build(&doc);
        assert_eq!(index.integer_bonus_for(&BonusAttribute::Iq.key()), 1);
        assert_eq!(index.integer_bonus_for(&BonusAttribute::Dx.key()), 0);
        assert_eq!(index.integer_bonus_for(&strength_key()), 2);
        assert_eq!(index.integer_bonus_for(&BonusAttribute::Will.key()), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn integer_bonus_truncates_and_fractional_does_not() {
        let index = index_of(vec![
            Feature::attribute_bonus(BonusAttribute::Speed, 0.75),
            Feature::attribute_bonus(BonusAttribute::Speed, 1.5),
        ]);
        let key = BonusAttribute::Speed.key();
        assert_eq!(index.integer_bonus_for(&key), 1);
        assert_eq!(index.fractional_bonus_for(&key), 2.25);
    }

    #[test]
    fn attribute_bonus_keeps_fractions_only_for_speed() {
        let index = index_of(vec![
            Feature::attribute_bonus(BonusAttribute::Speed, 0.75),
            Feature::attribute_bonus(BonusAttribute::Move, 1.5),
            Feature::attribute_bonus(BonusAttribute::Move, 0.75),
        ]);
        assert_eq!(index.attribute_bonus_for(BonusAttribute::Speed), 0.75);
        assert_eq!(index.attribute_bonus_for(BonusAttribute::Move), 1.0);
        assert_eq!(index.attribute_bonus_for(BonusAttribute::Dodge), 0.0);
    }

    #[test]
    fn cost_reduction_is_capped() {
        let index = index_of(vec![
            Feature::cost_reduction(BonusAttribute::St, 50),
            Feature::cost_reduction(BonusAttribute::St, 40),
            Feature::attribute_bonus(BonusAttribute::St, 3.0),
        ]);
        assert_eq!(index.cost_reduction_for(&strength_key()), 80);
        assert_eq!(index.integer_bonus_for(&strength_key()), 3);
    }

    #[test]
    fn weapon_bonuses_are_excluded_from_plain_sums() {
        let index = index_of(vec![weapon_bonus(
            WeaponSelection::WeaponsWithName,
            "Sword",
            NumericCriteria::any(),
        )]);
        assert_eq!(index.integer_bonus_for(WEAPON_NAME_KEY), 0);
        let matched =
            index.named_weapon_bonuses_for(WEAPON_NAME_KEY, "sword", "", &BTreeSet::new());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].integer_amount(), 2);
    }

    #[test]
    fn qualified_skill_and_spell_bonuses_filter_by_name_and_category() {
        let mut categories = BTreeSet::new();
        categories.insert("Combat".to_string());
        let index = index_of(vec![
            Feature::SkillPointBonus(SkillPointBonus {
                name: StringCriteria::is("Broadsword"),
                specialization: StringCriteria::any(),
                category: StringCriteria::is("combat"),
                amount: LeveledAmount::flat(2.0),
            }),
            Feature::SpellBonus(SpellBonus {
                match_college: true,
                name: StringCriteria::is("Fire"),
                category: StringCriteria::any(),
                amount: LeveledAmount::flat(1.0),
            }),
        ]);
        assert_eq!(
            index.skill_point_bonus_for("skill.points", "Broadsword", "", &categories),
            2
        );
        assert_eq!(
            index.skill_point_bonus_for("skill.points", "Broadsword", "", &BTreeSet::new()),
            0
        );
        assert_eq!(
            index.spell_compared_bonus_for("spell.college", "fire", &BTreeSet::new()),
            1
        );
        assert_eq!(
            index.spell_point_bonus_for("spell.college.points", "fire", &BTreeSet::new()),
            0
        );
    }

    #[test]
    fn weapon_compared_bonuses_use_the_best_skill_level() {
        let index = index_of(vec![
            weapon_bonus(
                WeaponSelection::WeaponsWithRequiredSkill,
                "Broadsword",
                NumericCriteria::new(NumericCompare::AtLeast, 2),
            ),
            weapon_bonus(
                WeaponSelection::WeaponsWithRequiredSkill,
                "Broadsword",
                NumericCriteria::new(NumericCompare::AtLeast, 5),
            ),
        ]);

        let mut skills = MockSkillLookup::new();
        skills
            .expect_relative_levels()
            .with(eq("Broadsword"), eq(""))
            .times(1)
            .returning(|_, _| vec![1, 3]);

        let matched = index.weapon_compared_bonuses_for(
            WEAPON_SKILL_KEY,
            "Broadsword",
            "",
            &BTreeSet::new(),
            &skills,
        );
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn weapon_compared_bonuses_need_a_matching_skill() {
        let index = index_of(vec![weapon_bonus(
            WeaponSelection::WeaponsWithRequiredSkill,
            "Axe/Mace",
            NumericCriteria::any(),
        )]);
        let mut skills = MockSkillLookup::new();
        skills.expect_relative_levels().returning(|_, _| Vec::new());

        assert!(index
            .weapon_compared_bonuses_for(WEAPON_SKILL_KEY, "Axe/Mace", "", &BTreeSet::new(), &skills)
            .is_empty());
    }
}
