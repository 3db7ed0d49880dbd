//! Recompute orchestrator
//!
//! [`SheetEngine`] owns a character document and the cache of everything
//! derived from it. Mutations only touch the document and report whether
//! anything changed; callers decide when to run [`SheetEngine::recompute`].
//! Each pass rebuilds the bonus index, runs every stage in order and
//! replaces the previous cache with a single assignment.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use sheetforge_domain::entities::{
    SkillBonus, WeaponBonus, SKILL_NAME_KEY, SKILL_POINTS_KEY, SKILL_WEAPON_NAME_KEY,
    SPELL_COLLEGE_KEY, SPELL_COLLEGE_POINTS_KEY, SPELL_NAME_KEY, SPELL_POINTS_KEY,
    WEAPON_NAME_KEY, WEAPON_SKILL_KEY,
};
use sheetforge_domain::rules::ExtendedTotals;
use sheetforge_domain::{CharacterDocument, DomainError, RowId};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::bonus_index::{BonusIndex, LeveledBonus};
use crate::infrastructure::ports::ClockPort;
use crate::skill_lookup::DocumentSkills;
use crate::stages::{
    self, AttributePoints, Budget, CarriedLoad, Movement, PointTotals, Pools, PrimaryAttributes,
    SecondaryAttributes, Stage, StrengthDerived,
};

/// Every derived value of one recompute pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetCache {
    pub primary: PrimaryAttributes,
    pub load: CarriedLoad,
    pub strength: StrengthDerived,
    pub movement: Movement,
    pub secondary: SecondaryAttributes,
    pub pools: Pools,
    pub attribute_points: AttributePoints,
    pub point_totals: PointTotals,
    pub budget: Budget,
}

impl SheetCache {
    /// Runs every stage against `document` using an already built index.
    pub fn compute(document: &CharacterDocument, index: &BonusIndex) -> Self {
        let settings = &document.settings;
        let bases = &document.attributes;

        let primary = stages::primary_attributes(document, index);
        debug!(
            stage = Stage::PrimaryAttributes.as_str(),
            st = primary.strength.value,
            dx = primary.dexterity.value,
            iq = primary.intelligence.value,
            ht = primary.health.value,
            sm = primary.size_modifier,
            "Stage complete"
        );

        let load = stages::carried_load(document);
        debug!(
            stage = Stage::CarriedLoad.as_str(),
            rows = load.extended.len(),
            weight_lb = load.weight_carried.normalized().to_f64(),
            "Stage complete"
        );

        let vitality = stages::vitality(bases, index, &primary);
        let strength = stages::strength_derived(settings, &primary, &load, &vitality);
        debug!(
            stage = Stage::StrengthDerived.as_str(),
            lifting_st = strength.lifting_strength,
            striking_st = strength.striking_strength,
            encumbrance = ?strength.encumbrance,
            "Stage complete"
        );

        let movement = stages::movement(bases, index, &primary, &vitality, &strength);
        debug!(
            stage = Stage::Movement.as_str(),
            basic_speed = movement.basic_speed,
            basic_move = movement.basic_move,
            current_move = movement.current_move,
            current_dodge = movement.current_dodge,
            "Stage complete"
        );

        let secondary = stages::secondary_attributes(settings, bases, index, &primary);
        debug!(
            stage = Stage::SecondaryAttributes.as_str(),
            will = secondary.will,
            per = secondary.perception,
            "Stage complete"
        );

        let pools = stages::pools(&vitality);
        debug!(
            stage = Stage::Pools.as_str(),
            hp = pools.hit_points.current,
            fp = pools.fatigue_points.current,
            reeling = pools.hit_points.reeling,
            tired = pools.fatigue_points.tired,
            "Stage complete"
        );

        let attribute_points = stages::attribute_points(settings, bases, &primary);
        debug!(
            stage = Stage::AttributePoints.as_str(),
            points = attribute_points.total(),
            "Stage complete"
        );

        let point_totals = stages::point_totals(document);
        debug!(
            stage = Stage::PointTotals.as_str(),
            advantages = point_totals.advantages,
            disadvantages = point_totals.disadvantages,
            quirks = point_totals.quirks,
            "Stage complete"
        );

        let budget = stages::budget(document.total_points, &attribute_points, &point_totals);
        debug!(
            stage = Stage::Budget.as_str(),
            spent = budget.spent,
            unspent = budget.unspent,
            "Stage complete"
        );

        Self {
            primary,
            load,
            strength,
            movement,
            secondary,
            pools,
            attribute_points,
            point_totals,
            budget,
        }
    }

    pub fn extended(&self, id: RowId) -> Option<&ExtendedTotals> {
        self.load.extended.get(&id)
    }
}

/// Level and point bonuses aimed at one skill or spell row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowBonuses {
    pub level: i32,
    pub points: i32,
}

/// A document together with its derived cache.
#[derive(Clone)]
pub struct SheetEngine {
    document: CharacterDocument,
    index: BonusIndex,
    cache: SheetCache,
    clock: Arc<dyn ClockPort>,
}

impl SheetEngine {
    /// Wraps `document` and runs an initial recompute.
    pub fn new(document: CharacterDocument, clock: Arc<dyn ClockPort>) -> Self {
        let index = BonusIndex::build(&document);
        let cache = SheetCache::compute(&document, &index);
        Self {
            document,
            index,
            cache,
            clock,
        }
    }

    pub fn document(&self) -> &CharacterDocument {
        &self.document
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }

    /// Bonuses gathered by the last recompute.
    pub fn bonuses(&self) -> &BonusIndex {
        &self.index
    }

    pub fn into_document(self) -> CharacterDocument {
        self.document
    }

    /// Rebuilds the bonus index and every derived value.
    pub fn recompute(&mut self) {
        let started = Instant::now();
        let index = BonusIndex::build(&self.document);
        let cache = SheetCache::compute(&self.document, &index);

        info!(
            name = %self.document.profile.name,
            features = index.len(),
            spent = cache.budget.spent,
            unspent = cache.budget.unspent,
            encumbrance = ?cache.strength.encumbrance,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Recomputed sheet"
        );

        self.index = index;
        self.cache = cache;
    }

    /// Applies `mutation` to the document, stamping the modification time
    /// when it reports a change. The cache is left as is.
    pub fn update<F>(&mut self, mutation: F) -> Result<bool, DomainError>
    where
        F: FnOnce(&mut CharacterDocument) -> Result<bool, DomainError>,
    {
        let changed = mutation(&mut self.document)?;
        if changed {
            self.document.mark_modified(self.clock.now());
        }
        Ok(changed)
    }

    /// Sets unspent points by moving the total, against the spent points of
    /// the last recompute.
    pub fn set_unspent_points(&mut self, unspent: i32) -> Result<bool, DomainError> {
        let spent = self.cache.budget.spent;
        self.update(|document| document.set_unspent_points(unspent, spent))
    }

    /// Sets the displayed size modifier, net of the size bonus found by the
    /// last recompute.
    pub fn set_size_modifier(&mut self, size: i32) -> Result<bool, DomainError> {
        let bonus = self.cache.primary.size_modifier_bonus;
        self.update(|document| document.set_size_modifier(size, bonus))
    }
}

// =============================================================================
// Row queries
// =============================================================================

impl SheetEngine {
    /// Skill lookup over the document's current skill list.
    pub fn skills(&self) -> DocumentSkills<'_> {
        DocumentSkills::new(&self.document.skills)
    }

    /// Bonuses matching a skill's name, specialization and categories.
    pub fn skill_bonuses(&self, id: RowId) -> Result<RowBonuses, DomainError> {
        let row = self
            .document
            .skills
            .get(id)
            .ok_or_else(|| DomainError::not_found("Skill", id.to_string()))?;
        let (name, specialization) = (&row.data.name, &row.data.specialization);
        Ok(RowBonuses {
            level: self.index.skill_compared_bonus_for(
                SKILL_NAME_KEY,
                name,
                specialization,
                &row.categories,
            ),
            points: self.index.skill_point_bonus_for(
                SKILL_POINTS_KEY,
                name,
                specialization,
                &row.categories,
            ),
        })
    }

    /// Bonuses matching a spell by name plus those matching its college.
    pub fn spell_bonuses(&self, id: RowId) -> Result<RowBonuses, DomainError> {
        let row = self
            .document
            .spells
            .get(id)
            .ok_or_else(|| DomainError::not_found("Spell", id.to_string()))?;
        let (name, college, categories) = (&row.data.name, &row.data.college, &row.categories);
        Ok(RowBonuses {
            level: self.index.spell_compared_bonus_for(SPELL_NAME_KEY, name, categories)
                + self
                    .index
                    .spell_compared_bonus_for(SPELL_COLLEGE_KEY, college, categories),
            points: self.index.spell_point_bonus_for(SPELL_POINTS_KEY, name, categories)
                + self
                    .index
                    .spell_point_bonus_for(SPELL_COLLEGE_POINTS_KEY, college, categories),
        })
    }

    /// Bonuses for weapons used with `skill`, gated on the best matching
    /// relative level among the document's skills.
    pub fn weapon_bonuses_for_skill(
        &self,
        skill: &str,
        specialization: &str,
        categories: &BTreeSet<String>,
    ) -> Vec<LeveledBonus<'_, WeaponBonus>> {
        self.index.weapon_compared_bonuses_for(
            WEAPON_SKILL_KEY,
            skill,
            specialization,
            categories,
            &self.skills(),
        )
    }

    /// Weapon bonuses selecting a weapon by its name and usage.
    pub fn named_weapon_bonuses(
        &self,
        name: &str,
        usage: &str,
        categories: &BTreeSet<String>,
    ) -> Vec<LeveledBonus<'_, WeaponBonus>> {
        self.index
            .named_weapon_bonuses_for(WEAPON_NAME_KEY, name, usage, categories)
    }

    /// Skill bonuses selecting a weapon by its name and usage.
    pub fn named_weapon_skill_bonuses(
        &self,
        name: &str,
        usage: &str,
        categories: &BTreeSet<String>,
    ) -> Vec<LeveledBonus<'_, SkillBonus>> {
        self.index
            .named_weapon_skill_bonuses_for(SKILL_WEAPON_NAME_KEY, name, usage, categories)
    }
}

impl std::fmt::Debug for SheetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetEngine")
            .field("document", &self.document.profile.name)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockClockPort;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use sheetforge_domain::entities::{
        BonusAttribute, ContainerType, EquipmentData, EquipmentModifier, EquipmentRow, Feature,
        LeveledAmount, ModifierStage, NumericCompare, NumericCriteria, SkillData,
        SkillPointBonus, SkillRow, SkillSelection, SpellBonus, SpellData, SpellPointBonus,
        SpellRow, StringCriteria, TraitData, TraitModifier, TraitRow, ValueAdjustment,
        WeaponSelection,
    };
    use sheetforge_domain::{BaseAttribute, Fixed6, RowTree, Weight};

    fn epoch() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(epoch()))
    }

    /// A fighter with a few traits and a loaded pack.
    fn fighter() -> (CharacterDocument, RowId) {
        let mut document = CharacterDocument::new(epoch())
            .with_name("Brakka")
            .with_total_points(150);
        document.attributes.strength = 13;
        document.attributes.dexterity = 12;

        let strong = TraitRow::new(TraitData::new("Lifting ST", 0).with_levels(2, 3))
            .with_feature(Feature::AttributeBonus(sheetforge_domain::AttributeBonus {
                attribute: BonusAttribute::St,
                limitation: sheetforge_domain::AttributeLimitation::LiftingOnly,
                amount: sheetforge_domain::LeveledAmount::per_level(1.0),
            }));
        let reflexes = TraitRow::new(TraitData::new("Combat Reflexes", 15))
            .with_feature(Feature::attribute_bonus(BonusAttribute::Dodge, 1.0));
        let powers = TraitRow::new(TraitData::container(
            "Powers",
            ContainerType::AlternativeAbilities,
        ))
        .detached()
        .with_child(TraitRow::new(TraitData::new("Blast", 40)).detached())
        .with_child(TraitRow::new(TraitData::new("Spark", 10)).detached());
        document.traits = RowTree::from_detached(vec![
            strong.detached(),
            reflexes.detached(),
            powers,
            TraitRow::new(TraitData::new("Honesty", -10)).detached(),
        ])
        .expect("traits");

        let pack = EquipmentRow::new(EquipmentData::container(
            "Backpack",
            Fixed6::from_int(60),
            Weight::pounds(3),
        ));
        let pack_id = pack.id;
        let rope = EquipmentRow::new(
            EquipmentData::new("Rope", Fixed6::from_int(5), Weight::pounds(10))
                .with_modifier(EquipmentModifier::new("Fine").with_value(
                    ModifierStage::Original,
                    ValueAdjustment::Multiplier(Fixed6::from_int(2)),
                )),
        );
        document.equipment =
            RowTree::from_detached(vec![pack.detached().with_child(rope.detached())])
                .expect("equipment");
        (document, pack_id)
    }

    #[test]
    fn recompute_fills_every_stage() {
        let (document, pack_id) = fighter();
        let engine = SheetEngine::new(document, clock());
        let cache = engine.cache();

        assert_eq!(cache.primary.strength.value, 13);
        assert_eq!(cache.strength.lifting_strength, 15);
        assert_eq!(cache.strength.striking_strength, 13);
        assert_eq!(cache.secondary.dodge_bonus, 1);
        assert_eq!(cache.movement.dodge_bonus, 1);

        let pack = cache.extended(pack_id).expect("pack totals");
        assert_eq!(pack.value, Fixed6::from_int(70));
        assert_eq!(pack.weight, Weight::pounds(13));

        // Traits: 6 + 15 + 42 advantages, -10 disadvantages
        assert_eq!(cache.point_totals.advantages, 63);
        assert_eq!(cache.point_totals.disadvantages, -10);
        // ST 13: 30, DX 12: 40
        assert_eq!(cache.attribute_points.total(), 70);
        assert_eq!(cache.budget.spent, 123);
        assert_eq!(cache.budget.unspent, 27);
    }

    #[test]
    fn recompute_is_idempotent() {
        let (document, _) = fighter();
        let mut engine = SheetEngine::new(document, clock());
        let first = engine.cache().clone();
        engine.recompute();
        assert_eq!(engine.cache(), &first);
        engine.recompute();
        assert_eq!(engine.cache(), &first);
    }

    #[test]
    fn clones_match_until_one_is_mutated() {
        let (document, pack_id) = fighter();
        let original = SheetEngine::new(document.clone(), clock());
        let mut copy = SheetEngine::new(document, clock());
        assert_eq!(original.cache(), copy.cache());

        let changed = copy
            .update(|document| document.set_quantity(pack_id, 2))
            .expect("set quantity");
        assert!(changed);
        // Nothing moves until the caller recomputes
        assert_eq!(original.cache(), copy.cache());

        copy.recompute();
        assert_ne!(original.cache(), copy.cache());
        // Two packs, one rope inside
        assert_eq!(copy.cache().load.wealth_carried, Fixed6::from_int(130));
        assert_eq!(original.cache().load.wealth_carried, Fixed6::from_int(70));
    }

    #[test]
    fn update_stamps_modified_only_on_change() {
        let (document, _) = fighter();
        let later = epoch() + chrono::Duration::hours(2);
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).return_const(later);
        let mut engine = SheetEngine::new(document, Arc::new(clock));

        let changed = engine
            .update(|document| document.set_attribute_base(BaseAttribute::Strength, 14.0))
            .expect("set strength");
        assert!(changed);
        assert_eq!(engine.document().modified, later);

        let changed = engine
            .update(|document| document.set_attribute_base(BaseAttribute::Strength, 14.0))
            .expect("set strength again");
        assert!(!changed);
    }

    #[test]
    fn update_surfaces_domain_errors() {
        let (document, _) = fighter();
        let mut engine = SheetEngine::new(document, clock());
        let result = engine.update(|document| document.set_quantity(RowId::new(), 3));
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[test]
    fn unspent_points_move_the_total() {
        let (document, _) = fighter();
        let mut engine = SheetEngine::new(document, clock());
        assert!(engine.set_unspent_points(10).expect("set unspent"));
        engine.recompute();
        assert_eq!(engine.document().total_points, 133);
        assert_eq!(engine.cache().budget.unspent, 10);
    }

    #[test]
    fn size_modifier_is_stored_net_of_bonuses() {
        let (mut document, _) = fighter();
        let giant = TraitRow::new(TraitData::new("Giant", 0))
            .with_feature(Feature::attribute_bonus(BonusAttribute::Sm, 1.0));
        document.traits = RowTree::from_detached(vec![giant.detached()]).expect("traits");
        let mut engine = SheetEngine::new(document, clock());

        assert!(engine.set_size_modifier(3).expect("set size"));
        engine.recompute();
        assert_eq!(engine.document().profile.size_modifier, 2);
        assert_eq!(engine.cache().primary.size_modifier, 3);
    }

    #[test]
    fn disabling_a_modifier_drops_its_features() {
        let mut document = CharacterDocument::new(epoch());
        let modifier = TraitModifier::percentage("Extra Tough", 0)
            .with_feature(Feature::attribute_bonus(BonusAttribute::Hp, 2.0));
        let tough = TraitRow::new(TraitData::new("Toughness", 5).with_modifier(modifier));
        let tough_id = tough.id;
        document.traits = RowTree::from_detached(vec![tough.detached()]).expect("traits");
        let mut engine = SheetEngine::new(document, clock());
        assert_eq!(engine.cache().pools.hit_points.maximum, 12);

        engine
            .update(|document| document.set_trait_modifier_enabled(tough_id, 0, false))
            .expect("disable modifier");
        engine.recompute();
        assert_eq!(engine.cache().pools.hit_points.maximum, 10);
    }

    #[test]
    fn cache_serializes_with_stage_sections() {
        let (document, _) = fighter();
        let engine = SheetEngine::new(document, clock());
        let json = serde_json::to_value(engine.cache()).expect("serialize cache");
        for section in [
            "primary",
            "load",
            "strength",
            "movement",
            "secondary",
            "pools",
            "attributePoints",
            "pointTotals",
            "budget",
        ] {
            assert!(json.get(section).is_some(), "missing {section}");
        }
    }

    // =========================================================================
    // Row queries
    // =========================================================================

    fn skill_bonus(selection: SkillSelection, name: &str, amount: f64) -> Feature {
        Feature::SkillBonus(SkillBonus {
            selection,
            name: StringCriteria::is(name),
            specialization: StringCriteria::any(),
            category: StringCriteria::any(),
            amount: LeveledAmount::flat(amount),
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

    /// A swordsman who dabbles in fire magic, returning the skill and spell ids.
    fn duelist() -> (CharacterDocument, RowId, RowId) {
        let mut document = CharacterDocument::new(epoch()).with_name("Ilse");

        let master = TraitRow::new(TraitData::new("Weapon Master", 20))
            .with_feature(skill_bonus(SkillSelection::SkillsWithName, "Broadsword", 2.0))
            .with_feature(Feature::SkillPointBonus(SkillPointBonus {
                name: StringCriteria::is("broadsword"),
                specialization: StringCriteria::any(),
                category: StringCriteria::is("Melee Combat"),
                amount: LeveledAmount::flat(1.0),
            }))
            .with_feature(Feature::SpellBonus(SpellBonus {
                match_college: true,
                name: StringCriteria::is("Fire"),
                category: StringCriteria::any(),
                amount: LeveledAmount::flat(1.0),
            }))
            .with_feature(Feature::SpellBonus(SpellBonus {
                match_college: false,
                name: StringCriteria::is("Fireball"),
                category: StringCriteria::any(),
                amount: LeveledAmount::flat(2.0),
            }))
            .with_feature(Feature::SpellPointBonus(SpellPointBonus {
                match_college: true,
                name: StringCriteria::is("fire"),
                category: StringCriteria::any(),
                amount: LeveledAmount::flat(3.0),
            }))
            .with_feature(weapon_bonus(
                WeaponSelection::WeaponsWithRequiredSkill,
                "Broadsword",
                NumericCriteria::new(NumericCompare::AtLeast, 2),
            ))
            .with_feature(weapon_bonus(
                WeaponSelection::WeaponsWithRequiredSkill,
                "Broadsword",
                NumericCriteria::new(NumericCompare::AtLeast, 5),
            ))
            .with_feature(weapon_bonus(
                WeaponSelection::WeaponsWithName,
                "Fine Broadsword",
                NumericCriteria::any(),
            ))
            .with_feature(skill_bonus(
                SkillSelection::WeaponsWithName,
                "Fine Broadsword",
                1.0,
            ));
        document.traits = RowTree::from_detached(vec![master.detached()]).expect("traits");

        let sword = SkillRow::new(SkillData::new("Broadsword", 4).with_relative_level(3))
            .with_category("Melee Combat");
        let sword_id = sword.id;
        document.skills = RowTree::from_detached(vec![sword.detached()]).expect("skills");

        let fireball = SpellRow::new(SpellData::new("Fireball", "Fire", 1));
        let fireball_id = fireball.id;
        document.spells = RowTree::from_detached(vec![fireball.detached()]).expect("spells");

        (document, sword_id, fireball_id)
    }

    #[test]
    fn engine_answers_skill_and_spell_bonuses() {
        let (document, sword_id, fireball_id) = duelist();
        let engine = SheetEngine::new(document, clock());

        assert_eq!(
            engine.skill_bonuses(sword_id).expect("skill"),
            RowBonuses {
                level: 2,
                points: 1
            }
        );
        assert_eq!(
            engine.spell_bonuses(fireball_id).expect("spell"),
            RowBonuses {
                level: 3,
                points: 3
            }
        );
        assert!(matches!(
            engine.skill_bonuses(fireball_id),
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            engine.spell_bonuses(RowId::new()),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn weapon_bonuses_follow_the_document_skill_level() {
        let (document, sword_id, _) = duelist();
        let mut engine = SheetEngine::new(document, clock());
        let no_categories = BTreeSet::new();

        let matched = engine.weapon_bonuses_for_skill("Broadsword", "", &no_categories);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].integer_amount(), 2);
        assert!(engine
            .weapon_bonuses_for_skill("Axe/Mace", "", &no_categories)
            .is_empty());

        engine
            .update(|document| {
                let row = document
                    .skills
                    .get_mut(sword_id)
                    .ok_or_else(|| DomainError::not_found("Skill", sword_id.to_string()))?;
                row.data.relative_level = 5;
                Ok(true)
            })
            .expect("raise skill");
        engine.recompute();
        assert_eq!(
            engine
                .weapon_bonuses_for_skill("broadsword", "", &no_categories)
                .len(),
            2
        );
    }

    #[test]
    fn named_weapon_queries_go_through_the_engine() {
        let (document, _, _) = duelist();
        let engine = SheetEngine::new(document, clock());
        let no_categories = BTreeSet::new();

        let weapon = engine.named_weapon_bonuses("Fine Broadsword", "Swing", &no_categories);
        assert_eq!(weapon.len(), 1);
        let skill = engine.named_weapon_skill_bonuses("fine broadsword", "", &no_categories);
        assert_eq!(skill.len(), 1);
        assert_eq!(skill[0].integer_amount(), 1);
        assert!(engine
            .named_weapon_bonuses("Broadsword", "", &no_categories)
            .is_empty());
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn trait_strategy() -> impl Strategy<Value = TraitRow> {
        ("[A-Z][a-z]{2,8}", -20i32..40)
            .prop_map(|(name, points)| TraitRow::new(TraitData::new(name, points)))
    }

    fn equipment_strategy() -> impl Strategy<Value = EquipmentRow> {
        (0i64..500, 0i64..40, 1u32..5).prop_map(|(value, weight, quantity)| {
            EquipmentRow::new(
                EquipmentData::new("Gear", Fixed6::from_int(value), Weight::pounds(weight))
                    .with_quantity(quantity),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_recompute_is_stable_and_budget_adds_up(
            traits in prop::collection::vec(trait_strategy(), 0..8),
            items in prop::collection::vec(equipment_strategy(), 0..6),
            total in 0i32..400,
            strength in 7i32..16,
        ) {
            let trait_points: i32 = traits.iter().map(|row| row.data.base_points).sum();
            let mut document = CharacterDocument::new(epoch()).with_total_points(total);
            document.attributes.strength = strength;
            document.traits =
                RowTree::from_detached(traits.into_iter().map(TraitRow::detached).collect())
                    .expect("traits");
            document.equipment =
                RowTree::from_detached(items.into_iter().map(EquipmentRow::detached).collect())
                    .expect("equipment");

            let first = SheetCache::compute(&document, &BonusIndex::build(&document));
            let second = SheetCache::compute(&document, &BonusIndex::build(&document));
            prop_assert_eq!(&first, &second);

            let mut engine = SheetEngine::new(document, clock());
            engine.recompute();
            prop_assert_eq!(engine.cache(), &first);

            let budget = first.budget;
            prop_assert_eq!(first.point_totals.total(), trait_points);
            prop_assert_eq!(
                budget.spent,
                first.attribute_points.total() + first.point_totals.total()
            );
            prop_assert_eq!(budget.total, total);
            prop_assert_eq!(budget.unspent, total - budget.spent);
        }
    }
}
