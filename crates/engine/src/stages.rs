//! Derived-attribute stages
//!
//! Each stage is a plain function from the document, the bonus index and
//! the outputs of earlier stages to one typed output. The orchestrator
//! runs them in [`Stage::ORDER`]; nothing here keeps state between passes.
//!
//! Move, dodge and basic lift depend on whether the character is reeling
//! or tired, which in turn depends on HP and FP. [`vitality`] computes
//! those pools straight from the primary attributes so that the earlier
//! stages can use them; the `Pools` stage expands the same figures into
//! the full set of thresholds.

use std::collections::BTreeMap;

use serde::Serialize;
use sheetforge_domain::entities::{AttributeLimitation, BonusAttribute};
use sheetforge_domain::rules::attributes::{
    basic_lift, collapse_threshold, encumbered_dodge, encumbered_move, encumbrance_level,
    hit_point_points, maximum_carry, points_for_attribute, simple_metric_weight,
    strength_cost_reduction, swing, thrust, LiftTable,
};
use sheetforge_domain::rules::{
    bucket_traits, extended_totals, skill_points, spell_points, ExtendedTotals,
};
use sheetforge_domain::{
    AttributeBases, CharacterDocument, Dice, Encumbrance, EquipmentRow, Fixed6, RowId, RowTree,
    SheetSettings, Weight,
};

use crate::bonus_index::BonusIndex;

/// Recompute stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PrimaryAttributes,
    CarriedLoad,
    StrengthDerived,
    Movement,
    SecondaryAttributes,
    Pools,
    AttributePoints,
    PointTotals,
    Budget,
}

impl Stage {
    pub const ORDER: [Stage; 9] = [
        Stage::PrimaryAttributes,
        Stage::CarriedLoad,
        Stage::StrengthDerived,
        Stage::Movement,
        Stage::SecondaryAttributes,
        Stage::Pools,
        Stage::AttributePoints,
        Stage::PointTotals,
        Stage::Budget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PrimaryAttributes => "primary_attributes",
            Stage::CarriedLoad => "carried_load",
            Stage::StrengthDerived => "strength_derived",
            Stage::Movement => "movement",
            Stage::SecondaryAttributes => "secondary_attributes",
            Stage::Pools => "pools",
            Stage::AttributePoints => "attribute_points",
            Stage::PointTotals => "point_totals",
            Stage::Budget => "budget",
        }
    }
}

/// One value per encumbrance level, lightest first.
pub type PerEncumbrance<T> = [T; 5];

fn bonus(index: &BonusIndex, attribute: BonusAttribute) -> i32 {
    index.attribute_bonus_for(attribute) as i32
}

// =============================================================================
// 1. Primary attributes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeScore {
    pub value: i32,
    pub bonus: i32,
    /// Cost reduction percentage, capped
    pub cost_reduction: i32,
}

impl AttributeScore {
    fn resolve(base: i32, index: &BonusIndex, attribute: BonusAttribute) -> Self {
        let bonus = bonus(index, attribute);
        Self {
            value: base + bonus,
            bonus,
            cost_reduction: index.cost_reduction_for(&attribute.key()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryAttributes {
    pub strength: AttributeScore,
    pub dexterity: AttributeScore,
    pub intelligence: AttributeScore,
    pub health: AttributeScore,
    pub lifting_strength_bonus: i32,
    pub striking_strength_bonus: i32,
    /// Profile size modifier plus bonuses
    pub size_modifier: i32,
    pub size_modifier_bonus: i32,
}

pub fn primary_attributes(document: &CharacterDocument, index: &BonusIndex) -> PrimaryAttributes {
    let bases = &document.attributes;
    let strength_key = BonusAttribute::St;
    let size_modifier_bonus = bonus(index, BonusAttribute::Sm);
    PrimaryAttributes {
        strength: AttributeScore::resolve(bases.strength, index, BonusAttribute::St),
        dexterity: AttributeScore::resolve(bases.dexterity, index, BonusAttribute::Dx),
        intelligence: AttributeScore::resolve(bases.intelligence, index, BonusAttribute::Iq),
        health: AttributeScore::resolve(bases.health, index, BonusAttribute::Ht),
        lifting_strength_bonus: index
            .integer_bonus_for(&strength_key.limited_key(AttributeLimitation::LiftingOnly)),
        striking_strength_bonus: index
            .integer_bonus_for(&strength_key.limited_key(AttributeLimitation::StrikingOnly)),
        size_modifier: document.profile.size_modifier + size_modifier_bonus,
        size_modifier_bonus,
    }
}

// =============================================================================
// 2. Carried load
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarriedLoad {
    /// Extended totals for every row of both equipment lists
    pub extended: BTreeMap<RowId, ExtendedTotals>,
    pub weight_carried: Weight,
    pub weight_carried_for_skills: Weight,
    pub wealth_carried: Fixed6,
    pub wealth_not_carried: Fixed6,
}

pub fn carried_load(document: &CharacterDocument) -> CarriedLoad {
    let settings = &document.settings;
    let unit = settings.default_weight_units;
    let carried = extended_totals(&document.equipment);
    let other = extended_totals(&document.other_equipment);

    let mut weight_carried = Weight::zero(unit);
    let mut weight_carried_for_skills = Weight::zero(unit);
    let mut wealth_carried = Fixed6::ZERO;
    for totals in top_level(&document.equipment, &carried) {
        weight_carried.add(simple_metric_weight(totals.weight, settings));
        weight_carried_for_skills.add(simple_metric_weight(totals.weight_for_skills, settings));
        wealth_carried += totals.value;
    }
    let wealth_not_carried = top_level(&document.other_equipment, &other)
        .map(|totals| totals.value)
        .sum();

    let mut extended: BTreeMap<RowId, ExtendedTotals> = carried.into_iter().collect();
    extended.extend(other);
    CarriedLoad {
        extended,
        weight_carried,
        weight_carried_for_skills,
        wealth_carried,
        wealth_not_carried,
    }
}

fn top_level<'a>(
    tree: &'a RowTree<EquipmentRow>,
    totals: &'a std::collections::HashMap<RowId, ExtendedTotals>,
) -> impl Iterator<Item = ExtendedTotals> + 'a {
    tree.roots().iter().filter_map(|id| totals.get(id).copied())
}

// =============================================================================
// Vitality (shared by stages 3, 4 and 6)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitality {
    pub hit_points: i32,
    pub hit_point_bonus: i32,
    pub current_hit_points: i32,
    pub fatigue_points: i32,
    pub fatigue_point_bonus: i32,
    pub current_fatigue_points: i32,
    pub reeling: bool,
    pub tired: bool,
}

pub fn vitality(bases: &AttributeBases, index: &BonusIndex, primary: &PrimaryAttributes) -> Vitality {
    let hit_point_bonus = bonus(index, BonusAttribute::Hp);
    let fatigue_point_bonus = bonus(index, BonusAttribute::Fp);
    let hit_points = primary.strength.value + bases.hit_points_adj + hit_point_bonus;
    let fatigue_points = primary.health.value + bases.fatigue_points_adj + fatigue_point_bonus;
    let current_hit_points = hit_points - bases.hit_points_damage;
    let current_fatigue_points = fatigue_points - bases.fatigue_points_damage;
    Vitality {
        hit_points,
        hit_point_bonus,
        current_hit_points,
        fatigue_points,
        fatigue_point_bonus,
        current_fatigue_points,
        reeling: current_hit_points <= collapse_threshold(hit_points),
        tired: current_fatigue_points <= collapse_threshold(fatigue_points),
    }
}

// =============================================================================
// 3. Strength-derived values
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthDerived {
    pub lifting_strength: i32,
    pub striking_strength: i32,
    pub lift: LiftTable,
    pub thrust: Dice,
    pub swing: Dice,
    pub maximum_carry: PerEncumbrance<Weight>,
    pub encumbrance: Encumbrance,
    pub encumbrance_for_skills: Encumbrance,
    /// Carrying more than an extra-heavy load
    pub over_maximum_load: bool,
}

pub fn strength_derived(
    settings: &SheetSettings,
    primary: &PrimaryAttributes,
    load: &CarriedLoad,
    vitality: &Vitality,
) -> StrengthDerived {
    let lifting_strength = primary.strength.value + primary.lifting_strength_bonus;
    let striking_strength = primary.strength.value + primary.striking_strength_bonus;
    let tired = vitality.tired;

    let maximum_carry =
        Encumbrance::ALL.map(|level| maximum_carry(lifting_strength, tired, settings, level));
    let heaviest = maximum_carry[Encumbrance::ExtraHeavy.index()].normalized();

    let damage = |dice: Dice| {
        if settings.use_modifying_dice_plus_adds {
            dice.with_adds_as_dice()
        } else {
            dice
        }
    };

    StrengthDerived {
        lifting_strength,
        striking_strength,
        lift: LiftTable::from_basic_lift(basic_lift(lifting_strength, tired, settings)),
        thrust: damage(thrust(striking_strength, settings)),
        swing: damage(swing(striking_strength, settings)),
        maximum_carry,
        encumbrance: encumbrance_level(load.weight_carried, lifting_strength, tired, settings),
        encumbrance_for_skills: encumbrance_level(
            load.weight_carried_for_skills,
            lifting_strength,
            tired,
            settings,
        ),
        over_maximum_load: load.weight_carried.normalized() > heaviest,
    }
}

// =============================================================================
// 4. Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub basic_speed: f64,
    pub basic_speed_bonus: f64,
    pub basic_move: i32,
    pub basic_move_bonus: i32,
    pub dodge_bonus: i32,
    pub moves: PerEncumbrance<i32>,
    pub dodges: PerEncumbrance<i32>,
    /// Move and dodge at the current encumbrance
    pub current_move: i32,
    pub current_dodge: i32,
}

pub fn movement(
    bases: &AttributeBases,
    index: &BonusIndex,
    primary: &PrimaryAttributes,
    vitality: &Vitality,
    strength: &StrengthDerived,
) -> Movement {
    let basic_speed_bonus = index.attribute_bonus_for(BonusAttribute::Speed);
    let raw_speed = f64::from(primary.dexterity.value + primary.health.value) / 4.0;
    let basic_speed = bases.speed_adj + basic_speed_bonus + raw_speed;

    let basic_move_bonus = bonus(index, BonusAttribute::Move);
    let basic_move = (bases.move_adj + basic_move_bonus + basic_speed.floor() as i32).max(0);
    let dodge_bonus = bonus(index, BonusAttribute::Dodge);

    let (reeling, tired) = (vitality.reeling, vitality.tired);
    let moves = Encumbrance::ALL.map(|level| encumbered_move(basic_move, level, reeling, tired));
    let dodges = Encumbrance::ALL
        .map(|level| encumbered_dodge(basic_speed, dodge_bonus, level, reeling, tired));
    let current = strength.encumbrance.index();

    Movement {
        basic_speed,
        basic_speed_bonus,
        basic_move,
        basic_move_bonus,
        dodge_bonus,
        moves,
        dodges,
        current_move: moves[current],
        current_dodge: dodges[current],
    }
}

// =============================================================================
// 5. Secondary attributes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryAttributes {
    pub will: i32,
    pub will_bonus: i32,
    pub perception: i32,
    pub perception_bonus: i32,
    pub fright_check: i32,
    pub vision: i32,
    pub hearing: i32,
    pub taste_smell: i32,
    pub touch: i32,
    pub dodge_bonus: i32,
    pub parry_bonus: i32,
    pub block_bonus: i32,
}

pub fn secondary_attributes(
    settings: &SheetSettings,
    bases: &AttributeBases,
    index: &BonusIndex,
    primary: &PrimaryAttributes,
) -> SecondaryAttributes {
    let foundation = if settings.base_will_and_per_on_10 {
        10
    } else {
        primary.intelligence.value
    };
    let will_bonus = bonus(index, BonusAttribute::Will);
    let perception_bonus = bonus(index, BonusAttribute::Per);
    let will = bases.will_adj + will_bonus + foundation;
    let perception = bases.perception_adj + perception_bonus + foundation;

    SecondaryAttributes {
        will,
        will_bonus,
        perception,
        perception_bonus,
        fright_check: will + bonus(index, BonusAttribute::FrightCheck),
        vision: perception + bonus(index, BonusAttribute::Vision),
        hearing: perception + bonus(index, BonusAttribute::Hearing),
        taste_smell: perception + bonus(index, BonusAttribute::TasteSmell),
        touch: perception + bonus(index, BonusAttribute::Touch),
        dodge_bonus: bonus(index, BonusAttribute::Dodge),
        parry_bonus: bonus(index, BonusAttribute::Parry),
        block_bonus: bonus(index, BonusAttribute::Block),
    }
}

// =============================================================================
// 6. Pools
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPointPool {
    pub maximum: i32,
    pub bonus: i32,
    pub current: i32,
    pub reeling_threshold: i32,
    pub reeling: bool,
    /// At or below zero: roll each turn to stay conscious
    pub collapsing: bool,
    /// Thresholds for the four death checks, `-1×HP` through `-4×HP`
    pub death_check_thresholds: [i32; 4],
    /// Death checks currently required, 0 to 4
    pub death_checks: usize,
    pub dead_threshold: i32,
    pub dead: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FatiguePointPool {
    pub maximum: i32,
    pub bonus: i32,
    pub current: i32,
    pub tired_threshold: i32,
    pub tired: bool,
    pub collapsing: bool,
    pub unconscious_threshold: i32,
    pub unconscious: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pools {
    pub hit_points: HitPointPool,
    pub fatigue_points: FatiguePointPool,
}

pub fn pools(vitality: &Vitality) -> Pools {
    let hp = vitality.hit_points;
    let current_hp = vitality.current_hit_points;
    let death_check_thresholds = [-hp, -2 * hp, -3 * hp, -4 * hp];
    let dead_threshold = -5 * hp;

    let fp = vitality.fatigue_points;
    let current_fp = vitality.current_fatigue_points;

    Pools {
        hit_points: HitPointPool {
            maximum: hp,
            bonus: vitality.hit_point_bonus,
            current: current_hp,
            reeling_threshold: collapse_threshold(hp),
            reeling: vitality.reeling,
            collapsing: current_hp <= 0,
            death_check_thresholds,
            death_checks: death_check_thresholds
                .iter()
                .filter(|threshold| current_hp <= **threshold)
                .count(),
            dead_threshold,
            dead: current_hp <= dead_threshold,
        },
        fatigue_points: FatiguePointPool {
            maximum: fp,
            bonus: vitality.fatigue_point_bonus,
            current: current_fp,
            tired_threshold: collapse_threshold(fp),
            tired: vitality.tired,
            collapsing: current_fp <= 0,
            unconscious_threshold: -fp,
            unconscious: current_fp <= -fp,
        },
    }
}

// =============================================================================
// 7. Attribute points
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePoints {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub health: i32,
    pub will: i32,
    pub perception: i32,
    pub basic_speed: i32,
    pub basic_move: i32,
    pub hit_points: i32,
    pub fatigue_points: i32,
}

impl AttributePoints {
    pub fn total(&self) -> i32 {
        self.strength
            + self.dexterity
            + self.intelligence
            + self.health
            + self.will
            + self.perception
            + self.basic_speed
            + self.basic_move
            + self.hit_points
            + self.fatigue_points
    }
}

pub fn attribute_points(
    settings: &SheetSettings,
    bases: &AttributeBases,
    primary: &PrimaryAttributes,
) -> AttributePoints {
    let kyos = settings.use_know_your_own_strength;
    let strength_reduction =
        strength_cost_reduction(primary.strength.cost_reduction, primary.size_modifier, kyos);

    AttributePoints {
        strength: points_for_attribute(bases.strength - 10, 10, strength_reduction),
        dexterity: points_for_attribute(bases.dexterity - 10, 20, primary.dexterity.cost_reduction),
        intelligence: points_for_attribute(
            bases.intelligence - 10,
            20,
            primary.intelligence.cost_reduction,
        ),
        health: points_for_attribute(bases.health - 10, 10, primary.health.cost_reduction),
        will: bases.will_adj * 5,
        perception: bases.perception_adj * 5,
        basic_speed: (bases.speed_adj * 20.0) as i32,
        basic_move: bases.move_adj * 5,
        hit_points: hit_point_points(bases.hit_points_adj, primary.size_modifier, kyos),
        fatigue_points: bases.fatigue_points_adj * 3,
    }
}

// =============================================================================
// 8. Point totals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointTotals {
    pub advantages: i32,
    pub disadvantages: i32,
    pub quirks: i32,
    pub race: i32,
    pub skills: i32,
    pub spells: i32,
}

impl PointTotals {
    pub fn total(&self) -> i32 {
        self.advantages + self.disadvantages + self.quirks + self.race + self.skills + self.spells
    }
}

pub fn point_totals(document: &CharacterDocument) -> PointTotals {
    let traits = bucket_traits(&document.traits);
    PointTotals {
        advantages: traits.advantages,
        disadvantages: traits.disadvantages,
        quirks: traits.quirks,
        race: traits.race,
        skills: skill_points(&document.skills),
        spells: spell_points(&document.spells),
    }
}

// =============================================================================
// 9. Budget
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub total: i32,
    pub spent: i32,
    pub unspent: i32,
}

pub fn budget(total_points: i32, attributes: &AttributePoints, points: &PointTotals) -> Budget {
    let spent = attributes.total() + points.total();
    Budget {
        total: total_points,
        spent,
        unspent: total_points - spent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sheetforge_domain::entities::{EquipmentData, Feature, TraitData, TraitRow};
    use sheetforge_domain::WeightUnit;

    fn document() -> CharacterDocument {
        CharacterDocument::new(Utc::now())
    }

    fn index_with(features: Vec<Feature>) -> BonusIndex {
        let mut index = BonusIndex::new();
        for feature in features {
            index.insert(feature, 0);
        }
        index
    }

    fn resolve_primary(doc: &CharacterDocument, index: &BonusIndex) -> (PrimaryAttributes, Vitality) {
        let primary = primary_attributes(doc, index);
        let vitality = vitality(&doc.attributes, index, &primary);
        (primary, vitality)
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(Stage::ORDER.len(), 9);
        assert_eq!(Stage::ORDER[0], Stage::PrimaryAttributes);
        assert_eq!(Stage::ORDER[8], Stage::Budget);
        assert_eq!(Stage::Movement.as_str(), "movement");
    }

    #[test]
    fn primary_attributes_add_bonuses_and_reductions() {
        let mut doc = document();
        doc.attributes.strength = 12;
        doc.profile.size_modifier = 1;
        let index = index_with(vec![
            Feature::attribute_bonus(BonusAttribute::St, 2.0),
            Feature::attribute_bonus(BonusAttribute::Sm, 1.0),
            Feature::cost_reduction(BonusAttribute::Ht, 20),
        ]);
        let primary = primary_attributes(&doc, &index);
        assert_eq!(primary.strength.value, 14);
        assert_eq!(primary.strength.bonus, 2);
        assert_eq!(primary.health.cost_reduction, 20);
        assert_eq!(primary.size_modifier, 2);
        assert_eq!(primary.size_modifier_bonus, 1);
    }

    #[test]
    fn carried_load_sums_top_level_rows_of_each_list() {
        let mut doc = document();
        let pack = EquipmentRow::new(EquipmentData::container(
            "Backpack",
            Fixed6::from_int(60),
            Weight::pounds(3),
        ));
        let bedroll = EquipmentRow::new(EquipmentData::new(
            "Bedroll",
            Fixed6::from_int(20),
            Weight::pounds(7),
        ));
        let chest = EquipmentRow::new(EquipmentData::new(
            "Chest",
            Fixed6::from_int(100),
            Weight::pounds(40),
        ));
        doc.equipment = RowTree::from_detached(vec![pack.detached().with_child(bedroll.detached())])
            .expect("equipment");
        doc.other_equipment = RowTree::from_detached(vec![chest.detached()]).expect("other");

        let load = carried_load(&doc);
        assert_eq!(load.weight_carried, Weight::pounds(10));
        assert_eq!(load.wealth_carried, Fixed6::from_int(80));
        assert_eq!(load.wealth_not_carried, Fixed6::from_int(100));
        assert_eq!(load.extended.len(), 3);
    }

    #[test]
    fn carried_load_uses_simple_metric_conversion() {
        let mut doc = document();
        doc.settings = SheetSettings::default()
            .with_default_weight_units(WeightUnit::Kg)
            .with_simple_metric_conversions(true);
        let anvil = EquipmentRow::new(EquipmentData::new(
            "Anvil",
            Fixed6::ZERO,
            Weight::pounds(20),
        ));
        doc.equipment = RowTree::from_detached(vec![anvil.detached()]).expect("equipment");
        let load = carried_load(&doc);
        assert_eq!(
            load.weight_carried,
            Weight::new(Fixed6::from_int(10), WeightUnit::Kg)
        );
    }

    #[test]
    fn heavy_loads_and_fatigue_reduce_move_and_dodge() {
        let mut doc = document();
        doc.attributes.fatigue_points_damage = 8;
        let boulder = EquipmentRow::new(EquipmentData::new(
            "Boulder",
            Fixed6::ZERO,
            Weight::pounds(50),
        ));
        doc.equipment = RowTree::from_detached(vec![boulder.detached()]).expect("equipment");
        let index = BonusIndex::new();

        let (primary, vitality) = resolve_primary(&doc, &index);
        assert!(vitality.tired);
        let load = carried_load(&doc);
        let strength = strength_derived(&doc.settings, &primary, &load, &vitality);
        // Tired ST 10 lifts as ST 5: BL 5 lb, so 50 lb is extra-heavy
        assert_eq!(strength.lift.basic_lift, Weight::pounds(5));
        assert_eq!(strength.encumbrance, Encumbrance::ExtraHeavy);
        assert!(!strength.over_maximum_load);

        let movement = movement(&doc.attributes, &index, &primary, &vitality, &strength);
        assert_eq!(movement.basic_speed, 5.0);
        assert_eq!(movement.basic_move, 5);
        assert_eq!(movement.moves, [3, 2, 1, 1, 1]);
        assert_eq!(movement.dodges, [4, 3, 2, 1, 1]);
        assert_eq!(movement.current_move, 1);
    }

    #[test]
    fn striking_strength_drives_damage() {
        let doc = document();
        let index = index_with(vec![Feature::AttributeBonus(
            sheetforge_domain::AttributeBonus {
                attribute: BonusAttribute::St,
                limitation: AttributeLimitation::StrikingOnly,
                amount: sheetforge_domain::LeveledAmount::flat(4.0),
            },
        )]);
        let (primary, vitality) = resolve_primary(&doc, &index);
        let load = carried_load(&doc);
        let strength = strength_derived(&doc.settings, &primary, &load, &vitality);
        assert_eq!(strength.striking_strength, 14);
        assert_eq!(strength.lifting_strength, 10);
        assert_eq!(strength.thrust, Dice::new(1, 0));
        assert_eq!(strength.swing, Dice::new(2, 0));
    }

    #[test]
    fn secondary_attributes_follow_iq_or_ten() {
        let mut doc = document();
        doc.attributes.intelligence = 13;
        doc.attributes.will_adj = 1;
        let index = index_with(vec![
            Feature::attribute_bonus(BonusAttribute::FrightCheck, 2.0),
            Feature::attribute_bonus(BonusAttribute::Vision, 1.0),
            Feature::attribute_bonus(BonusAttribute::Parry, 1.0),
        ]);
        let primary = primary_attributes(&doc, &index);

        let secondary = secondary_attributes(&doc.settings, &doc.attributes, &index, &primary);
        assert_eq!(secondary.will, 14);
        assert_eq!(secondary.perception, 13);
        assert_eq!(secondary.fright_check, 16);
        assert_eq!(secondary.vision, 14);
        assert_eq!(secondary.hearing, 13);
        assert_eq!(secondary.parry_bonus, 1);

        let on_ten = SheetSettings::default().with_base_will_and_per_on_10(true);
        let secondary = secondary_attributes(&on_ten, &doc.attributes, &index, &primary);
        assert_eq!(secondary.will, 11);
        assert_eq!(secondary.perception, 10);
    }

    #[test]
    fn pools_report_thresholds_and_states() {
        let mut doc = document();
        doc.attributes.hit_points_damage = 25;
        let index = BonusIndex::new();
        let (_, vitality) = resolve_primary(&doc, &index);

        let pools = pools(&vitality);
        let hp = pools.hit_points;
        assert_eq!(hp.maximum, 10);
        assert_eq!(hp.current, -15);
        assert_eq!(hp.reeling_threshold, 3);
        assert!(hp.reeling && hp.collapsing);
        assert_eq!(hp.death_check_thresholds, [-10, -20, -30, -40]);
        assert_eq!(hp.death_checks, 1);
        assert!(!hp.dead);

        let fp = pools.fatigue_points;
        assert_eq!(fp.tired_threshold, 3);
        assert!(!fp.tired);
        assert_eq!(fp.unconscious_threshold, -10);
    }

    #[test]
    fn attribute_points_apply_reductions_and_size() {
        let mut doc = document();
        doc.attributes.strength = 15;
        doc.attributes.dexterity = 12;
        doc.attributes.speed_adj = 0.25;
        doc.attributes.hit_points_adj = 3;
        doc.attributes.fatigue_points_adj = 2;
        doc.attributes.perception_adj = -1;
        doc.profile.size_modifier = 1;
        let index = index_with(vec![Feature::cost_reduction(BonusAttribute::St, 30)]);
        let primary = primary_attributes(&doc, &index);

        let points = attribute_points(&doc.settings, &doc.attributes, &primary);
        // ST: reduction 30 + SM 10 = 40 -> (99 + 50 * 60) / 100
        assert_eq!(points.strength, 30);
        assert_eq!(points.dexterity, 40);
        assert_eq!(points.basic_speed, 5);
        // HP: 6 * 9 / 10 = 5.4, rounded down
        assert_eq!(points.hit_points, 5);
        assert_eq!(points.fatigue_points, 6);
        assert_eq!(points.perception, -5);
        assert_eq!(points.total(), 81);
    }

    #[test]
    fn budget_subtracts_every_category() {
        let mut doc = document().with_total_points(100);
        doc.attributes.dexterity = 11;
        doc.traits = RowTree::from_detached(vec![
            TraitRow::new(TraitData::new("Fit", 5)).detached(),
            TraitRow::new(TraitData::new("Greed", -15)).detached(),
            TraitRow::new(TraitData::new("Hums", -1)).detached(),
        ])
        .expect("traits");
        let index = BonusIndex::new();
        let primary = primary_attributes(&doc, &index);

        let attributes = attribute_points(&doc.settings, &doc.attributes, &primary);
        let totals = point_totals(&doc);
        let budget = budget(doc.total_points, &attributes, &totals);
        assert_eq!(totals.advantages, 5);
        assert_eq!(totals.disadvantages, -15);
        assert_eq!(totals.quirks, -1);
        assert_eq!(budget.spent, 9);
        assert_eq!(budget.unspent, 91);
    }
}
