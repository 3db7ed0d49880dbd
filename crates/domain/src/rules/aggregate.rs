//! Point aggregation across nested rows
//!
//! Trait points roll up by container type. Leaves run the cost pipeline
//! with their own modifiers followed by every ancestor's modifiers. Groups,
//! meta-traits and races sum their children. Alternative abilities charge
//! the most expensive child in full and a fifth of every other child.
//! Disabled rows, directly or through an ancestor, contribute nothing.

use serde::{Deserialize, Serialize};

use super::cost::{adjusted_points, apply_rounding, percentage_of, CostBasis};
use crate::entities::{
    is_effectively_disabled, ContainerType, RowTree, SkillRow, SpellRow, TraitModifier, TraitRow,
};
use crate::ids::RowId;

/// Share of each non-primary alternative ability that is charged.
pub const ALTERNATIVE_ABILITY_PERCENTAGE: i32 = 20;

/// Adjusted points of one trait row, including its subtree.
pub fn trait_adjusted_points(tree: &RowTree<TraitRow>, id: RowId) -> i32 {
    let Some(row) = tree.get(id) else {
        return 0;
    };
    if is_effectively_disabled(tree, id) {
        return 0;
    }

    match row.data.container_type() {
        None => {
            let inherited = tree
                .ancestors(id)
                .into_iter()
                .filter_map(|ancestor| tree.get(ancestor))
                .flat_map(|ancestor| ancestor.data.modifiers.iter());
            let modifiers: Vec<&TraitModifier> =
                row.data.modifiers.iter().chain(inherited).collect();
            adjusted_points(&CostBasis::for_trait(&row.data), modifiers)
        }
        Some(ContainerType::AlternativeAbilities) => {
            let values: Vec<i32> = tree
                .children(id)
                .iter()
                .map(|child| trait_adjusted_points(tree, *child))
                .collect();
            alternative_abilities_points(&values, row.data.round_down)
        }
        Some(ContainerType::Group | ContainerType::MetaTrait | ContainerType::Race) => tree
            .children(id)
            .iter()
            .map(|child| trait_adjusted_points(tree, *child))
            .sum(),
    }
}

/// The first most expensive child is charged in full; every other child
/// adds a rounded fifth of its value.
pub fn alternative_abilities_points(values: &[i32], round_down: bool) -> i32 {
    let max = values.iter().copied().fold(0, i32::max);
    let mut points = max;
    let mut found = false;
    for value in values {
        if !found && *value == max {
            found = true;
        } else {
            let reduced = percentage_of(f64::from(*value), ALTERNATIVE_ABILITY_PERCENTAGE);
            points += apply_rounding(reduced, round_down) as i32;
        }
    }
    points
}

/// Trait points split into the sheet's point categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitPointTotals {
    pub advantages: i32,
    pub disadvantages: i32,
    /// Each quirk counts as exactly -1
    pub quirks: i32,
    pub race: i32,
}

impl TraitPointTotals {
    fn bucket(&mut self, points: i32) {
        if points > 0 {
            self.advantages += points;
        } else if points < -1 {
            self.disadvantages += points;
        } else if points == -1 {
            self.quirks -= 1;
        }
    }
}

/// Buckets top-level traits, descending through plain groups. Races go to
/// their own bucket whole; any other row is bucketed by its own total.
pub fn bucket_traits(tree: &RowTree<TraitRow>) -> TraitPointTotals {
    let mut totals = TraitPointTotals::default();
    for root in tree.roots() {
        bucket_row(tree, *root, &mut totals);
    }
    totals
}

fn bucket_row(tree: &RowTree<TraitRow>, id: RowId, totals: &mut TraitPointTotals) {
    let Some(row) = tree.get(id) else {
        return;
    };
    match row.data.container_type() {
        Some(ContainerType::Group) => {
            for child in tree.children(id) {
                bucket_row(tree, *child, totals);
            }
        }
        Some(ContainerType::Race) => totals.race += trait_adjusted_points(tree, id),
        _ => totals.bucket(trait_adjusted_points(tree, id)),
    }
}

/// Points spent on skills and techniques; containers carry none.
pub fn skill_points(tree: &RowTree<SkillRow>) -> i32 {
    tree.iter()
        .filter(|row| !row.data.container)
        .map(|row| row.data.points)
        .sum()
}

pub fn spell_points(tree: &RowTree<SpellRow>) -> i32 {
    tree.iter()
        .filter(|row| !row.data.container)
        .map(|row| row.data.points)
        .sum()
}
