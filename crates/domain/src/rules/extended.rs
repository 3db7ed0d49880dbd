//! Extended equipment totals: a row's own adjusted value and weight times
//! its quantity, plus everything it contains.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::equipment_value::adjusted_value;
use super::equipment_weight::adjusted_weight;
use crate::entities::{EquipmentRow, Feature, RowTree, WeightReduction};
use crate::ids::RowId;
use crate::value_objects::{Fixed6, Weight};

/// Extended figures for one equipment row, weights in the row's own unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTotals {
    pub value: Fixed6,
    pub weight: Weight,
    /// Like `weight`, with rows flagged as ignored for skills counting zero
    pub weight_for_skills: Weight,
}

/// Summed contained-weight reductions from a row and its enabled modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContainedReduction {
    percentage: Fixed6,
    absolute: Weight,
}

impl ContainedReduction {
    fn for_row(row: &EquipmentRow) -> Self {
        let mut reduction = Self {
            percentage: Fixed6::ZERO,
            absolute: Weight::zero(row.data.weight.unit),
        };
        let modifier_features = row
            .data
            .modifiers
            .iter()
            .filter(|m| m.enabled)
            .flat_map(|m| m.features.iter());
        for feature in row.features.iter().chain(modifier_features) {
            if let Feature::ContainedWeightReduction(cwr) = feature {
                match cwr.reduction {
                    WeightReduction::Percentage(percentage) => {
                        reduction.percentage += Fixed6::from(percentage)
                    }
                    WeightReduction::Weight(weight) => reduction.absolute.add(weight),
                }
            }
        }
        reduction
    }

    fn apply(&self, contained: Weight) -> Weight {
        let hundred = Fixed6::from_int(100);
        let mut contained = contained;
        if self.percentage > Fixed6::ZERO {
            if self.percentage >= hundred {
                contained = Weight::zero(contained.unit);
            } else {
                let removed = contained.value * self.percentage / hundred;
                contained.value -= removed;
            }
        }
        contained.subtract(self.absolute);
        contained
    }
}

impl ExtendedTotals {
    /// Totals for `row` given the already computed totals of its children.
    pub fn for_row(row: &EquipmentRow, children: &[ExtendedTotals]) -> Self {
        let data = &row.data;
        let unit = data.weight.unit;
        let quantity = Fixed6::from(data.quantity);

        let mut value = quantity * adjusted_value(data.value, &data.modifiers);
        let own_weight = adjusted_weight(data.weight, &data.modifiers);
        let mut weight = Weight::new(own_weight.value * quantity, unit);
        let mut weight_for_skills = if data.weight_ignored_for_skills {
            Weight::zero(unit)
        } else {
            weight
        };

        let mut contained = Weight::zero(unit);
        let mut contained_for_skills = Weight::zero(unit);
        for child in children {
            value += child.value;
            contained.add(child.weight);
            contained_for_skills.add(child.weight_for_skills);
        }

        let reduction = ContainedReduction::for_row(row);
        let contained = reduction.apply(contained);
        let contained_for_skills = reduction.apply(contained_for_skills);
        if contained.normalized() > Fixed6::ZERO {
            weight.add(contained);
        }
        if contained_for_skills.normalized() > Fixed6::ZERO {
            weight_for_skills.add(contained_for_skills);
        }

        Self {
            value,
            weight,
            weight_for_skills,
        }
    }
}

/// Extended totals for every row in an equipment tree, children first.
pub fn extended_totals(tree: &RowTree<EquipmentRow>) -> HashMap<RowId, ExtendedTotals> {
    let mut totals = HashMap::with_capacity(tree.len());
    for root in tree.roots() {
        accumulate(tree, *root, &mut totals);
    }
    totals
}

fn accumulate(
    tree: &RowTree<EquipmentRow>,
    id: RowId,
    totals: &mut HashMap<RowId, ExtendedTotals>,
) -> Option<ExtendedTotals> {
    let row = tree.get(id)?;
    let children: Vec<ExtendedTotals> = tree
        .children(id)
        .iter()
        .filter_map(|child| accumulate(tree, *child, totals))
        .collect();
    let row_totals = ExtendedTotals::for_row(row, &children);
    totals.insert(id, row_totals);
    Some(row_totals)
}
