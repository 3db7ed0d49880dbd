//! Equipment weight pipeline
//!
//! `Original` adds weight additions directly, then adds the summed
//! percentages of the unmodified weight. `Base`, `FinalBase` and `Final`
//! apply multipliers one at a time in order and add that stage's summed
//! additions at the end. Stage-inapplicable adjustments are skipped. All
//! arithmetic happens in the item's own unit; the result never drops below
//! zero.

use crate::entities::{EquipmentModifier, ModifierStage, WeightAdjustment};
use crate::value_objects::{Fixed6, Weight};

pub fn adjusted_weight(weight: Weight, modifiers: &[EquipmentModifier]) -> Weight {
    let original = weight;
    let mut weight = weight;

    let mut percentages = Fixed6::ZERO;
    for adjustment in stage_adjustments(ModifierStage::Original, modifiers) {
        match adjustment {
            WeightAdjustment::Addition(addition) => weight.add(addition),
            WeightAdjustment::Percentage(amount) => percentages += amount,
            WeightAdjustment::Multiplier(_) | WeightAdjustment::PercentageMultiplier(_) => {}
        }
    }
    if !percentages.is_zero() {
        weight.add(original.scaled(percentages / Fixed6::from_int(100)));
    }

    for stage in [ModifierStage::Base, ModifierStage::FinalBase, ModifierStage::Final] {
        weight = multiply_add_stage(stage, weight, modifiers);
    }
    weight.clamped_non_negative()
}

fn stage_adjustments(
    stage: ModifierStage,
    modifiers: &[EquipmentModifier],
) -> impl Iterator<Item = WeightAdjustment> + '_ {
    modifiers
        .iter()
        .filter(move |m| m.enabled && m.weight_stage == stage)
        .map(|m| m.weight_adjustment)
}

fn multiply_add_stage(stage: ModifierStage, weight: Weight, modifiers: &[EquipmentModifier]) -> Weight {
    let mut weight = weight;
    let mut sum = Weight::zero(weight.unit);
    for adjustment in stage_adjustments(stage, modifiers) {
        match adjustment {
            WeightAdjustment::Multiplier(fraction) => {
                weight.value = weight.value * fraction.numerator / fraction.denominator;
            }
            WeightAdjustment::PercentageMultiplier(fraction) => {
                weight.value = weight.value * fraction.numerator
                    / (fraction.denominator * Fixed6::from_int(100));
            }
            WeightAdjustment::Addition(addition) => sum.add(addition),
            WeightAdjustment::Percentage(_) => {}
        }
    }
    weight.add(sum);
    weight
}
