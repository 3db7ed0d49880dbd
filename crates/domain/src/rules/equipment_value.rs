//! Equipment value pipeline
//!
//! Enabled modifiers apply in four stages. `Original`, `FinalBase` and
//! `Final` apply multipliers immediately in order, then add the summed
//! additions, then add the summed percentages of the stage's input.
//! `Base` folds every adjustment into one cost factor, floored at -0.8 and
//! applied once. The result never drops below zero.

use crate::entities::{EquipmentModifier, ModifierStage, ValueAdjustment};
use crate::value_objects::Fixed6;

/// Smallest combined cost factor a `Base` stage can apply.
pub const MIN_COST_FACTOR: Fixed6 = Fixed6::from_raw(-800_000);

pub fn adjusted_value(value: Fixed6, modifiers: &[EquipmentModifier]) -> Fixed6 {
    let mut cost = non_factor_stage(ModifierStage::Original, value, modifiers);

    let mut factor = Fixed6::ZERO;
    for adjustment in stage_adjustments(ModifierStage::Base, modifiers) {
        factor += match adjustment {
            ValueAdjustment::Multiplier(amount) => amount - Fixed6::ONE,
            ValueAdjustment::Percentage(amount) => amount / Fixed6::from_int(100),
            ValueAdjustment::Addition(amount) => amount,
        };
    }
    if !factor.is_zero() {
        cost = cost * (factor.max(MIN_COST_FACTOR) + Fixed6::ONE);
    }

    cost = non_factor_stage(ModifierStage::FinalBase, cost, modifiers);
    cost = non_factor_stage(ModifierStage::Final, cost, modifiers);
    cost.max(Fixed6::ZERO)
}

fn stage_adjustments(
    stage: ModifierStage,
    modifiers: &[EquipmentModifier],
) -> impl Iterator<Item = ValueAdjustment> + '_ {
    modifiers
        .iter()
        .filter(move |m| m.enabled && m.value_stage == stage)
        .map(|m| m.value_adjustment)
}

fn non_factor_stage(stage: ModifierStage, value: Fixed6, modifiers: &[EquipmentModifier]) -> Fixed6 {
    let mut percentages = Fixed6::ZERO;
    let mut additions = Fixed6::ZERO;
    let mut cost = value;
    for adjustment in stage_adjustments(stage, modifiers) {
        match adjustment {
            ValueAdjustment::Addition(amount) => additions += amount,
            ValueAdjustment::Percentage(amount) => percentages += amount,
            ValueAdjustment::Multiplier(amount) => cost = cost * amount,
        }
    }
    cost += additions;
    if !percentages.is_zero() {
        cost += value * (percentages / Fixed6::from_int(100));
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(stage: ModifierStage, adjustment: ValueAdjustment) -> EquipmentModifier {
        EquipmentModifier::new("Test").with_value(stage, adjustment)
    }

    fn multiplier(stage: ModifierStage, amount: f64) -> EquipmentModifier {
        modifier(stage, ValueAdjustment::Multiplier(Fixed6::from_f64(amount)))
    }

    #[test]
    fn base_multiplier_applies_as_cost_factor() {
        let modifiers = [multiplier(ModifierStage::Base, 1.2)];
        assert_eq!(
            adjusted_value(Fixed6::from_int(100), &modifiers),
            Fixed6::from_int(120)
        );
    }

    #[test]
    fn base_cost_factor_is_floored() {
        let modifiers = [
            multiplier(ModifierStage::Base, 0.5),
            multiplier(ModifierStage::Base, 0.4),
        ];
        assert_eq!(
            adjusted_value(Fixed6::from_int(100), &modifiers),
            Fixed6::from_int(20)
        );
    }

    #[test]
    fn original_stage_percentages_use_the_stage_input() {
        let modifiers = [
            modifier(ModifierStage::Original, ValueAdjustment::Addition(Fixed6::from_int(10))),
            modifier(ModifierStage::Original, ValueAdjustment::Percentage(Fixed6::from_int(50))),
            modifier(ModifierStage::Original, ValueAdjustment::Percentage(Fixed6::from_int(50))),
        ];
        // 100 + 10 + 100 * 100%
        assert_eq!(
            adjusted_value(Fixed6::from_int(100), &modifiers),
            Fixed6::from_int(210)
        );
    }

    #[test]
    fn final_stages_apply_multipliers_in_order() {
        let modifiers = [
            multiplier(ModifierStage::FinalBase, 2.0),
            modifier(ModifierStage::Final, ValueAdjustment::Addition(Fixed6::from_int(5))),
            multiplier(ModifierStage::Final, 3.0),
        ];
        // (100 * 2) * 3 + 5
        assert_eq!(
            adjusted_value(Fixed6::from_int(100), &modifiers),
            Fixed6::from_int(605)
        );
    }

    #[test]
    fn result_is_clamped_at_zero() {
        let modifiers = [modifier(
            ModifierStage::Final,
            ValueAdjustment::Addition(Fixed6::from_int(-500)),
        )];
        assert_eq!(adjusted_value(Fixed6::from_int(100), &modifiers), Fixed6::ZERO);
    }

    #[test]
    fn disabled_modifiers_are_ignored() {
        let modifiers = [multiplier(ModifierStage::Base, 3.0).with_enabled(false)];
        assert_eq!(
            adjusted_value(Fixed6::from_int(100), &modifiers),
            Fixed6::from_int(100)
        );
    }
}
