//! Attribute formulas
//!
//! Closed-form rules behind the derived attributes: basic lift and the
//! loads built on it, thrust and swing damage, attribute point costs and
//! the reeling/tired adjustments to move and dodge. Integer division
//! truncates toward zero throughout, matching the published tables.

use crate::value_objects::{Dice, Encumbrance, Fixed6, SheetSettings, Weight, WeightUnit};

pub const ONE_HANDED_LIFT: i64 = 2;
pub const TWO_HANDED_LIFT: i64 = 8;
pub const SHOVE_AND_KNOCK_OVER: i64 = 12;
pub const RUNNING_SHOVE_AND_KNOCK_OVER: i64 = 24;
pub const CARRY_ON_BACK: i64 = 15;
pub const SHIFT_SLIGHTLY: i64 = 50;

/// Largest cost reduction any attribute can receive.
pub const MAX_COST_REDUCTION: i32 = 80;

// =============================================================================
// Lift and carry
// =============================================================================

/// Unit and constants the basic lift formula works in.
struct LiftScale {
    unit: WeightUnit,
    divisor: Fixed6,
    multiplier: Fixed6,
    round_at: Fixed6,
}

impl LiftScale {
    fn for_settings(settings: &SheetSettings) -> Self {
        if settings.uses_simple_metric_kilograms() {
            Self {
                unit: WeightUnit::Kg,
                divisor: Fixed6::from_int(10),
                multiplier: Fixed6::ONE,
                round_at: Fixed6::from_int(5),
            }
        } else {
            Self {
                unit: WeightUnit::Lb,
                divisor: Fixed6::from_int(5),
                multiplier: Fixed6::from_int(2),
                round_at: Fixed6::from_int(10),
            }
        }
    }
}

/// Unit maximum carry is computed in before converting to the sheet unit.
fn carry_unit(settings: &SheetSettings) -> WeightUnit {
    LiftScale::for_settings(settings).unit
}

/// Halves an odd value rounding up, as used for tired strength.
fn halve_rounding_up(value: i32) -> i32 {
    divide_rounding_up(value, 2)
}

/// Divides, adding one when there is a remainder.
pub fn divide_rounding_up(value: i32, divisor: i32) -> i32 {
    let plus_one = value % divisor != 0;
    let result = value / divisor;
    if plus_one {
        result + 1
    } else {
        result
    }
}

/// Basic lift in `unit` for a lifting strength. Tired characters lift with
/// half their strength.
pub fn basic_lift_in(
    strength: i32,
    tired: bool,
    settings: &SheetSettings,
    unit: WeightUnit,
) -> Weight {
    let scale = LiftScale::for_settings(settings);
    let ten = Fixed6::from_int(10);
    let mut strength = strength;
    if tired {
        strength = halve_rounding_up(strength);
    }

    let value = if strength < 1 {
        Fixed6::ZERO
    } else {
        let mut value = if settings.use_know_your_own_strength {
            let mut diff = 0;
            if strength > 19 {
                diff = strength / 10 - 1;
                strength -= diff * 10;
            }
            let mut value =
                Fixed6::from_f64(10f64.powf(f64::from(strength) / 10.0)) * scale.multiplier;
            value = if strength <= 6 {
                (value * ten).round() / ten
            } else {
                value.round()
            };
            value * Fixed6::from_f64(10f64.powi(diff))
        } else {
            Fixed6::from_int(i64::from(strength) * i64::from(strength)) / scale.divisor
        };
        if value >= scale.round_at {
            value = value.round();
        }
        (value * ten).trunc() / ten
    };
    Weight::new(unit.convert(scale.unit, value), unit)
}

/// Basic lift in the sheet's default unit.
pub fn basic_lift(strength: i32, tired: bool, settings: &SheetSettings) -> Weight {
    basic_lift_in(strength, tired, settings, settings.default_weight_units)
}

/// The standard multiples of basic lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftTable {
    pub basic_lift: Weight,
    pub one_handed_lift: Weight,
    pub two_handed_lift: Weight,
    pub shove_and_knock_over: Weight,
    pub running_shove_and_knock_over: Weight,
    pub carry_on_back: Weight,
    pub shift_slightly: Weight,
}

impl LiftTable {
    pub fn from_basic_lift(lift: Weight) -> Self {
        let multiple = |factor: i64| lift.scaled(Fixed6::from_int(factor));
        Self {
            basic_lift: lift,
            one_handed_lift: multiple(ONE_HANDED_LIFT),
            two_handed_lift: multiple(TWO_HANDED_LIFT),
            shove_and_knock_over: multiple(SHOVE_AND_KNOCK_OVER),
            running_shove_and_knock_over: multiple(RUNNING_SHOVE_AND_KNOCK_OVER),
            carry_on_back: multiple(CARRY_ON_BACK),
            shift_slightly: multiple(SHIFT_SLIGHTLY),
        }
    }
}

/// Heaviest load carried at `encumbrance`, in the sheet's default unit.
pub fn maximum_carry(
    strength: i32,
    tired: bool,
    settings: &SheetSettings,
    encumbrance: Encumbrance,
) -> Weight {
    let unit = carry_unit(settings);
    let lift = basic_lift_in(strength, tired, settings, unit);
    let carry = lift.value * Fixed6::from_int(encumbrance.weight_multiplier());
    let desired = settings.default_weight_units;
    Weight::new(desired.convert(unit, carry), desired)
}

/// The lightest level whose maximum carry holds `carried`.
pub fn encumbrance_level(
    carried: Weight,
    strength: i32,
    tired: bool,
    settings: &SheetSettings,
) -> Encumbrance {
    let carried = carried.normalized();
    Encumbrance::ALL
        .into_iter()
        .find(|level| carried <= maximum_carry(strength, tired, settings, *level).normalized())
        .unwrap_or(Encumbrance::ExtraHeavy)
}

/// Converts a weight with GURPS Metric rules toward the sheet's unit family.
pub fn simple_metric_weight(weight: Weight, settings: &SheetSettings) -> Weight {
    if !settings.use_simple_metric_conversions {
        return weight;
    }
    if settings.default_weight_units.is_metric() {
        weight.to_gurps_metric()
    } else {
        weight.to_gurps_imperial()
    }
}

// =============================================================================
// Damage
// =============================================================================

/// Basic thrust damage for a striking strength.
pub fn thrust(strength: i32, settings: &SheetSettings) -> Dice {
    if settings.use_thrust_equals_swing_minus_2 {
        let mut dice = swing(strength, settings);
        dice.add_modifier(-2);
        return dice;
    }
    if settings.use_reduced_swing {
        if strength < 19 {
            return Dice::new(1, -(6 - (strength - 1) / 2));
        }
        let mut adds = (strength - 10) / 2 - 2;
        if (strength - 10) % 2 == 1 {
            adds += 1;
        }
        return reduced_dice(adds);
    }
    if settings.use_know_your_own_strength {
        if strength < 12 {
            return Dice::new(1, strength - 12);
        }
        return Dice::new((strength - 7) / 4, (strength + 1) % 4 - 1);
    }

    if strength < 19 {
        return Dice::new(1, -(6 - (strength - 1) / 2));
    }
    let mut value = strength - 11;
    if strength > 50 {
        value -= 1;
        if strength > 79 {
            value -= 1 + (strength - 80) / 5;
        }
    }
    Dice::new(value / 8 + 1, value % 8 / 2 - 1)
}

/// Basic swing damage for a striking strength.
pub fn swing(strength: i32, settings: &SheetSettings) -> Dice {
    if settings.use_reduced_swing {
        if strength < 10 {
            return Dice::new(1, -(5 - (strength - 1) / 2));
        }
        return reduced_dice((strength - 10) / 2);
    }
    if settings.use_know_your_own_strength {
        if strength < 10 {
            return Dice::new(1, strength - 10);
        }
        return Dice::new((strength - 5) / 4, (strength - 1) % 4 - 1);
    }

    if strength < 10 {
        return Dice::new(1, -(5 - (strength - 1) / 2));
    }
    if strength < 28 {
        let value = strength - 9;
        return Dice::new(value / 4 + 1, value % 4 - 1);
    }
    let mut value = strength;
    if strength > 40 {
        value -= (strength - 40) / 5;
    }
    if strength > 59 {
        value += 1;
    }
    value += 9;
    Dice::new(value / 8 + 1, value % 8 / 2 - 1)
}

/// Reduced-swing progression: every 7 adds is 2d, every 4 is 1d, and a
/// leftover +3 becomes another die at -1.
fn reduced_dice(adds: i32) -> Dice {
    let mut dice = 1 + 2 * (adds / 7);
    let mut adds = adds % 7;
    dice += adds / 4;
    adds %= 4;
    if adds == 3 {
        dice += 1;
        adds = -1;
    }
    Dice::new(dice, adds)
}

// =============================================================================
// Point costs
// =============================================================================

/// `delta * per_level`, or the reduced cost when a cost reduction applies
/// to a raised attribute. Integer division truncates.
pub fn points_for_attribute(delta: i32, per_level: i32, reduction: i32) -> i32 {
    let amount = i64::from(delta) * i64::from(per_level);
    if reduction > 0 && delta > 0 {
        let reduction = i64::from(reduction.min(MAX_COST_REDUCTION));
        return saturate(amount.saturating_mul(100 - reduction).saturating_add(99) / 100);
    }
    saturate(amount)
}

/// Clamps a widened intermediate back into the `i32` range.
fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Cost reduction for ST: size modifier counts 10% per level unless Know
/// Your Own Strength is in use.
pub fn strength_cost_reduction(reduction: i32, size_modifier: i32, know_your_own_strength: bool) -> i32 {
    if know_your_own_strength {
        reduction
    } else {
        reduction + size_modifier * 10
    }
}

/// HP cost: 2 per level, discounted 10% per positive size modifier level
/// (at most 8) unless Know Your Own Strength is in use.
pub fn hit_point_points(adjustment: i32, size_modifier: i32, know_your_own_strength: bool) -> i32 {
    let mut points = 2 * i64::from(adjustment);
    if !know_your_own_strength && size_modifier > 0 {
        let size_modifier = i64::from(size_modifier.min(8));
        points *= 10 - size_modifier;
        let remainder = points % 10;
        points /= 10;
        if remainder > 4 {
            points += 1;
        } else if remainder < -5 {
            points -= 1;
        }
    }
    saturate(points)
}

// =============================================================================
// Vitality
// =============================================================================

/// Current value at or below which a pool of `maximum` leaves the
/// character reeling (HP) or tired (FP).
pub fn collapse_threshold(maximum: i32) -> i32 {
    (divide_rounding_up(maximum, 3) - 1).max(0)
}

fn impaired(value: i32, reeling: bool, tired: bool) -> i32 {
    if reeling || tired {
        let divisor = if reeling && tired { 4 } else { 2 };
        divide_rounding_up(value, divisor)
    } else {
        value
    }
}

/// Ground move at an encumbrance level.
pub fn encumbered_move(basic_move: i32, encumbrance: Encumbrance, reeling: bool, tired: bool) -> i32 {
    let initial = impaired(basic_move, reeling, tired);
    let movement = initial * (10 + 2 * encumbrance.penalty()) / 10;
    if movement < 1 {
        return if initial > 0 { 1 } else { 0 };
    }
    movement
}

/// Dodge at an encumbrance level; never below 1.
pub fn encumbered_dodge(
    basic_speed: f64,
    dodge_bonus: i32,
    encumbrance: Encumbrance,
    reeling: bool,
    tired: bool,
) -> i32 {
    let dodge = 3 + dodge_bonus + basic_speed.floor() as i32;
    (impaired(dodge, reeling, tired) + encumbrance.penalty()).max(1)
}
