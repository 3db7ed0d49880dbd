//! Trait cost pipeline
//!
//! Turns a trait's base and per-level points plus an ordered list of
//! modifiers into adjusted points:
//!
//! 1. Percentages accumulate into base and level enhancements/limitations;
//!    `Total` modifiers feed both.
//! 2. Flat points add to the base, or to the per-level cost for
//!    `LevelsOnly`.
//! 3. Multipliers compound with the self-control multiplier.
//! 4. Net percentages are floored at -80 and applied once when the base and
//!    level percentages agree, separately otherwise.
//! 5. The result is multiplied, rounded up (or down) and truncated.
//!
//! Accumulation is commutative, so modifier order within a partition never
//! changes the result. Negative results are valid.

use crate::entities::{CostAdjustment, TraitData, TraitModifier};

/// Largest total limitation a trait can take.
pub const MAX_LIMITATION: i32 = -80;

/// Inputs to the cost pipeline for one trait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBasis {
    pub base_points: i32,
    pub points_per_level: i32,
    /// Level count including any half level
    pub levels: f64,
    pub multiplier: f64,
    pub round_down: bool,
}

impl CostBasis {
    pub fn for_trait(data: &TraitData) -> Self {
        Self {
            base_points: data.base_points,
            points_per_level: data.points_per_level,
            levels: data.effective_levels(),
            multiplier: data.self_control.multiplier(),
            round_down: data.round_down,
        }
    }
}

/// `points` adjusted by `percentage` percent.
pub fn modify_points(points: f64, percentage: i32) -> f64 {
    points + percentage_of(points, percentage)
}

pub fn percentage_of(points: f64, percentage: i32) -> f64 {
    points * f64::from(percentage) / 100.0
}

/// Ceiling by default, floor when the trait rounds down.
pub fn apply_rounding(value: f64, round_down: bool) -> f64 {
    if round_down {
        value.floor()
    } else {
        value.ceil()
    }
}

#[derive(Debug, Default)]
struct Accumulators {
    base_enhancement: i32,
    base_limitation: i32,
    level_enhancement: i32,
    level_limitation: i32,
}

impl Accumulators {
    fn add(&mut self, modifier: &TraitModifier, percentage: i32) {
        let affects = modifier.affects;
        if affects.touches_base() {
            if percentage < 0 {
                self.base_limitation += percentage;
            } else {
                self.base_enhancement += percentage;
            }
        }
        if affects.touches_levels() {
            if percentage < 0 {
                self.level_limitation += percentage;
            } else {
                self.level_enhancement += percentage;
            }
        }
    }

    fn any(&self) -> bool {
        self.base_enhancement != 0
            || self.base_limitation != 0
            || self.level_enhancement != 0
            || self.level_limitation != 0
    }
}

/// Adjusted points for `basis` under the enabled entries of `modifiers`.
pub fn adjusted_points<'a, I>(basis: &CostBasis, modifiers: I) -> i32
where
    I: IntoIterator<Item = &'a TraitModifier>,
{
    let mut base_points = basis.base_points;
    let mut points_per_level = basis.points_per_level;
    let mut multiplier = basis.multiplier;
    let mut accumulators = Accumulators::default();

    for modifier in modifiers.into_iter().filter(|m| m.enabled) {
        match modifier.effective_cost() {
            CostAdjustment::Percentage(percentage) => accumulators.add(modifier, percentage),
            CostAdjustment::FlatPoints(points) => {
                if modifier.affects.touches_base() {
                    base_points += points;
                } else {
                    points_per_level += points;
                }
            }
            CostAdjustment::Multiplier(amount) => multiplier *= amount,
        }
    }

    let base = f64::from(base_points);
    let leveled = f64::from(points_per_level) * basis.levels;
    let modified = if accumulators.any() {
        let base_mod = (accumulators.base_enhancement + accumulators.base_limitation)
            .max(MAX_LIMITATION);
        let level_mod = (accumulators.level_enhancement + accumulators.level_limitation)
            .max(MAX_LIMITATION);
        if base_mod == level_mod {
            modify_points(base + leveled, base_mod)
        } else {
            modify_points(base, base_mod) + modify_points(leveled, level_mod)
        }
    } else {
        base + leveled
    };

    apply_rounding(modified * multiplier, basis.round_down) as i32
}
