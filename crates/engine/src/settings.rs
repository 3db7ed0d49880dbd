//! Sheet settings overrides from the environment
//!
//! A loaded document carries its own [`SheetSettings`]. Operators can force
//! house rules for every sheet the binary processes through `SHEETFORGE_*`
//! variables; unparseable values are logged and ignored.

use sheetforge_domain::{SheetSettings, WeightUnit};

pub const DEFAULT_WEIGHT_UNITS_VAR: &str = "SHEETFORGE_DEFAULT_WEIGHT_UNITS";

/// Boolean house-rule variables, one per settings flag.
pub const FLAG_VARS: [&str; 6] = [
    "SHEETFORGE_BASE_WILL_AND_PER_ON_10",
    "SHEETFORGE_USE_KNOW_YOUR_OWN_STRENGTH",
    "SHEETFORGE_USE_REDUCED_SWING",
    "SHEETFORGE_USE_THRUST_EQUALS_SWING_MINUS_2",
    "SHEETFORGE_USE_MODIFYING_DICE_PLUS_ADDS",
    "SHEETFORGE_USE_SIMPLE_METRIC_CONVERSIONS",
];

fn flag_slot<'a>(settings: &'a mut SheetSettings, var: &str) -> Option<&'a mut bool> {
    match var {
        "SHEETFORGE_BASE_WILL_AND_PER_ON_10" => Some(&mut settings.base_will_and_per_on_10),
        "SHEETFORGE_USE_KNOW_YOUR_OWN_STRENGTH" => Some(&mut settings.use_know_your_own_strength),
        "SHEETFORGE_USE_REDUCED_SWING" => Some(&mut settings.use_reduced_swing),
        "SHEETFORGE_USE_THRUST_EQUALS_SWING_MINUS_2" => {
            Some(&mut settings.use_thrust_equals_swing_minus_2)
        }
        "SHEETFORGE_USE_MODIFYING_DICE_PLUS_ADDS" => {
            Some(&mut settings.use_modifying_dice_plus_adds)
        }
        "SHEETFORGE_USE_SIMPLE_METRIC_CONVERSIONS" => {
            Some(&mut settings.use_simple_metric_conversions)
        }
        _ => None,
    }
}

/// Applies `SHEETFORGE_*` process environment overrides to `settings`.
pub fn apply_env_overrides(settings: &mut SheetSettings) -> usize {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Applies overrides read through `lookup`; returns how many were applied.
pub fn apply_overrides<F>(settings: &mut SheetSettings, lookup: F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(val) = lookup(DEFAULT_WEIGHT_UNITS_VAR) {
        match val.parse::<WeightUnit>() {
            Ok(units) => {
                settings.default_weight_units = units;
                applied += 1;
                tracing::info!(%units, "Applied SHEETFORGE_DEFAULT_WEIGHT_UNITS environment variable");
            }
            Err(_) => {
                tracing::warn!(
                    val = %val,
                    "SHEETFORGE_DEFAULT_WEIGHT_UNITS is not a known weight unit, ignoring"
                );
            }
        }
    }

    for name in FLAG_VARS {
        let Some(val) = lookup(name) else {
            continue;
        };
        match (parse_flag(&val), flag_slot(settings, name)) {
            (Some(enabled), Some(slot)) => {
                *slot = enabled;
                applied += 1;
                tracing::info!(var = name, enabled, "Applied environment variable");
            }
            _ => {
                tracing::warn!(var = name, val = %val, "Not a valid boolean, ignoring");
            }
        }
    }

    applied
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
