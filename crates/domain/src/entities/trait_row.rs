//! Trait rows: advantages, disadvantages, quirks and their containers

use serde::{Deserialize, Serialize};

use super::data_row::{DataRow, RowPayload};
use super::modifier::TraitModifier;

pub type TraitRow = DataRow<TraitData>;

/// How a trait container rolls up its children's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    #[default]
    Group,
    MetaTrait,
    Race,
    AlternativeAbilities,
}

/// Self-control roll for mental disadvantages; scales the final cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfControlRoll {
    #[default]
    NoneRequired,
    Cr6,
    Cr9,
    Cr12,
    Cr15,
}

impl SelfControlRoll {
    pub fn multiplier(self) -> f64 {
        match self {
            SelfControlRoll::NoneRequired | SelfControlRoll::Cr12 => 1.0,
            SelfControlRoll::Cr6 => 2.0,
            SelfControlRoll::Cr9 => 1.5,
            SelfControlRoll::Cr15 => 0.5,
        }
    }
}

fn not_leveled() -> i32 {
    -1
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitData {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(default)]
    pub base_points: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub points_per_level: i32,
    /// Level count; `-1` when the trait is not leveled
    #[serde(default = "not_leveled")]
    pub levels: i32,
    #[serde(default)]
    pub allow_half_levels: bool,
    #[serde(default)]
    pub half_level: bool,
    #[serde(default)]
    pub round_down: bool,
    #[serde(default)]
    pub self_control: SelfControlRoll,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<TraitModifier>,
}

impl TraitData {
    pub fn new(name: impl Into<String>, base_points: i32) -> Self {
        Self {
            name: name.into(),
            reference: String::new(),
            base_points,
            points_per_level: 0,
            levels: -1,
            allow_half_levels: false,
            half_level: false,
            round_down: false,
            self_control: SelfControlRoll::NoneRequired,
            container: None,
            modifiers: Vec::new(),
        }
    }

    pub fn container(name: impl Into<String>, container: ContainerType) -> Self {
        Self {
            container: Some(container),
            ..Self::new(name, 0)
        }
    }

    pub fn with_levels(mut self, levels: i32, points_per_level: i32) -> Self {
        self.levels = levels;
        self.points_per_level = points_per_level;
        self
    }

    pub fn with_half_level(mut self) -> Self {
        self.allow_half_levels = true;
        self.half_level = true;
        self
    }

    pub fn with_round_down(mut self, round_down: bool) -> Self {
        self.round_down = round_down;
        self
    }

    pub fn with_self_control(mut self, roll: SelfControlRoll) -> Self {
        self.self_control = roll;
        self
    }

    pub fn with_modifier(mut self, modifier: TraitModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn is_leveled(&self) -> bool {
        self.levels >= 0
    }

    pub fn container_type(&self) -> Option<ContainerType> {
        self.container
    }

    /// Level count with the half level added. An unleveled trait counts as
    /// `-1`, so any leftover per-level cost is subtracted once.
    pub fn effective_levels(&self) -> f64 {
        let half = if self.allow_half_levels && self.half_level {
            0.5
        } else {
            0.0
        };
        f64::from(self.levels) + half
    }

    /// Level used to scale per-level bonuses from this trait's features.
    pub fn feature_level(&self) -> i32 {
        self.levels.max(0)
    }

    pub fn set_levels(&mut self, levels: i32) -> bool {
        let levels = levels.max(-1);
        if self.levels == levels {
            return false;
        }
        self.levels = levels;
        true
    }
}

impl RowPayload for TraitData {
    fn is_container(&self) -> bool {
        self.container.is_some()
    }
}
