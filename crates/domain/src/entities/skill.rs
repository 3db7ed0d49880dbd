//! Skill and technique rows

use serde::{Deserialize, Serialize};

use super::data_row::{DataRow, RowPayload};

pub type SkillRow = DataRow<SkillData>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub specialization: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub technique: bool,
    /// Level relative to the controlling attribute, resolved by the caller
    #[serde(default)]
    pub relative_level: i32,
}

impl SkillData {
    pub fn new(name: impl Into<String>, points: i32) -> Self {
        Self {
            name: name.into(),
            specialization: String::new(),
            points,
            container: false,
            technique: false,
            relative_level: 0,
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self {
            container: true,
            ..Self::new(name, 0)
        }
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = specialization.into();
        self
    }

    pub fn with_relative_level(mut self, relative_level: i32) -> Self {
        self.relative_level = relative_level;
        self
    }

    pub fn as_technique(mut self) -> Self {
        self.technique = true;
        self
    }

    /// Techniques count even without points; other skills need some.
    pub fn is_known(&self) -> bool {
        self.technique || self.points > 0
    }
}

impl RowPayload for SkillData {
    fn is_container(&self) -> bool {
        self.container
    }
}
