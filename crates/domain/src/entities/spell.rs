//! Spell rows

use serde::{Deserialize, Serialize};

use super::data_row::{DataRow, RowPayload};

pub type SpellRow = DataRow<SpellData>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellData {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub college: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub relative_level: i32,
}

impl SpellData {
    pub fn new(name: impl Into<String>, college: impl Into<String>, points: i32) -> Self {
        Self {
            name: name.into(),
            college: college.into(),
            points,
            container: false,
            relative_level: 0,
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self {
            container: true,
            ..Self::new(name, "", 0)
        }
    }
}

impl RowPayload for SpellData {
    fn is_container(&self) -> bool {
        self.container
    }
}
