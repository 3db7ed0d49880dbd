//! Free-form note rows

use serde::{Deserialize, Serialize};

use super::data_row::{DataRow, RowPayload};

pub type NoteRow = DataRow<NoteData>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub text: String,
    #[serde(default)]
    pub container: bool,
}

impl NoteData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            container: false,
        }
    }
}

impl RowPayload for NoteData {
    fn is_container(&self) -> bool {
        self.container
    }
}
