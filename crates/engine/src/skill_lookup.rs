//! Skill lookup backed by the document's own skill list.

use sheetforge_domain::entities::{RowTree, SkillRow};

use crate::infrastructure::ports::SkillLookup;

/// Matches skills by case-insensitive name and, when one is given,
/// specialization. Containers and skills without points are skipped.
pub struct DocumentSkills<'a> {
    skills: &'a RowTree<SkillRow>,
}

impl<'a> DocumentSkills<'a> {
    pub fn new(skills: &'a RowTree<SkillRow>) -> Self {
        Self { skills }
    }
}

impl SkillLookup for DocumentSkills<'_> {
    fn relative_levels(&self, name: &str, specialization: &str) -> Vec<i32> {
        self.skills
            .iter()
            .filter(|row| !row.data.container && row.data.is_known())
            .filter(|row| row.data.name.eq_ignore_ascii_case(name))
            .filter(|row| {
                specialization.is_empty()
                    || row.data.specialization.eq_ignore_ascii_case(specialization)
            })
            .map(|row| row.data.relative_level)
            .collect()
    }
}
