//! Prerequisite trees attached to rows
//!
//! Prerequisites are carried as data: they round-trip through documents and
//! take part in structural equivalence, but point and weight calculations
//! never consult them.

use serde::{Deserialize, Serialize};

use super::criteria::{NumericCriteria, StringCriteria};
use super::feature::BonusAttribute;

/// Boolean AND (`all`) or OR composite of prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrereqList {
    #[serde(default = "default_all")]
    pub all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_tech_level: Option<NumericCriteria>,
    #[serde(default)]
    pub prereqs: Vec<Prereq>,
}

fn default_all() -> bool {
    true
}

impl Default for PrereqList {
    fn default() -> Self {
        Self {
            all: true,
            when_tech_level: None,
            prereqs: Vec::new(),
        }
    }
}

impl PrereqList {
    pub fn any_of(prereqs: Vec<Prereq>) -> Self {
        Self {
            all: false,
            when_tech_level: None,
            prereqs,
        }
    }

    pub fn all_of(prereqs: Vec<Prereq>) -> Self {
        Self {
            all: true,
            when_tech_level: None,
            prereqs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prereqs.is_empty()
    }
}

/// One prerequisite. `has` false inverts the requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prereq {
    List(PrereqList),
    Attribute {
        has: bool,
        which: BonusAttribute,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        combined_with: Option<BonusAttribute>,
        qualifier: NumericCriteria,
    },
    Trait {
        has: bool,
        name: StringCriteria,
        #[serde(default)]
        level: NumericCriteria,
        #[serde(default)]
        notes: StringCriteria,
    },
    Skill {
        has: bool,
        name: StringCriteria,
        #[serde(default)]
        specialization: StringCriteria,
        #[serde(default)]
        level: NumericCriteria,
    },
    Spell {
        has: bool,
        qualifier: StringCriteria,
        #[serde(default)]
        quantity: NumericCriteria,
    },
    ContainedWeight {
        has: bool,
        qualifier: NumericCriteria,
    },
    ContainedQuantity {
        has: bool,
        qualifier: NumericCriteria,
    },
}
