use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete load levels derived from carried weight versus basic lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encumbrance {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
    ExtraHeavy,
}

impl Encumbrance {
    /// Levels in increasing order of load.
    pub const ALL: [Encumbrance; 5] = [
        Encumbrance::None,
        Encumbrance::Light,
        Encumbrance::Medium,
        Encumbrance::Heavy,
        Encumbrance::ExtraHeavy,
    ];

    /// Multiple of basic lift that may be carried at this level.
    pub fn weight_multiplier(self) -> i64 {
        match self {
            Encumbrance::None => 1,
            Encumbrance::Light => 2,
            Encumbrance::Medium => 3,
            Encumbrance::Heavy => 6,
            Encumbrance::ExtraHeavy => 10,
        }
    }

    /// Penalty applied to move and dodge; the negated level index.
    pub fn penalty(self) -> i32 {
        -(self.index() as i32)
    }

    pub fn index(self) -> usize {
        match self {
            Encumbrance::None => 0,
            Encumbrance::Light => 1,
            Encumbrance::Medium => 2,
            Encumbrance::Heavy => 3,
            Encumbrance::ExtraHeavy => 4,
        }
    }
}

impl fmt::Display for Encumbrance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encumbrance::None => "None",
            Encumbrance::Light => "Light",
            Encumbrance::Medium => "Medium",
            Encumbrance::Heavy => "Heavy",
            Encumbrance::ExtraHeavy => "X-Heavy",
        };
        f.write_str(name)
    }
}
