//! Match criteria used by prerequisites and qualified bonuses

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a string qualifier is compared. Comparisons ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringCompare {
    #[default]
    Any,
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    StartsWith,
    DoesNotStartWith,
    EndsWith,
    DoesNotEndWith,
}

impl StringCompare {
    pub fn is_negation(self) -> bool {
        matches!(
            self,
            StringCompare::IsNot
                | StringCompare::DoesNotContain
                | StringCompare::DoesNotStartWith
                | StringCompare::DoesNotEndWith
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringCriteria {
    #[serde(default)]
    pub compare: StringCompare,
    #[serde(default)]
    pub qualifier: String,
}

impl StringCriteria {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is(qualifier: impl Into<String>) -> Self {
        Self::new(StringCompare::Is, qualifier)
    }

    pub fn new(compare: StringCompare, qualifier: impl Into<String>) -> Self {
        Self {
            compare,
            qualifier: qualifier.into(),
        }
    }

    pub fn matches(&self, data: &str) -> bool {
        let data = data.to_lowercase();
        let qualifier = self.qualifier.to_lowercase();
        match self.compare {
            StringCompare::Any => true,
            StringCompare::Is => data == qualifier,
            StringCompare::IsNot => data != qualifier,
            StringCompare::Contains => data.contains(&qualifier),
            StringCompare::DoesNotContain => !data.contains(&qualifier),
            StringCompare::StartsWith => data.starts_with(&qualifier),
            StringCompare::DoesNotStartWith => !data.starts_with(&qualifier),
            StringCompare::EndsWith => data.ends_with(&qualifier),
            StringCompare::DoesNotEndWith => !data.ends_with(&qualifier),
        }
    }

    /// Category matching: a positive comparison needs one matching category,
    /// a negated one needs every category to pass. An empty set only passes
    /// negated comparisons.
    pub fn matches_any_of(&self, categories: &BTreeSet<String>) -> bool {
        if self.compare == StringCompare::Any {
            return true;
        }
        if categories.is_empty() {
            return self.compare.is_negation();
        }
        if self.compare.is_negation() {
            categories.iter().all(|c| self.matches(c))
        } else {
            categories.iter().any(|c| self.matches(c))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericCompare {
    Is,
    #[default]
    AtLeast,
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericCriteria {
    #[serde(default)]
    pub compare: NumericCompare,
    #[serde(default)]
    pub qualifier: i32,
}

impl NumericCriteria {
    pub fn new(compare: NumericCompare, qualifier: i32) -> Self {
        Self { compare, qualifier }
    }

    /// Matches every value: at least `i32::MIN`.
    pub fn any() -> Self {
        Self::new(NumericCompare::AtLeast, i32::MIN)
    }

    pub fn matches(&self, value: i32) -> bool {
        match self.compare {
            NumericCompare::Is => value == self.qualifier,
            NumericCompare::AtLeast => value >= self.qualifier,
            NumericCompare::AtMost => value <= self.qualifier,
        }
    }
}
