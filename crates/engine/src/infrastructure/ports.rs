//! Ports for the collaborators a recompute pass depends on.

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Skill resolution
// =============================================================================

/// Resolves skills by name for bonuses that depend on a skill's level.
///
/// Skill levels are computed outside this engine; implementations report
/// the relative level already attached to each skill.
#[cfg_attr(test, mockall::automock)]
pub trait SkillLookup: Send + Sync {
    /// Relative levels of every known, non-container skill whose name and
    /// specialization match. An empty specialization matches any.
    fn relative_levels(&self, name: &str, specialization: &str) -> Vec<i32>;
}
