//! SheetForge engine library.
//!
//! Builds the bonus index over a character document, runs the
//! derived-attribute stages and keeps the resulting cache.
//!
//! ## Structure
//!
//! - `bonus_index` - Feature multimap and bonus queries
//! - `stages` - Named derived-attribute stages
//! - `recompute` - Orchestrator owning the document and its cache
//! - `settings` - Environment overrides for sheet settings
//! - `document_file` - Loading and saving documents on disk
//! - `infrastructure/` - Ports and their adapters

pub mod bonus_index;
pub mod document_file;
pub mod error;
pub mod infrastructure;
pub mod recompute;
pub mod settings;
pub mod skill_lookup;
pub mod stages;

pub use bonus_index::{BonusIndex, IndexedFeature, LeveledBonus};
pub use error::EngineError;
pub use recompute::{RowBonuses, SheetCache, SheetEngine};
pub use skill_lookup::DocumentSkills;
pub use stages::Stage;
