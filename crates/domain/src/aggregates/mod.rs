//! Aggregate roots - domain objects that own their related data
//!
//! The character document owns its six row lists outright. Mutations go
//! through its entry points, which return whether anything changed rather
//! than tracking dirty state.

mod character;

pub use character::{
    AttributeBases, BaseAttribute, CharacterDocument, Profile, CURRENT_VERSION, MIN_VERSION,
};
