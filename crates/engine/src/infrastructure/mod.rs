//! Infrastructure implementations.
//!
//! Port traits for the engine's collaborators and their production adapters.

pub mod clock;
pub mod ports;
