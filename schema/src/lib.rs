// Creature Battle Schema - Shared type definitions
// This crate contains the closed enums and static record types shared between
// the engine crate and the RON data tables it loads.

// Re-export the main types
pub use battle_data::*;
pub use element_types::*;
pub use move_data::*;
pub use species_data::*;

pub mod battle_data;
pub mod element_types;
pub mod move_data;
pub mod species_data;
