//! Creature Battle Engine
//!
//! Resolves single-encounter, turn-based battles between two creatures: turn
//! order, damage, status, capture, and post-battle progression. The engine
//! renders nothing. Every turn produces an ordered list of events.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod creature;
pub mod dex;
pub mod errors;
pub mod progression;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    BaseStats, CaptureDevice, ElementType, EvolutionMethod, EvolutionRule, ExperienceGroup,
    ItemId, Learnset, MoveCategory, MoveData, MoveEffect, MoveId, SpeciesData, SpeciesId,
    StatType, StatusType, Target,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine functions and state.
pub use battle::ai::{OpponentPolicy, ScoringPolicy};
pub use battle::engine::{
    advance_turn, collect_opponent_action, conclude, start_battle, submit_action, valid_actions,
    OpponentSpec,
};
pub use battle::items::{BasicItems, ItemEffect, ItemHandler, NoItems};
pub use battle::state::{
    BattleAction, BattleConclusion, BattleContext, BattleEvent, BattleKind, BattleOutcome,
    BattlePhase, Side, TurnResult, TurnRng,
};

// Core runtime types for a battle.
pub use config::BattleConfig;
pub use creature::{CreatureInstance, StatusCondition};
pub use dex::Dex;

// Crate-specific error and result types.
pub use errors::{
    BattleEngineError, BattleResult, ConfigResult, ConfigurationError, InvalidActionError,
    InvalidMoveError, InvalidTargetError,
};
