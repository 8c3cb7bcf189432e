use crate::battle::state::{BattleKind, Side};
use schema::{MoveId, SpeciesId};
use thiserror::Error;

/// Main error type for the creature battle engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    /// The submitted or resolved action is not legal right now
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] InvalidActionError),
    /// The action targets something that cannot be targeted
    #[error("Invalid target: {0}")]
    InvalidTarget(#[from] InvalidTargetError),
    /// Static data or config is missing or inconsistent
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl BattleEngineError {
    /// Fatal errors abort the battle. Everything else leaves the context untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BattleEngineError::Configuration(_))
    }
}

/// Errors related to actions submitted for a turn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidActionError {
    #[error("{0}")]
    InvalidMove(#[from] InvalidMoveError),
    #[error("the battle has already ended")]
    BattleEnded,
    #[error("the battle has not ended yet")]
    BattleNotEnded,
    #[error("the battle is not awaiting actions")]
    NotAwaitingActions,
    #[error("{0} has already submitted an action this turn")]
    AlreadySubmitted(Side),
    #[error("both sides must submit an action before the turn can advance")]
    ActionsMissing,
    #[error("capture is not allowed in a {0} battle")]
    CaptureNotAllowed(BattleKind),
    #[error("fleeing is not allowed in a {0} battle")]
    FleeNotAllowed(BattleKind),
    #[error("{side} may not {action}")]
    NotAllowedForSide { side: Side, action: String },
    #[error("item rejected: {0}")]
    ItemRejected(String),
}

/// Errors related to move slot selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMoveError {
    #[error("move slot {slot} is empty")]
    EmptySlot { slot: usize },
    #[error("move slot {slot} has no PP remaining")]
    NoPpRemaining { slot: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTargetError {
    #[error("the target has already fainted")]
    TargetFainted,
}

/// Errors related to static data tables and tunable constants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("species not found: {0}")]
    SpeciesNotFound(SpeciesId),
    #[error("move not found: {0}")]
    MoveNotFound(MoveId),
    #[error("species {species} must have one or two types, found {count}")]
    InvalidTyping { species: SpeciesId, count: usize },
    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<InvalidMoveError> for BattleEngineError {
    fn from(err: InvalidMoveError) -> Self {
        BattleEngineError::InvalidAction(InvalidActionError::InvalidMove(err))
    }
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using ConfigurationError
pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        let config: BattleEngineError = ConfigurationError::MoveNotFound(MoveId(99)).into();
        let action: BattleEngineError = InvalidActionError::ActionsMissing.into();
        let target: BattleEngineError = InvalidTargetError::TargetFainted.into();
        let slot: BattleEngineError = InvalidMoveError::EmptySlot { slot: 3 }.into();

        assert!(config.is_fatal());
        assert!(!action.is_fatal());
        assert!(!target.is_fatal());
        assert!(!slot.is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        let err: BattleEngineError = InvalidMoveError::NoPpRemaining { slot: 2 }.into();
        assert_eq!(
            err.to_string(),
            "Invalid action: move slot 2 has no PP remaining"
        );

        let err = InvalidActionError::CaptureNotAllowed(BattleKind::Trainer);
        assert_eq!(err.to_string(), "capture is not allowed in a Trainer battle");
    }
}
