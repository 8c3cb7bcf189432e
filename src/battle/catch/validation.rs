use crate::battle::state::{BattleContext, BattleKind, Side};
use crate::errors::{BattleResult, InvalidActionError, InvalidTargetError};

/// Check if capture attempts are allowed based on battle kind
pub fn is_capture_allowed(kind: BattleKind) -> bool {
    matches!(kind, BattleKind::Wild)
}

/// Validate that `side` may throw an orb right now.
pub fn can_attempt_capture(context: &BattleContext, side: Side) -> BattleResult<()> {
    if !is_capture_allowed(context.kind) {
        return Err(InvalidActionError::CaptureNotAllowed(context.kind).into());
    }

    // Only the player owns capture devices
    if side != Side::Player {
        return Err(InvalidActionError::NotAllowedForSide {
            side,
            action: "capture".to_string(),
        }
        .into());
    }

    if context.combatant(side.opponent()).is_fainted() {
        return Err(InvalidTargetError::TargetFainted.into());
    }

    Ok(())
}
