use crate::battle::combatant::CombatantState;
use crate::battle::state::TurnRng;
use crate::config::BattleConfig;
use crate::creature::StatusCondition;
use crate::dex::Dex;
use crate::errors::{BattleResult, InvalidTargetError};
use schema::CaptureDevice;
use serde::{Deserialize, Serialize};

/// Snapshot of the target at the moment the orb is thrown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureAttempt {
    pub device: CaptureDevice,
    pub current_hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusCondition>,
}

impl CaptureAttempt {
    pub fn from_target(target: &CombatantState, device: CaptureDevice) -> Self {
        Self {
            device,
            current_hp: target.current_hp,
            max_hp: target.max_hp(),
            status: target.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub success: bool,
    pub shake_count: u8,
    pub probability: f32,
}

/// catch_value = catch_rate * device * status * (3*maxHP - 2*HP) / (3*maxHP),
/// clamped into the configured bounds.
pub fn catch_value(catch_rate: u8, attempt: &CaptureAttempt, config: &BattleConfig) -> f32 {
    let max_hp = attempt.max_hp.max(1) as f32;
    let current_hp = attempt.current_hp.min(attempt.max_hp) as f32;
    let hp_multiplier = (max_hp * 3.0 - current_hp * 2.0) / (max_hp * 3.0);

    let value = catch_rate as f32
        * attempt.device.modifier()
        * calculate_status_multiplier(&attempt.status)
        * hp_multiplier;

    value.clamp(config.catch_value_min, config.catch_value_max)
}

/// Resolve a capture attempt against `target`. Consumes exactly one draw.
pub fn attempt_capture(
    target: &CombatantState,
    attempt: &CaptureAttempt,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
) -> BattleResult<CaptureResult> {
    if target.is_fainted() {
        return Err(InvalidTargetError::TargetFainted.into());
    }

    let species_data = dex.species(target.species)?;
    let value = catch_value(species_data.catch_rate, attempt, config);
    let probability = value / 255.0;

    let roll = rng.next_in_range("capture roll", 0..=254);
    let success = (roll as f32) < value;

    Ok(CaptureResult {
        success,
        shake_count: shake_count(success, probability),
        probability,
    })
}

/// Presentation only: 3 on success, otherwise the probability band capped at 2.
pub fn shake_count(success: bool, probability: f32) -> u8 {
    if success {
        3
    } else {
        ((probability * 3.0).floor() as u8).min(2)
    }
}

/// Calculate status condition multiplier for catch rate
fn calculate_status_multiplier(status: &Option<StatusCondition>) -> f32 {
    match status {
        Some(StatusCondition::Sleep { .. }) | Some(StatusCondition::Freeze) => 2.0,
        Some(StatusCondition::Paralysis)
        | Some(StatusCondition::Burn)
        | Some(StatusCondition::Poison)
        | Some(StatusCondition::Confusion { .. }) => 1.5,
        None => 1.0,
    }
}
