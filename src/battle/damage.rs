use crate::battle::combatant::CombatantState;
use crate::battle::effectiveness::effectiveness;
use crate::battle::state::{Side, TurnRng};
use crate::battle::stats::{effective_attack, effective_defense};
use crate::config::BattleConfig;
use crate::creature::StatusCondition;
use crate::dex::Dex;
use crate::errors::{BattleResult, InvalidMoveError};
use schema::{ElementType, MoveCategory, MoveData, MoveEffect, MoveId, StatType, StatusType, Target};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Reserved id of the fixed fallback move. Never present in a dex.
pub const FALLBACK_MOVE_ID: MoveId = MoveId(0);
pub const FALLBACK_MOVE_NAME: &str = "Desperation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSelection {
    Known(usize),
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChangeOutcome {
    pub target: Side,
    pub stat: StatType,
    pub stages: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub move_id: MoveId,
    pub move_name: String,
    /// False for status moves, which never deal damage.
    pub damaging: bool,
    pub amount: u16,
    pub effectiveness: f32,
    pub critical: bool,
    pub missed: bool,
    pub status_inflicted: Option<StatusCondition>,
    pub stat_changes: Vec<StatChangeOutcome>,
    pub recoil: u16,
}

impl DamageOutcome {
    fn empty(move_data: &MoveData, effectiveness: f32) -> Self {
        Self {
            move_id: move_data.id,
            move_name: move_data.name.clone(),
            damaging: move_data.is_damaging(),
            amount: 0,
            effectiveness,
            critical: false,
            missed: false,
            status_inflicted: None,
            stat_changes: Vec::new(),
            recoil: 0,
        }
    }
}

/// The typeless move used once every known move is out of PP.
pub fn fallback_move(config: &BattleConfig) -> MoveData {
    MoveData {
        id: FALLBACK_MOVE_ID,
        name: FALLBACK_MOVE_NAME.to_string(),
        move_type: ElementType::Typeless,
        category: MoveCategory::Physical,
        power: Some(config.fallback_power),
        accuracy: Some(100),
        priority: 0,
        max_pp: 1,
        effects: vec![MoveEffect::Recoil(config.fallback_recoil_percent)],
    }
}

/// Resolve one move from `attacker` against `defender`. Pure apart from RNG draws.
///
/// Draw order: accuracy, then (for damaging hits) critical and damage roll,
/// then one draw per secondary effect that is not already certain.
pub fn compute_damage(
    attacker: &CombatantState,
    defender: &CombatantState,
    selection: MoveSelection,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
) -> BattleResult<DamageOutcome> {
    let move_data: Cow<MoveData> = match selection {
        MoveSelection::Known(slot) => {
            let move_slot = attacker
                .moves
                .get(slot)
                .copied()
                .flatten()
                .ok_or(InvalidMoveError::EmptySlot { slot })?;
            if move_slot.pp == 0 {
                return Err(InvalidMoveError::NoPpRemaining { slot }.into());
            }
            Cow::Borrowed(dex.move_data(move_slot.move_id)?)
        }
        MoveSelection::Fallback => Cow::Owned(fallback_move(config)),
    };

    let multiplier = effectiveness(move_data.move_type, &defender.types);
    let mut outcome = DamageOutcome::empty(&move_data, multiplier);

    // 1. Accuracy check.
    if let Some(accuracy) = move_data.accuracy {
        let roll = rng.next_in_range("accuracy", 0..=99);
        if roll >= accuracy as u16 {
            outcome.missed = true;
            return Ok(outcome);
        }
    }

    // 2. Status moves only roll their effects.
    if !move_data.is_damaging() {
        roll_secondary_effects(&mut outcome, &move_data, attacker, defender, false, config, rng);
        return Ok(outcome);
    }

    // 3. Immunity stops everything else.
    if multiplier == 0.0 {
        return Ok(outcome);
    }

    // 4. Base damage from the staged offensive and defensive stats.
    let power = move_data.power.unwrap_or(0);
    let attack = effective_attack(attacker, move_data.category);
    let defense = effective_defense(defender, move_data.category);
    let base = base_damage(attacker.level, power, attack, defense);

    // 5. Multipliers: STAB, type effectiveness, critical, random roll.
    let stab = if attacker.has_type(move_data.move_type) {
        config.stab_multiplier
    } else {
        1.0
    };
    outcome.critical = rng.chance("critical hit", config.crit_chance);
    let critical = if outcome.critical {
        config.critical_multiplier
    } else {
        1.0
    };
    let roll = rng.next_in_range(
        "damage roll",
        config.damage_roll_min as u16..=config.damage_roll_max as u16,
    );

    let scaled = base as f32 * stab * multiplier * critical * (roll as f32 / 100.0);
    let amount = (scaled as u32).max(1).min(u16::MAX as u32) as u16;
    outcome.amount = amount;

    // 6. Secondary effects and recoil.
    let dealt = amount.min(defender.current_hp);
    let defender_faints = dealt >= defender.current_hp;
    roll_secondary_effects(
        &mut outcome,
        &move_data,
        attacker,
        defender,
        defender_faints,
        config,
        rng,
    );
    if let Some(percent) = move_data.recoil_percent() {
        if percent > 0 && dealt > 0 {
            outcome.recoil = ((dealt as u32 * percent as u32) / 100).max(1) as u16;
        }
    }

    Ok(outcome)
}

/// ((2 * level / 5 + 2) * power * attack / defense) / 50 + 2, in integers.
pub fn base_damage(level: u8, power: u8, attack: u16, defense: u16) -> u32 {
    let level_factor = 2 * level as u32 / 5 + 2;
    let defense = defense.max(1) as u32;
    (level_factor * power as u32 * attack as u32 / defense) / 50 + 2
}

/// Typeless physical hit a confused creature deals to itself. No rolls.
pub fn confusion_self_hit_damage(combatant: &CombatantState, config: &BattleConfig) -> u16 {
    let attack = effective_attack(combatant, MoveCategory::Physical);
    let defense = effective_defense(combatant, MoveCategory::Physical);
    base_damage(combatant.level, config.confusion_self_hit_power, attack, defense)
        .min(u16::MAX as u32) as u16
}

/// Types that shrug off a given status entirely.
pub fn status_immune(status: StatusType, types: &[ElementType]) -> bool {
    match status {
        StatusType::Burn => types.contains(&ElementType::Fire),
        StatusType::Freeze => types.contains(&ElementType::Ice),
        StatusType::Poison => {
            types.contains(&ElementType::Poison) || types.contains(&ElementType::Steel)
        }
        StatusType::Paralysis => types.contains(&ElementType::Electric),
        StatusType::Sleep | StatusType::Confusion => false,
    }
}

/// Turn a status type into a concrete condition, rolling its duration when it has one.
pub fn roll_status(status: StatusType, config: &BattleConfig, rng: &mut TurnRng) -> StatusCondition {
    match status {
        StatusType::Poison => StatusCondition::Poison,
        StatusType::Paralysis => StatusCondition::Paralysis,
        StatusType::Burn => StatusCondition::Burn,
        StatusType::Freeze => StatusCondition::Freeze,
        StatusType::Sleep => StatusCondition::Sleep {
            turns_remaining: rng.next_in_range(
                "sleep duration",
                config.sleep_turns_min as u16..=config.sleep_turns_max as u16,
            ) as u8,
        },
        StatusType::Confusion => StatusCondition::Confusion {
            turns_remaining: rng.next_in_range(
                "confusion duration",
                config.confusion_turns_min as u16..=config.confusion_turns_max as u16,
            ) as u8,
        },
    }
}

fn roll_secondary_effects(
    outcome: &mut DamageOutcome,
    move_data: &MoveData,
    attacker: &CombatantState,
    defender: &CombatantState,
    defender_faints: bool,
    config: &BattleConfig,
    rng: &mut TurnRng,
) {
    let target_reachable = !defender_faints && outcome.effectiveness > 0.0;

    for effect in &move_data.effects {
        match effect {
            MoveEffect::InflictStatus { status, chance } => {
                let eligible = target_reachable
                    && outcome.status_inflicted.is_none()
                    && defender.status.is_none()
                    && !status_immune(*status, &defender.types);
                if eligible && rng.chance("secondary status", *chance) {
                    outcome.status_inflicted = Some(roll_status(*status, config, rng));
                }
            }
            MoveEffect::StatChange {
                target,
                stat,
                stages,
                chance,
            } => {
                let side = match target {
                    Target::User => attacker.side,
                    Target::Target => defender.side,
                };
                if *target == Target::Target && !target_reachable {
                    continue;
                }
                if rng.chance("stat change", *chance) {
                    outcome.stat_changes.push(StatChangeOutcome {
                        target: side,
                        stat: *stat,
                        stages: *stages,
                    });
                }
            }
            MoveEffect::Recoil(_) => {} // Needs the final damage, handled by the caller
        }
    }
}
