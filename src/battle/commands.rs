use crate::battle::state::{BattleContext, BattleEvent, BattleOutcome, BattlePhase, EventBus, Side};
use crate::creature::{MoveSlot, StatusCondition};
use crate::dex::Dex;
use crate::errors::{BattleResult, InvalidMoveError};
use crate::progression::ExperienceAward;
use schema::StatType;

/// Where a hit point loss came from. Decides which event is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Move,
    Recoil,
    Confusion,
    Status(StatusCondition),
}

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetPhase(BattlePhase),
    SetOutcome(BattleOutcome),
    IncrementTurnNumber,
    ClearPendingActions,

    // Combatant modifications
    DealDamage {
        target: Side,
        amount: u16,
        source: DamageSource,
    },
    Heal {
        target: Side,
        amount: u16,
    },
    InflictStatus {
        target: Side,
        status: StatusCondition,
    },
    CureStatus {
        target: Side,
    },
    /// Replace the current status without an event (turn counters ticking down).
    UpdateStatus {
        target: Side,
        status: Option<StatusCondition>,
    },
    ChangeStatStage {
        target: Side,
        stat: StatType,
        delta: i8,
    },
    SpendPp {
        target: Side,
        slot: usize,
    },
    RestorePp {
        target: Side,
        slot: usize,
        amount: u8,
    },
    ApplyExperienceAward {
        target: Side,
        award: Box<ExperienceAward>,
    },

    // Battle flow
    EmitEvent(BattleEvent),
}

/// Execute a batch of commands in order, stopping at the first failure
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    context: &mut BattleContext,
    bus: &mut EventBus,
    dex: &Dex,
) -> BattleResult<()> {
    for command in commands {
        execute_command(command, context, bus, dex)?;
    }
    Ok(())
}

/// Helper function specifically for DealDamage command with event emission
fn execute_deal_damage_command(
    target: Side,
    amount: u16,
    source: DamageSource,
    context: &mut BattleContext,
    bus: &mut EventBus,
) {
    let combatant = context.combatant_mut(target);
    // A fainted combatant takes no further damage
    if combatant.is_fainted() {
        return;
    }

    let dealt = combatant.take_damage(amount);
    let remaining_hp = combatant.current_hp;

    bus.push(match source {
        DamageSource::Move => BattleEvent::DamageDealt {
            target,
            amount: dealt,
            remaining_hp,
        },
        DamageSource::Recoil => BattleEvent::RecoilDamage {
            side: target,
            amount: dealt,
            remaining_hp,
        },
        DamageSource::Confusion => BattleEvent::ConfusionSelfHit {
            side: target,
            amount: dealt,
            remaining_hp,
        },
        DamageSource::Status(status) => BattleEvent::StatusTick {
            side: target,
            status,
            damage: dealt,
            remaining_hp,
        },
    });

    if remaining_hp == 0 {
        bus.push(BattleEvent::Fainted { side: target });
    }
}

fn execute_apply_award_command(
    target: Side,
    award: &ExperienceAward,
    context: &mut BattleContext,
    bus: &mut EventBus,
) {
    let combatant = context.combatant_mut(target);
    let old_max_hp = combatant.max_hp();

    combatant.experience = award.total_experience;
    combatant.level = combatant.level.max(award.new_level);
    combatant.evs = award.new_evs;
    combatant.stats = award.new_stats;

    // Max HP growth carries over to current HP. Fainted stays fainted.
    if combatant.current_hp > 0 {
        let growth = combatant.max_hp().saturating_sub(old_max_hp);
        combatant.current_hp = combatant
            .current_hp
            .saturating_add(growth)
            .min(combatant.max_hp());
    }
    combatant.current_hp = combatant.current_hp.min(combatant.max_hp());

    for learned in &award.learned_moves {
        if let Some(slot) = combatant.moves.get_mut(learned.slot) {
            *slot = Some(MoveSlot {
                move_id: learned.move_id,
                pp: learned.pp,
            });
        }
    }
    let species = combatant.species;

    bus.push(BattleEvent::ExperienceGained {
        side: target,
        amount: award.exp_gained,
    });
    for level in award.old_level.saturating_add(1)..=award.new_level {
        bus.push(BattleEvent::LevelUp {
            side: target,
            new_level: level,
        });
    }
    for learned in &award.learned_moves {
        bus.push(BattleEvent::MoveLearned {
            side: target,
            move_id: learned.move_id,
            move_name: learned.name.clone(),
            slot: learned.slot,
        });
    }
    for blocked in &award.blocked_moves {
        bus.push(BattleEvent::MoveLearnBlocked {
            side: target,
            move_id: blocked.move_id,
            move_name: blocked.name.clone(),
        });
    }
    if let Some(evolves_into) = award.evolution_ready {
        bus.push(BattleEvent::EvolutionReady {
            side: target,
            species,
            evolves_into,
        });
        if target == Side::Player {
            context.player_evolution_ready = true;
        }
    }
    context.experience_awarded = true;
}

pub fn execute_command(
    command: BattleCommand,
    context: &mut BattleContext,
    bus: &mut EventBus,
    dex: &Dex,
) -> BattleResult<()> {
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
        }
        BattleCommand::SetPhase(phase) => {
            context.phase = phase;
        }
        BattleCommand::SetOutcome(outcome) => {
            context.outcome = outcome;
        }
        BattleCommand::IncrementTurnNumber => {
            context.turn_number += 1;
        }
        BattleCommand::ClearPendingActions => {
            context.pending_actions = [None, None];
        }
        BattleCommand::DealDamage {
            target,
            amount,
            source,
        } => {
            execute_deal_damage_command(target, amount, source, context, bus);
        }
        BattleCommand::Heal { target, amount } => {
            let combatant = context.combatant_mut(target);
            let healed = combatant.heal(amount);
            bus.push(BattleEvent::Healed {
                side: target,
                amount: healed,
                new_hp: combatant.current_hp,
            });
        }
        BattleCommand::InflictStatus { target, status } => {
            let combatant = context.combatant_mut(target);
            // Only one status at a time
            if combatant.status.is_none() && !combatant.is_fainted() {
                combatant.status = Some(status);
                bus.push(BattleEvent::StatusInflicted { target, status });
            }
        }
        BattleCommand::CureStatus { target } => {
            if let Some(status) = context.combatant_mut(target).status.take() {
                bus.push(BattleEvent::StatusCured {
                    side: target,
                    status,
                });
            }
        }
        BattleCommand::UpdateStatus { target, status } => {
            context.combatant_mut(target).status = status;
        }
        BattleCommand::ChangeStatStage {
            target,
            stat,
            delta,
        } => {
            let stages = &mut context.combatant_mut(target).stat_stages;
            if stages.at_limit(stat, delta) {
                bus.push(BattleEvent::StatChangeBlocked {
                    target,
                    stat,
                    stages: delta,
                });
            } else {
                let (old_stage, new_stage) = stages.apply(stat, delta);
                bus.push(BattleEvent::StatStageChanged {
                    target,
                    stat,
                    old_stage,
                    new_stage,
                });
            }
        }
        BattleCommand::SpendPp { target, slot } => {
            let move_slot = context
                .combatant_mut(target)
                .moves
                .get_mut(slot)
                .and_then(Option::as_mut)
                .ok_or(InvalidMoveError::EmptySlot { slot })?;
            move_slot.pp = move_slot.pp.saturating_sub(1);
        }
        BattleCommand::RestorePp {
            target,
            slot,
            amount,
        } => {
            let move_slot = context
                .combatant_mut(target)
                .moves
                .get_mut(slot)
                .and_then(Option::as_mut)
                .ok_or(InvalidMoveError::EmptySlot { slot })?;
            let max_pp = dex.move_data(move_slot.move_id)?.max_pp;
            let restored = amount.min(max_pp.saturating_sub(move_slot.pp));
            move_slot.pp += restored;
            bus.push(BattleEvent::PpRestored {
                side: target,
                slot,
                amount: restored,
            });
        }
        BattleCommand::ApplyExperienceAward { target, award } => {
            execute_apply_award_command(target, &award, context, bus);
        }
    }
    Ok(())
}
