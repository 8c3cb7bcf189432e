use crate::battle::action_stack::{ActionStack, TurnAction};
use crate::battle::ai::OpponentPolicy;
use crate::battle::catch::{attempt_capture, can_attempt_capture, CaptureAttempt};
use crate::battle::combatant::CombatantState;
use crate::battle::commands::{execute_command, execute_command_batch, BattleCommand, DamageSource};
use crate::battle::damage::{compute_damage, confusion_self_hit_damage, MoveSelection};
use crate::battle::items::{ItemEffect, ItemHandler};
use crate::battle::state::{
    BattleAction, BattleConclusion, BattleContext, BattleEvent, BattleKind, BattleOutcome,
    BattlePhase, EventBus, PreventionReason, Side, TurnResult, TurnRng,
};
use crate::config::BattleConfig;
use crate::creature::{CreatureInstance, StatusCondition};
use crate::dex::Dex;
use crate::errors::{
    BattleEngineError, BattleResult, ConfigurationError, InvalidActionError, InvalidMoveError,
};
use crate::progression::award_experience;
use schema::{CaptureDevice, SpeciesId};
use tracing::{debug, info, warn};

/// Who the player is up against.
#[derive(Debug, Clone, PartialEq)]
pub enum OpponentSpec {
    Instance(CreatureInstance),
    /// A fresh wild creature whose moves come from its learnset.
    Wild { species: SpeciesId, level: u8 },
}

// --- Battle setup ---

pub fn start_battle(
    dex: &Dex,
    player: &CreatureInstance,
    opponent: OpponentSpec,
    kind: BattleKind,
) -> BattleResult<BattleContext> {
    if player.is_fainted() {
        return Err(ConfigurationError::Invalid(
            "cannot start a battle with a fainted creature".to_string(),
        )
        .into());
    }

    let opponent_instance = match opponent {
        OpponentSpec::Instance(instance) => instance,
        OpponentSpec::Wild { species, level } => CreatureInstance::new(dex, species, level)?,
    };
    if opponent_instance.is_fainted() {
        return Err(ConfigurationError::Invalid(
            "cannot start a battle against a fainted creature".to_string(),
        )
        .into());
    }

    let player_state = CombatantState::from_instance(dex, player, Side::Player)?;
    let opponent_state = CombatantState::from_instance(dex, &opponent_instance, Side::Opponent)?;
    let mut context = BattleContext::new(player_state, opponent_state, kind);

    let mut bus = EventBus::new();
    execute_command_batch(
        vec![
            BattleCommand::EmitEvent(BattleEvent::BattleStarted {
                kind,
                player_species: context.player.species,
                opponent_species: context.opponent.species,
            }),
            BattleCommand::SetPhase(BattlePhase::AwaitingActions),
        ],
        &mut context,
        &mut bus,
        dex,
    )?;
    context.event_log.extend(bus.into_events());

    info!(
        %kind,
        player = %context.player.name,
        opponent = %context.opponent.name,
        "Battle started"
    );
    Ok(context)
}

// --- Action collection ---

/// Validate and store `action` for `side`. Rejected actions leave the context untouched.
pub fn submit_action(
    context: &mut BattleContext,
    dex: &Dex,
    side: Side,
    action: BattleAction,
) -> BattleResult<()> {
    if context.is_ended() {
        return Err(InvalidActionError::BattleEnded.into());
    }
    if context.phase != BattlePhase::AwaitingActions {
        return Err(InvalidActionError::NotAwaitingActions.into());
    }
    if context.pending_action(side).is_some() {
        return Err(InvalidActionError::AlreadySubmitted(side).into());
    }

    validate_action(context, dex, side, &action)?;

    debug!(%side, %action, "Action submitted");
    context.pending_actions[side.to_index()] = Some(action);
    Ok(())
}

fn validate_action(
    context: &BattleContext,
    dex: &Dex,
    side: Side,
    action: &BattleAction,
) -> BattleResult<()> {
    match action {
        BattleAction::UseMove { move_index } => {
            let combatant = context.combatant(side);
            // With every slot dry, any move choice becomes the fallback
            if combatant.must_use_fallback() {
                return Ok(());
            }
            let slot = combatant
                .moves
                .get(*move_index)
                .copied()
                .flatten()
                .ok_or(InvalidMoveError::EmptySlot { slot: *move_index })?;
            if slot.pp == 0 {
                return Err(InvalidMoveError::NoPpRemaining { slot: *move_index }.into());
            }
            dex.move_data(slot.move_id)?;
            Ok(())
        }
        BattleAction::AttemptCapture { .. } => can_attempt_capture(context, side),
        BattleAction::Flee => {
            if context.kind != BattleKind::Wild {
                return Err(InvalidActionError::FleeNotAllowed(context.kind).into());
            }
            if side != Side::Player {
                return Err(InvalidActionError::NotAllowedForSide {
                    side,
                    action: "flee".to_string(),
                }
                .into());
            }
            Ok(())
        }
        BattleAction::UseItem { .. } => {
            if side != Side::Player {
                return Err(InvalidActionError::NotAllowedForSide {
                    side,
                    action: "use items".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }
}

/// Every action `side` could submit right now.
pub fn valid_actions(
    context: &BattleContext,
    side: Side,
    items: &dyn ItemHandler,
) -> Vec<BattleAction> {
    if context.phase != BattlePhase::AwaitingActions {
        return Vec::new();
    }

    let combatant = context.combatant(side);
    let mut actions: Vec<BattleAction> = if combatant.must_use_fallback() {
        vec![BattleAction::UseMove { move_index: 0 }]
    } else {
        combatant
            .moves
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some_and(|slot| slot.pp > 0))
            .map(|(move_index, _)| BattleAction::UseMove { move_index })
            .collect()
    };

    if side == Side::Player {
        if context.kind == BattleKind::Wild {
            actions.extend(
                CaptureDevice::ALL
                    .into_iter()
                    .map(|device| BattleAction::AttemptCapture { device }),
            );
            actions.push(BattleAction::Flee);
        }
        actions.extend(
            items
                .available_items()
                .into_iter()
                .map(|item| BattleAction::UseItem { item }),
        );
    }

    actions
}

/// Ask the injected policy for the opponent's action and submit it.
pub fn collect_opponent_action(
    context: &mut BattleContext,
    dex: &Dex,
    policy: &dyn OpponentPolicy,
) -> BattleResult<BattleAction> {
    let action = policy.choose_action(context, dex);
    submit_action(context, dex, Side::Opponent, action)?;
    Ok(action)
}

// --- Turn resolution ---

/// Resolve one full turn. Needs both actions submitted.
///
/// A recoverable error restores the context and generator to their state before
/// the call and drops both pending actions. A configuration error aborts the battle.
pub fn advance_turn(
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    items: &dyn ItemHandler,
) -> BattleResult<TurnResult> {
    if context.is_ended() {
        return Err(InvalidActionError::BattleEnded.into());
    }
    if context.phase != BattlePhase::AwaitingActions {
        return Err(InvalidActionError::NotAwaitingActions.into());
    }
    if context.pending_actions.iter().any(Option::is_none) {
        return Err(InvalidActionError::ActionsMissing.into());
    }

    let context_snapshot = context.clone();
    let rng_snapshot = rng.clone();
    let turn_number = context.turn_number;
    let mut bus = EventBus::new();

    match resolve_turn(context, dex, config, rng, items, &mut bus) {
        Ok(()) => {
            let events = bus.into_events();
            context.event_log.extend(events.iter().cloned());
            Ok(TurnResult {
                turn_number,
                events,
                outcome: context.outcome.clone(),
            })
        }
        Err(error) => {
            *context = context_snapshot;
            *rng = rng_snapshot;
            // Both sides choose again
            context.pending_actions = [None, None];
            if error.is_fatal() {
                abort_battle(context, &error);
            }
            Err(error)
        }
    }
}

fn abort_battle(context: &mut BattleContext, error: &BattleEngineError) {
    warn!(%error, turn = context.turn_number, "Battle aborted");
    let outcome = BattleOutcome::Aborted(error.to_string());
    context.outcome = outcome.clone();
    context.phase = BattlePhase::Ended;
    context.pending_actions = [None, None];
    context.event_log.push(BattleEvent::BattleEnded { outcome });
}

fn resolve_turn(
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    items: &dyn ItemHandler,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let turn_number = context.turn_number;
    debug!(turn_number, "Turn started");

    // 1. Initialize the turn.
    execute_command_batch(
        vec![
            BattleCommand::SetPhase(BattlePhase::ResolvingTurn),
            BattleCommand::EmitEvent(BattleEvent::TurnStarted { turn_number }),
        ],
        context,
        bus,
        dex,
    )?;

    // 2. Schedule and run actions until someone faints or the battle ends.
    let mut action_stack = ActionStack::build_initial(context, dex)?;
    let tick_order = action_stack.sides();
    while let Some(action) = action_stack.pop_front() {
        if battle_interrupted(context) {
            break;
        }
        execute_turn_action(action, context, dex, config, rng, items, bus)?;
    }

    // 3. End-of-turn ticks, first actor first. Capture and flee still tick,
    // including an actor whose action was cancelled; a faint skips the rest.
    for side in tick_order {
        if anyone_fainted(context) {
            break;
        }
        apply_end_of_turn_status(side, context, dex, config, rng, bus)?;
    }

    // 4. Check the outcome.
    execute_command(BattleCommand::SetPhase(BattlePhase::CheckOutcome), context, bus, dex)?;
    check_outcome(context, dex, config, bus)?;
    finalize_turn(context, dex, bus)
}

fn battle_interrupted(context: &BattleContext) -> bool {
    context.outcome.is_terminal() || anyone_fainted(context)
}

fn anyone_fainted(context: &BattleContext) -> bool {
    context.player.is_fainted() || context.opponent.is_fainted()
}

fn execute_turn_action(
    action: TurnAction,
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    items: &dyn ItemHandler,
    bus: &mut EventBus,
) -> BattleResult<()> {
    match action {
        TurnAction::AttemptCapture { side, device } => {
            execute_capture(side, device, context, dex, config, rng, bus)
        }
        TurnAction::Flee { side } => {
            debug!(%side, "Fled from battle");
            execute_command_batch(
                vec![
                    BattleCommand::EmitEvent(BattleEvent::Fled { side }),
                    BattleCommand::SetOutcome(BattleOutcome::Fled),
                ],
                context,
                bus,
                dex,
            )
        }
        TurnAction::UseItem { side, item } => {
            let effect = items.use_item(item, context.combatant(side))?;
            let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::ItemUsed { side, item })];
            match effect {
                ItemEffect::Heal(amount) => commands.push(BattleCommand::Heal {
                    target: side,
                    amount,
                }),
                ItemEffect::CureStatus => commands.push(BattleCommand::CureStatus { target: side }),
                ItemEffect::RestorePp { slot, amount } => commands.push(BattleCommand::RestorePp {
                    target: side,
                    slot,
                    amount,
                }),
                ItemEffect::NoEffect => {}
            }
            execute_command_batch(commands, context, bus, dex)
        }
        TurnAction::UseMove { side, selection } => {
            execute_move(side, selection, context, dex, config, rng, bus)
        }
    }
}

fn execute_capture(
    side: Side,
    device: CaptureDevice,
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    can_attempt_capture(context, side)?;

    let target = side.opponent();
    let attempt = CaptureAttempt::from_target(context.combatant(target), device);
    let result = attempt_capture(context.combatant(target), &attempt, dex, config, rng)?;
    debug!(%device, probability = result.probability, success = result.success, "Capture attempted");

    let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::CaptureAttempted {
        device,
        probability: result.probability,
    })];
    for shake_number in 1..=result.shake_count {
        commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureShake { shake_number }));
    }
    if result.success {
        commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureSucceeded {
            species: context.combatant(target).species,
        }));
        commands.push(BattleCommand::SetOutcome(BattleOutcome::Captured));
    } else {
        commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureFailed {
            shake_count: result.shake_count,
        }));
    }
    execute_command_batch(commands, context, bus, dex)
}

fn execute_move(
    side: Side,
    selection: MoveSelection,
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let defender_side = side.opponent();

    // 1. Conditions that stop the move outright.
    if let Some(reason) = check_action_preventing_conditions(context.combatant(side), config, rng) {
        return execute_command(
            BattleCommand::EmitEvent(BattleEvent::ActionPrevented { side, reason }),
            context,
            bus,
            dex,
        );
    }

    // 2. Confusion may turn the attack inward.
    if matches!(
        context.combatant(side).status,
        Some(StatusCondition::Confusion { .. })
    ) && rng.chance("confusion self-hit", config.confusion_self_hit_chance)
    {
        let amount = confusion_self_hit_damage(context.combatant(side), config);
        return execute_command(
            BattleCommand::DealDamage {
                target: side,
                amount,
                source: DamageSource::Confusion,
            },
            context,
            bus,
            dex,
        );
    }

    // 3. Calculate the outcome against the current state.
    let outcome = compute_damage(
        context.combatant(side),
        context.combatant(defender_side),
        selection,
        dex,
        config,
        rng,
    )?;

    let mut commands = Vec::new();
    match selection {
        MoveSelection::Known(slot) => {
            commands.push(BattleCommand::EmitEvent(BattleEvent::MoveUsed {
                side,
                move_id: outcome.move_id,
                move_name: outcome.move_name.clone(),
            }));
            commands.push(BattleCommand::SpendPp { target: side, slot });
        }
        MoveSelection::Fallback => {
            commands.push(BattleCommand::EmitEvent(BattleEvent::FallbackMoveUsed { side }));
        }
    }

    // 4. Turn the outcome into commands.
    if outcome.missed {
        commands.push(BattleCommand::EmitEvent(BattleEvent::MoveMissed { side }));
        return execute_command_batch(commands, context, bus, dex);
    }

    if outcome.damaging {
        if outcome.effectiveness == 0.0 {
            commands.push(BattleCommand::EmitEvent(BattleEvent::Effectiveness {
                multiplier: 0.0,
            }));
            return execute_command_batch(commands, context, bus, dex);
        }
        if outcome.critical {
            commands.push(BattleCommand::EmitEvent(BattleEvent::CriticalHit { side }));
        }
        commands.push(BattleCommand::EmitEvent(BattleEvent::Effectiveness {
            multiplier: outcome.effectiveness,
        }));
        commands.push(BattleCommand::DealDamage {
            target: defender_side,
            amount: outcome.amount,
            source: DamageSource::Move,
        });
    } else if outcome.effectiveness == 0.0
        && outcome.status_inflicted.is_none()
        && outcome.stat_changes.is_empty()
    {
        commands.push(BattleCommand::EmitEvent(BattleEvent::Effectiveness {
            multiplier: 0.0,
        }));
    }

    if let Some(status) = outcome.status_inflicted {
        commands.push(BattleCommand::InflictStatus {
            target: defender_side,
            status,
        });
    }
    for change in &outcome.stat_changes {
        commands.push(BattleCommand::ChangeStatStage {
            target: change.target,
            stat: change.stat,
            delta: change.stages,
        });
    }
    if outcome.recoil > 0 {
        commands.push(BattleCommand::DealDamage {
            target: side,
            amount: outcome.recoil,
            source: DamageSource::Recoil,
        });
    }

    execute_command_batch(commands, context, bus, dex)
}

/// Returns Some(reason) if the move should be prevented, None if it can proceed
fn check_action_preventing_conditions(
    combatant: &CombatantState,
    config: &BattleConfig,
    rng: &mut TurnRng,
) -> Option<PreventionReason> {
    match combatant.status? {
        StatusCondition::Sleep { .. } => Some(PreventionReason::Asleep),
        StatusCondition::Freeze => Some(PreventionReason::Frozen),
        StatusCondition::Paralysis => rng
            .chance("full paralysis", config.paralysis_full_chance)
            .then_some(PreventionReason::FullyParalyzed),
        StatusCondition::Poison | StatusCondition::Burn | StatusCondition::Confusion { .. } => {
            None
        }
    }
}

fn apply_end_of_turn_status(
    side: Side,
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let combatant = context.combatant(side);
    if combatant.is_fainted() {
        return Ok(());
    }
    let Some(status) = combatant.status else {
        return Ok(());
    };
    let max_hp = combatant.max_hp();
    let current_hp = combatant.current_hp;

    let commands = match status {
        StatusCondition::Poison => vec![BattleCommand::DealDamage {
            target: side,
            amount: (max_hp / config.poison_divisor).max(1),
            source: DamageSource::Status(status),
        }],
        StatusCondition::Burn => vec![BattleCommand::DealDamage {
            target: side,
            amount: (max_hp / config.burn_divisor).max(1),
            source: DamageSource::Status(status),
        }],
        StatusCondition::Sleep { turns_remaining } => {
            let turns_remaining = turns_remaining.saturating_sub(1);
            if turns_remaining == 0 {
                vec![BattleCommand::CureStatus { target: side }]
            } else {
                let status = StatusCondition::Sleep { turns_remaining };
                countdown_commands(side, status, current_hp)
            }
        }
        StatusCondition::Confusion { turns_remaining } => {
            let turns_remaining = turns_remaining.saturating_sub(1);
            if turns_remaining == 0 {
                vec![BattleCommand::CureStatus { target: side }]
            } else {
                let status = StatusCondition::Confusion { turns_remaining };
                countdown_commands(side, status, current_hp)
            }
        }
        StatusCondition::Freeze => {
            if rng.chance("thaw", config.freeze_thaw_chance) {
                vec![BattleCommand::CureStatus { target: side }]
            } else {
                Vec::new()
            }
        }
        StatusCondition::Paralysis => Vec::new(),
    };

    execute_command_batch(commands, context, bus, dex)
}

fn countdown_commands(side: Side, status: StatusCondition, current_hp: u16) -> Vec<BattleCommand> {
    vec![
        BattleCommand::UpdateStatus {
            target: side,
            status: Some(status),
        },
        BattleCommand::EmitEvent(BattleEvent::StatusTick {
            side,
            status,
            damage: 0,
            remaining_hp: current_hp,
        }),
    ]
}

fn check_outcome(
    context: &mut BattleContext,
    dex: &Dex,
    config: &BattleConfig,
    bus: &mut EventBus,
) -> BattleResult<()> {
    // Capture and flee already settled the outcome
    if context.outcome.is_terminal() {
        return Ok(());
    }

    if context.opponent.is_fainted() {
        let mut commands = Vec::new();
        if !context.experience_awarded {
            let award = award_experience(
                &context.player,
                context.opponent.species,
                context.opponent.level,
                context.kind,
                dex,
                config,
            )?;
            commands.push(BattleCommand::ApplyExperienceAward {
                target: Side::Player,
                award: Box::new(award),
            });
        }
        commands.push(BattleCommand::SetOutcome(BattleOutcome::Victory));
        return execute_command_batch(commands, context, bus, dex);
    }

    if context.player.is_fainted() {
        return execute_command(BattleCommand::SetOutcome(BattleOutcome::Defeat), context, bus, dex);
    }

    Ok(())
}

fn finalize_turn(context: &mut BattleContext, dex: &Dex, bus: &mut EventBus) -> BattleResult<()> {
    let turn_number = context.turn_number;
    let mut commands = vec![
        BattleCommand::EmitEvent(BattleEvent::TurnEnded { turn_number }),
        BattleCommand::ClearPendingActions,
    ];

    if context.outcome.is_terminal() {
        info!(outcome = ?context.outcome, turn_number, "Battle ended");
        commands.push(BattleCommand::SetPhase(BattlePhase::Ended));
        commands.push(BattleCommand::EmitEvent(BattleEvent::BattleEnded {
            outcome: context.outcome.clone(),
        }));
    } else {
        commands.push(BattleCommand::IncrementTurnNumber);
        commands.push(BattleCommand::SetPhase(BattlePhase::AwaitingActions));
    }

    debug!(turn_number, "Turn ended");
    execute_command_batch(commands, context, bus, dex)
}

// --- Conclusion ---

/// Snapshot both creatures for write-back. Only valid once the battle has ended.
pub fn conclude(context: &BattleContext) -> BattleResult<BattleConclusion> {
    if !context.is_ended() {
        return Err(InvalidActionError::BattleNotEnded.into());
    }
    Ok(BattleConclusion {
        outcome: context.outcome.clone(),
        player: context.player.to_instance(),
        opponent: context.opponent.to_instance(),
        player_evolution_ready: context.player_evolution_ready,
    })
}
