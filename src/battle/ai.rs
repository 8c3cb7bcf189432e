//! Decision making for the non-player side.

use crate::battle::combatant::{CombatantState, MAX_STAT_STAGE};
use crate::battle::effectiveness::effectiveness;
use crate::battle::state::{BattleAction, BattleContext, Side};
use crate::battle::stats::effective_attack;
use crate::dex::Dex;
use crate::errors::ConfigResult;
use ordered_float::OrderedFloat;
use schema::{MoveCategory, MoveEffect, Target};

/// Anything that can pick the opponent's action for a turn.
pub trait OpponentPolicy {
    /// Inspects the battle and decides on the opponent's next action.
    fn choose_action(&self, context: &BattleContext, dex: &Dex) -> BattleAction;
}

// Rough STAB weight used only for estimates
const STAB_ESTIMATE: f32 = 1.5;

/// Picks the move with the best damage-plus-utility estimate. Deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringPolicy;

impl ScoringPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Best move for `side`. Ties go to the earliest slot.
    pub fn choose_for(&self, side: Side, context: &BattleContext, dex: &Dex) -> BattleAction {
        let attacker = context.combatant(side);
        let defender = context.combatant(side.opponent());

        if attacker.must_use_fallback() {
            return BattleAction::UseMove { move_index: 0 };
        }

        attacker
            .moves
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some_and(|slot| slot.pp > 0))
            .map(|(move_index, _)| {
                let score = self
                    .score_move(move_index, attacker, defender, dex)
                    .unwrap_or(0.0);
                (move_index, score)
            })
            .rev()
            .max_by_key(|(_, score)| OrderedFloat(*score))
            .map(|(move_index, _)| BattleAction::UseMove { move_index })
            .unwrap_or(BattleAction::UseMove { move_index: 0 })
    }

    /// The core scoring logic. Assigns a floating-point value to a move slot.
    fn score_move(
        &self,
        move_index: usize,
        attacker: &CombatantState,
        defender: &CombatantState,
        dex: &Dex,
    ) -> ConfigResult<f32> {
        let Some(slot) = attacker.moves.get(move_index).copied().flatten() else {
            return Ok(-1.0);
        };
        let move_data = dex.move_data(slot.move_id)?;
        let multiplier = effectiveness(move_data.move_type, &defender.types);

        // --- Step 1: Calculate the Core Damage Score ---
        let mut damage_score = 0.0;
        if move_data.is_damaging() {
            // If the opponent is immune, this is a terrible move.
            if multiplier == 0.0 {
                return Ok(-1.0);
            }

            let base_power = move_data.power.unwrap_or(0) as f32;
            let stab = if attacker.has_type(move_data.move_type) {
                STAB_ESTIMATE
            } else {
                1.0
            };
            let effective_stat = effective_attack(attacker, move_data.category) as f32;
            let level_scalar = (attacker.level as f32 * 2.0).max(1.0);

            damage_score = base_power * multiplier * stab * (effective_stat / level_scalar);
        }

        // --- Step 2: Calculate the Utility Score ---
        let mut utility_score = 0.0;
        for effect in &move_data.effects {
            match effect {
                // Self-buffs are valuable if the stat isn't maxed out.
                MoveEffect::StatChange {
                    target: Target::User,
                    stat,
                    stages,
                    chance,
                } if *stages > 0 => {
                    let current_stage = attacker.stat_stages.get(*stat);
                    if current_stage < MAX_STAT_STAGE {
                        let potential_gain = 1.0 - (current_stage as f32 / MAX_STAT_STAGE as f32);
                        utility_score +=
                            20.0 * (*stages as f32) * potential_gain * (*chance as f32 / 100.0);
                    }
                }
                // Opponent debuffs are valuable if the stat isn't minimized.
                MoveEffect::StatChange {
                    target: Target::Target,
                    stat,
                    stages,
                    chance,
                } if *stages < 0 => {
                    if defender.stat_stages.get(*stat) > -MAX_STAT_STAGE && multiplier > 0.0 {
                        utility_score += 15.0 * (stages.abs() as f32) * (*chance as f32 / 100.0);
                    }
                }
                // Inflicting a status is very valuable, but only if the opponent is healthy.
                MoveEffect::InflictStatus { chance, .. } => {
                    if defender.status.is_none() && multiplier > 0.0 {
                        utility_score += 45.0 * (*chance as f32 / 100.0);
                    }
                }
                _ => {}
            }
        }

        // --- Step 3: Combine Scores and Apply Final Modifiers ---
        let mut final_score = damage_score + utility_score;

        // Don't use a Status move if it has no utility (e.g., trying to boost a maxed stat).
        if move_data.category == MoveCategory::Status && utility_score < 1.0 {
            return Ok(-1.0);
        }

        // Factor in accuracy for any move that targets the opponent.
        if move_data.category != MoveCategory::Status {
            let accuracy = move_data.accuracy.unwrap_or(101); // Slight edge to sure-hit moves
            final_score *= accuracy as f32 / 100.0;
        }

        Ok(final_score)
    }
}

impl OpponentPolicy for ScoringPolicy {
    fn choose_action(&self, context: &BattleContext, dex: &Dex) -> BattleAction {
        self.choose_for(Side::Opponent, context, dex)
    }
}
