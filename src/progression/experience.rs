use super::evolution::evolution_ready;
use super::rewards::RewardCalculator;
use crate::battle::combatant::CombatantState;
use crate::battle::state::BattleKind;
use crate::config::BattleConfig;
use crate::creature::{calculate_stats, MoveSlot, Stats, MAX_EV_PER_STAT};
use crate::dex::Dex;
use crate::errors::BattleResult;
use schema::{MoveId, SpeciesId};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedMove {
    pub slot: usize,
    pub move_id: MoveId,
    pub name: String,
    pub pp: u8,
}

/// A move the winner could learn but has no free slot for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedMove {
    pub move_id: MoveId,
    pub name: String,
}

/// Everything the winner gains from one knockout. Computed, not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceAward {
    pub exp_gained: u32,
    pub total_experience: u32,
    pub old_level: u8,
    pub new_level: u8,
    pub leveled_up: bool,
    pub evolution_ready: Option<SpeciesId>,
    pub learned_moves: Vec<LearnedMove>,
    pub blocked_moves: Vec<BlockedMove>,
    pub ev_gain: [u8; 6],
    pub new_evs: [u8; 6],
    pub new_stats: Stats,
}

/// Work out what `winner` earns for knocking out `fainted_species` at `fainted_level`.
///
/// The experience amount depends only on the fainted creature and the battle kind,
/// so applying two awards yields the sum of both.
pub fn award_experience(
    winner: &CombatantState,
    fainted_species: SpeciesId,
    fainted_level: u8,
    kind: BattleKind,
    dex: &Dex,
    config: &BattleConfig,
) -> BattleResult<ExperienceAward> {
    let calculator = RewardCalculator;
    let winner_data = dex.species(winner.species)?;
    let fainted_data = dex.species(fainted_species)?;

    // 1. Experience and the level it reaches.
    let exp_gained = calculator.calculate_exp_yield(fainted_data, fainted_level, kind, config);
    let total_experience = winner.experience.saturating_add(exp_gained);
    let new_level = winner_data
        .experience_group
        .level_for_exp(total_experience, config.max_level)
        .max(winner.level);

    // 2. Effort values, capped per stat.
    let ev_gain = calculator.calculate_ev_yield(fainted_data).as_array();
    let mut new_evs = winner.evs;
    for (ev, gain) in new_evs.iter_mut().zip(ev_gain) {
        *ev = ev.saturating_add(gain).min(MAX_EV_PER_STAT);
    }

    let new_stats = calculate_stats(&winner_data.base_stats, new_level, &winner.ivs, &new_evs);

    // 3. Moves from every level crossed, filling empty slots in order.
    let mut slots = winner.moves;
    let mut learned_moves = Vec::new();
    let mut blocked_moves = Vec::new();
    for level in winner.level.saturating_add(1)..=new_level {
        for move_id in winner_data.learnset.learns_at_level(level) {
            let already_known = slots.iter().flatten().any(|slot| slot.move_id == *move_id);
            if already_known {
                continue;
            }
            let move_data = dex.move_data(*move_id)?;
            match slots.iter().position(|slot| slot.is_none()) {
                Some(index) => {
                    slots[index] = Some(MoveSlot {
                        move_id: *move_id,
                        pp: move_data.max_pp,
                    });
                    learned_moves.push(LearnedMove {
                        slot: index,
                        move_id: *move_id,
                        name: move_data.name.clone(),
                        pp: move_data.max_pp,
                    });
                }
                None => blocked_moves.push(BlockedMove {
                    move_id: *move_id,
                    name: move_data.name.clone(),
                }),
            }
        }
    }

    let award = ExperienceAward {
        exp_gained,
        total_experience,
        old_level: winner.level,
        new_level,
        leveled_up: new_level > winner.level,
        evolution_ready: evolution_ready(winner_data, new_level),
        learned_moves,
        blocked_moves,
        ev_gain,
        new_evs,
        new_stats,
    };
    debug!(
        winner = %winner.name,
        exp = award.exp_gained,
        old_level = award.old_level,
        new_level = award.new_level,
        "Experience awarded"
    );
    Ok(award)
}
