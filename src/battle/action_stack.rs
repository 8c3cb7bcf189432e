use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::battle::combatant::CombatantState;
use crate::battle::damage::MoveSelection;
use crate::battle::state::{BattleAction, BattleContext, Side};
use crate::battle::stats::effective_speed;
use crate::dex::Dex;
use crate::errors::{BattleResult, InvalidActionError};
use schema::{CaptureDevice, ItemId};
use tracing::debug;

/// Executable actions for one turn, already resolved against the actor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    AttemptCapture { side: Side, device: CaptureDevice },
    Flee { side: Side },
    UseItem { side: Side, item: ItemId },
    /// A move from a known slot, or the fallback once every slot is dry.
    UseMove { side: Side, selection: MoveSelection },
}

impl TurnAction {
    pub fn side(&self) -> Side {
        match self {
            TurnAction::AttemptCapture { side, .. }
            | TurnAction::Flee { side }
            | TurnAction::UseItem { side, .. }
            | TurnAction::UseMove { side, .. } => *side,
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionStack {
    actions: VecDeque<TurnAction>,
}

// A helper struct local to this implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActionPriority {
    action_priority: i8, // Capture/Flee: 10, Item: 6, Move: 0
    move_priority: i8,   // Priority from move data (e.g., Quick Attack)
    speed: u16,          // Effective speed for tiebreaking
}

impl ActionStack {
    /// Creates a new, empty ActionStack.
    pub fn new() -> Self {
        Self {
            actions: VecDeque::new(),
        }
    }

    /// Builds the ordered stack for a turn from the pending action pair.
    pub fn build_initial(context: &BattleContext, dex: &Dex) -> BattleResult<Self> {
        // 1. Both actions must be present.
        let (Some(player_action), Some(opponent_action)) = (
            context.pending_action(Side::Player),
            context.pending_action(Side::Opponent),
        ) else {
            return Err(InvalidActionError::ActionsMissing.into());
        };

        // 2. Determine the execution order.
        let order = order_actions(
            &player_action,
            &opponent_action,
            &context.player,
            &context.opponent,
            dex,
        );
        debug!(first = %order[0], second = %order[1], "Scheduled turn order");

        // 3. Convert into executable actions.
        let mut stack = Self::new();
        for side in order {
            let action = match side {
                Side::Player => player_action,
                Side::Opponent => opponent_action,
            };
            stack.push_back(Self::resolve_action(side, action, context.combatant(side)));
        }

        Ok(stack)
    }

    /// Adds an action to the end of the execution queue.
    pub fn push_back(&mut self, action: TurnAction) {
        self.actions.push_back(action);
    }

    /// Removes and returns the next action to be executed from the front of the queue.
    pub fn pop_front(&mut self) -> Option<TurnAction> {
        self.actions.pop_front()
    }

    /// Sides in the order their actions are queued.
    pub fn sides(&self) -> Vec<Side> {
        self.actions.iter().map(TurnAction::side).collect()
    }

    // --- Private Helper Functions ---

    fn resolve_action(side: Side, action: BattleAction, actor: &CombatantState) -> TurnAction {
        match action {
            BattleAction::AttemptCapture { device } => TurnAction::AttemptCapture { side, device },
            BattleAction::Flee => TurnAction::Flee { side },
            BattleAction::UseItem { item } => TurnAction::UseItem { side, item },
            BattleAction::UseMove { move_index } => {
                // Determine if the move should become the fallback due to 0 PP everywhere.
                let selection = if actor.must_use_fallback() {
                    MoveSelection::Fallback
                } else {
                    MoveSelection::Known(move_index)
                };
                TurnAction::UseMove { side, selection }
            }
        }
    }
}

/// Execution order for the turn. Deterministic: exact ties go to the player.
pub fn order_actions(
    player_action: &BattleAction,
    opponent_action: &BattleAction,
    player_state: &CombatantState,
    opponent_state: &CombatantState,
    dex: &Dex,
) -> [Side; 2] {
    let player = calculate_action_priority(player_action, player_state, dex);
    let opponent = calculate_action_priority(opponent_action, opponent_state, dex);

    // Sort by action priority (highest first), then move priority, then speed.
    let ordering = opponent
        .action_priority
        .cmp(&player.action_priority)
        .then(opponent.move_priority.cmp(&player.move_priority))
        .then(opponent.speed.cmp(&player.speed));

    match ordering {
        Ordering::Greater => [Side::Opponent, Side::Player],
        Ordering::Less | Ordering::Equal => [Side::Player, Side::Opponent],
    }
}

fn calculate_action_priority(
    action: &BattleAction,
    actor: &CombatantState,
    dex: &Dex,
) -> ActionPriority {
    let speed = effective_speed(actor);
    match action {
        BattleAction::AttemptCapture { .. } | BattleAction::Flee => ActionPriority {
            action_priority: 10,
            move_priority: 0,
            speed,
        },
        BattleAction::UseItem { .. } => ActionPriority {
            action_priority: 6,
            move_priority: 0,
            speed,
        },
        BattleAction::UseMove { move_index } => {
            // The fallback move carries no priority.
            let move_priority = if actor.must_use_fallback() {
                0
            } else {
                actor
                    .moves
                    .get(*move_index)
                    .copied()
                    .flatten()
                    .and_then(|slot| dex.move_data(slot.move_id).ok())
                    .map(|move_data| move_data.priority)
                    .unwrap_or(0)
            };
            ActionPriority {
                action_priority: 0,
                move_priority,
                speed,
            }
        }
    }
}
