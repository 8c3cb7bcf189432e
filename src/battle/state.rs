use crate::battle::combatant::CombatantState;
use crate::creature::{CreatureInstance, StatusCondition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{CaptureDevice, ItemId, MoveId, SpeciesId, StatType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::trace;

/// Side target for commands - provides type safety over raw indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn to_index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn from_index(index: usize) -> Option<Side> {
        match index {
            0 => Some(Side::Player),
            1 => Some(Side::Opponent),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleKind {
    Wild,
    Trainer,
}

impl fmt::Display for BattleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleKind::Wild => write!(f, "Wild"),
            BattleKind::Trainer => write!(f, "Trainer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    Intro,
    AwaitingActions,
    ResolvingTurn,
    CheckOutcome,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Undetermined,
    Victory,
    Defeat,
    Captured,
    Fled,
    Aborted(String),
}

impl BattleOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BattleOutcome::Undetermined)
    }
}

/// An action submitted by one side for the coming turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleAction {
    UseMove { move_index: usize },
    AttemptCapture { device: CaptureDevice },
    Flee,
    UseItem { item: ItemId },
}

impl fmt::Display for BattleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleAction::UseMove { move_index } => write!(f, "use move {}", move_index),
            BattleAction::AttemptCapture { device } => write!(f, "throw a {}", device),
            BattleAction::Flee => write!(f, "flee"),
            BattleAction::UseItem { item } => write!(f, "use {}", item),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreventionReason {
    Asleep,
    Frozen,
    FullyParalyzed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    // Battle and turn management
    BattleStarted {
        kind: BattleKind,
        player_species: SpeciesId,
        opponent_species: SpeciesId,
    },
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded {
        turn_number: u32,
    },

    // Moves
    MoveUsed {
        side: Side,
        move_id: MoveId,
        move_name: String,
    },
    FallbackMoveUsed {
        side: Side,
    },
    MoveMissed {
        side: Side,
    },
    CriticalHit {
        side: Side,
    },
    Effectiveness {
        multiplier: f32,
    },

    // Damage
    DamageDealt {
        target: Side,
        amount: u16,
        remaining_hp: u16,
    },
    RecoilDamage {
        side: Side,
        amount: u16,
        remaining_hp: u16,
    },
    ConfusionSelfHit {
        side: Side,
        amount: u16,
        remaining_hp: u16,
    },

    // Status
    StatusInflicted {
        target: Side,
        status: StatusCondition,
    },
    StatusTick {
        side: Side,
        status: StatusCondition,
        damage: u16,
        remaining_hp: u16,
    },
    StatusCured {
        side: Side,
        status: StatusCondition,
    },
    ActionPrevented {
        side: Side,
        reason: PreventionReason,
    },

    // Stat stages
    StatStageChanged {
        target: Side,
        stat: StatType,
        old_stage: i8,
        new_stage: i8,
    },
    StatChangeBlocked {
        target: Side,
        stat: StatType,
        stages: i8,
    },

    // Items
    ItemUsed {
        side: Side,
        item: ItemId,
    },
    Healed {
        side: Side,
        amount: u16,
        new_hp: u16,
    },
    PpRestored {
        side: Side,
        slot: usize,
        amount: u8,
    },

    // Capture and escape
    CaptureAttempted {
        device: CaptureDevice,
        probability: f32,
    },
    CaptureShake {
        shake_number: u8,
    },
    CaptureSucceeded {
        species: SpeciesId,
    },
    CaptureFailed {
        shake_count: u8,
    },
    Fled {
        side: Side,
    },

    // Fainting and progression
    Fainted {
        side: Side,
    },
    ExperienceGained {
        side: Side,
        amount: u32,
    },
    LevelUp {
        side: Side,
        new_level: u8,
    },
    MoveLearned {
        side: Side,
        move_id: MoveId,
        move_name: String,
        slot: usize,
    },
    MoveLearnBlocked {
        side: Side,
        move_id: MoveId,
        move_name: String,
    },
    EvolutionReady {
        side: Side,
        species: SpeciesId,
        evolves_into: SpeciesId,
    },

    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, context: &BattleContext) -> Option<String> {
        let name = |side: &Side| context.combatant(*side).name.clone();

        match self {
            // === Turn Management Events ===
            BattleEvent::BattleStarted { kind, .. } => match kind {
                BattleKind::Wild => Some(format!("A wild {} appeared!", name(&Side::Opponent))),
                BattleKind::Trainer => Some(format!(
                    "The opposing trainer sent out {}!",
                    name(&Side::Opponent)
                )),
            },
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::TurnEnded { .. } => None,

            // === Move Events ===
            BattleEvent::MoveUsed {
                side, move_name, ..
            } => Some(format!("{} used {}!", name(side), move_name)),
            BattleEvent::FallbackMoveUsed { side } => {
                Some(format!("{} has no moves left and lashes out!", name(side)))
            }
            BattleEvent::MoveMissed { side } => Some(format!("{}'s attack missed!", name(side))),
            BattleEvent::CriticalHit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::Effectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 && m > 0.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None, // Normal effectiveness, no message
            },

            // === Damage Events ===
            BattleEvent::DamageDealt { target, amount, .. } => {
                Some(format!("{} took {} damage!", name(target), amount))
            }
            BattleEvent::RecoilDamage { side, .. } => {
                Some(format!("{} is damaged by recoil!", name(side)))
            }
            BattleEvent::ConfusionSelfHit { side, .. } => {
                Some(format!("{} hurt itself in its confusion!", name(side)))
            }

            // === Status Events ===
            BattleEvent::StatusInflicted { target, status } => Some(format!(
                "{} {}",
                name(target),
                Self::format_status_applied(status)
            )),
            BattleEvent::StatusTick {
                side,
                status,
                damage,
                ..
            } => match status {
                StatusCondition::Poison | StatusCondition::Burn => Some(format!(
                    "{} is hurt by its {}! ({} damage)",
                    name(side),
                    status.status_type(),
                    damage
                )),
                StatusCondition::Sleep { .. } => Some(format!("{} is fast asleep.", name(side))),
                _ => None,
            },
            BattleEvent::StatusCured { side, status } => Some(format!(
                "{} {}",
                name(side),
                Self::format_status_removed(status)
            )),
            BattleEvent::ActionPrevented { side, reason } => Some(format!(
                "{} {}",
                name(side),
                Self::format_prevention_reason(reason)
            )),

            // === Stat Change Events ===
            BattleEvent::StatStageChanged {
                target,
                stat,
                old_stage,
                new_stage,
            } => {
                if new_stage > old_stage {
                    Some(format!("{}'s {} rose!", name(target), stat))
                } else {
                    Some(format!("{}'s {} fell!", name(target), stat))
                }
            }
            BattleEvent::StatChangeBlocked {
                target,
                stat,
                stages,
            } => {
                let direction = if *stages > 0 { "higher" } else { "lower" };
                Some(format!(
                    "{}'s {} won't go any {}!",
                    name(target),
                    stat,
                    direction
                ))
            }

            // === Item Events ===
            BattleEvent::ItemUsed { side, item } => {
                Some(format!("{} used {}.", Self::format_trainer(side), item))
            }
            BattleEvent::Healed { side, amount, .. } => {
                Some(format!("{} recovered {} HP!", name(side), amount))
            }
            BattleEvent::PpRestored { side, amount, .. } => {
                Some(format!("{}'s move regained {} PP!", name(side), amount))
            }

            // === Capture Events ===
            BattleEvent::CaptureAttempted { device, .. } => {
                Some(format!("You threw a {}!", device))
            }
            BattleEvent::CaptureShake { .. } => Some("...the orb shakes...".to_string()),
            BattleEvent::CaptureSucceeded { .. } => {
                Some(format!("Gotcha! {} was caught!", name(&Side::Opponent)))
            }
            BattleEvent::CaptureFailed { .. } => {
                Some(format!("Oh no! {} broke free!", name(&Side::Opponent)))
            }
            BattleEvent::Fled { .. } => Some("Got away safely!".to_string()),

            // === Progression Events ===
            BattleEvent::Fainted { side } => Some(format!("{} fainted!", name(side))),
            BattleEvent::ExperienceGained { side, amount } => Some(format!(
                "{} gained {} experience points!",
                name(side),
                amount
            )),
            BattleEvent::LevelUp { side, new_level } => {
                Some(format!("{} grew to level {}!", name(side), new_level))
            }
            BattleEvent::MoveLearned {
                side, move_name, ..
            } => Some(format!("{} learned {}!", name(side), move_name)),
            BattleEvent::MoveLearnBlocked {
                side, move_name, ..
            } => Some(format!(
                "{} wants to learn {}, but already knows four moves.",
                name(side),
                move_name
            )),
            BattleEvent::EvolutionReady { side, .. } => {
                Some(format!("{} is ready to evolve!", name(side)))
            }

            // === Battle End Events ===
            BattleEvent::BattleEnded { outcome } => match outcome {
                BattleOutcome::Victory => Some("You won the battle!".to_string()),
                BattleOutcome::Defeat => Some("You lost the battle...".to_string()),
                BattleOutcome::Captured | BattleOutcome::Fled => None,
                BattleOutcome::Aborted(reason) => {
                    Some(format!("The battle was aborted: {}", reason))
                }
                BattleOutcome::Undetermined => None,
            },
        }
    }

    // --- Private Helper Functions ---

    fn format_trainer(side: &Side) -> &'static str {
        match side {
            Side::Player => "You",
            Side::Opponent => "The opponent",
        }
    }

    fn format_status_applied(status: &StatusCondition) -> &'static str {
        match status {
            StatusCondition::Sleep { .. } => "fell asleep!",
            StatusCondition::Poison => "was poisoned!",
            StatusCondition::Burn => "was burned!",
            StatusCondition::Freeze => "was frozen solid!",
            StatusCondition::Paralysis => "is paralyzed! It may be unable to move!",
            StatusCondition::Confusion { .. } => "became confused!",
        }
    }

    fn format_status_removed(status: &StatusCondition) -> String {
        match status {
            StatusCondition::Sleep { .. } => "woke up!".to_string(),
            StatusCondition::Freeze => "thawed out!".to_string(),
            StatusCondition::Confusion { .. } => "snapped out of its confusion!".to_string(),
            _ => format!("was cured of its {}!", status.status_type()),
        }
    }

    fn format_prevention_reason(reason: &PreventionReason) -> &'static str {
        match reason {
            PreventionReason::Asleep => "is fast asleep.",
            PreventionReason::Frozen => "is frozen solid!",
            PreventionReason::FullyParalyzed => "is fully paralyzed!",
        }
    }
}

/// Event bus for collecting and managing battle events.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = BattleEvent>) {
        self.events.extend(events);
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Formatted text for every non-silent event.
    pub fn formatted(&self, context: &BattleContext) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(context))
            .collect()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    /// Format the EventBus for printing. Shows debug format of all events.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    /// Pre-scripted outcomes, clamped into whatever range is requested.
    Scripted { outcomes: Vec<u8>, index: usize },
    Seeded(StdRng),
}

/// Every random decision in a battle flows through here, tagged with a reason.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Same seed, same battle.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::from_seed(seed)
    }

    /// Uniform integer in `range`.
    pub fn next_in_range(&mut self, reason: &str, range: RangeInclusive<u16>) -> u16 {
        let outcome = match &mut self.source {
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let value = outcomes[*index] as u16;
                *index += 1;
                value.clamp(*range.start(), *range.end())
            }
            RngSource::Seeded(rng) => rng.random_range(range),
        };

        trace!(reason, outcome, "[RNG] Consumed");
        outcome
    }

    /// True with `percent` probability. 0 and 100 are decided without a draw.
    pub fn chance(&mut self, reason: &str, percent: u8) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => self.next_in_range(reason, 0..=99) < p as u16,
        }
    }

    /// Scripted outcomes not yet consumed. Always None for seeded generators.
    pub fn remaining(&self) -> Option<usize> {
        match &self.source {
            RngSource::Scripted { outcomes, index } => Some(outcomes.len() - *index),
            RngSource::Seeded(_) => None,
        }
    }
}

/// Complete state of one battle. The engine never reaches outside it.
#[derive(Debug, Clone)]
pub struct BattleContext {
    pub player: CombatantState,
    pub opponent: CombatantState,
    pub kind: BattleKind,
    pub phase: BattlePhase,
    pub turn_number: u32,
    pub outcome: BattleOutcome,
    pub pending_actions: [Option<BattleAction>; 2],
    pub event_log: EventBus,
    pub experience_awarded: bool,
    pub player_evolution_ready: bool,
}

impl BattleContext {
    pub fn new(player: CombatantState, opponent: CombatantState, kind: BattleKind) -> Self {
        Self {
            player,
            opponent,
            kind,
            phase: BattlePhase::Intro,
            turn_number: 1,
            outcome: BattleOutcome::Undetermined,
            pending_actions: [None, None],
            event_log: EventBus::new(),
            experience_awarded: false,
            player_evolution_ready: false,
        }
    }

    pub fn combatant(&self, side: Side) -> &CombatantState {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut CombatantState {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn pending_action(&self, side: Side) -> Option<BattleAction> {
        self.pending_actions[side.to_index()]
    }

    pub fn is_ended(&self) -> bool {
        self.phase == BattlePhase::Ended
    }
}

/// Result of one `advance_turn` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    pub turn_number: u32,
    pub events: Vec<BattleEvent>,
    pub outcome: BattleOutcome,
}

/// Terminal report handed back to the caller for write-back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleConclusion {
    pub outcome: BattleOutcome,
    pub player: CreatureInstance,
    pub opponent: CreatureInstance,
    pub player_evolution_ready: bool,
}

#[cfg(test)]
mod event_formatting_tests {
    use super::*;
    use crate::battle::tests::common::TestCreatureBuilder;
    use pretty_assertions::assert_eq;

    fn create_test_context() -> BattleContext {
        let player = TestCreatureBuilder::new("Voltmouse", 25).build_combatant(Side::Player);
        let opponent = TestCreatureBuilder::new("Cindercub", 25).build_combatant(Side::Opponent);
        BattleContext::new(player, opponent, BattleKind::Wild)
    }

    #[test]
    fn test_silent_events_return_none() {
        let context = create_test_context();

        let silent_events = vec![
            BattleEvent::TurnEnded { turn_number: 1 },
            BattleEvent::Effectiveness { multiplier: 1.0 },
            BattleEvent::StatusTick {
                side: Side::Player,
                status: StatusCondition::Confusion { turns_remaining: 1 },
                damage: 0,
                remaining_hp: 10,
            },
        ];

        for event in silent_events {
            assert!(
                event.format(&context).is_none(),
                "Event {:?} should be silent but returned text",
                event
            );
        }
    }

    #[test]
    fn test_event_text_samples() {
        let context = create_test_context();

        assert_eq!(
            BattleEvent::TurnStarted { turn_number: 5 }.format(&context),
            Some("=== Turn 5 ===".to_string())
        );
        assert_eq!(
            BattleEvent::Effectiveness { multiplier: 0.25 }.format(&context),
            Some("It's not very effective...".to_string())
        );
        assert_eq!(
            BattleEvent::Effectiveness { multiplier: 0.0 }.format(&context),
            Some("It had no effect!".to_string())
        );
        assert_eq!(
            BattleEvent::Fainted {
                side: Side::Opponent
            }
            .format(&context),
            Some("Cindercub fainted!".to_string())
        );
        assert_eq!(
            BattleEvent::StatusCured {
                side: Side::Player,
                status: StatusCondition::Sleep { turns_remaining: 0 }
            }
            .format(&context),
            Some("Voltmouse woke up!".to_string())
        );
        assert_eq!(
            BattleEvent::StatChangeBlocked {
                target: Side::Opponent,
                stat: StatType::Attack,
                stages: -1
            }
            .format(&context),
            Some("Cindercub's Attack won't go any lower!".to_string())
        );
    }

    #[test]
    fn test_event_bus_collects_in_order() {
        let context = create_test_context();
        let mut event_bus = EventBus::new();
        event_bus.push(BattleEvent::TurnStarted { turn_number: 1 });
        event_bus.push(BattleEvent::CriticalHit { side: Side::Player });
        event_bus.push(BattleEvent::TurnEnded { turn_number: 1 });

        assert!(!event_bus.is_empty());
        assert_eq!(event_bus.len(), 3);
        assert_eq!(
            event_bus.formatted(&context),
            vec!["=== Turn 1 ===".to_string(), "A critical hit!".to_string()]
        );

        let display_output = format!("{}", event_bus);
        assert!(display_output.contains("TurnStarted"));
        assert!(display_output.contains("CriticalHit"));
    }

    #[test]
    fn test_events_serialize_to_json() {
        let event = BattleEvent::DamageDealt {
            target: Side::Opponent,
            amount: 12,
            remaining_hp: 30,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("DamageDealt"));
        assert!(json.contains("\"amount\":12"));
    }
}
