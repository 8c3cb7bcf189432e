use crate::battle::combatant::CombatantState;
use crate::battle::engine::{advance_turn, start_battle, submit_action, OpponentSpec};
use crate::battle::items::NoItems;
use crate::battle::state::{BattleAction, BattleContext, BattleKind, Side, TurnResult, TurnRng};
use crate::config::BattleConfig;
use crate::creature::{CreatureInstance, StatusCondition};
use crate::dex::Dex;
use crate::errors::BattleResult;
use schema::MoveId;

/// The built-in dex. Panics if the embedded data does not load.
pub fn test_dex() -> Dex {
    match Dex::builtin() {
        Ok(dex) => dex,
        Err(err) => panic!("Failed to load built-in dex: {}", err),
    }
}

/// A builder for creating test creatures with common defaults.
///
/// # Example
/// ```ignore
/// let creature = TestCreatureBuilder::new("Voltmouse", 25)
///     .with_moves(&[MoveId(9)])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestCreatureBuilder {
    species: String,
    level: u8,
    moves: Option<Vec<MoveId>>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
}

impl TestCreatureBuilder {
    /// Creates a new builder for a species name and level.
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            moves: None,
            status: None,
            current_hp: None,
        }
    }

    /// Sets the moves for the test creature.
    pub fn with_moves(mut self, moves: &[MoveId]) -> Self {
        self.moves = Some(moves.to_vec());
        self
    }

    /// Sets the status condition for the test creature.
    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP for the test creature. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Builds the `CreatureInstance`.
    pub fn build(self) -> CreatureInstance {
        let dex = test_dex();
        let species = match dex.species_by_name(&self.species) {
            Some(data) => data.id,
            None => panic!("Unknown test species {}", self.species),
        };

        let built = match &self.moves {
            Some(moves) => CreatureInstance::with_moves(&dex, species, self.level, moves),
            None => CreatureInstance::new(&dex, species, self.level),
        };
        let mut creature = match built {
            Ok(creature) => creature,
            Err(err) => panic!("Failed to build {}: {}", self.species, err),
        };

        creature.status = self.status;
        if let Some(hp) = self.current_hp {
            creature.current_hp = hp;
        }
        creature
    }

    /// Builds a battle-ready `CombatantState` for `side`.
    pub fn build_combatant(self, side: Side) -> CombatantState {
        let name = self.species.clone();
        let creature = self.build();
        match CombatantState::from_instance(&test_dex(), &creature, side) {
            Ok(state) => state,
            Err(err) => panic!("Failed to enter {} into battle: {}", name, err),
        }
    }
}

/// Starts a battle between two prepared creatures, ready for actions.
pub fn create_test_battle(
    player: CreatureInstance,
    opponent: CreatureInstance,
    kind: BattleKind,
) -> BattleContext {
    assert_ok(start_battle(
        &test_dex(),
        &player,
        OpponentSpec::Instance(opponent),
        kind,
    ))
}

/// Submit both actions and resolve the turn with default config and no items.
pub fn run_turn(
    context: &mut BattleContext,
    player_action: BattleAction,
    opponent_action: BattleAction,
    rng: &mut TurnRng,
) -> TurnResult {
    let dex = test_dex();
    assert_ok(submit_action(context, &dex, Side::Player, player_action));
    assert_ok(submit_action(context, &dex, Side::Opponent, opponent_action));
    assert_ok(advance_turn(
        context,
        &dex,
        &BattleConfig::default(),
        rng,
        &NoItems,
    ))
}

/// Creates a `TurnRng` instance with a long list of default values (50).
/// Useful for tests where the specific RNG outcome is not important, preventing panics from exhaustion.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100]) // Provide a generous buffer of RNG values
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
