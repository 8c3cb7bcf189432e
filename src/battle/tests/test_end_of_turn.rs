#[cfg(test)]
mod tests {
    use crate::battle::engine::conclude;
    use crate::battle::state::{
        BattleAction, BattleContext, BattleEvent, BattleKind, BattleOutcome, Side, TurnRng,
    };
    use crate::battle::tests::common::{
        create_test_battle, predictable_rng, run_turn, TestCreatureBuilder,
    };
    use crate::creature::{CreatureInstance, StatusCondition};
    use pretty_assertions::assert_eq;
    use schema::{CaptureDevice, MoveId};

    const FIRST_MOVE: BattleAction = BattleAction::UseMove { move_index: 0 };

    // Howl and Harden never draw, so only the ticks touch the generator
    fn quiet_player(level: u8) -> TestCreatureBuilder {
        TestCreatureBuilder::new("Gustling", level).with_moves(&[MoveId(21)])
    }

    fn quiet_opponent() -> TestCreatureBuilder {
        TestCreatureBuilder::new("Pebblit", 15).with_moves(&[MoveId(22)])
    }

    fn no_draws() -> TurnRng {
        TurnRng::new_for_test(Vec::new())
    }

    fn battle(player: CreatureInstance, opponent: CreatureInstance) -> BattleContext {
        create_test_battle(player, opponent, BattleKind::Wild)
    }

    fn ticks(events: &[BattleEvent]) -> Vec<(Side, u16)> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::StatusTick { side, damage, .. } => Some((*side, *damage)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_poison_deals_an_eighth() {
        let player = quiet_player(30).with_status(StatusCondition::Poison).build();
        let mut battle = battle(player, quiet_opponent().build());
        let max_hp = battle.player.max_hp();

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());

        assert_eq!(ticks(&result.events), vec![(Side::Player, max_hp / 8)]);
        assert_eq!(battle.player.current_hp, max_hp - max_hp / 8);
        assert_eq!(battle.player.status, Some(StatusCondition::Poison));
    }

    #[test]
    fn test_burn_deals_a_sixteenth() {
        let player = quiet_player(30).with_status(StatusCondition::Burn).build();
        let mut battle = battle(player, quiet_opponent().build());
        let max_hp = battle.player.max_hp();

        run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());

        assert_eq!(battle.player.current_hp, max_hp - max_hp / 16);
    }

    #[test]
    fn test_tick_damage_is_at_least_one() {
        let player = quiet_player(1).with_status(StatusCondition::Burn).build();
        let mut battle = battle(player, quiet_opponent().build());
        let max_hp = battle.player.max_hp();
        assert!(max_hp < 16);

        run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());

        assert_eq!(battle.player.current_hp, max_hp - 1);
    }

    #[test]
    fn test_sleep_counts_down_then_wakes() {
        let player = quiet_player(30)
            .with_status(StatusCondition::Sleep { turns_remaining: 2 })
            .build();
        let mut battle = battle(player, quiet_opponent().build());

        run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());
        assert_eq!(
            battle.player.status,
            Some(StatusCondition::Sleep { turns_remaining: 1 })
        );

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());
        assert_eq!(battle.player.status, None);
        assert!(result.events.iter().any(|event| matches!(
            event,
            BattleEvent::StatusCured {
                side: Side::Player,
                status: StatusCondition::Sleep { .. }
            }
        )));
    }

    #[test]
    fn test_confusion_wears_off() {
        let player = quiet_player(30)
            .with_status(StatusCondition::Confusion { turns_remaining: 1 })
            .build();
        let mut battle = battle(player, quiet_opponent().build());
        // Confusion self-hit check is the only draw
        let mut rng = TurnRng::new_for_test(vec![99]);

        run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut rng);

        assert_eq!(battle.player.status, None);
        assert_eq!(rng.remaining(), Some(0));
    }

    #[test]
    fn test_freeze_may_thaw() {
        let player = quiet_player(30).with_status(StatusCondition::Freeze).build();
        let mut battle = battle(player, quiet_opponent().build());

        run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut TurnRng::new_for_test(vec![0]));

        assert_eq!(battle.player.status, None);
    }

    #[test]
    fn test_paralysis_has_no_tick() {
        let player = quiet_player(30).with_status(StatusCondition::Paralysis).build();
        let mut battle = battle(player, quiet_opponent().build());
        // Only the full paralysis check draws
        let mut rng = TurnRng::new_for_test(vec![99]);

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut rng);

        assert!(ticks(&result.events).is_empty());
        assert_eq!(battle.player.current_hp, battle.player.max_hp());
        assert_eq!(battle.player.status, Some(StatusCondition::Paralysis));
    }

    #[test]
    fn test_ticks_follow_action_order() {
        let player = quiet_player(30).with_status(StatusCondition::Poison).build();
        let opponent = quiet_opponent().with_status(StatusCondition::Burn).build();
        let mut battle = battle(player, opponent);

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());

        let sides: Vec<Side> = ticks(&result.events).into_iter().map(|(side, _)| side).collect();
        assert_eq!(sides, vec![Side::Player, Side::Opponent]);
    }

    #[test]
    fn test_ticks_stop_once_someone_faints() {
        let player = quiet_player(30)
            .with_status(StatusCondition::Poison)
            .with_hp(1)
            .build();
        let opponent = quiet_opponent()
            .with_status(StatusCondition::Poison)
            .with_hp(1)
            .build();
        let mut battle = battle(player, opponent);

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut no_draws());

        assert_eq!(result.outcome, BattleOutcome::Defeat);
        assert_eq!(battle.opponent.current_hp, 1);
        assert_eq!(ticks(&result.events).len(), 1);
    }

    #[test]
    fn test_no_ticks_after_action_knockout() {
        let player = TestCreatureBuilder::new("Gustling", 30)
            .with_moves(&[MoveId(1)])
            .with_status(StatusCondition::Poison)
            .build();
        let opponent = quiet_opponent().with_hp(1).build();
        let mut battle = battle(player, opponent);

        let result = run_turn(&mut battle, FIRST_MOVE, FIRST_MOVE, &mut predictable_rng());

        assert_eq!(result.outcome, BattleOutcome::Victory);
        assert!(ticks(&result.events).is_empty());
    }

    #[test]
    fn test_flee_still_ticks_both_sides() {
        let player = quiet_player(30).with_status(StatusCondition::Poison).build();
        let opponent = quiet_opponent().with_status(StatusCondition::Burn).build();
        let mut battle = battle(player, opponent);
        let player_max = battle.player.max_hp();
        let opponent_max = battle.opponent.max_hp();

        let result = run_turn(&mut battle, BattleAction::Flee, FIRST_MOVE, &mut no_draws());

        assert_eq!(result.outcome, BattleOutcome::Fled);
        assert!(!result
            .events
            .iter()
            .any(|event| matches!(event, BattleEvent::MoveUsed { .. })));
        // The opponent never acted but its burn still ticks
        assert_eq!(
            ticks(&result.events),
            vec![
                (Side::Player, player_max / 8),
                (Side::Opponent, opponent_max / 16)
            ]
        );
        let conclusion = conclude(&battle).unwrap();
        assert_eq!(conclusion.player.current_hp, player_max - player_max / 8);
    }

    #[test]
    fn test_successful_capture_still_ticks() {
        let player = quiet_player(30).with_status(StatusCondition::Poison).build();
        let mut battle = battle(player, quiet_opponent().build());
        let max_hp = battle.player.max_hp();
        let mut rng = TurnRng::new_for_test(vec![254]);

        let result = run_turn(
            &mut battle,
            BattleAction::AttemptCapture {
                device: CaptureDevice::Master,
            },
            FIRST_MOVE,
            &mut rng,
        );

        assert_eq!(result.outcome, BattleOutcome::Captured);
        assert_eq!(ticks(&result.events), vec![(Side::Player, max_hp / 8)]);
        assert_eq!(battle.player.current_hp, max_hp - max_hp / 8);
        assert_eq!(rng.remaining(), Some(0));
    }
}
