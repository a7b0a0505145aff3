//! Whole-game scenarios through the mock board

use battleship_core::hal::mock::DisplayOp;
use battleship_core::hal::IndicatorLine;
use battleship_core::render::{MAP_LOADED_TEXT, WELCOME_TEXT};
use battleship_core::test_utils::board_maps::{empty_board, horizontal_ship, with_line_noise};
use battleship_core::test_utils::GameHarness;
use battleship_core::{
    Axis, ButtonOutcome, Coord, DigitPosition, GameConfig, GameState, IngestOutcome, KeyAction,
    Outcome, StepOutcome, SEGMENT_PATTERNS,
};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> GameHarness {
    GameHarness::new()
}

/// Outcome of the current game, once it has finished
fn outcome_of(harness: &GameHarness) -> Option<Outcome> {
    harness.game.snapshot().outcome()
}

#[rstest]
fn test_welcome_screen_on_power_up(mut harness: GameHarness) {
    assert_eq!(harness.step().unwrap(), StepOutcome::Painted(GameState::Welcome));
    assert_eq!(harness.display().last_text(), Some(WELCOME_TEXT));
    assert_eq!(harness.settle(4).unwrap(), 0);
}

#[rstest]
fn test_map_loaded_message(mut harness: GameHarness) {
    harness.step().unwrap();
    let outcome = harness.load(&[(2, 2)]).unwrap();
    assert_eq!(outcome, IngestOutcome::Completed { ship_cells: 1 });

    assert_eq!(harness.step().unwrap(), StepOutcome::Painted(GameState::MapLoaded));
    assert_eq!(harness.display().last_text(), Some(MAP_LOADED_TEXT));
    assert!(harness
        .display()
        .ops()
        .iter()
        .any(|op| matches!(op, DisplayOp::Text(3, _))));
}

/// 0 ships and 0 hits is a win on the very first shot
#[rstest]
fn test_scenario_a_empty_board_is_an_immediate_win(mut harness: GameHarness) {
    harness.receive(&empty_board()).unwrap();
    assert_eq!(harness.state(), GameState::MapLoaded);
    assert_eq!(harness.game.ship_cell_count(), 0);

    assert_eq!(harness.press_button().unwrap(), ButtonOutcome::Started);
    let ButtonOutcome::Shot(report) = harness.press_button().unwrap() else {
        panic!("expected a shot");
    };
    assert!(report.game_over);
    assert_eq!(harness.state(), GameState::GameFinished);
    assert_eq!(outcome_of(&harness), Some(Outcome::Won));

    harness.settle(4).unwrap();
    assert_eq!(harness.display().last_text(), Some("You Won"));
}

#[rstest]
fn test_scenario_b_single_ship_sunk_first_shot(mut harness: GameHarness) {
    harness.start(&[(0, 0)]).unwrap();

    let ButtonOutcome::Shot(report) = harness.fire_at(0, 0).unwrap() else {
        panic!("expected a shot");
    };
    assert!(report.hit);
    assert_eq!(report.tally.hits_scored, 1);
    assert_eq!(harness.state(), GameState::GameFinished);
    assert_eq!(outcome_of(&harness), Some(Outcome::Won));

    // Six toggles: the hit LED ends where it started
    assert_eq!(harness.button_leds.hit_toggles(), 6);
    assert!(!harness.button_leds.is_on(IndicatorLine::HitLed));
}

#[rstest]
fn test_scenario_c_sixteen_misses_lose(mut harness: GameHarness) {
    harness.start(&[(7, 7)]).unwrap();

    let targets: Vec<(u8, u8)> = (0..16u8).map(|i| (i / 8, i % 8)).collect();
    for (n, &(row, col)) in targets.iter().enumerate() {
        let ButtonOutcome::Shot(report) = harness.fire_at(row, col).unwrap() else {
            panic!("expected a shot");
        };
        assert!(!report.hit);
        assert_eq!(report.tally.shots_taken as usize, n + 1);
        assert_eq!(report.game_over, n == 15);
    }

    assert_eq!(harness.state(), GameState::GameFinished);
    assert_eq!(outcome_of(&harness), Some(Outcome::Lost));
    harness.settle(4).unwrap();
    assert_eq!(harness.display().last_text(), Some("Game Over"));
}

#[rstest]
fn test_scenario_d_axis_toggle_round_trip(mut harness: GameHarness) {
    harness.start(&[(7, 7)]).unwrap();
    assert_eq!(harness.press_key(4).unwrap(), StepOutcome::KeyApplied(KeyAction::SetColumn(3)));

    assert_eq!(
        harness.press_key(9).unwrap(),
        StepOutcome::KeyApplied(KeyAction::ToggledAxis(Axis::Row))
    );
    for key in 1..=8 {
        harness.press_key(key).unwrap();
        assert_eq!(harness.cursor().col(), 3);
        assert_eq!(harness.cursor().row(), key - 1);
    }
    assert_eq!(
        harness.press_key(9).unwrap(),
        StepOutcome::KeyApplied(KeyAction::ToggledAxis(Axis::Column))
    );
    assert_eq!(harness.game.axis(), Axis::Column);
    assert_eq!(harness.cursor(), Coord::new(7, 3).unwrap());
}

#[rstest]
#[case::empty_board(&[], &[(4, 4)], Outcome::Won, 1)]
#[case::one_ship_first_shot(&[(0, 0)], &[(0, 0)], Outcome::Won, 1)]
#[case::sunk_after_a_miss(&[(3, 4), (3, 5)], &[(0, 0), (3, 4), (3, 5)], Outcome::Won, 3)]
#[case::repeat_shots_burn_the_cap(&[(6, 6)], &[(1, 1); 16], Outcome::Lost, 16)]
#[case::last_shot_sinks(&[(5, 0)], &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (1, 0),
    (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7), (5, 0)], Outcome::Won, 16)]
fn test_game_outcome(
    mut harness: GameHarness,
    #[case] ships: &[(u8, u8)],
    #[case] shots: &[(u8, u8)],
    #[case] expected: Outcome,
    #[case] shots_taken: u8,
) {
    harness.start(ships).unwrap();
    for &(row, col) in shots {
        assert_eq!(harness.state(), GameState::GameStarted);
        harness.fire_at(row, col).unwrap();
    }

    assert_eq!(harness.state(), GameState::GameFinished);
    assert_eq!(harness.game.shots_taken(), shots_taken);
    assert_eq!(outcome_of(&harness), Some(expected));
}

#[rstest]
fn test_board_glyphs_follow_shots(mut harness: GameHarness) {
    let ship = horizontal_ship(2, 1, 3);
    harness.start(&ship).unwrap();

    harness.fire_at(2, 2).unwrap();
    harness.fire_at(0, 0).unwrap();
    harness.settle(4).unwrap();

    let display = harness.display();
    assert_eq!(display.glyph_at(2 * 17, 2 * 8), Some('X'));
    assert_eq!(display.glyph_at(0, 0), Some('0'));
    assert_eq!(display.glyph_at(17, 2 * 8), Some('-'));
    assert_eq!(display.glyph_at(3 * 17, 2 * 8), Some('-'));
}

#[rstest]
fn test_digits_show_cursor_and_shot_count(mut harness: GameHarness) {
    harness.start(&[(7, 7)]).unwrap();
    for _ in 0..12 {
        harness.fire_at(0, 5).unwrap();
    }
    harness.press_key(9).unwrap();
    harness.press_key(3).unwrap();

    let ones = harness.tick().unwrap().unwrap();
    assert_eq!((ones.position, ones.digit), (DigitPosition::Ones, 3));
    assert_eq!(harness.digits.pattern(), SEGMENT_PATTERNS[3]);

    let tens = harness.tick().unwrap().unwrap();
    assert_eq!((tens.position, tens.digit), (DigitPosition::Tens, 1));

    let units = harness.tick().unwrap().unwrap();
    assert_eq!((units.position, units.digit), (DigitPosition::Hundreds, 2));
}

#[rstest]
fn test_digits_dark_outside_play(mut harness: GameHarness) {
    assert_eq!(harness.tick().unwrap(), None);
    harness.load(&[(1, 1)]).unwrap();
    assert_eq!(harness.tick().unwrap(), None);
    assert_eq!(harness.digits.enabled(), None);
}

#[rstest]
fn test_noise_between_board_bytes_is_dropped(mut harness: GameHarness) {
    let board = battleship_core::test_utils::board_bytes(&[(0, 7), (4, 4)]);
    let last = harness.receive(&with_line_noise(&board)).unwrap();

    // The trailing CR/LF after the 64th byte is ignored
    assert_eq!(last, IngestOutcome::Ignored);
    assert_eq!(harness.state(), GameState::MapLoaded);
    assert_eq!(harness.serial.sent(), &board[..]);
    assert_eq!(harness.game.ship_cell_count(), 2);
}

#[rstest]
fn test_button_before_board_is_ignored(mut harness: GameHarness) {
    assert_eq!(harness.press_button().unwrap(), ButtonOutcome::Ignored);
    assert_eq!(harness.state(), GameState::Welcome);
    assert!(harness.game.is_dirty());
}

#[rstest]
fn test_reset_clears_board_and_replay_needs_new_load(mut harness: GameHarness) {
    harness.start(&[(0, 0)]).unwrap();
    harness.fire_at(0, 0).unwrap();
    harness.settle(4).unwrap();
    assert_eq!(harness.foreground.indicators().buzzer_toggles(), 10);

    assert_eq!(harness.press_button().unwrap(), ButtonOutcome::Reset);
    let snap = harness.game.snapshot();
    assert_eq!(snap.state, GameState::Welcome);
    assert!(snap.ships.is_empty());
    assert!(snap.shots.is_empty());
    assert_eq!(snap.ship_cells, 0);
    assert_eq!(snap.axis, Axis::Column);

    harness.settle(4).unwrap();
    assert_eq!(harness.display().last_text(), Some(WELCOME_TEXT));
    assert!(!harness.foreground.indicators().is_on(IndicatorLine::AxisLed));

    // A second game plays against the newly loaded board only
    harness.start(&[(5, 5)]).unwrap();
    let ButtonOutcome::Shot(report) = harness.fire_at(0, 0).unwrap() else {
        panic!("expected a shot");
    };
    assert!(!report.hit);

    // And the buzzer sounds again when it ends
    for _ in 0..15 {
        harness.fire_at(1, 1).unwrap();
    }
    harness.settle(4).unwrap();
    assert_eq!(harness.foreground.indicators().buzzer_toggles(), 20);
}

#[rstest]
fn test_axis_led_tracks_editing_axis(mut harness: GameHarness) {
    harness.start(&[(3, 3)]).unwrap();
    harness.press_key(9).unwrap();
    assert!(harness.foreground.indicators().is_on(IndicatorLine::AxisLed));
    harness.press_key(9).unwrap();
    assert!(!harness.foreground.indicators().is_on(IndicatorLine::AxisLed));
}

#[rstest]
fn test_custom_shot_cap() {
    let config = GameConfig::new(3, 2, 4, 10, 10, 10).unwrap();
    let mut harness = GameHarness::with_config(config);
    harness.start(&[(7, 7)]).unwrap();

    for _ in 0..3 {
        harness.fire_at(0, 0).unwrap();
    }
    assert_eq!(harness.state(), GameState::GameFinished);
    harness.settle(4).unwrap();
    assert_eq!(harness.foreground.indicators().buzzer_toggles(), 4);
}
