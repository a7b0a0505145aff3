//! Property tests for ingestion and shot bookkeeping

use battleship_core::test_utils::GameHarness;
use battleship_core::{Axis, ButtonOutcome, Coord, GameState, Grid, IngestOutcome, Outcome};
use proptest::prelude::*;

/// Any byte the ingester must drop
fn noise_byte() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("board bytes are not noise", |b| *b != b'0' && *b != b'1')
}

/// 64 board cells, each optionally followed by a noise byte
fn noisy_board() -> impl Strategy<Value = Vec<(bool, Option<u8>)>> {
    prop::collection::vec((any::<bool>(), prop::option::of(noise_byte())), 64)
}

/// One board byte per bit of `ships`, row-major from bit 0
fn ship_bytes(ships: u64) -> Vec<u8> {
    (0..64).map(|i| if ships & (1 << i) != 0 { b'1' } else { b'0' }).collect()
}

fn cell(row: u8, col: u8) -> Coord {
    Coord::new(row, col).unwrap()
}

/// Drive the cursor straight through the shared game, skipping the keypad
fn aim(harness: &GameHarness, row: u8, col: u8) {
    if harness.game.axis() == Axis::Row {
        harness.game.apply_key(9);
    }
    harness.game.apply_key(col + 1);
    harness.game.apply_key(9);
    harness.game.apply_key(row + 1);
    harness.game.apply_key(9);
}

proptest! {
    #[test]
    fn prop_ingested_board_matches_stream(cells in noisy_board()) {
        let mut harness = GameHarness::new();
        let mut stream = Vec::new();
        let mut accepted = Vec::new();
        for &(ship, noise) in &cells {
            let byte = if ship { b'1' } else { b'0' };
            stream.push(byte);
            accepted.push(byte);
            if let Some(noise) = noise {
                stream.push(noise);
            }
        }

        let mut completed = None;
        for &byte in &stream {
            if let IngestOutcome::Completed { ship_cells } = harness.receive(&[byte]).unwrap() {
                completed = Some(ship_cells);
            }
        }

        let expected_ships = cells.iter().filter(|(ship, _)| *ship).count() as u8;
        prop_assert_eq!(completed, Some(expected_ships));
        prop_assert_eq!(harness.state(), GameState::MapLoaded);
        prop_assert_eq!(harness.game.ship_cell_count(), expected_ships);
        prop_assert_eq!(harness.cursor(), Coord::ORIGIN);
        prop_assert_eq!(harness.serial.sent(), &accepted[..]);

        let ships = harness.game.ships();
        for (index, &(ship, _)) in cells.iter().enumerate() {
            let target = Coord::from_index(index as u8).unwrap();
            prop_assert_eq!(ships.contains(target), ship);
        }
    }

    #[test]
    fn prop_bytes_after_completion_are_ignored(
        ships in any::<u64>(),
        extra in prop::collection::vec(any::<u8>(), 1..32),
    ) {
        let mut harness = GameHarness::new();
        let board = ship_bytes(ships);
        harness.receive(&board).unwrap();
        let before = harness.game.snapshot();

        for &byte in &extra {
            prop_assert_eq!(harness.receive(&[byte]).unwrap(), IngestOutcome::Ignored);
        }
        prop_assert_eq!(harness.game.snapshot(), before);
        prop_assert_eq!(harness.serial.sent().len(), 64);
    }

    #[test]
    fn prop_shot_bookkeeping(
        ships in any::<u64>(),
        targets in prop::collection::vec((0..8u8, 0..8u8), 1..40),
    ) {
        let mut harness = GameHarness::new();
        let board = ship_bytes(ships);
        harness.receive(&board).unwrap();
        prop_assert_eq!(harness.press_button().unwrap(), ButtonOutcome::Started);

        let ship_grid = Grid::from_bits(ships);
        let ship_cells = ship_grid.count() as u8;
        let mut shot_before = Grid::EMPTY;

        for &(row, col) in &targets {
            if harness.state() != GameState::GameStarted {
                break;
            }
            let before = harness.game.snapshot();
            aim(&harness, row, col);

            let ButtonOutcome::Shot(report) = harness.press_button().unwrap() else {
                panic!("expected a shot while playing");
            };
            let target = cell(row, col);
            let first_at_ship = ship_grid.contains(target) && !shot_before.contains(target);
            shot_before.insert(target);

            prop_assert_eq!(report.target, target);
            prop_assert_eq!(report.tally.shots_taken, before.shots_taken + 1);
            prop_assert_eq!(report.hit, first_at_ship);
            prop_assert_eq!(report.tally.hits_scored, before.hits_scored + first_at_ship as u8);
            prop_assert!(harness.game.shots().contains(target));

            let over = report.tally.shots_taken >= 16 || report.tally.hits_scored >= ship_cells;
            prop_assert_eq!(report.game_over, over);
            let expected_state = if over {
                GameState::GameFinished
            } else {
                GameState::GameStarted
            };
            prop_assert_eq!(harness.state(), expected_state);
        }

        let snap = harness.game.snapshot();
        prop_assert!(snap.shots_taken <= 16);
        prop_assert!(snap.hits_scored <= snap.ship_cells);
        let hits_on_ships = (snap.ships.bits() & snap.shots.bits()).count_ones();
        prop_assert_eq!(snap.hits_scored as u32, hits_on_ships);
        if let Some(outcome) = snap.outcome() {
            let won = snap.hits_scored >= snap.ship_cells;
            prop_assert_eq!(outcome, if won { Outcome::Won } else { Outcome::Lost });
        }
    }

    #[test]
    fn prop_keys_edit_only_the_current_axis(keys in prop::collection::vec(1..=9u8, 0..64)) {
        let mut harness = GameHarness::new();
        harness.start(&[(7, 7)]).unwrap();
        for key in keys {
            let before = harness.cursor();
            let axis = harness.game.axis();
            harness.game.apply_key(key);
            prop_assert_eq!(harness.state(), GameState::GameStarted);
            let after = harness.cursor();

            if key == 9 {
                prop_assert_eq!(after, before);
                prop_assert_ne!(harness.game.axis(), axis);
            } else if axis == Axis::Row {
                prop_assert_eq!(after.row(), key - 1);
                prop_assert_eq!(after.col(), before.col());
            } else {
                prop_assert_eq!(after.col(), key - 1);
                prop_assert_eq!(after.row(), before.row());
            }
        }
    }

    #[test]
    fn prop_keys_outside_play_never_move_the_cursor(
        loaded in prop::collection::vec(prop::sample::select(vec![b'0', b'1']), 0..64),
        keys in prop::collection::vec(1..=9u8, 1..16),
    ) {
        let mut harness = GameHarness::new();
        harness.receive(&loaded).unwrap();
        let before = harness.game.snapshot();

        for key in keys {
            harness.game.apply_key(key);
        }
        prop_assert_eq!(harness.game.snapshot(), before);
    }
}
