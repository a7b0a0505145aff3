//! Shot resolution against the selected cell

use portable_atomic::Ordering;

use crate::board::Grid;
use crate::shared::SharedGame;
use crate::types::{Coord, Outcome};

/// Shot and hit counters plus the win threshold
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShotTally {
    pub shots_taken: u8,
    pub hits_scored: u8,
    pub ship_cells: u8,
}

impl ShotTally {
    /// The game is over once the cap is reached or every ship cell is hit
    pub const fn is_over(&self, shot_cap: u8) -> bool {
        self.shots_taken >= shot_cap || self.hits_scored >= self.ship_cells
    }

    pub const fn outcome(&self) -> Outcome {
        Outcome::from_tally(self.hits_scored, self.ship_cells)
    }
}

/// Result of one resolved shot
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShotReport {
    pub target: Coord,
    /// First shot at a ship cell
    pub hit: bool,
    /// The cell had already been shot
    pub repeat: bool,
    pub tally: ShotTally,
    pub game_over: bool,
}

/// Apply one shot at `target`.
///
/// Every shot counts against the cap, repeats included. Only the first shot
/// at a ship cell scores. The cell is marked as shot either way.
pub fn resolve(
    ships: Grid,
    shots: &mut Grid,
    target: Coord,
    tally: &mut ShotTally,
    shot_cap: u8,
) -> ShotReport {
    tally.shots_taken = tally.shots_taken.saturating_add(1);

    let fresh = shots.insert(target);
    let hit = fresh && ships.contains(target);
    if hit {
        tally.hits_scored += 1;
    }

    ShotReport {
        target,
        hit,
        repeat: !fresh,
        tally: *tally,
        game_over: tally.is_over(shot_cap),
    }
}

impl SharedGame {
    /// Resolve a shot at the current selection; caller holds the critical section
    pub(crate) fn resolve_shot(&self, shot_cap: u8) -> ShotReport {
        let ships = self.ships();
        let mut shots = self.shots();
        let mut tally = ShotTally {
            shots_taken: self.shots_taken(),
            hits_scored: self.hits_scored(),
            ship_cells: self.ship_cell_count(),
        };

        let report = resolve(ships, &mut shots, self.selection(), &mut tally, shot_cap);

        self.shots.store(shots.bits(), Ordering::Relaxed);
        self.shots_taken.store(tally.shots_taken, Ordering::Relaxed);
        self.hits_scored.store(tally.hits_scored, Ordering::Relaxed);
        report
    }
}
