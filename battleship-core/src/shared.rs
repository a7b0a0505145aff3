//! Game state shared between the foreground loop and interrupt handlers

use portable_atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use crate::board::{CellView, Grid};
use crate::selector::{CoordinateSelector, KeyAction};
use crate::types::{Axis, Coord, GameState, Outcome};

/// Atomic game state, safe to place in a `static` and touch from any context.
///
/// Each scalar is one atomic. Updates spanning several fields (cursor
/// advance, shot resolution, reset, key application) run inside
/// `critical_section::with`, so no reader in another context sees them half
/// done. Blocking work never happens inside those sections.
pub struct SharedGame {
    pub(crate) state: AtomicU8,
    pub(crate) ships: AtomicU64,
    pub(crate) shots: AtomicU64,
    pub(crate) ship_cells: AtomicU8,
    pub(crate) shots_taken: AtomicU8,
    pub(crate) hits_scored: AtomicU8,
    /// Selection cursor, doubling as the ingestion cursor while Welcome
    pub(crate) row: AtomicU8,
    pub(crate) col: AtomicU8,
    pub(crate) editing_row: AtomicBool,
    dirty: AtomicBool,
}

/// Consistent copy of everything the foreground needs for one paint
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameSnapshot {
    pub state: GameState,
    pub ships: Grid,
    pub shots: Grid,
    pub selection: Coord,
    pub axis: Axis,
    pub ship_cells: u8,
    pub shots_taken: u8,
    pub hits_scored: u8,
}

impl GameSnapshot {
    pub fn cell(&self, cell: Coord) -> CellView {
        CellView::of(self.ships, self.shots, cell)
    }

    /// Result of the game, only once it has finished
    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            GameState::GameFinished => Some(Outcome::from_tally(self.hits_scored, self.ship_cells)),
            _ => None,
        }
    }

    /// 1-based coordinate currently being edited
    pub fn edited_coordinate(&self) -> u8 {
        match self.axis {
            Axis::Column => self.selection.col() + 1,
            Axis::Row => self.selection.row() + 1,
        }
    }
}

impl SharedGame {
    /// Power-up state: Welcome with everything zeroed
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(GameState::Welcome as u8),
            ships: AtomicU64::new(0),
            shots: AtomicU64::new(0),
            ship_cells: AtomicU8::new(0),
            shots_taken: AtomicU8::new(0),
            hits_scored: AtomicU8::new(0),
            row: AtomicU8::new(0),
            col: AtomicU8::new(0),
            editing_row: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> GameState {
        GameState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: GameState) {
        self.state.store(state.as_u8(), Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!("Game state -> {:?}", state);
    }

    pub fn ships(&self) -> Grid {
        Grid::from_bits(self.ships.load(Ordering::Relaxed))
    }

    pub fn shots(&self) -> Grid {
        Grid::from_bits(self.shots.load(Ordering::Relaxed))
    }

    pub fn ship_cell_count(&self) -> u8 {
        self.ship_cells.load(Ordering::Relaxed)
    }

    pub fn shots_taken(&self) -> u8 {
        self.shots_taken.load(Ordering::Relaxed)
    }

    pub fn hits_scored(&self) -> u8 {
        self.hits_scored.load(Ordering::Relaxed)
    }

    pub fn axis(&self) -> Axis {
        Axis::from_bool(self.editing_row.load(Ordering::Relaxed))
    }

    /// Current cursor; out-of-range raw values clamp to the origin
    pub fn selection(&self) -> Coord {
        let row = self.row.load(Ordering::Relaxed);
        let col = self.col.load(Ordering::Relaxed);
        Coord::new(row, col).unwrap_or(Coord::ORIGIN)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Consume the render-dirty flag, returning whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Read every field at once
    pub fn snapshot(&self) -> GameSnapshot {
        critical_section::with(|_| GameSnapshot {
            state: self.state(),
            ships: self.ships(),
            shots: self.shots(),
            selection: self.selection(),
            axis: self.axis(),
            ship_cells: self.ship_cell_count(),
            shots_taken: self.shots_taken(),
            hits_scored: self.hits_scored(),
        })
    }

    /// Zero every game field; called on entry to Welcome
    pub(crate) fn reset_for_welcome(&self) {
        critical_section::with(|_| {
            self.ships.store(0, Ordering::Relaxed);
            self.shots.store(0, Ordering::Relaxed);
            self.ship_cells.store(0, Ordering::Relaxed);
            self.shots_taken.store(0, Ordering::Relaxed);
            self.hits_scored.store(0, Ordering::Relaxed);
            self.row.store(0, Ordering::Relaxed);
            self.col.store(0, Ordering::Relaxed);
            self.editing_row.store(false, Ordering::Relaxed);
            self.set_state(GameState::Welcome);
            self.mark_dirty();
        });
    }

    pub(crate) fn selector(&self) -> CoordinateSelector {
        let cursor = self.selection();
        CoordinateSelector::new(cursor.row(), cursor.col(), self.axis())
    }

    pub(crate) fn store_selector(&self, selector: &CoordinateSelector) {
        let cursor = selector.selection();
        self.row.store(cursor.row(), Ordering::Relaxed);
        self.col.store(cursor.col(), Ordering::Relaxed);
        self.editing_row.store(selector.axis().is_row(), Ordering::Relaxed);
    }

    /// Feed one keypad key to the coordinate selector.
    ///
    /// Only applies while `GameStarted`. In `Welcome` the cursor belongs to
    /// board ingestion, and a key that settled across a state change must
    /// not move it.
    pub fn apply_key(&self, key: u8) -> KeyAction {
        critical_section::with(|_| {
            if self.state() != GameState::GameStarted {
                return KeyAction::None;
            }
            let mut selector = self.selector();
            let action = selector.apply(key);
            self.store_selector(&selector);
            action
        })
    }
}

impl Default for SharedGame {
    fn default() -> Self {
        Self::new()
    }
}
