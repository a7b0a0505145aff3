//! Board ingestion over the serial link
//!
//! While the game is in `Welcome`, every `'0'` or `'1'` received fills the
//! next cell of the ship map (row-major) and is echoed back as an
//! acknowledgement. Other bytes are dropped without an echo and do not move
//! the cursor. The 64th accepted byte completes the board and moves the game
//! to `MapLoaded`. Bytes arriving in any other state are ignored.

use portable_atomic::Ordering;

use crate::board::Grid;
use crate::fsm::{next_state, GameEvent};
use crate::hal::{HalError, SerialPort};
use crate::shared::SharedGame;
use crate::types::{Coord, GameState, GRID_SIZE};

pub const EMPTY_CELL_BYTE: u8 = b'0';
pub const SHIP_CELL_BYTE: u8 = b'1';

/// Decode one board byte: `Some(true)` for a ship, `Some(false)` for water
pub const fn decode_cell(byte: u8) -> Option<bool> {
    match byte {
        SHIP_CELL_BYTE => Some(true),
        EMPTY_CELL_BYTE => Some(false),
        _ => None,
    }
}

/// What happened to one received byte
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestOutcome {
    /// Not a board byte, or the game is not accepting a board
    Ignored,
    /// Cell written, board still incomplete
    Accepted { cell: Coord, ship: bool },
    /// Last cell written; the game is now `MapLoaded`
    Completed { ship_cells: u8 },
}

impl IngestOutcome {
    pub const fn is_accepted(&self) -> bool {
        !matches!(self, IngestOutcome::Ignored)
    }
}

/// Handle one byte from the receive interrupt
pub fn on_rx_byte<S: SerialPort>(
    game: &SharedGame,
    byte: u8,
    serial: &mut S,
) -> Result<IngestOutcome, HalError> {
    let Some(ship) = decode_cell(byte) else {
        #[cfg(feature = "defmt")]
        defmt::trace!("Dropped board byte {=u8:#x}", byte);
        return Ok(IngestOutcome::Ignored);
    };

    let outcome = critical_section::with(|_| store_cell(game, ship));

    if outcome.is_accepted() {
        serial.write_blocking(byte)?;
    }

    #[cfg(feature = "defmt")]
    if let IngestOutcome::Completed { ship_cells } = outcome {
        defmt::info!("Board loaded, {=u8} ship cells", ship_cells);
    }

    Ok(outcome)
}

/// Write one cell and advance the cursor; caller holds the critical section
fn store_cell(game: &SharedGame, ship: bool) -> IngestOutcome {
    if !game.state().accepts_board_bytes() {
        return IngestOutcome::Ignored;
    }

    let row = game.row.load(Ordering::Relaxed);
    let col = game.col.load(Ordering::Relaxed);
    let Some(cell) = Coord::new(row, col) else {
        // Cursor ran off the board; refuse rather than index outside it
        #[cfg(feature = "defmt")]
        defmt::warn!("Ingestion cursor out of range ({=u8}, {=u8})", row, col);
        return IngestOutcome::Ignored;
    };

    let mut ships = Grid::from_bits(game.ships.load(Ordering::Relaxed));
    ships.set(cell, ship);
    game.ships.store(ships.bits(), Ordering::Relaxed);

    let mut ship_cells = game.ship_cells.load(Ordering::Relaxed);
    if ship {
        ship_cells += 1;
        game.ship_cells.store(ship_cells, Ordering::Relaxed);
    }

    let (next_row, next_col) = if col + 1 == GRID_SIZE {
        (row + 1, 0)
    } else {
        (row, col + 1)
    };

    if next_row == GRID_SIZE {
        game.row.store(0, Ordering::Relaxed);
        game.col.store(0, Ordering::Relaxed);
        game.set_state(next_state(GameState::Welcome, GameEvent::BoardComplete));
        game.mark_dirty();
        return IngestOutcome::Completed { ship_cells };
    }

    game.row.store(next_row, Ordering::Relaxed);
    game.col.store(next_col, Ordering::Relaxed);
    IngestOutcome::Accepted { cell, ship }
}
