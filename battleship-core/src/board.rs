//! 8x8 boolean grids packed into a `u64`, one bit per cell (row-major)

use crate::types::{Coord, CELL_COUNT};

/// Ship placement (ShipMap) or shot record (PlayMap)
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Grid(u64);

impl Grid {
    pub const EMPTY: Grid = Grid(0);

    pub const fn from_bits(bits: u64) -> Self {
        Grid(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn contains(&self, cell: Coord) -> bool {
        self.0 & (1 << cell.index()) != 0
    }

    /// Set or clear one cell
    pub fn set(&mut self, cell: Coord, value: bool) {
        let mask = 1u64 << cell.index();
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Mark a cell, returning true if it was not already marked
    pub fn insert(&mut self, cell: Coord) -> bool {
        let fresh = !self.contains(cell);
        self.set(cell, true);
        fresh
    }

    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Marked cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..CELL_COUNT)
            .filter_map(Coord::from_index)
            .filter(move |cell| self.contains(*cell))
    }
}

/// What a board cell shows to the player
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CellView {
    /// Not shot yet
    Unknown,
    /// Shot and a ship is there
    Hit,
    /// Shot and empty water
    Miss,
}

impl CellView {
    pub const fn of(ships: Grid, shots: Grid, cell: Coord) -> CellView {
        match (shots.contains(cell), ships.contains(cell)) {
            (false, _) => CellView::Unknown,
            (true, true) => CellView::Hit,
            (true, false) => CellView::Miss,
        }
    }

    pub const fn glyph(&self) -> char {
        match self {
            CellView::Unknown => '-',
            CellView::Hit => 'X',
            CellView::Miss => '0',
        }
    }
}
