//! Cursor selection driven by a single numeric keypad

use crate::types::{Axis, Coord, GRID_SIZE};

/// Key that switches between editing the column and the row
pub const AXIS_TOGGLE_KEY: u8 = 9;

/// What a key press did to the selection
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No key, or a key outside the keypad range
    None,
    /// Key 9 switched the editing axis; carries the new axis
    ToggledAxis(Axis),
    /// Keys 1-8 while editing the column; carries the 0-based column
    SetColumn(u8),
    /// Keys 1-8 while editing the row; carries the 0-based row
    SetRow(u8),
}

/// Selected cell plus the axis numeric keys edit
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoordinateSelector {
    row: u8,
    col: u8,
    axis: Axis,
}

impl CoordinateSelector {
    /// Out-of-range components clamp to the last row/column
    pub fn new(row: u8, col: u8, axis: Axis) -> Self {
        Self {
            row: row.min(GRID_SIZE - 1),
            col: col.min(GRID_SIZE - 1),
            axis,
        }
    }

    pub fn selection(&self) -> Coord {
        Coord::new(self.row, self.col).unwrap_or(Coord::ORIGIN)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Apply one keypad result (0 = nothing pressed)
    pub fn apply(&mut self, key: u8) -> KeyAction {
        match key {
            AXIS_TOGGLE_KEY => {
                self.axis = self.axis.toggled();
                KeyAction::ToggledAxis(self.axis)
            }
            1..=GRID_SIZE => {
                let index = key - 1;
                match self.axis {
                    Axis::Column => {
                        self.col = index;
                        KeyAction::SetColumn(index)
                    }
                    Axis::Row => {
                        self.row = index;
                        KeyAction::SetRow(index)
                    }
                }
            }
            _ => KeyAction::None,
        }
    }
}
