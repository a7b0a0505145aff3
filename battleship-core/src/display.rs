//! Time-sliced 7-segment display driven from the periodic timer interrupt

use crate::hal::{DigitDisplay, DigitPosition, HalError};
use crate::shared::SharedGame;
use crate::types::{Axis, GameState};

/// Segment patterns for digits 0-9 (active low, bit n = segment line n)
pub const SEGMENT_PATTERNS: [u8; 10] = [0x82, 0xEE, 0x07, 0x46, 0x6A, 0x52, 0x12, 0xE6, 0x02, 0x42];

/// One digit shown for one tick
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitFrame {
    pub position: DigitPosition,
    pub digit: u8,
}

impl DigitFrame {
    pub fn pattern(&self) -> u8 {
        SEGMENT_PATTERNS[(self.digit % 10) as usize]
    }
}

/// Three-phase digit multiplexer.
///
/// Phase 0 shows the 1-based coordinate being edited, phase 1 the tens of
/// the shot count, phase 2 its units. The phase belongs to the timer
/// handler alone.
#[derive(Debug, Default)]
pub struct DisplayMultiplexer {
    phase: u8,
}

impl DisplayMultiplexer {
    pub const PHASES: u8 = 3;

    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Digit for a phase given the values it reads
    pub fn frame(phase: u8, axis: Axis, row: u8, col: u8, shots_taken: u8) -> DigitFrame {
        match phase {
            0 => DigitFrame {
                position: DigitPosition::Ones,
                digit: match axis {
                    Axis::Column => col + 1,
                    Axis::Row => row + 1,
                },
            },
            1 => DigitFrame {
                position: DigitPosition::Tens,
                digit: shots_taken / 10,
            },
            _ => DigitFrame {
                position: DigitPosition::Hundreds,
                digit: shots_taken % 10,
            },
        }
    }

    /// Handle one timer tick.
    ///
    /// Every tick blanks all positions first. Outside of play nothing is
    /// enabled afterwards and the phase does not move.
    pub fn tick<D: DigitDisplay>(
        &mut self,
        game: &SharedGame,
        out: &mut D,
    ) -> Result<Option<DigitFrame>, HalError> {
        out.blank_all()?;

        if game.state() != GameState::GameStarted {
            return Ok(None);
        }

        let cursor = game.selection();
        let frame = Self::frame(
            self.phase,
            game.axis(),
            cursor.row(),
            cursor.col(),
            game.shots_taken(),
        );

        out.select_position(frame.position)?;
        out.write_segments(frame.pattern())?;

        self.phase = (self.phase + 1) % Self::PHASES;
        Ok(Some(frame))
    }
}
