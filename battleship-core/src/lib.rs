#![cfg_attr(not(feature = "std"), no_std)]

//! # Battleship Core
//!
//! Game logic for a single-board battleship controller: board ingestion over
//! serial, shot resolution, keypad cursor selection and digit multiplexing,
//! all sharing one interrupt-safe game state.

pub mod types;
pub mod board;
pub mod hal;
pub mod shared;
pub mod selector;
pub mod shot;
pub mod fsm;
pub mod ingest;
pub mod keypad;
pub mod display;
pub mod render;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use board::{CellView, Grid};
pub use shared::{GameSnapshot, SharedGame};
pub use selector::{CoordinateSelector, KeyAction};
pub use shot::{ShotReport, ShotTally};
pub use fsm::{next_state, on_button, ButtonOutcome, GameEvent};
pub use ingest::{on_rx_byte, IngestOutcome};
pub use keypad::MatrixKeypad;
pub use display::{DigitFrame, DisplayMultiplexer, SEGMENT_PATTERNS};
pub use render::{RenderLoop, StepOutcome};
pub use hal::{
    DigitDisplay, DigitPosition, GraphicDisplay, HalError, IndicatorLine, Indicators, Keypad,
    SerialPort,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 16 shots, 6 hit flashes, 10 buzzer pulses
pub fn default_config() -> GameConfig {
    GameConfig::default()
}
