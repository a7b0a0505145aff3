//! Test utilities for battleship core functionality

#[cfg(feature = "test-utils")]
pub mod board_maps {
    //! Board byte streams for driving ingestion

    use crate::types::{Coord, CELL_COUNT};

    /// 64-byte board stream with ships at the given (row, col) cells
    pub fn board_bytes(ships: &[(u8, u8)]) -> [u8; 64] {
        let mut bytes = [b'0'; 64];
        for &(row, col) in ships {
            if let Some(cell) = Coord::new(row, col) {
                bytes[cell.index() as usize] = b'1';
            }
        }
        bytes
    }

    /// Every cell empty
    pub fn empty_board() -> [u8; 64] {
        [b'0'; 64]
    }

    /// Horizontal ship of `len` cells starting at (row, col)
    pub fn horizontal_ship(row: u8, col: u8, len: u8) -> std::vec::Vec<(u8, u8)> {
        (col..col.saturating_add(len)).map(|c| (row, c)).collect()
    }

    /// Interleave noise bytes between board bytes, as a terminal might send
    pub fn with_line_noise(board: &[u8; 64]) -> std::vec::Vec<u8> {
        let mut stream = std::vec::Vec::with_capacity(CELL_COUNT as usize * 2);
        for (i, &byte) in board.iter().enumerate() {
            stream.push(byte);
            if i % GRID_WIDTH == GRID_WIDTH - 1 {
                stream.extend_from_slice(b"\r\n");
            }
        }
        stream
    }

    const GRID_WIDTH: usize = crate::types::GRID_SIZE as usize;
}

#[cfg(feature = "test-utils")]
pub mod harness {
    //! Whole-board harness wiring the game to mock peripherals

    use crate::display::{DigitFrame, DisplayMultiplexer};
    use crate::fsm::{on_button, ButtonOutcome};
    use crate::hal::mock::*;
    use crate::hal::HalError;
    use crate::ingest::{on_rx_byte, IngestOutcome};
    use crate::render::{RenderLoop, StepOutcome};
    use crate::shared::SharedGame;
    use crate::types::{Axis, Coord, GameConfig, GameState};

    pub type MockRenderLoop = RenderLoop<MockDisplay, ScriptedKeypad, MockIndicators, MockDelay>;

    /// One game plus every context that touches it: the serial and button
    /// handlers, the timer-driven multiplexer and the foreground loop
    pub struct GameHarness {
        pub game: SharedGame,
        pub config: GameConfig,
        pub serial: MockSerial,
        /// Indicators seen by the button handler
        pub button_leds: MockIndicators,
        pub button_delay: MockDelay,
        pub digits: MockDigitDisplay,
        pub mux: DisplayMultiplexer,
        pub foreground: MockRenderLoop,
    }

    impl GameHarness {
        pub fn new() -> Self {
            Self::with_config(GameConfig::default())
        }

        pub fn with_config(config: GameConfig) -> Self {
            Self {
                game: SharedGame::new(),
                config,
                serial: MockSerial::new(),
                button_leds: MockIndicators::new(),
                button_delay: MockDelay::new(),
                digits: MockDigitDisplay::new(),
                mux: DisplayMultiplexer::new(),
                foreground: RenderLoop::new(
                    MockDisplay::new(),
                    ScriptedKeypad::new(),
                    MockIndicators::new(),
                    MockDelay::new(),
                    config,
                ),
            }
        }

        pub fn state(&self) -> GameState {
            self.game.state()
        }

        /// Feed raw bytes to the receive handler
        pub fn receive(&mut self, bytes: &[u8]) -> Result<IngestOutcome, HalError> {
            let mut last = IngestOutcome::Ignored;
            for &byte in bytes {
                last = on_rx_byte(&self.game, byte, &mut self.serial)?;
            }
            Ok(last)
        }

        /// Send a complete board with ships at the given cells
        pub fn load(&mut self, ships: &[(u8, u8)]) -> Result<IngestOutcome, HalError> {
            let bytes = super::board_maps::board_bytes(ships);
            self.receive(&bytes)
        }

        pub fn press_button(&mut self) -> Result<ButtonOutcome, HalError> {
            on_button(&self.game, &self.config, &mut self.button_leds, &mut self.button_delay)
        }

        /// Load a board and press the button once to start play
        pub fn start(&mut self, ships: &[(u8, u8)]) -> Result<(), HalError> {
            self.load(ships)?;
            self.press_button()?;
            Ok(())
        }

        /// Queue a key and run the foreground until it has been applied
        pub fn press_key(&mut self, key: u8) -> Result<StepOutcome, HalError> {
            self.foreground.keypad_mut().push(key);
            loop {
                match self.step()? {
                    StepOutcome::Painted(_) => continue,
                    other => return Ok(other),
                }
            }
        }

        /// Move the cursor to (row, col) through the keypad
        pub fn select(&mut self, row: u8, col: u8) -> Result<(), HalError> {
            if self.game.axis() == Axis::Row {
                self.press_key(9)?;
            }
            self.press_key(col + 1)?;
            self.press_key(9)?;
            self.press_key(row + 1)?;
            self.press_key(9)?;
            Ok(())
        }

        /// Select a cell and fire at it
        pub fn fire_at(&mut self, row: u8, col: u8) -> Result<ButtonOutcome, HalError> {
            self.select(row, col)?;
            self.press_button()
        }

        pub fn step(&mut self) -> Result<StepOutcome, HalError> {
            self.foreground.step(&self.game)
        }

        /// Step the foreground until it reports `Idle`, at most `limit` times
        pub fn settle(&mut self, limit: usize) -> Result<usize, HalError> {
            for n in 0..limit {
                if self.step()? == StepOutcome::Idle {
                    return Ok(n);
                }
            }
            Ok(limit)
        }

        /// One timer tick of the digit multiplexer
        pub fn tick(&mut self) -> Result<Option<DigitFrame>, HalError> {
            self.digits.reset();
            self.mux.tick(&self.game, &mut self.digits)
        }

        pub fn display(&self) -> &MockDisplay {
            self.foreground.display()
        }

        pub fn cursor(&self) -> Coord {
            self.game.selection()
        }
    }

    impl Default for GameHarness {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(feature = "test-utils")]
pub use board_maps::board_bytes;
#[cfg(feature = "test-utils")]
pub use harness::GameHarness;
