//! Foreground render loop as a cooperative step function

use embedded_hal::delay::DelayNs;

use crate::hal::{GraphicDisplay, HalError, IndicatorLine, Indicators, Keypad};
use crate::selector::KeyAction;
use crate::shared::{GameSnapshot, SharedGame};
use crate::types::{Axis, Coord, GameConfig, GameState, CELL_COUNT};

pub const WELCOME_TEXT: &str = "Battleship";
pub const MAP_LOADED_TEXT: &str = "Map Loaded Successfully";

/// Text line used for status messages
pub const STATUS_LINE: u8 = 1;
/// Text line for the map-loaded message
pub const MAP_LOADED_LINE: u8 = 3;

/// Pixel pitch between board cells
pub const CELL_PITCH_X: u8 = 17;
pub const CELL_PITCH_Y: u8 = 8;

/// What one call to [`RenderLoop::step`] did
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// Nothing to paint and no key down
    Idle,
    /// Screen repainted for this state
    Painted(GameState),
    /// A key was read, settled and applied
    KeyApplied(KeyAction),
    /// End-of-game buzzer sequence played
    Buzzed,
}

/// Foreground loop state.
///
/// Each `step` does at most one repaint, one keypad sample or the buzzer
/// sequence, then returns so the caller can sleep or run other work.
pub struct RenderLoop<G, K, I, D> {
    display: G,
    keypad: K,
    indicators: I,
    delay: D,
    config: GameConfig,
    repaint: bool,
    buzzed: bool,
}

impl<G, K, I, D> RenderLoop<G, K, I, D>
where
    G: GraphicDisplay,
    K: Keypad,
    I: Indicators,
    D: DelayNs,
{
    pub fn new(display: G, keypad: K, indicators: I, delay: D, config: GameConfig) -> Self {
        Self {
            display,
            keypad,
            indicators,
            delay,
            config,
            repaint: true,
            buzzed: false,
        }
    }

    pub fn display(&self) -> &G {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut G {
        &mut self.display
    }

    pub fn keypad_mut(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Run one foreground iteration
    pub fn step(&mut self, game: &SharedGame) -> Result<StepOutcome, HalError> {
        if game.take_dirty() {
            self.display.clear()?;
            self.repaint = true;
        }

        let snapshot = game.snapshot();
        match snapshot.state {
            GameState::Welcome => {
                self.buzzed = false;
                if self.repaint {
                    self.indicators.set(IndicatorLine::AxisLed, false)?;
                }
                self.paint_message(snapshot.state, STATUS_LINE, WELCOME_TEXT)
            }
            GameState::MapLoaded => {
                self.paint_message(snapshot.state, MAP_LOADED_LINE, MAP_LOADED_TEXT)
            }
            GameState::GameStarted => {
                if self.repaint {
                    self.paint_board(&snapshot)?;
                    return Ok(StepOutcome::Painted(snapshot.state));
                }
                self.poll_keypad(game)
            }
            GameState::GameFinished => {
                if let Some(outcome) = snapshot.outcome() {
                    if self.repaint {
                        return self.paint_message(snapshot.state, STATUS_LINE, outcome.message());
                    }
                }
                if !self.buzzed {
                    self.sound_buzzer()?;
                    return Ok(StepOutcome::Buzzed);
                }
                Ok(StepOutcome::Idle)
            }
        }
    }

    fn paint_message(
        &mut self,
        state: GameState,
        line: u8,
        text: &str,
    ) -> Result<StepOutcome, HalError> {
        if !self.repaint {
            return Ok(StepOutcome::Idle);
        }
        self.display.draw_text(line, text)?;
        self.display.flush()?;
        self.repaint = false;
        Ok(StepOutcome::Painted(state))
    }

    fn paint_board(&mut self, snapshot: &GameSnapshot) -> Result<(), HalError> {
        for cell in (0..CELL_COUNT).filter_map(Coord::from_index) {
            let glyph = snapshot.cell(cell).glyph();
            self.display
                .draw_glyph(cell.col() * CELL_PITCH_X, cell.row() * CELL_PITCH_Y, glyph)?;
        }
        self.display.flush()?;
        self.repaint = false;
        Ok(())
    }

    fn poll_keypad(&mut self, game: &SharedGame) -> Result<StepOutcome, HalError> {
        let key = self.keypad.scan()?;
        if key == 0 {
            return Ok(StepOutcome::Idle);
        }

        self.delay.delay_ms(self.config.settle_delay_ms);
        let action = game.apply_key(key);
        if let KeyAction::ToggledAxis(axis) = action {
            self.indicators.set(IndicatorLine::AxisLed, axis == Axis::Row)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Key {=u8} -> {:?}", key, action);

        self.repaint = true;
        Ok(StepOutcome::KeyApplied(action))
    }

    fn sound_buzzer(&mut self) -> Result<(), HalError> {
        for _ in 0..self.config.buzzer_pulses {
            self.indicators.toggle(IndicatorLine::Buzzer)?;
            self.delay.delay_ms(self.config.buzz_delay_ms);
        }
        self.buzzed = true;
        Ok(())
    }
}
