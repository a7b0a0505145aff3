//! Game lifecycle state machine

use embedded_hal::delay::DelayNs;

use crate::hal::{HalError, IndicatorLine, Indicators};
use crate::shared::SharedGame;
use crate::shot::ShotReport;
use crate::types::{GameConfig, GameState};

/// Inputs that can move the game between states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameEvent {
    /// Ingestion consumed the last cell
    BoardComplete,
    /// Button pressed outside of play
    Button,
    /// Button pressed during play and the shot was resolved
    ShotResolved { game_over: bool },
}

/// Pure transition function; unlisted pairs leave the state unchanged
pub const fn next_state(state: GameState, event: GameEvent) -> GameState {
    match (state, event) {
        (GameState::Welcome, GameEvent::BoardComplete) => GameState::MapLoaded,
        (GameState::MapLoaded, GameEvent::Button) => GameState::GameStarted,
        (GameState::GameStarted, GameEvent::ShotResolved { game_over: true }) => {
            GameState::GameFinished
        }
        (GameState::GameFinished, GameEvent::Button) => GameState::Welcome,
        (state, _) => state,
    }
}

/// What a button press did
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonOutcome {
    /// No board yet; nothing changes
    Ignored,
    /// MapLoaded -> GameStarted
    Started,
    /// A shot was taken
    Shot(ShotReport),
    /// GameFinished -> Welcome, everything zeroed
    Reset,
}

/// Handle one button event from the button interrupt.
///
/// The transition itself happens inside one critical section; the hit flash
/// runs afterwards so the section stays short.
pub fn on_button<I, D>(
    game: &SharedGame,
    config: &GameConfig,
    indicators: &mut I,
    delay: &mut D,
) -> Result<ButtonOutcome, HalError>
where
    I: Indicators,
    D: DelayNs,
{
    let outcome = critical_section::with(|_| {
        let outcome = match game.state() {
            GameState::Welcome => ButtonOutcome::Ignored,
            GameState::MapLoaded => handle_map_loaded(game),
            GameState::GameStarted => handle_game_started(game, config),
            GameState::GameFinished => handle_game_finished(game),
        };
        game.mark_dirty();
        outcome
    });

    if let ButtonOutcome::Shot(report) = outcome {
        #[cfg(feature = "defmt")]
        defmt::debug!("Shot {:?}: hit={=bool} tally={:?}", report.target, report.hit, report.tally);

        if report.hit {
            flash_hit(config, indicators, delay)?;
        }
    }

    Ok(outcome)
}

fn handle_map_loaded(game: &SharedGame) -> ButtonOutcome {
    game.set_state(next_state(GameState::MapLoaded, GameEvent::Button));
    ButtonOutcome::Started
}

fn handle_game_started(game: &SharedGame, config: &GameConfig) -> ButtonOutcome {
    let report = game.resolve_shot(config.shot_cap);
    let next = next_state(
        GameState::GameStarted,
        GameEvent::ShotResolved { game_over: report.game_over },
    );
    if next != GameState::GameStarted {
        game.set_state(next);
    }
    ButtonOutcome::Shot(report)
}

fn handle_game_finished(game: &SharedGame) -> ButtonOutcome {
    game.reset_for_welcome();
    ButtonOutcome::Reset
}

/// Blink the hit LED a fixed number of times
fn flash_hit<I: Indicators, D: DelayNs>(
    config: &GameConfig,
    indicators: &mut I,
    delay: &mut D,
) -> Result<(), HalError> {
    for _ in 0..config.hit_flash_toggles {
        indicators.toggle(IndicatorLine::HitLed)?;
        delay.delay_ms(config.flash_delay_ms);
    }
    Ok(())
}
