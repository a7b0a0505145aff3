//! Core data types for the battleship board

/// Rows and columns on each side of the board
pub const GRID_SIZE: u8 = 8;

/// Total number of cells on the board
pub const CELL_COUNT: u8 = GRID_SIZE * GRID_SIZE;

/// Game lifecycle states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GameState {
    /// Waiting for the board to arrive over the serial link
    Welcome = 0,
    /// Board received, waiting for the button to start play
    MapLoaded = 1,
    /// Shots are being taken
    GameStarted = 2,
    /// Game over, waiting for the button to return to Welcome
    GameFinished = 3,
}

impl GameState {
    /// Decode a stored discriminant; anything unknown maps to `Welcome`
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => GameState::MapLoaded,
            2 => GameState::GameStarted,
            3 => GameState::GameFinished,
            _ => GameState::Welcome,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true while serial bytes populate the board
    pub const fn accepts_board_bytes(&self) -> bool {
        matches!(self, GameState::Welcome)
    }

    /// Returns true in the only state with keypad polling and digit refresh
    pub const fn is_playing(&self) -> bool {
        matches!(self, GameState::GameStarted)
    }
}

/// Which coordinate numeric keys currently edit
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    #[default]
    Column,
    Row,
}

impl Axis {
    pub const fn toggled(self) -> Axis {
        match self {
            Axis::Column => Axis::Row,
            Axis::Row => Axis::Column,
        }
    }

    pub(crate) const fn from_bool(editing_row: bool) -> Axis {
        if editing_row {
            Axis::Row
        } else {
            Axis::Column
        }
    }

    pub(crate) const fn is_row(self) -> bool {
        matches!(self, Axis::Row)
    }
}

/// Board cell coordinate, both components in `0..GRID_SIZE`
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { row: 0, col: 0 };

    /// Returns `None` when either component is off the board
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Row-major cell index (`8 * row + col`)
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Self {
                row: index / GRID_SIZE,
                col: index % GRID_SIZE,
            })
        } else {
            None
        }
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    pub const fn col(&self) -> u8 {
        self.col
    }

    pub const fn index(&self) -> u8 {
        self.row * GRID_SIZE + self.col
    }
}

/// How a finished game ended
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Win when every ship cell has been hit, including the empty-board case
    pub const fn from_tally(hits_scored: u8, ship_cells: u8) -> Outcome {
        if hits_scored >= ship_cells {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Outcome::Won => "You Won",
            Outcome::Lost => "Game Over",
        }
    }
}

/// Game configuration parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// Shots allowed before the game ends
    pub shot_cap: u8,
    /// Hit LED toggles per hit (even, so the LED ends where it started)
    pub hit_flash_toggles: u8,
    /// Buzzer toggles when the game finishes
    pub buzzer_pulses: u8,
    /// Keypad settle time after a press is seen
    pub settle_delay_ms: u32,
    /// Time between hit LED toggles
    pub flash_delay_ms: u32,
    /// Time between buzzer toggles
    pub buzz_delay_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shot_cap: 16,
            hit_flash_toggles: 6,
            buzzer_pulses: 10,
            settle_delay_ms: 200,
            flash_delay_ms: 100,
            buzz_delay_ms: 50,
        }
    }
}

impl GameConfig {
    /// Longest blocking delay allowed for any single step
    pub const MAX_DELAY_MS: u32 = 1000;

    /// Create a new configuration with validation
    pub fn new(
        shot_cap: u8,
        hit_flash_toggles: u8,
        buzzer_pulses: u8,
        settle_delay_ms: u32,
        flash_delay_ms: u32,
        buzz_delay_ms: u32,
    ) -> Result<Self, &'static str> {
        if shot_cap == 0 || shot_cap > 99 {
            return Err("Shot cap must be between 1 and 99");
        }
        if hit_flash_toggles % 2 != 0 {
            return Err("Hit flash toggles must be even");
        }
        if settle_delay_ms > Self::MAX_DELAY_MS
            || flash_delay_ms > Self::MAX_DELAY_MS
            || buzz_delay_ms > Self::MAX_DELAY_MS
        {
            return Err("Delays must be <= 1000ms");
        }

        Ok(Self {
            shot_cap,
            hit_flash_toggles,
            buzzer_pulses,
            settle_delay_ms,
            flash_delay_ms,
            buzz_delay_ms,
        })
    }
}
