//! Hardware Abstraction Layer for the game board peripherals

use embedded_hal::digital::{OutputPin, StatefulOutputPin};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Serial transmit failed
    SerialError,
    /// Graphic display did not accept a command
    DisplayError,
    /// Peripheral used before `main` installed it
    NotInitialized,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::SerialError => write!(f, "Serial transmit failed"),
            HalError::DisplayError => write!(f, "Display command failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Positions on the multiplexed digit display
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitPosition {
    Ones,
    Tens,
    Hundreds,
}

impl DigitPosition {
    pub const ALL: [DigitPosition; 3] =
        [DigitPosition::Ones, DigitPosition::Tens, DigitPosition::Hundreds];

    pub const fn index(&self) -> usize {
        match self {
            DigitPosition::Ones => 0,
            DigitPosition::Tens => 1,
            DigitPosition::Hundreds => 2,
        }
    }
}

/// Single-bit outputs toggled by the game
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorLine {
    /// Flashes on a hit
    HitLed,
    /// Sounds when the game finishes
    Buzzer,
    /// Lit while numeric keys edit the row
    AxisLed,
}

/// Text/glyph display used for the board and status messages
pub trait GraphicDisplay {
    fn clear(&mut self) -> Result<(), HalError>;

    /// Draw a line of text on the given text line
    fn draw_text(&mut self, line: u8, text: &str) -> Result<(), HalError>;

    /// Draw one character at pixel position (x, y)
    fn draw_glyph(&mut self, x: u8, y: u8, ch: char) -> Result<(), HalError>;

    /// Push a finished frame to the panel
    fn flush(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

/// Multiplexed 7-segment display sharing one segment bus
pub trait DigitDisplay {
    /// Disable every digit position
    fn blank_all(&mut self) -> Result<(), HalError>;

    /// Enable exactly one digit position
    fn select_position(&mut self, position: DigitPosition) -> Result<(), HalError>;

    /// Drive the shared segment lines with an 8-bit pattern
    fn write_segments(&mut self, pattern: u8) -> Result<(), HalError>;
}

/// LED and buzzer lines
pub trait Indicators {
    fn toggle(&mut self, line: IndicatorLine) -> Result<(), HalError>;

    fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), HalError>;
}

/// Serial link used to acknowledge board bytes
pub trait SerialPort {
    /// Send one byte, waiting only for the transmitter to be ready
    fn write_blocking(&mut self, byte: u8) -> Result<(), HalError>;
}

/// Numeric keypad
pub trait Keypad {
    /// Returns 0 when no key is pressed, otherwise the key number 1-9
    fn scan(&mut self) -> Result<u8, HalError>;
}

/// Digit display built from embedded-hal pins: three position enables
/// and an eight-line segment bus (bit n of the pattern drives segment n)
pub struct PinDigitDisplay<E, S> {
    enables: [E; 3],
    segments: [S; 8],
    enable_active_high: bool,
}

impl<E, S> PinDigitDisplay<E, S>
where
    E: OutputPin,
    S: OutputPin,
{
    pub fn new(enables: [E; 3], segments: [S; 8], enable_active_high: bool) -> Self {
        Self {
            enables,
            segments,
            enable_active_high,
        }
    }

    fn drive(pin: &mut E, level: bool) -> Result<(), HalError> {
        if level {
            pin.set_high().map_err(|_| HalError::GpioError)
        } else {
            pin.set_low().map_err(|_| HalError::GpioError)
        }
    }
}

impl<E, S> DigitDisplay for PinDigitDisplay<E, S>
where
    E: OutputPin,
    S: OutputPin,
{
    fn blank_all(&mut self) -> Result<(), HalError> {
        let idle = !self.enable_active_high;
        for pin in self.enables.iter_mut() {
            Self::drive(pin, idle)?;
        }
        Ok(())
    }

    fn select_position(&mut self, position: DigitPosition) -> Result<(), HalError> {
        let active = self.enable_active_high;
        Self::drive(&mut self.enables[position.index()], active)
    }

    fn write_segments(&mut self, pattern: u8) -> Result<(), HalError> {
        for (bit, pin) in self.segments.iter_mut().enumerate() {
            if pattern & (1 << bit) != 0 {
                pin.set_high().map_err(|_| HalError::GpioError)?;
            } else {
                pin.set_low().map_err(|_| HalError::GpioError)?;
            }
        }
        Ok(())
    }
}

/// Indicator lines on embedded-hal stateful output pins
pub struct PinIndicators<L, B, A> {
    hit_led: L,
    buzzer: B,
    axis_led: A,
    /// LEDs on this board sink current, so "on" is a low pin
    leds_active_low: bool,
}

impl<L, B, A> PinIndicators<L, B, A>
where
    L: StatefulOutputPin,
    B: StatefulOutputPin,
    A: StatefulOutputPin,
{
    pub fn new(hit_led: L, buzzer: B, axis_led: A, leds_active_low: bool) -> Self {
        Self {
            hit_led,
            buzzer,
            axis_led,
            leds_active_low,
        }
    }
}

fn drive_stateful<P: StatefulOutputPin>(pin: &mut P, high: bool) -> Result<(), HalError> {
    if high {
        pin.set_high().map_err(|_| HalError::GpioError)
    } else {
        pin.set_low().map_err(|_| HalError::GpioError)
    }
}

impl<L, B, A> Indicators for PinIndicators<L, B, A>
where
    L: StatefulOutputPin,
    B: StatefulOutputPin,
    A: StatefulOutputPin,
{
    fn toggle(&mut self, line: IndicatorLine) -> Result<(), HalError> {
        match line {
            IndicatorLine::HitLed => self.hit_led.toggle().map_err(|_| HalError::GpioError),
            IndicatorLine::Buzzer => self.buzzer.toggle().map_err(|_| HalError::GpioError),
            IndicatorLine::AxisLed => self.axis_led.toggle().map_err(|_| HalError::GpioError),
        }
    }

    fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), HalError> {
        let led_level = on != self.leds_active_low;
        match line {
            IndicatorLine::HitLed => drive_stateful(&mut self.hit_led, led_level),
            IndicatorLine::Buzzer => drive_stateful(&mut self.buzzer, on),
            IndicatorLine::AxisLed => drive_stateful(&mut self.axis_led, led_level),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use embedded_hal::delay::DelayNs;
    use heapless::{Deque, String, Vec};

    /// One recorded call on [`MockDisplay`]
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum DisplayOp {
        Clear,
        Text(u8, String<32>),
        Glyph(u8, u8, char),
        Flush,
    }

    /// Display that logs the most recent draw calls
    #[derive(Default)]
    pub struct MockDisplay {
        ops: Vec<DisplayOp, 256>,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ops(&self) -> &[DisplayOp] {
            &self.ops
        }

        pub fn reset(&mut self) {
            self.ops.clear();
        }

        pub fn clear_count(&self) -> usize {
            self.ops.iter().filter(|op| **op == DisplayOp::Clear).count()
        }

        pub fn glyph_count(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, DisplayOp::Glyph(..))).count()
        }

        /// Last glyph drawn at (x, y)
        pub fn glyph_at(&self, x: u8, y: u8) -> Option<char> {
            self.ops.iter().rev().find_map(|op| match op {
                DisplayOp::Glyph(gx, gy, ch) if *gx == x && *gy == y => Some(*ch),
                _ => None,
            })
        }

        pub fn last_text(&self) -> Option<&str> {
            self.ops.iter().rev().find_map(|op| match op {
                DisplayOp::Text(_, text) => Some(text.as_str()),
                _ => None,
            })
        }

        fn record(&mut self, op: DisplayOp) -> Result<(), HalError> {
            if self.ops.is_full() {
                self.ops.remove(0);
            }
            self.ops.push(op).map_err(|_| HalError::DisplayError)
        }
    }

    impl GraphicDisplay for MockDisplay {
        fn clear(&mut self) -> Result<(), HalError> {
            self.record(DisplayOp::Clear)
        }

        fn draw_text(&mut self, line: u8, text: &str) -> Result<(), HalError> {
            let mut owned = String::new();
            owned.push_str(text).map_err(|_| HalError::DisplayError)?;
            self.record(DisplayOp::Text(line, owned))
        }

        fn draw_glyph(&mut self, x: u8, y: u8, ch: char) -> Result<(), HalError> {
            self.record(DisplayOp::Glyph(x, y, ch))
        }

        fn flush(&mut self) -> Result<(), HalError> {
            self.record(DisplayOp::Flush)
        }
    }

    /// One recorded call on [`MockDigitDisplay`]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum DigitOp {
        Blank,
        Select(DigitPosition),
        Segments(u8),
    }

    #[derive(Default)]
    pub struct MockDigitDisplay {
        ops: Vec<DigitOp, 64>,
        enabled: Option<DigitPosition>,
        pattern: u8,
    }

    impl MockDigitDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ops(&self) -> &[DigitOp] {
            &self.ops
        }

        pub fn reset(&mut self) {
            self.ops.clear();
        }

        /// Currently enabled position, if any
        pub fn enabled(&self) -> Option<DigitPosition> {
            self.enabled
        }

        pub fn pattern(&self) -> u8 {
            self.pattern
        }

        fn record(&mut self, op: DigitOp) -> Result<(), HalError> {
            self.ops.push(op).map_err(|_| HalError::GpioError)
        }
    }

    impl DigitDisplay for MockDigitDisplay {
        fn blank_all(&mut self) -> Result<(), HalError> {
            self.enabled = None;
            self.record(DigitOp::Blank)
        }

        fn select_position(&mut self, position: DigitPosition) -> Result<(), HalError> {
            // Two enabled positions at once would ghost
            if self.enabled.is_some() {
                return Err(HalError::GpioError);
            }
            self.enabled = Some(position);
            self.record(DigitOp::Select(position))
        }

        fn write_segments(&mut self, pattern: u8) -> Result<(), HalError> {
            self.pattern = pattern;
            self.record(DigitOp::Segments(pattern))
        }
    }

    #[derive(Default)]
    pub struct MockIndicators {
        hit_led: bool,
        buzzer: bool,
        axis_led: bool,
        hit_toggles: usize,
        buzzer_toggles: usize,
    }

    impl MockIndicators {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_on(&self, line: IndicatorLine) -> bool {
            match line {
                IndicatorLine::HitLed => self.hit_led,
                IndicatorLine::Buzzer => self.buzzer,
                IndicatorLine::AxisLed => self.axis_led,
            }
        }

        pub fn hit_toggles(&self) -> usize {
            self.hit_toggles
        }

        pub fn buzzer_toggles(&self) -> usize {
            self.buzzer_toggles
        }
    }

    impl Indicators for MockIndicators {
        fn toggle(&mut self, line: IndicatorLine) -> Result<(), HalError> {
            match line {
                IndicatorLine::HitLed => {
                    self.hit_led = !self.hit_led;
                    self.hit_toggles += 1;
                }
                IndicatorLine::Buzzer => {
                    self.buzzer = !self.buzzer;
                    self.buzzer_toggles += 1;
                }
                IndicatorLine::AxisLed => self.axis_led = !self.axis_led,
            }
            Ok(())
        }

        fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), HalError> {
            match line {
                IndicatorLine::HitLed => self.hit_led = on,
                IndicatorLine::Buzzer => self.buzzer = on,
                IndicatorLine::AxisLed => self.axis_led = on,
            }
            Ok(())
        }
    }

    /// Serial port that records every echoed byte
    #[derive(Default)]
    pub struct MockSerial {
        sent: Vec<u8, 512>,
    }

    impl MockSerial {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> &[u8] {
            &self.sent
        }
    }

    impl SerialPort for MockSerial {
        fn write_blocking(&mut self, byte: u8) -> Result<(), HalError> {
            self.sent.push(byte).map_err(|_| HalError::SerialError)
        }
    }

    /// Keypad that replays queued scan results, then reports no key
    #[derive(Default)]
    pub struct ScriptedKeypad {
        script: Deque<u8, 32>,
        scans: usize,
    }

    impl ScriptedKeypad {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&mut self, key: u8) {
            self.script.push_back(key).ok();
        }

        pub fn scans(&self) -> usize {
            self.scans
        }

        pub fn pending(&self) -> usize {
            self.script.len()
        }
    }

    impl Keypad for ScriptedKeypad {
        fn scan(&mut self) -> Result<u8, HalError> {
            self.scans += 1;
            Ok(self.script.pop_front().unwrap_or(0))
        }
    }

    /// Delay that only accumulates the requested time
    #[derive(Default)]
    pub struct MockDelay {
        elapsed_ns: u64,
    }

    impl MockDelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn elapsed_ms(&self) -> u64 {
            self.elapsed_ns / 1_000_000
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ns += ns as u64;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.elapsed_ns += ms as u64 * 1_000_000;
        }
    }
}
