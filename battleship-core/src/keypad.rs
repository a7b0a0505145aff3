//! 3x3 matrix keypad scanner
//!
//! One strobe line is driven low at a time and the three sense lines are
//! sampled; a low sense line means the key at that crossing is down. The
//! scan order is fixed, so the first key found wins when several are held.
//! No debouncing happens here.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::hal::{HalError, Keypad};

/// Key number at `[strobe][sense]`
pub const KEY_MAP: [[u8; 3]; 3] = [[1, 4, 7], [2, 5, 8], [3, 6, 9]];

/// Keypad on three strobe outputs and three pulled-up sense inputs
pub struct MatrixKeypad<O, I> {
    strobes: [O; 3],
    senses: [I; 3],
}

impl<O, I> MatrixKeypad<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    pub fn new(strobes: [O; 3], senses: [I; 3]) -> Self {
        Self { strobes, senses }
    }

    /// Park every strobe line high so no column is selected
    pub fn enable(&mut self) -> Result<(), HalError> {
        for strobe in self.strobes.iter_mut() {
            strobe.set_high().map_err(|_| HalError::GpioError)?;
        }
        Ok(())
    }

    /// Give the pins back
    pub fn release(self) -> ([O; 3], [I; 3]) {
        (self.strobes, self.senses)
    }
}

impl<O, I> Keypad for MatrixKeypad<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    fn scan(&mut self) -> Result<u8, HalError> {
        for (strobe_index, strobe) in self.strobes.iter_mut().enumerate() {
            strobe.set_low().map_err(|_| HalError::GpioError)?;

            let mut found = 0;
            for (sense_index, sense) in self.senses.iter_mut().enumerate() {
                if sense.is_low().map_err(|_| HalError::GpioError)? {
                    found = KEY_MAP[strobe_index][sense_index];
                    break;
                }
            }

            strobe.set_high().map_err(|_| HalError::GpioError)?;
            if found != 0 {
                return Ok(found);
            }
        }
        Ok(0)
    }
}
