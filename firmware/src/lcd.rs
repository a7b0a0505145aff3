//! UC1601 128x64 LCD over bit-banged 9-bit SPI
//!
//! Each SPI word is one D/C bit (1 = data) followed by the byte, MSB first.
//! Drawing goes to a page-organised frame buffer through embedded-graphics;
//! `flush` pushes the whole buffer to the panel.

use battleship_core::hal::{GraphicDisplay, HalError};
use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle, MonoTextStyleBuilder},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::digital::OutputPin;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Pixel height of one text line
const LINE_HEIGHT: i32 = 8;

mod cmd {
    pub const SYSTEM_RESET: u8 = 0xE2;
    pub const FRAME_RATE_100: u8 = 0xA1;
    pub const BIAS_RATIO_MAX: u8 = 0xEB;
    pub const SET_VBIAS: u8 = 0x81;
    pub const VBIAS_VALUE: u8 = 0xA0;
    pub const MAPPING: u8 = 0xC0;
    pub const DISPLAY_ENABLE: u8 = 0xAF;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_COLUMN_LSB: u8 = 0x00;
    pub const SET_COLUMN_MSB: u8 = 0x10;
}

const INIT_SEQUENCE: [u8; 7] = [
    cmd::SYSTEM_RESET,
    cmd::FRAME_RATE_100,
    cmd::BIAS_RATIO_MAX,
    cmd::SET_VBIAS,
    cmd::VBIAS_VALUE,
    cmd::MAPPING,
    cmd::DISPLAY_ENABLE,
];

/// UC1601 driver with a 1 KiB frame buffer
pub struct Uc1601<P> {
    cs: P,
    sck: P,
    mosi: P,
    buffer: [[u8; WIDTH]; PAGES],
}

impl<P: OutputPin> Uc1601<P> {
    pub fn new(cs: P, sck: P, mosi: P) -> Self {
        Self {
            cs,
            sck,
            mosi,
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Reset the controller, enable the panel and blank it
    pub fn init(&mut self) -> Result<(), HalError> {
        self.cs.set_high().map_err(|_| HalError::GpioError)?;
        self.sck.set_high().map_err(|_| HalError::GpioError)?;
        for command in INIT_SEQUENCE {
            self.command(command)?;
        }
        GraphicDisplay::clear(self)?;
        self.flush()
    }

    fn command(&mut self, command: u8) -> Result<(), HalError> {
        self.write_word(false, command)
    }

    fn data(&mut self, data: u8) -> Result<(), HalError> {
        self.write_word(true, data)
    }

    /// Clock out one 9-bit word; clock idles high, panel samples on the rising edge
    fn write_word(&mut self, is_data: bool, byte: u8) -> Result<(), HalError> {
        let word = ((is_data as u16) << 8) | byte as u16;

        self.cs.set_low().map_err(|_| HalError::GpioError)?;
        for bit in (0..9).rev() {
            self.sck.set_low().map_err(|_| HalError::GpioError)?;
            if word & (1 << bit) != 0 {
                self.mosi.set_high().map_err(|_| HalError::GpioError)?;
            } else {
                self.mosi.set_low().map_err(|_| HalError::GpioError)?;
            }
            self.sck.set_high().map_err(|_| HalError::GpioError)?;
        }
        self.cs.set_high().map_err(|_| HalError::GpioError)
    }

    /// Opaque background so a redrawn glyph fully replaces the old one
    fn text_style() -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyleBuilder::new()
            .font(&FONT_5X8)
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build()
    }
}

impl<P> OriginDimensions for Uc1601<P> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<P> DrawTarget for Uc1601<P> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let mask = 1 << (y % 8);
            match color {
                BinaryColor::On => self.buffer[y / 8][x] |= mask,
                BinaryColor::Off => self.buffer[y / 8][x] &= !mask,
            }
        }
        Ok(())
    }
}

impl<P: OutputPin> GraphicDisplay for Uc1601<P> {
    fn clear(&mut self) -> Result<(), HalError> {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
        Ok(())
    }

    fn draw_text(&mut self, line: u8, text: &str) -> Result<(), HalError> {
        let origin = Point::new(0, line as i32 * LINE_HEIGHT);
        Text::with_baseline(text, origin, Self::text_style(), Baseline::Top)
            .draw(self)
            .map_err(|_| HalError::DisplayError)?;
        Ok(())
    }

    fn draw_glyph(&mut self, x: u8, y: u8, ch: char) -> Result<(), HalError> {
        let mut utf8 = [0u8; 4];
        let glyph = ch.encode_utf8(&mut utf8);
        let origin = Point::new(x as i32, y as i32);
        Text::with_baseline(glyph, origin, Self::text_style(), Baseline::Top)
            .draw(self)
            .map_err(|_| HalError::DisplayError)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8)?;
            self.command(cmd::SET_COLUMN_LSB)?;
            self.command(cmd::SET_COLUMN_MSB)?;
            for col in 0..WIDTH {
                let byte = self.buffer[page][col];
                self.data(byte)?;
            }
        }
        Ok(())
    }
}
