//! CH32V203 register-level peripherals
//!
//! GPIO handles implement the embedded-hal 1.0 pin traits so the generic
//! adapters in `battleship-core` drive them directly. Clock tree setup is
//! left at the reset default (HSI, 8 MHz).

use core::convert::Infallible;

use battleship_core::hal::{HalError, SerialPort};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

/// Core clock after reset
pub const SYSCLK_HZ: u32 = 8_000_000;

/// Board byte link
pub const BAUD_RATE: u32 = 115_200;

/// Digit multiplexer tick rate (each of the three digits refreshes at a third of this)
pub const MUX_TICK_HZ: u32 = 600;

// ========================================
// Register map
// ========================================

const RCC_BASE: u32 = 0x4002_1000;
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

pub const GPIOA_BASE: u32 = 0x4001_0800;
pub const GPIOB_BASE: u32 = 0x4001_0C00;
pub const GPIOC_BASE: u32 = 0x4001_1000;

const GPIO_CFGLR: u32 = 0x00;
const GPIO_CFGHR: u32 = 0x04;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;

const AFIO_BASE: u32 = 0x4001_0000;
const AFIO_EXTICR4: u32 = 0x14;

const EXTI_BASE: u32 = 0x4001_0400;
const EXTI_INTENR: u32 = 0x00;
const EXTI_FTENR: u32 = 0x0C;
const EXTI_INTFR: u32 = 0x14;

const USART1_BASE: u32 = 0x4001_3800;
const USART_STATR: u32 = 0x00;
const USART_DATAR: u32 = 0x04;
const USART_BRR: u32 = 0x08;
const USART_CTLR1: u32 = 0x0C;

const TIM2_BASE: u32 = 0x4000_0000;
const TIM_CTLR1: u32 = 0x00;
const TIM_DMAINTENR: u32 = 0x0C;
const TIM_INTFR: u32 = 0x10;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;

const PFIC_IENR2: u32 = 0xE000_E104;

/// Interrupt numbers in the PFIC vector table
const IRQ_TIM2: u32 = 44;
const IRQ_USART1: u32 = 53;
const IRQ_EXTI15_10: u32 = 56;

/// Board pin assignments
pub mod pins {
    use super::{GPIOA_BASE, GPIOB_BASE, GPIOC_BASE};

    /// Keypad strobes in scan order (keys 1/4/7, 2/5/8, 3/6/9)
    pub const KEYPAD_STROBES: [(u32, u8); 3] = [(GPIOA_BASE, 2), (GPIOA_BASE, 1), (GPIOA_BASE, 0)];
    pub const KEYPAD_SENSES: [(u32, u8); 3] = [(GPIOA_BASE, 3), (GPIOA_BASE, 4), (GPIOA_BASE, 5)];

    pub const USART1_TX: (u32, u8) = (GPIOA_BASE, 9);
    pub const USART1_RX: (u32, u8) = (GPIOA_BASE, 10);

    /// Hit LED, sinks current
    pub const HIT_LED: (u32, u8) = (GPIOA_BASE, 8);
    /// Row-editing LED, sinks current
    pub const AXIS_LED: (u32, u8) = (GPIOC_BASE, 13);
    pub const BUZZER: (u32, u8) = (GPIOB_BASE, 11);

    /// Fire button, falling edge on EXTI15
    pub const BUTTON: (u32, u8) = (GPIOB_BASE, 15);

    /// Segment bus PB0-PB7
    pub const SEGMENT_PORT: u32 = GPIOB_BASE;
    /// Digit enables for ones, tens, hundreds
    pub const DIGIT_ENABLES: [(u32, u8); 3] = [(GPIOB_BASE, 8), (GPIOB_BASE, 9), (GPIOB_BASE, 10)];

    pub const LCD_CS: (u32, u8) = (GPIOB_BASE, 12);
    pub const LCD_SCK: (u32, u8) = (GPIOB_BASE, 13);
    pub const LCD_MOSI: (u32, u8) = (GPIOB_BASE, 14);
}

#[inline(always)]
fn read_reg(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

#[inline(always)]
fn write_reg(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline(always)]
fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

// ========================================
// GPIO
// ========================================

/// Pin configuration nibble (CNF:MODE)
#[derive(Copy, Clone)]
enum PinMode {
    /// Push-pull output, 50 MHz
    PushPull = 0x3,
    /// Alternate function push-pull, 50 MHz
    AltPushPull = 0xB,
    /// Floating input
    Floating = 0x4,
    /// Input with pull-up/down (direction from OUTDR)
    Pulled = 0x8,
}

fn configure(port: u32, pin: u8, mode: PinMode) {
    let (reg, shift) = if pin < 8 {
        (port + GPIO_CFGLR, pin as u32 * 4)
    } else {
        (port + GPIO_CFGHR, (pin as u32 - 8) * 4)
    };
    modify_reg(reg, |cfg| (cfg & !(0xF << shift)) | ((mode as u32) << shift));
}

/// Push-pull output pin
pub struct Output {
    port: u32,
    pin: u8,
}

impl Output {
    pub fn new((port, pin): (u32, u8)) -> Self {
        configure(port, pin, PinMode::PushPull);
        Self { port, pin }
    }

    /// Handle to a pin that is already configured as an output
    pub const fn attach((port, pin): (u32, u8)) -> Self {
        Self { port, pin }
    }
}

impl ErrorType for Output {
    type Error = Infallible;
}

impl OutputPin for Output {
    fn set_low(&mut self) -> Result<(), Infallible> {
        write_reg(self.port + GPIO_BSHR, 1 << (self.pin + 16));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        write_reg(self.port + GPIO_BSHR, 1 << self.pin);
        Ok(())
    }
}

impl StatefulOutputPin for Output {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(read_reg(self.port + GPIO_OUTDR) & (1 << self.pin) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        self.is_set_high().map(|high| !high)
    }
}

/// Input pin with the internal pull-up enabled
pub struct PullUpInput {
    port: u32,
    pin: u8,
}

impl PullUpInput {
    pub fn new((port, pin): (u32, u8)) -> Self {
        configure(port, pin, PinMode::Pulled);
        write_reg(port + GPIO_BSHR, 1 << pin);
        Self { port, pin }
    }
}

impl ErrorType for PullUpInput {
    type Error = Infallible;
}

impl InputPin for PullUpInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(read_reg(self.port + GPIO_INDR) & (1 << self.pin) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Enable GPIOA/B/C, AFIO, USART1 and TIM2 clocks
pub fn enable_peripheral_clocks() {
    // APB2: AFIO(0) GPIOA(2) GPIOB(3) GPIOC(4) USART1(14)
    modify_reg(RCC_BASE + RCC_APB2PCENR, |v| {
        v | (1 << 0) | (1 << 2) | (1 << 3) | (1 << 4) | (1 << 14)
    });
    // APB1: TIM2(0)
    modify_reg(RCC_BASE + RCC_APB1PCENR, |v| v | 1);
}

// ========================================
// USART1
// ========================================

const STATR_RXNE: u32 = 1 << 5;
const STATR_TXE: u32 = 1 << 7;

/// USART1, 8N1, receive interrupt enabled
pub struct Usart1 {
    _private: (),
}

impl Usart1 {
    pub fn new() -> Self {
        let (tx_port, tx_pin) = pins::USART1_TX;
        let (rx_port, rx_pin) = pins::USART1_RX;
        configure(tx_port, tx_pin, PinMode::AltPushPull);
        configure(rx_port, rx_pin, PinMode::Floating);

        write_reg(USART1_BASE + USART_BRR, (SYSCLK_HZ + BAUD_RATE / 2) / BAUD_RATE);
        // UE(13) TE(3) RE(2) RXNEIE(5)
        write_reg(USART1_BASE + USART_CTLR1, (1 << 13) | (1 << 5) | (1 << 3) | (1 << 2));

        Self { _private: () }
    }

    /// Take the received byte, if one is waiting
    pub fn read_byte(&mut self) -> Option<u8> {
        if read_reg(USART1_BASE + USART_STATR) & STATR_RXNE != 0 {
            Some(read_reg(USART1_BASE + USART_DATAR) as u8)
        } else {
            None
        }
    }
}

impl SerialPort for Usart1 {
    fn write_blocking(&mut self, byte: u8) -> Result<(), HalError> {
        while read_reg(USART1_BASE + USART_STATR) & STATR_TXE == 0 {}
        write_reg(USART1_BASE + USART_DATAR, byte as u32);
        Ok(())
    }
}

// ========================================
// Button and timer interrupts
// ========================================

const BUTTON_LINE: u32 = 15;

/// Route PB15 to EXTI15 on the falling edge
pub fn configure_button() -> PullUpInput {
    let button = PullUpInput::new(pins::BUTTON);
    // EXTICR4 field for line 15 is bits 12..16; port B = 1
    modify_reg(AFIO_BASE + AFIO_EXTICR4, |v| (v & !(0xF << 12)) | (0x1 << 12));
    modify_reg(EXTI_BASE + EXTI_FTENR, |v| v | (1 << BUTTON_LINE));
    modify_reg(EXTI_BASE + EXTI_INTENR, |v| v | (1 << BUTTON_LINE));
    button
}

/// Returns true and clears the flag if the button line fired
pub fn take_button_pending() -> bool {
    let pending = read_reg(EXTI_BASE + EXTI_INTFR) & (1 << BUTTON_LINE) != 0;
    if pending {
        write_reg(EXTI_BASE + EXTI_INTFR, 1 << BUTTON_LINE);
    }
    pending
}

/// TIM2 update interrupt at `MUX_TICK_HZ`
pub fn configure_mux_timer() {
    // 1 MHz timer clock
    write_reg(TIM2_BASE + TIM_PSC, SYSCLK_HZ / 1_000_000 - 1);
    write_reg(TIM2_BASE + TIM_ATRLR, 1_000_000 / MUX_TICK_HZ - 1);
    write_reg(TIM2_BASE + TIM_DMAINTENR, 1);
    write_reg(TIM2_BASE + TIM_CTLR1, 1);
}

/// Returns true and clears the flag if TIM2 overflowed
pub fn take_timer_pending() -> bool {
    let pending = read_reg(TIM2_BASE + TIM_INTFR) & 1 != 0;
    if pending {
        write_reg(TIM2_BASE + TIM_INTFR, 0);
    }
    pending
}

/// Unmask the three game interrupts in the PFIC
pub fn enable_interrupts() {
    let mask = (1 << (IRQ_TIM2 - 32)) | (1 << (IRQ_USART1 - 32)) | (1 << (IRQ_EXTI15_10 - 32));
    write_reg(PFIC_IENR2, mask);
}

// ========================================
// Delay
// ========================================

/// Busy-wait delay counted in core cycles
#[derive(Copy, Clone, Default)]
pub struct CycleDelay;

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * SYSCLK_HZ as u64 / 1_000_000_000) as u32;
        unsafe { riscv::asm::delay(cycles.max(1)) }
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            unsafe { riscv::asm::delay(SYSCLK_HZ / 1000) }
        }
    }
}
