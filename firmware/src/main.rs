#![no_std]
#![no_main]

// Logging support
#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

// No-op logging macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

mod hardware;
mod lcd;

use core::cell::RefCell;

use battleship_core::hal::{HalError, PinDigitDisplay, PinIndicators};
use battleship_core::{
    on_button, on_rx_byte, DisplayMultiplexer, GameConfig, IndicatorLine, Indicators, MatrixKeypad,
    RenderLoop, SharedGame, StepOutcome,
};
use critical_section::Mutex;
use riscv_rt::entry;

use hardware::{pins, CycleDelay, Output, PullUpInput, Usart1};
use lcd::Uc1601;

// Critical section implementation for RISC-V
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

type BoardIndicators = PinIndicators<Output, Output, Output>;
type BoardDigits = PinDigitDisplay<Output, Output>;

/// Everything the button handler needs besides the game
struct ButtonContext {
    config: GameConfig,
    indicators: BoardIndicators,
    delay: CycleDelay,
}

/// Timer handler state: the multiplexer phase and the pins it drives
struct DigitContext {
    mux: DisplayMultiplexer,
    digits: BoardDigits,
}

// ========================================
// Shared state
// ========================================

static GAME: SharedGame = SharedGame::new();

static SERIAL: Mutex<RefCell<Option<Usart1>>> = Mutex::new(RefCell::new(None));
static BUTTON: Mutex<RefCell<Option<ButtonContext>>> = Mutex::new(RefCell::new(None));
static DIGITS: Mutex<RefCell<Option<DigitContext>>> = Mutex::new(RefCell::new(None));

/// Run `f` on a peripheral owned by an interrupt handler.
///
/// The peripheral is moved out for the duration of `f`, so blocking work in
/// `f` runs outside any critical section. Returns `None` before `main` has
/// installed it.
fn with_peripheral<T, R>(
    slot: &Mutex<RefCell<Option<T>>>,
    f: impl FnOnce(&mut T) -> R,
) -> Option<R> {
    let mut taken = critical_section::with(|cs| slot.borrow(cs).take())?;
    let result = f(&mut taken);
    critical_section::with(|cs| *slot.borrow(cs).borrow_mut() = Some(taken));
    Some(result)
}

/// Indicator lines over register handles.
///
/// Every line has one writer: the button handler flashes the hit LED, the
/// foreground drives the buzzer and the axis LED. Pin writes go through the
/// atomic set/reset register.
fn board_indicators() -> BoardIndicators {
    PinIndicators::new(
        Output::attach(pins::HIT_LED),
        Output::attach(pins::BUZZER),
        Output::attach(pins::AXIS_LED),
        true,
    )
}

// ========================================
// Initialization
// ========================================

fn hardware_init(config: GameConfig) {
    hardware::enable_peripheral_clocks();

    // Indicator pins: configure, then park LEDs dark and the buzzer low
    let mut indicators = PinIndicators::new(
        Output::new(pins::HIT_LED),
        Output::new(pins::BUZZER),
        Output::new(pins::AXIS_LED),
        true,
    );
    for line in [IndicatorLine::HitLed, IndicatorLine::Buzzer, IndicatorLine::AxisLed] {
        if let Err(e) = indicators.set(line, false) {
            warn!("Indicator init failed: {:?}", e);
        }
    }

    let digits = PinDigitDisplay::new(
        pins::DIGIT_ENABLES.map(Output::new),
        core::array::from_fn(|bit| Output::new((pins::SEGMENT_PORT, bit as u8))),
        true,
    );

    let _button = hardware::configure_button();
    let serial = Usart1::new();
    hardware::configure_mux_timer();

    critical_section::with(|cs| {
        *SERIAL.borrow(cs).borrow_mut() = Some(serial);
        *BUTTON.borrow(cs).borrow_mut() = Some(ButtonContext {
            config,
            indicators: board_indicators(),
            delay: CycleDelay,
        });
        *DIGITS.borrow(cs).borrow_mut() = Some(DigitContext {
            mux: DisplayMultiplexer::new(),
            digits,
        });
    });

    hardware::enable_interrupts();
    unsafe { riscv::register::mstatus::set_mie() };

    info!("Hardware initialization complete");
}

#[entry]
fn main() -> ! {
    let config = battleship_core::default_config();
    hardware_init(config);

    let mut lcd = Uc1601::new(
        Output::new(pins::LCD_CS),
        Output::new(pins::LCD_SCK),
        Output::new(pins::LCD_MOSI),
    );
    if let Err(e) = lcd.init() {
        warn!("LCD init failed: {:?}", e);
    }

    let mut keypad = MatrixKeypad::new(
        pins::KEYPAD_STROBES.map(Output::new),
        pins::KEYPAD_SENSES.map(PullUpInput::new),
    );
    if let Err(e) = keypad.enable() {
        warn!("Keypad enable failed: {:?}", e);
    }

    let mut foreground = RenderLoop::new(lcd, keypad, board_indicators(), CycleDelay, config);

    info!("Battleship v{} ready", battleship_core::VERSION);

    loop {
        match foreground.step(&GAME) {
            Ok(StepOutcome::Idle) if !GAME.state().is_playing() => {
                // Only interrupts can change anything until the next event
                unsafe { riscv::asm::wfi() };
            }
            Ok(outcome) => {
                debug!("Step: {:?}", outcome);
            }
            Err(e) => {
                warn!("Foreground step failed: {:?}", e);
            }
        }
    }
}

// ========================================
// Interrupt Handlers
// ========================================

/// Drain the receive register into the ingester
fn serve_serial(serial: &mut Usart1) -> Result<(), HalError> {
    while let Some(byte) = serial.read_byte() {
        on_rx_byte(&GAME, byte, serial)?;
    }
    Ok(())
}

/// Board bytes from the host
#[no_mangle]
extern "C" fn USART1_IRQHandler() {
    let result = with_peripheral(&SERIAL, serve_serial).unwrap_or(Err(HalError::NotInitialized));
    if let Err(e) = result {
        warn!("Serial handler failed: {:?}", e);
    }
}

/// Fire button (PB15, falling edge)
#[no_mangle]
extern "C" fn EXTI15_10_IRQHandler() {
    if !hardware::take_button_pending() {
        return;
    }
    let result = with_peripheral(&BUTTON, |ctx| {
        on_button(&GAME, &ctx.config, &mut ctx.indicators, &mut ctx.delay)
    })
    .unwrap_or(Err(HalError::NotInitialized));
    match result {
        Ok(outcome) => {
            debug!("Button: {:?}", outcome);
        }
        Err(e) => {
            warn!("Button handling failed: {:?}", e);
        }
    }
}

/// Digit multiplexer tick
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    if !hardware::take_timer_pending() {
        return;
    }
    let result = with_peripheral(&DIGITS, |ctx| ctx.mux.tick(&GAME, &mut ctx.digits))
        .unwrap_or(Err(HalError::NotInitialized));
    if let Err(e) = result {
        warn!("Digit refresh failed: {:?}", e);
    }
}
