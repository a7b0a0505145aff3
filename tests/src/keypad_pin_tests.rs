//! Matrix keypad scanning against pin-level expectations

use battleship_core::hal::Keypad;
use battleship_core::keypad::KEY_MAP;
use battleship_core::MatrixKeypad;
use embedded_hal_mock::eh1::pin::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use rstest::rstest;

/// Expected pin traffic for one scan with at most one key held at
/// `[strobe][sense]`
fn scan_expectations(
    held: Option<(usize, usize)>,
) -> ([Vec<PinTransaction>; 3], [Vec<PinTransaction>; 3]) {
    let mut strobes: [Vec<PinTransaction>; 3] = Default::default();
    let mut senses: [Vec<PinTransaction>; 3] = Default::default();

    for strobe in 0..3 {
        strobes[strobe].push(PinTransaction::set(PinState::Low));
        for sense in 0..3 {
            if held == Some((strobe, sense)) {
                senses[sense].push(PinTransaction::get(PinState::Low));
                break;
            }
            senses[sense].push(PinTransaction::get(PinState::High));
        }
        strobes[strobe].push(PinTransaction::set(PinState::High));

        if matches!(held, Some((s, _)) if s == strobe) {
            break;
        }
    }
    (strobes, senses)
}

fn keypad_for(
    strobes: &[Vec<PinTransaction>; 3],
    senses: &[Vec<PinTransaction>; 3],
) -> MatrixKeypad<PinMock, PinMock> {
    MatrixKeypad::new(
        [PinMock::new(&strobes[0]), PinMock::new(&strobes[1]), PinMock::new(&strobes[2])],
        [PinMock::new(&senses[0]), PinMock::new(&senses[1]), PinMock::new(&senses[2])],
    )
}

fn finish(keypad: MatrixKeypad<PinMock, PinMock>) {
    let (strobes, senses) = keypad.release();
    for mut pin in strobes.into_iter().chain(senses) {
        pin.done();
    }
}

#[test]
fn test_enable_parks_strobes_high() {
    let high = [PinTransaction::set(PinState::High)];
    let mut keypad = MatrixKeypad::new(
        [PinMock::new(&high), PinMock::new(&high), PinMock::new(&high)],
        [PinMock::new(&[]), PinMock::new(&[]), PinMock::new(&[])],
    );
    keypad.enable().unwrap();
    finish(keypad);
}

#[test]
fn test_no_key_scans_every_strobe() {
    let (strobes, senses) = scan_expectations(None);
    let mut keypad = keypad_for(&strobes, &senses);
    assert_eq!(keypad.scan().unwrap(), 0);
    finish(keypad);
}

#[rstest]
#[case(0, 0)]
#[case(0, 2)]
#[case(1, 1)]
#[case(1, 2)]
#[case(2, 0)]
#[case(2, 2)]
fn test_single_key_stops_the_scan(#[case] strobe: usize, #[case] sense: usize) {
    let (strobes, senses) = scan_expectations(Some((strobe, sense)));
    let mut keypad = keypad_for(&strobes, &senses);
    assert_eq!(keypad.scan().unwrap(), KEY_MAP[strobe][sense]);
    finish(keypad);
}

#[test]
fn test_key_five_pin_traffic() {
    let strobes = [
        vec![PinTransaction::set(PinState::Low), PinTransaction::set(PinState::High)],
        vec![PinTransaction::set(PinState::Low), PinTransaction::set(PinState::High)],
        vec![],
    ];
    let senses = [
        vec![PinTransaction::get(PinState::High), PinTransaction::get(PinState::High)],
        vec![PinTransaction::get(PinState::High), PinTransaction::get(PinState::Low)],
        vec![PinTransaction::get(PinState::High)],
    ];
    let mut keypad = keypad_for(&strobes, &senses);
    assert_eq!(keypad.scan().unwrap(), 5);
    finish(keypad);
}

#[test]
fn test_scan_order_matches_key_numbers() {
    // Strobe lines walk keys 1/4/7, 2/5/8, 3/6/9
    let flattened: Vec<u8> = (0..3)
        .flat_map(|sense| (0..3).map(move |strobe| KEY_MAP[strobe][sense]))
        .collect();
    assert_eq!(flattened, (1..=9).collect::<Vec<u8>>());
}
