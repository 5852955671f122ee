//! Group selection against a scripted joystick.

use std::time::Duration;

use crate::mock_hw::{MockDisplay, MockInput};

use helpbeacon::app::ports::{Direction, InputError, JoystickEvent};
use helpbeacon::setup::select_group;

const WHITE: (u8, u8, u8) = (255, 255, 255);

fn press(d: Direction) -> JoystickEvent {
    JoystickEvent::pressed(d)
}

#[test]
fn selection_renders_each_step_and_clears_on_confirm() {
    let mut input = MockInput::with_events([
        press(Direction::Up),
        press(Direction::Up),
        press(Direction::Down),
        press(Direction::Middle),
    ]);
    let mut display = MockDisplay::new();

    let group = select_group(&mut input, &mut display, WHITE, Duration::from_millis(1)).unwrap();

    assert_eq!(group.get(), 1);
    assert_eq!(
        display.frames(),
        vec![
            ('0', WHITE),
            ('1', WHITE),
            ('2', WHITE),
            ('1', WHITE),
            (' ', (0, 0, 0)),
        ]
    );
}

#[test]
fn events_after_confirmation_stay_queued() {
    let mut input = MockInput::with_events([press(Direction::Middle), press(Direction::Up)]);
    let mut display = MockDisplay::new();
    let group = select_group(&mut input, &mut display, WHITE, Duration::from_millis(1)).unwrap();
    assert_eq!(group.get(), 0);
    assert_eq!(input.remaining(), 1);
}

#[test]
fn closed_device_aborts_selection() {
    let mut input = MockInput::with_events([press(Direction::Left)]);
    input.close();
    let mut display = MockDisplay::new();
    assert_eq!(
        select_group(&mut input, &mut display, WHITE, Duration::from_millis(1)),
        Err(InputError::Closed)
    );
    assert_eq!(display.last(), Some(('9', WHITE)));
}
