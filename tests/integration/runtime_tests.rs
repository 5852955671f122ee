//! Full runtime on real threads with mock adapters.
//!
//! Uses a short blink period so the timer path is exercised quickly.

use std::time::{Duration, Instant};

use crate::mock_hw::{MockBus, MockDisplay, MockInput};

use helpbeacon::app::ports::{Direction, JoystickEvent};
use helpbeacon::config::BeaconConfig;
use helpbeacon::events::Event;
use helpbeacon::fsm::StateId;
use helpbeacon::runtime::BeaconRuntime;
use helpbeacon::setup::GroupId;

const CHANNEL: &str = "raspberrypi/6";

fn fast_config() -> BeaconConfig {
    BeaconConfig {
        blink_period_ms: 40,
        input_poll_interval_ms: 5,
        network_poll_timeout_ms: 5,
        ..BeaconConfig::default()
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

struct Harness {
    runtime: BeaconRuntime,
    display: MockDisplay,
    input: MockInput,
    bus: MockBus,
}

fn start() -> Harness {
    let display = MockDisplay::new();
    let input = MockInput::new();
    let bus = MockBus::new();
    let runtime = BeaconRuntime::start(
        &fast_config(),
        GroupId::new(6).unwrap(),
        display.clone(),
        input.clone(),
        bus.clone(),
        bus.clone(),
    )
    .unwrap();
    Harness {
        runtime,
        display,
        input,
        bus,
    }
}

#[test]
fn idle_glyph_is_shown_before_start_returns() {
    let h = start();
    assert_eq!(h.display.frames(), vec![('6', (0, 255, 0))]);
    assert_eq!(h.runtime.state(), StateId::Idle);
    let report = h.runtime.shutdown().unwrap();
    assert_eq!(report.final_state, StateId::Idle);
    assert_eq!(report.delivered, 0);
}

#[test]
fn remote_request_blinks_until_done() {
    let h = start();
    h.bus.inject(CHANNEL, br#""assistance_requested""#);
    assert!(wait_for(|| h.runtime.state() != StateId::Idle));

    // Both blink phases are rendered by the timer path.
    assert!(wait_for(|| h.display.frames().contains(&(' ', (255, 0, 0)))));
    assert!(wait_for(|| h.display.frames().iter().filter(|f| f.0 == '6').count() >= 3));

    h.bus.inject(CHANNEL, br#""assistance_done""#);
    assert!(wait_for(|| h.runtime.state() == StateId::Idle));

    // No further blinking once idle.
    std::thread::sleep(Duration::from_millis(120));
    let settled = h.display.count();
    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(h.display.count(), settled);
    assert_eq!(h.display.last(), Some(('6', (0, 255, 0))));

    let report = h.runtime.shutdown().unwrap();
    assert_eq!(report.final_state, StateId::Idle);
}

#[test]
fn local_press_is_published_and_applied() {
    let h = start();
    h.input.push(JoystickEvent::pressed(Direction::Middle));
    assert!(wait_for(|| h.runtime.state() != StateId::Idle));

    let published = h.bus.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].channel, CHANNEL);
    assert_eq!(published[0].payload, br#""assistance_requested""#);

    // The echo is consumed and ignored; the unit keeps blinking.
    assert!(wait_for(|| h.bus.queued() == 0));
    assert_ne!(h.runtime.state(), StateId::Idle);
    h.runtime.shutdown();
}

#[test]
fn shutdown_stops_timer_and_rejects_late_events() {
    let h = start();
    let router = h.runtime.router().clone();
    h.bus.inject(CHANNEL, br#""assistance_requested""#);
    assert!(wait_for(|| h.runtime.state() != StateId::Idle));

    let report = h.runtime.shutdown().unwrap();
    assert_ne!(report.final_state, StateId::Idle);
    assert!(report.delivered >= 1);

    let frames = h.display.count();
    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(h.display.count(), frames, "timer fired after shutdown");
    assert!(router.is_closed());
    assert!(!router.submit(Event::AssistanceDone));
}

#[test]
fn wait_returns_when_input_closes() {
    let h = start();
    h.input.push(JoystickEvent::pressed(Direction::Middle));
    h.input.push(JoystickEvent::pressed(Direction::Middle));
    h.input.close();
    let report = h.runtime.wait().unwrap();
    assert!(report.delivered >= 2);
    assert_eq!(h.input.remaining(), 0);
}
