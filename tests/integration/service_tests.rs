//! Integration tests for the BeaconService → FSM → display/timer pipeline.
//!
//! The service is driven directly, one event at a time, the way the
//! router's consumer drives it.

use std::time::Duration;

use crate::mock_hw::{MockDisplay, MockTimer, RecordingSink, TimerCall};

use helpbeacon::app::events::AppEvent;
use helpbeacon::app::service::BeaconService;
use helpbeacon::config::BeaconConfig;
use helpbeacon::events::Event;
use helpbeacon::fsm::StateId;
use helpbeacon::setup::GroupId;

const CALM: (u8, u8, u8) = (0, 255, 0);
const ALERT: (u8, u8, u8) = (255, 0, 0);

fn make_service() -> BeaconService<MockDisplay, MockTimer, RecordingSink> {
    BeaconService::new(
        &BeaconConfig::default(),
        GroupId::new(4).unwrap(),
        MockDisplay::new(),
        MockTimer::default(),
        RecordingSink::default(),
    )
}

// ── Construction ─────────────────────────────────────────────

#[test]
fn starts_idle_with_calm_glyph_and_no_timer() {
    let svc = make_service();
    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(svc.display().frames(), vec![('4', CALM)]);
    assert_eq!(svc.timer().calls, vec![TimerCall::Cancel("t")]);
    assert!(!svc.timer().pending());
}

// ── Scenario A: Idle → AssistanceRequested ───────────────────

#[test]
fn request_from_idle_shows_alert_and_arms_timer() {
    let mut svc = make_service();
    assert!(svc.handle(Event::AssistanceRequested));

    assert_eq!(svc.state(), StateId::IndicatorOn);
    assert_eq!(svc.display().last(), Some(('4', ALERT)));
    assert_eq!(
        svc.timer().calls.last(),
        Some(&TimerCall::Start("t", Duration::from_millis(1000)))
    );
}

// ── Scenario B: IndicatorOn → TimerExpired ───────────────────

#[test]
fn expiry_while_on_blanks_and_rearms() {
    let mut svc = make_service();
    svc.handle(Event::AssistanceRequested);
    svc.handle(Event::TimerExpired);

    assert_eq!(svc.state(), StateId::IndicatorOff);
    assert_eq!(svc.display().last(), Some((' ', ALERT)));
    assert_eq!(svc.timer().starts(), 2);
    assert!(svc.timer().pending());
}

// ── Scenario C: IndicatorOff → AssistanceDone ────────────────

#[test]
fn done_while_off_returns_to_calm_idle() {
    let mut svc = make_service();
    svc.handle(Event::AssistanceRequested);
    svc.handle(Event::TimerExpired);
    svc.handle(Event::AssistanceDone);

    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(svc.display().last(), Some(('4', CALM)));
    assert!(!svc.timer().pending());
}

// ── Scenario D: repeated request while on ────────────────────

#[test]
fn second_request_while_on_is_ignored() {
    let mut svc = make_service();
    svc.handle(Event::AssistanceRequested);
    let frames = svc.display().count();
    let timer_calls = svc.timer().calls.len();

    assert!(!svc.handle(Event::AssistanceRequested));

    assert_eq!(svc.state(), StateId::IndicatorOn);
    assert_eq!(svc.display().count(), frames);
    assert_eq!(svc.timer().calls.len(), timer_calls);
    assert_eq!(
        svc.sink().events.last(),
        Some(&AppEvent::Ignored {
            state: StateId::IndicatorOn,
            trigger: Event::AssistanceRequested
        })
    );
}

// ── Idempotence ──────────────────────────────────────────────

#[test]
fn done_while_idle_has_no_side_effects() {
    let mut svc = make_service();
    assert!(!svc.handle(Event::AssistanceDone));
    assert!(!svc.handle(Event::AssistanceDone));

    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(svc.display().count(), 1);
    assert_eq!(svc.timer().calls.len(), 1);
}

#[test]
fn stale_expiry_in_idle_reenters_idle() {
    let mut svc = make_service();
    assert!(svc.handle(Event::TimerExpired));

    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(svc.display().frames(), vec![('4', CALM), ('4', CALM)]);
    assert!(!svc.timer().pending());
    assert_eq!(
        svc.sink().events.last(),
        Some(&AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::Idle,
            trigger: Event::TimerExpired
        })
    );
}

// ── Liveness and exit ────────────────────────────────────────

#[test]
fn expiries_alternate_until_done() {
    let mut svc = make_service();
    svc.handle(Event::AssistanceRequested);
    let mut expected = StateId::IndicatorOn;
    for _ in 0..7 {
        svc.handle(Event::TimerExpired);
        expected = if expected == StateId::IndicatorOn {
            StateId::IndicatorOff
        } else {
            StateId::IndicatorOn
        };
        assert_eq!(svc.state(), expected);
    }
    svc.handle(Event::AssistanceDone);
    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(svc.transition_count(), 9);
    assert_eq!(svc.handled_count(), 9);
}

#[test]
fn shutdown_leaves_no_pending_timer() {
    let mut svc = make_service();
    svc.handle(Event::AssistanceRequested);
    let (display, timer, sink) = svc.shutdown();
    assert!(!timer.pending());
    assert_eq!(display.last(), Some(('4', ALERT)));
    assert_eq!(sink.events.first(), Some(&AppEvent::Started(StateId::Idle)));
}
