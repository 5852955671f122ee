//! Network listener and input poller feeding the engine through the
//! router, with the in-memory broker echoing publications back.

use crate::mock_hw::{MockBus, MockDisplay, MockTimer, RecordingSink};

use helpbeacon::app::ports::{Direction, InboundPort, JoystickEvent};
use helpbeacon::app::service::BeaconService;
use helpbeacon::config::BeaconConfig;
use helpbeacon::events::Event;
use helpbeacon::fsm::StateId;
use helpbeacon::input::InputPoller;
use helpbeacon::network::NetworkListener;
use helpbeacon::router::EventRouter;
use helpbeacon::setup::GroupId;

use std::time::Duration;

const CHANNEL: &str = "raspberrypi/2";

struct Rig {
    router: EventRouter,
    service: BeaconService<MockDisplay, MockTimer, RecordingSink>,
    listener: NetworkListener,
    poller: InputPoller<MockBus>,
    bus: MockBus,
}

fn rig() -> Rig {
    let router = EventRouter::new();
    let service = BeaconService::new(
        &BeaconConfig::default(),
        GroupId::new(2).unwrap(),
        MockDisplay::new(),
        MockTimer::default(),
        RecordingSink::default(),
    );
    let bus = MockBus::new();
    let listener = NetworkListener::new(CHANNEL, router.handle());
    let poller = InputPoller::new(CHANNEL, bus.clone(), router.handle(), service.snapshot());
    Rig {
        router,
        service,
        listener,
        poller,
        bus,
    }
}

impl Rig {
    /// Deliver everything queued on the broker to the listener.
    fn pump_network(&mut self) {
        let mut inbound = self.bus.clone();
        while let Ok(Some(msg)) = inbound.recv_timeout(Duration::from_millis(1)) {
            self.listener.on_inbound(&msg);
        }
    }

    /// Apply everything queued on the router.
    fn pump_engine(&mut self) -> Vec<Event> {
        self.router.handle().request_stop();
        let mut seen = Vec::new();
        let service = &mut self.service;
        self.router.run(|e| {
            seen.push(e);
            service.handle(e);
        });
        seen
    }
}

#[test]
fn remote_request_and_done_drive_the_indicator() {
    let mut rig = rig();
    rig.bus.inject(CHANNEL, br#""assistance_requested""#);
    rig.pump_network();
    rig.pump_engine();
    assert_eq!(rig.service.state(), StateId::IndicatorOn);

    rig.bus.inject(CHANNEL, br#""assistance_done""#);
    rig.pump_network();
    rig.pump_engine();
    assert_eq!(rig.service.state(), StateId::Idle);
}

#[test]
fn foreign_channel_and_bad_payloads_never_reach_engine() {
    let mut rig = rig();
    rig.bus.inject("raspberrypi/3", br#""assistance_requested""#);
    rig.bus.inject(CHANNEL, b"not json");
    rig.bus.inject(CHANNEL, br#""t""#);
    rig.pump_network();
    assert!(rig.pump_engine().is_empty());
    assert_eq!(rig.service.state(), StateId::Idle);
    assert_eq!(rig.listener.dropped(), 2);
}

#[test]
fn local_press_publishes_before_submitting() {
    let mut rig = rig();
    rig.poller
        .on_input(JoystickEvent::pressed(Direction::Middle));

    let published = rig.bus.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].channel, CHANNEL);
    assert_eq!(published[0].payload, br#""assistance_requested""#);

    assert_eq!(rig.pump_engine(), vec![Event::AssistanceRequested]);
    assert_eq!(rig.service.state(), StateId::IndicatorOn);
}

/// The broker echoes the unit's own press back.  The echoed request
/// arrives while already on and matches no rule.
#[test]
fn echoed_press_is_filtered_by_the_table() {
    let mut rig = rig();
    rig.poller
        .on_input(JoystickEvent::pressed(Direction::Middle));
    rig.pump_engine();
    let frames = rig.service.display().count();

    rig.pump_network();
    assert_eq!(rig.pump_engine(), vec![Event::AssistanceRequested]);
    assert_eq!(rig.service.state(), StateId::IndicatorOn);
    assert_eq!(rig.service.display().count(), frames);
    assert_eq!(rig.service.timer().starts(), 1);
}

#[test]
fn second_press_while_on_clears_everywhere() {
    let mut rig = rig();
    rig.poller
        .on_input(JoystickEvent::pressed(Direction::Middle));
    rig.pump_engine();
    rig.poller
        .on_input(JoystickEvent::pressed(Direction::Middle));
    rig.pump_engine();
    assert_eq!(rig.service.state(), StateId::Idle);

    let tags: Vec<_> = rig.bus.published().into_iter().map(|m| m.payload).collect();
    assert_eq!(
        tags,
        vec![
            br#""assistance_requested""#.to_vec(),
            br#""assistance_done""#.to_vec()
        ]
    );
}

#[test]
fn failed_publish_does_not_block_local_handling() {
    let mut rig = rig();
    rig.bus.set_fail_publish(true);
    rig.poller
        .on_input(JoystickEvent::pressed(Direction::Middle));
    rig.pump_engine();
    assert_eq!(rig.service.state(), StateId::IndicatorOn);
    assert!(rig.bus.published().is_empty());
}
