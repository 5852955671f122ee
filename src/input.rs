//! Input poller: maps a middle-button press to a request or a release.
//!
//! The decision depends on the engine's state at the moment of the press:
//! Idle raises a request, anything else marks it done.  The decision is
//! published on the group channel first so other units follow, then
//! submitted locally.  A failed publish never blocks the local event.

use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{Direction, InputError, InputPort, JoystickEvent, PublishPort};
use crate::app::service::StateSnapshot;
use crate::error::Result;
use crate::events::{Event, RemoteCommand};
use crate::router::RouterHandle;
use crate::worker::{StopSignal, Worker};

pub struct InputPoller<P> {
    channel: String,
    publisher: P,
    router: RouterHandle,
    snapshot: StateSnapshot,
    presses: u64,
}

impl<P: PublishPort> InputPoller<P> {
    pub fn new(
        channel: impl Into<String>,
        publisher: P,
        router: RouterHandle,
        snapshot: StateSnapshot,
    ) -> Self {
        Self {
            channel: channel.into(),
            publisher,
            router,
            snapshot,
            presses: 0,
        }
    }

    /// What a press means right now.
    pub fn decide(&self) -> RemoteCommand {
        if self.snapshot.is_idle() {
            RemoteCommand::AssistanceRequested
        } else {
            RemoteCommand::AssistanceDone
        }
    }

    /// Handle one joystick event.  Returns the event the router accepted
    /// for a middle press, `None` for everything else or when the router
    /// refused it.
    pub fn on_input(&mut self, input: JoystickEvent) -> Option<Event> {
        if !input.is_press() || input.direction != Direction::Middle {
            return None;
        }
        self.presses += 1;

        let cmd = self.decide();
        if let Err(e) = self.publisher.publish(&self.channel, cmd.payload()) {
            warn!("Input: publish of {} failed: {}", cmd.tag(), e);
        }

        let event = Event::from(cmd);
        if !self.router.submit(event) {
            // Other units already saw the publish; this one falls out of step.
            warn!("Input: {} published but not accepted locally", event);
            return None;
        }
        debug!("Input: press -> {}", event);
        Some(event)
    }

    /// Middle presses handled so far.
    pub fn presses(&self) -> u64 {
        self.presses
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Poll `input` every `interval` until `stop` is raised or the device
    /// closes.
    pub fn run(
        &mut self,
        input: &mut impl InputPort,
        interval: Duration,
        stop: &StopSignal,
    ) -> core::result::Result<(), InputError> {
        info!("Input: polling every {:?}", interval);
        while !stop.is_set() {
            while let Some(ev) = input.poll()? {
                self.on_input(ev);
            }
            std::thread::sleep(interval);
        }
        Ok(())
    }
}

impl<P: PublishPort + Send + 'static> InputPoller<P> {
    /// Run the poll loop on its own thread.  `on_exit` runs on that thread
    /// once the loop ends, with the reason it ended.
    pub fn spawn<I, F>(mut self, mut input: I, interval: Duration, on_exit: F) -> Result<Worker>
    where
        I: InputPort + Send + 'static,
        F: FnOnce(core::result::Result<(), InputError>) + Send + 'static,
    {
        Worker::spawn("input-poller", move |stop| {
            let outcome = self.run(&mut input, interval, &stop);
            match outcome {
                Ok(()) => info!("Input: poller stopped after {} presses", self.presses),
                Err(e) => info!("Input: poller ended: {}", e),
            }
            on_exit(outcome);
        })
    }
}
