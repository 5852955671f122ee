//! Network listener: turns inbound messages into engine events.
//!
//! Only messages on this unit's group channel are considered.  The payload
//! must decode to one of the two remote commands; anything else is logged
//! and dropped before it reaches the router.

use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{InboundMessage, InboundPort};
use crate::error::Result;
use crate::events::{Event, decode_payload};
use crate::router::RouterHandle;
use crate::worker::{StopSignal, Worker};

/// Pause after a transport error before receiving again.
pub const ERROR_BACKOFF: Duration = Duration::from_millis(250);

pub struct NetworkListener {
    channel: String,
    router: RouterHandle,
    accepted: u64,
    dropped: u64,
    refused: u64,
}

impl NetworkListener {
    pub fn new(channel: impl Into<String>, router: RouterHandle) -> Self {
        Self {
            channel: channel.into(),
            router,
            accepted: 0,
            dropped: 0,
            refused: 0,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Decode `payload` and submit the resulting event.
    ///
    /// Returns the event the router accepted, or `None` if the payload was
    /// rejected or the router refused the event.
    pub fn on_message(&mut self, payload: &[u8]) -> Option<Event> {
        match decode_payload(payload) {
            Ok(cmd) => {
                let event = Event::from(cmd);
                if !self.router.submit(event) {
                    self.refused += 1;
                    return None;
                }
                debug!("Net: {} on {}", event, self.channel);
                self.accepted += 1;
                Some(event)
            }
            Err(e) => {
                self.dropped += 1;
                warn!("Net: dropping payload on {}: {}", self.channel, e);
                None
            }
        }
    }

    /// Filter by channel, then [`on_message`](Self::on_message).
    pub fn on_inbound(&mut self, msg: &InboundMessage) -> Option<Event> {
        if msg.channel != self.channel {
            debug!("Net: ignoring message on {}", msg.channel);
            return None;
        }
        self.on_message(&msg.payload)
    }

    /// Events accepted by the router.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Payloads rejected by the decoder.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Valid events the router refused.
    pub fn refused(&self) -> u64 {
        self.refused
    }

    /// Receive loop.  Returns when `stop` is raised.
    pub fn run(&mut self, inbound: &mut impl InboundPort, poll_timeout: Duration, stop: &StopSignal) {
        info!("Net: listening on {}", self.channel);
        while !stop.is_set() {
            match inbound.recv_timeout(poll_timeout) {
                Ok(Some(msg)) => {
                    self.on_inbound(&msg);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Net: receive error: {}", e);
                    std::thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!(
            "Net: listener exiting ({} accepted, {} dropped, {} refused)",
            self.accepted, self.dropped, self.refused
        );
    }

    /// Run the receive loop on its own thread.
    pub fn spawn<N>(mut self, mut inbound: N, poll_timeout: Duration) -> Result<Worker>
    where
        N: InboundPort + Send + 'static,
    {
        Worker::spawn("net-listener", move |stop| {
            self.run(&mut inbound, poll_timeout, &stop);
        })
    }
}
