//! Event router: the single serialization point in front of the engine.
//!
//! Uses an `embassy-sync` bounded channel as a many-producer,
//! single-consumer FIFO.  Producers (network listener, input poller,
//! timer worker) enqueue without blocking; the engine thread drains it
//! with `futures_lite::future::block_on`, which parks the thread while the
//! channel is empty.
//!
//! ```text
//! ┌──────────────┐
//! │ Net listener │──┐
//! ├──────────────┤  │ submit   ┌────────────────┐  run   ┌──────────────┐
//! │ Input poller │──┼────────▶│ Channel (FIFO) │──────▶│ BeaconService │
//! ├──────────────┤  │          └────────────────┘        └──────────────┘
//! │ Timer worker │──┘
//! └──────────────┘
//! ```
//!
//! A full channel refuses the submission.  The timer worker treats a
//! refusal as "retry later" (see [`crate::timer`]), so an expiry is delayed
//! rather than lost.
//!
//! Stopping is in-band: [`RouterHandle::request_stop`] enqueues a marker
//! behind everything already submitted, so [`EventRouter::run`] delivers
//! all earlier events before returning.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;
use log::{debug, info, warn};

use crate::events::Event;

/// Channel depth.  Producers are few and the consumer never blocks, so
/// the queue stays near-empty in practice.
pub const ROUTER_DEPTH: usize = 64;

/// What travels through the channel.
enum Envelope {
    Event(Event),
    Stop,
}

struct Shared {
    channel: Channel<CriticalSectionRawMutex, Envelope, ROUTER_DEPTH>,
    closed: AtomicBool,
    rejected: AtomicU64,
}

/// Consumer side.  Owned by the engine thread.
pub struct EventRouter {
    shared: Arc<Shared>,
}

/// Producer side.  Cheap to clone, safe to use from any thread.
#[derive(Clone)]
pub struct RouterHandle {
    shared: Arc<Shared>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                channel: Channel::new(),
                closed: AtomicBool::new(false),
                rejected: AtomicU64::new(0),
            }),
        }
    }

    /// A new producer handle.
    pub fn handle(&self) -> RouterHandle {
        RouterHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Deliver events to `consumer`, one at a time, in arrival order.
    ///
    /// Blocks while the channel is empty.  Returns the number of events
    /// delivered once a stop marker is dequeued.
    pub fn run(&self, mut consumer: impl FnMut(Event)) -> u64 {
        let mut delivered = 0;
        loop {
            match block_on(self.shared.channel.receive()) {
                Envelope::Event(event) => {
                    consumer(event);
                    delivered += 1;
                }
                Envelope::Stop => {
                    info!("Router: stop requested after {} events", delivered);
                    return delivered;
                }
            }
        }
    }

    /// Reject every later submission.  Call after [`run`](Self::run)
    /// returned and the last producer (the timer) has been shut down.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        let leftover = self.shared.channel.len();
        if leftover > 0 {
            debug!("Router: closed with {} undelivered entries", leftover);
        }
        self.shared.channel.clear();
    }

    /// Entries currently queued (events and stop markers).
    pub fn pending(&self) -> usize {
        self.shared.channel.len()
    }

    /// Submissions refused because the router was closed or full.
    pub fn rejected(&self) -> u64 {
        self.shared.rejected.load(Ordering::Relaxed)
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterHandle {
    /// Enqueue `event` without blocking.
    ///
    /// Returns `false` if the router is closed or the channel is full.
    pub fn submit(&self, event: Event) -> bool {
        if self.is_closed() {
            self.shared.rejected.fetch_add(1, Ordering::Relaxed);
            debug!("Router: closed, dropping {}", event);
            return false;
        }
        if self.shared.channel.try_send(Envelope::Event(event)).is_err() {
            self.shared.rejected.fetch_add(1, Ordering::Relaxed);
            warn!("Router: channel full, dropping {}", event);
            return false;
        }
        true
    }

    /// Ask the consumer to return from [`EventRouter::run`] after draining
    /// everything submitted before this call.
    ///
    /// Waits for channel space if the queue is momentarily full.
    pub fn request_stop(&self) {
        if self.is_closed() {
            return;
        }
        block_on(self.shared.channel.send(Envelope::Stop));
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}
