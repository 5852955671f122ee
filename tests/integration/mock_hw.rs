//! Mock hardware and transport adapters for integration tests.
//!
//! Every mock records its calls so tests can assert on the full history.
//! The ones that cross threads keep their log behind `Arc<Mutex<_>>` and
//! hand out a cloneable probe.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use helpbeacon::app::events::AppEvent;
use helpbeacon::app::ports::{
    CommsError, DisplayPort, EventSink, InboundMessage, InboundPort, InputError, InputPort,
    JoystickEvent, PublishPort, TimerName, TimerPort,
};
use helpbeacon::config::Rgb;

// ── Display ───────────────────────────────────────────────────

/// Records every rendered frame.  Clones share the same log.
#[derive(Clone, Default)]
pub struct MockDisplay {
    frames: Arc<Mutex<Vec<(char, Rgb)>>>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<(char, Rgb)> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(char, Rgb)> {
        self.frames.lock().unwrap().last().copied()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, symbol: char, colour: Rgb) {
        self.frames.lock().unwrap().push((symbol, colour));
    }
}

// ── Timer ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TimerCall {
    Start(TimerName, Duration),
    Cancel(TimerName),
}

/// Records start/cancel calls; never fires on its own.
#[derive(Default)]
pub struct MockTimer {
    pub calls: Vec<TimerCall>,
}

#[allow(dead_code)]
impl MockTimer {
    /// Whether a timer is pending after replaying the call log.
    pub fn pending(&self) -> bool {
        self.calls
            .last()
            .is_some_and(|c| matches!(c, TimerCall::Start(..)))
    }

    pub fn starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, TimerCall::Start(..)))
            .count()
    }
}

impl TimerPort for MockTimer {
    fn start(&mut self, name: TimerName, duration: Duration) {
        self.calls.push(TimerCall::Start(name, duration));
    }

    fn cancel(&mut self, name: TimerName) {
        self.calls.push(TimerCall::Cancel(name));
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Transport ─────────────────────────────────────────────────

#[derive(Default)]
struct BusState {
    queue: VecDeque<InboundMessage>,
    published: Vec<InboundMessage>,
    fail_publish: bool,
}

/// In-memory broker.  Publications are recorded and, like a real broker,
/// delivered back to the subscriber on the same channel.
#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a message as if another unit had published it.
    pub fn inject(&self, channel: &str, payload: &[u8]) {
        self.state.lock().unwrap().queue.push_back(InboundMessage {
            channel: channel.to_string(),
            payload: payload.to_vec(),
        });
    }

    pub fn published(&self) -> Vec<InboundMessage> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn set_fail_publish(&self, fail: bool) {
        self.state.lock().unwrap().fail_publish = fail;
    }

    /// Messages waiting to be received.
    pub fn queued(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }
}

impl PublishPort for MockBus {
    fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), CommsError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_publish {
            return Err(CommsError::PublishFailed);
        }
        let msg = InboundMessage {
            channel: channel.to_string(),
            payload: payload.to_vec(),
        };
        state.published.push(msg.clone());
        state.queue.push_back(msg);
        Ok(())
    }
}

impl InboundPort for MockBus {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<InboundMessage>, CommsError> {
        if let Some(msg) = self.state.lock().unwrap().queue.pop_front() {
            return Ok(Some(msg));
        }
        std::thread::sleep(timeout.min(Duration::from_millis(5)));
        Ok(None)
    }
}

// ── Input ─────────────────────────────────────────────────────

/// Scripted joystick.  Tests push events through a cloned handle and
/// close it to simulate end-of-stream.
#[derive(Clone, Default)]
pub struct MockInput {
    queue: Arc<Mutex<VecDeque<JoystickEvent>>>,
    closed: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: impl IntoIterator<Item = JoystickEvent>) -> Self {
        let input = Self::new();
        input.queue.lock().unwrap().extend(events);
        input
    }

    pub fn push(&self, event: JoystickEvent) {
        self.queue.lock().unwrap().push_back(event);
    }

    /// Report `Closed` once the queue is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl InputPort for MockInput {
    fn poll(&mut self) -> Result<Option<JoystickEvent>, InputError> {
        if let Some(event) = self.queue.lock().unwrap().pop_front() {
            return Ok(Some(event));
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(InputError::Closed);
        }
        Ok(None)
    }
}
