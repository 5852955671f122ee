//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BeaconService (domain)
//! ```
//!
//! Driven adapters (display, timer, event sinks) and driving adapters
//! (network transport, joystick) implement these traits.  The
//! [`BeaconService`](super::service::BeaconService) and the producer loops
//! consume them via generics, so the domain core never touches hardware
//! or sockets directly.

use core::fmt;
use std::time::Duration;

use crate::config::Rgb;

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → LED matrix / terminal)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to show a glyph.
///
/// Rendering is assumed to succeed; adapters log their own failures.
pub trait DisplayPort {
    /// Show `symbol` in `colour`, replacing whatever was shown.
    fn render(&mut self, symbol: char, colour: Rgb);

    /// Blank the display.
    fn clear(&mut self) {
        self.render(' ', (0, 0, 0));
    }
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: domain → timer service)
// ───────────────────────────────────────────────────────────────

/// Timer identity.  Starting a timer whose name is pending supersedes it.
pub type TimerName = &'static str;

/// One-shot named timers.  Expiry is delivered back through the router,
/// never through this trait.
pub trait TimerPort {
    /// Schedule an expiry `duration` from now, replacing any pending
    /// timer with the same name.
    fn start(&mut self, name: TimerName, duration: Duration);

    /// Drop the pending timer with this name, if any.
    fn cancel(&mut self, name: TimerName);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Network ports (driving + driven adapters: transport ↔ domain)
// ───────────────────────────────────────────────────────────────

/// A message as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Logical channel the message arrived on.
    pub channel: String,
    /// Raw payload bytes, not yet decoded.
    pub payload: Vec<u8>,
}

/// Receive side of the network transport.
pub trait InboundPort {
    /// Wait up to `timeout` for the next message.  `Ok(None)` on timeout.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<InboundMessage>, CommsError>;
}

/// Send side of the network transport.  Fire-and-forget: callers log
/// failures and carry on.
pub trait PublishPort {
    fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Input port (driving adapter: joystick → domain)
// ───────────────────────────────────────────────────────────────

/// Joystick direction.  `Middle` is the push-to-select button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Middle,
}

/// What happened to the stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pressed,
    Released,
    Held,
}

/// A single discrete joystick event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickEvent {
    pub direction: Direction,
    pub action: Action,
}

impl JoystickEvent {
    pub fn pressed(direction: Direction) -> Self {
        Self {
            direction,
            action: Action::Pressed,
        }
    }

    pub fn is_press(&self) -> bool {
        self.action == Action::Pressed
    }
}

/// Polled input device.
pub trait InputPort {
    /// Next buffered event, `Ok(None)` if nothing is pending.
    fn poll(&mut self) -> Result<Option<JoystickEvent>, InputError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from the network ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Socket could not be created or bound.
    BindFailed,
    /// Sending a publication failed.
    PublishFailed,
    /// Receiving failed for a reason other than a timeout.
    ReceiveFailed,
    /// Datagram did not contain a channel header.
    BadFrame,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed => write!(f, "bind failed"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::ReceiveFailed => write!(f, "receive failed"),
            Self::BadFrame => write!(f, "bad frame"),
        }
    }
}

/// Errors from [`InputPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The device could not be opened.
    OpenFailed,
    /// The device reached end-of-stream; no further events will arrive.
    Closed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "input device open failed"),
            Self::Closed => write!(f, "input device closed"),
        }
    }
}
