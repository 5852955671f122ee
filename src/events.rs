//! Engine events and their network encoding.
//!
//! Events are produced by:
//! - the network listener (decoded remote commands)
//! - the input poller (a local press, mirrored to the network)
//! - the timer service (blink timer expiry)
//!
//! and consumed one at a time by the engine through the router.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Network     │────▶│              │     │              │
//! │ Joystick    │────▶│    Router    │────▶│    Engine    │
//! │ Timer       │────▶│    (FIFO)    │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Only two of the three events ever travel over the network.  Their wire
//! form is a JSON string: `"assistance_requested"` or `"assistance_done"`.

use core::fmt;

/// Triggers understood by the state machine.  No payload beyond the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    /// Someone asked for assistance (remote message or local press).
    AssistanceRequested = 0,
    /// The request was handled (remote message or local press).
    AssistanceDone = 1,
    /// The blink timer fired.
    TimerExpired = 2,
}

impl Event {
    pub const ALL: [Event; 3] = [
        Event::AssistanceRequested,
        Event::AssistanceDone,
        Event::TimerExpired,
    ];

    /// Trigger name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::AssistanceRequested => "assistance_requested",
            Self::AssistanceDone => "assistance_done",
            Self::TimerExpired => "t",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Remote commands ───────────────────────────────────────────

/// The subset of [`Event`] that may be carried by a network message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    AssistanceRequested,
    AssistanceDone,
}

impl RemoteCommand {
    /// Wire tag (the JSON string contents).
    pub fn tag(self) -> &'static str {
        match self {
            Self::AssistanceRequested => "assistance_requested",
            Self::AssistanceDone => "assistance_done",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "assistance_requested" => Some(Self::AssistanceRequested),
            "assistance_done" => Some(Self::AssistanceDone),
            _ => None,
        }
    }

    /// Encoded payload, byte-identical to `serde_json::to_vec(tag)`.
    pub fn payload(self) -> &'static [u8] {
        match self {
            Self::AssistanceRequested => b"\"assistance_requested\"",
            Self::AssistanceDone => b"\"assistance_done\"",
        }
    }
}

impl From<RemoteCommand> for Event {
    fn from(cmd: RemoteCommand) -> Self {
        match cmd {
            RemoteCommand::AssistanceRequested => Event::AssistanceRequested,
            RemoteCommand::AssistanceDone => Event::AssistanceDone,
        }
    }
}

// ── Decoding ──────────────────────────────────────────────────

/// Why an inbound payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not a JSON string.
    Malformed,
    /// Payload is a JSON string but not one of the two known tags.
    UnknownTag(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "payload is not a JSON string"),
            Self::UnknownTag(tag) => write!(f, "unknown tag '{}'", tag),
        }
    }
}

/// Decode a network payload into a remote command.
pub fn decode_payload(payload: &[u8]) -> Result<RemoteCommand, DecodeError> {
    let tag: String = serde_json::from_slice(payload).map_err(|_| DecodeError::Malformed)?;
    RemoteCommand::from_tag(&tag).ok_or(DecodeError::UnknownTag(tag))
}
