//! Outbound application events.
//!
//! The [`BeaconService`](super::service::BeaconService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, count them in a
//! test, etc.

use crate::events::Event;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The engine was constructed and entered its initial state.
    Started(StateId),

    /// A transition rule matched; `from == to` for self-loops.
    StateChanged {
        from: StateId,
        to: StateId,
        trigger: Event,
    },

    /// No rule matched; state and display are untouched.
    Ignored { state: StateId, trigger: Event },
}
