//! Application service: the hexagonal core.
//!
//! [`BeaconService`] owns the FSM, its context, the display and the timer.
//! It is the only place where entry-action commands become real side
//! effects, and the only writer of the current state.
//!
//! ```text
//!  Router ──▶ ┌────────────────────────┐ ──▶ DisplayPort
//!  (events)   │     BeaconService      │ ──▶ TimerPort
//!             │   FSM · FsmContext     │ ──▶ EventSink
//!             └───────────┬────────────┘
//!                         └──▶ StateSnapshot (read by the input poller)
//! ```
//!
//! The service is single-threaded by construction: it is not `Sync`
//! and the runtime moves it onto the router's consumer thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use log::info;

use crate::config::BeaconConfig;
use crate::events::Event;
use crate::fsm::context::{FsmContext, IndicatorCommand};
use crate::fsm::states::{BLINK_TIMER, build_state_table};
use crate::fsm::{Fsm, StateId};
use crate::setup::GroupId;

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, TimerPort};

// ───────────────────────────────────────────────────────────────
// StateSnapshot
// ───────────────────────────────────────────────────────────────

/// Read-only view of the current state, shareable across threads.
///
/// Only [`BeaconService`] stores into it.
#[derive(Debug, Clone)]
pub struct StateSnapshot(Arc<AtomicU8>);

impl StateSnapshot {
    pub(crate) fn new(state: StateId) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    pub(crate) fn store(&self, state: StateId) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Latest state published by the engine.
    pub fn load(&self) -> StateId {
        StateId::from_index(self.0.load(Ordering::Acquire) as usize)
    }

    pub fn is_idle(&self) -> bool {
        self.load() == StateId::Idle
    }
}

// ───────────────────────────────────────────────────────────────
// BeaconService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct BeaconService<D, T, S> {
    fsm: Fsm,
    ctx: FsmContext,
    display: D,
    timer: T,
    sink: S,
    snapshot: StateSnapshot,
    handled: u64,
}

impl<D, T, S> BeaconService<D, T, S>
where
    D: DisplayPort,
    T: TimerPort,
    S: EventSink,
{
    /// Construct the service and enter the initial state.
    ///
    /// Idle's entry action runs here, exactly once: the display shows the
    /// group glyph in the calm colour and the blink timer is cancelled.
    pub fn new(config: &BeaconConfig, group: GroupId, display: D, timer: T, sink: S) -> Self {
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        let ctx = FsmContext::new(config, group);
        let snapshot = StateSnapshot::new(fsm.current_state());

        let mut service = Self {
            fsm,
            ctx,
            display,
            timer,
            sink,
            snapshot,
            handled: 0,
        };
        service.fsm.start(&mut service.ctx);
        service.apply_commands();
        service.sink.emit(&AppEvent::Started(service.fsm.current_state()));
        info!("BeaconService started in {:?} (group {})", service.state(), group);
        service
    }

    // ── Event handling ────────────────────────────────────────

    /// Apply one event: transition lookup, entry action, side effects.
    ///
    /// Returns `true` if a rule matched.
    pub fn handle(&mut self, event: Event) -> bool {
        self.handled += 1;

        match self.fsm.handle(event, &mut self.ctx) {
            Some(from) => {
                let to = self.fsm.current_state();
                self.snapshot.store(to);
                self.apply_commands();
                self.sink.emit(&AppEvent::StateChanged {
                    from,
                    to,
                    trigger: event,
                });
                true
            }
            None => {
                self.sink.emit(&AppEvent::Ignored {
                    state: self.fsm.current_state(),
                    trigger: event,
                });
                false
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// A shareable read-only handle on the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        self.snapshot.clone()
    }

    /// Events handled since construction, ignored ones included.
    pub fn handled_count(&self) -> u64 {
        self.handled
    }

    /// Matched transitions since construction.
    pub fn transition_count(&self) -> u64 {
        self.fsm.transitions()
    }

    pub fn group(&self) -> GroupId {
        self.ctx.group
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Cancel the blink timer and hand back the owned ports.
    pub fn shutdown(mut self) -> (D, T, S) {
        self.timer.cancel(BLINK_TIMER);
        info!("BeaconService stopped in {:?} after {} events", self.state(), self.handled);
        (self.display, self.timer, self.sink)
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate entry-action commands into port calls, in issue order.
    fn apply_commands(&mut self) {
        for cmd in self.ctx.take_commands() {
            match cmd {
                IndicatorCommand::Render { symbol, colour } => {
                    self.display.render(symbol, colour);
                }
                IndicatorCommand::StartTimer { name, duration } => {
                    self.timer.start(name, duration);
                }
                IndicatorCommand::CancelTimer { name } => {
                    self.timer.cancel(name);
                }
            }
        }
    }
}
