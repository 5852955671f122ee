//! Event-driven finite state machine engine.
//!
//! Two static tables drive the machine:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  TRANSITIONS (pure)           StateTable (entry actions) │
//! │  ┌──────────────┬─────────┐   ┌──────────────┬────────┐  │
//! │  │ (from, evt)  │ to      │   │ StateId      │on_enter│  │
//! │  ├──────────────┼─────────┤   ├──────────────┼────────┤  │
//! │  │ Idle, Req    │ On      │   │ Idle         │ fn(ctx)│  │
//! │  │ On,   t      │ Off     │   │ IndicatorOn  │ fn(ctx)│  │
//! │  │ Off,  t      │ On      │   │ IndicatorOff │ fn(ctx)│  │
//! │  │ On,   Done   │ Idle    │   └──────────────┴────────┘  │
//! │  │ Off,  Done   │ Idle    │                              │
//! │  │ Idle, t      │ Idle    │                              │
//! │  └──────────────┴─────────┘                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`next_state`] is a pure lookup over [`TRANSITIONS`].  When it yields a
//! target, the engine updates its current pointer and runs the target's
//! `on_enter`, which only writes commands into the [`FsmContext`].  The
//! caller applies those commands to the display and timer afterwards.
//! An event with no matching row is ignored: no state change, no entry
//! action.

pub mod context;
pub mod states;

use context::FsmContext;
use log::{debug, info};

use crate::events::Event;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible indicator states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    IndicatorOn = 1,
    IndicatorOff = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    pub const ALL: [StateId; StateId::COUNT] =
        [StateId::Idle, StateId::IndicatorOn, StateId::IndicatorOff];

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::IndicatorOn,
            2 => Self::IndicatorOff,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub trigger: Event,
    pub to: StateId,
}

const fn rule(from: StateId, trigger: Event, to: StateId) -> Transition {
    Transition { from, trigger, to }
}

/// The complete, immutable transition table.
///
/// `Idle × TimerExpired → Idle` re-enters Idle, which cancels the blink
/// timer again.  It absorbs an expiry that was already queued when
/// `AssistanceDone` arrived.
pub static TRANSITIONS: [Transition; 6] = [
    rule(StateId::Idle, Event::AssistanceRequested, StateId::IndicatorOn),
    rule(StateId::IndicatorOn, Event::TimerExpired, StateId::IndicatorOff),
    rule(StateId::IndicatorOff, Event::TimerExpired, StateId::IndicatorOn),
    rule(StateId::IndicatorOn, Event::AssistanceDone, StateId::Idle),
    rule(StateId::IndicatorOff, Event::AssistanceDone, StateId::Idle),
    rule(StateId::Idle, Event::TimerExpired, StateId::Idle),
];

/// Pure transition function.  `None` means the event is ignored in `state`.
pub fn next_state(state: StateId, event: Event) -> Option<StateId> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == state && t.trigger == event)
        .map(|t| t.to)
}

// ---------------------------------------------------------------------------
// Function-pointer type alias
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
/// These run exactly once each time a state becomes current.
pub type StateActionFn = fn(&mut FsmContext);

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: StateActionFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the current pointer.  It never touches the
/// outside world: entry actions write into the [`FsmContext`] passed in.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Number of matched transitions, self-loops included.
    transitions: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `handle()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        ctx.clear_commands();
        (self.table[self.current].on_enter)(ctx);
    }

    /// Apply one event.
    ///
    /// Returns the state that was left if a rule matched (the entry action
    /// of the new current state has run), or `None` if the event was
    /// ignored.
    pub fn handle(&mut self, event: Event, ctx: &mut FsmContext) -> Option<StateId> {
        let from = self.current_state();
        let Some(to) = next_state(from, event) else {
            debug!("FSM: {} ignored in {}", event, self.table[self.current].name);
            return None;
        };
        self.transition(to, event, ctx);
        Some(from)
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Name of the current state, as written in logs.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// Number of matched transitions since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, trigger: Event, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -[{}]-> {}",
            self.table[self.current].name, trigger, self.table[next_idx].name
        );

        self.current = next_idx;
        self.transitions += 1;

        ctx.clear_commands();
        (self.table[self.current].on_enter)(ctx);
    }
}
