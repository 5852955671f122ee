//! Concrete entry actions and table builder.
//!
//! Each state is defined by one plain `fn` pointer.  Entry actions only
//! write [`IndicatorCommand`]s into the context.
//!
//! ```text
//!  IDLE ──[assistance_requested]──▶ INDICATOR_ON ◀──[t]── INDICATOR_OFF
//!   ▲ │                                  │                    ▲    │
//!   │ └[t]┐                              └────────[t]─────────┘    │
//!   │◀────┘                                                        │
//!   └─────────────[assistance_done]── ON or OFF ◀──────────────────┘
//! ```

use super::context::{FsmContext, IndicatorCommand};
use super::{StateDescriptor, StateId};
use crate::app::ports::TimerName;

/// Name of the single blink timer.
pub const BLINK_TIMER: TimerName = "t";

/// Glyph shown during the dark half of a blink.
pub const BLANK_GLYPH: char = ' ';

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "idle",
            on_enter: idle_enter,
        },
        // Index 1: IndicatorOn
        StateDescriptor {
            id: StateId::IndicatorOn,
            name: "assistance_light_on",
            on_enter: indicator_on_enter,
        },
        // Index 2: IndicatorOff
        StateDescriptor {
            id: StateId::IndicatorOff,
            name: "assistance_light_off",
            on_enter: indicator_off_enter,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: group number in calm colour, no timer
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.issue(IndicatorCommand::Render {
        symbol: ctx.group.glyph(),
        colour: ctx.calm_colour,
    });
    ctx.issue(IndicatorCommand::CancelTimer { name: BLINK_TIMER });
}

// ═══════════════════════════════════════════════════════════════════════════
//  INDICATOR_ON: group number in alert colour
// ═══════════════════════════════════════════════════════════════════════════

fn indicator_on_enter(ctx: &mut FsmContext) {
    ctx.issue(IndicatorCommand::StartTimer {
        name: BLINK_TIMER,
        duration: ctx.blink_period,
    });
    ctx.issue(IndicatorCommand::Render {
        symbol: ctx.group.glyph(),
        colour: ctx.alert_colour,
    });
}

// ═══════════════════════════════════════════════════════════════════════════
//  INDICATOR_OFF: blank glyph
// ═══════════════════════════════════════════════════════════════════════════

fn indicator_off_enter(ctx: &mut FsmContext) {
    ctx.issue(IndicatorCommand::StartTimer {
        name: BLINK_TIMER,
        duration: ctx.blink_period,
    });
    ctx.issue(IndicatorCommand::Render {
        symbol: BLANK_GLYPH,
        colour: ctx.alert_colour,
    });
}
