//! Context threaded through every entry action.
//!
//! `FsmContext` carries the read-only parameters entry actions need (group
//! glyph, colours, blink period) and collects the commands they issue.
//! The engine never executes a command itself; the service drains
//! [`FsmContext::commands`] after each transition and applies them to the
//! display and timer ports in order.

use std::time::Duration;

use heapless::Vec;
use log::warn;

use crate::app::ports::TimerName;
use crate::config::{BeaconConfig, Rgb};
use crate::setup::GroupId;

/// Upper bound on commands a single entry action may issue.
pub const MAX_COMMANDS: usize = 4;

// ---------------------------------------------------------------------------
// Indicator commands (written by entry actions; applied by the service)
// ---------------------------------------------------------------------------

/// A side effect requested by an entry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCommand {
    /// Show `symbol` in `colour`.
    Render { symbol: char, colour: Rgb },
    /// Start (or re-arm) the named timer.
    StartTimer { name: TimerName, duration: Duration },
    /// Drop the named timer if pending.
    CancelTimer { name: TimerName },
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every entry action.
pub struct FsmContext {
    // -- Identity --
    /// Group number shown on the display.
    pub group: GroupId,

    // -- Parameters --
    /// Time each blink phase stays visible.
    pub blink_period: Duration,
    /// Glyph colour while idle.
    pub calm_colour: Rgb,
    /// Glyph colour while assistance is requested.
    pub alert_colour: Rgb,

    // -- Outputs --
    /// Commands issued by the most recent entry action.
    pub commands: Vec<IndicatorCommand, MAX_COMMANDS>,
}

impl FsmContext {
    /// Create a new context for `group` with the configured parameters.
    pub fn new(config: &BeaconConfig, group: GroupId) -> Self {
        Self {
            group,
            blink_period: config.blink_period(),
            calm_colour: config.calm_colour,
            alert_colour: config.alert_colour,
            commands: Vec::new(),
        }
    }

    /// Queue a command for the service to apply.
    pub fn issue(&mut self, cmd: IndicatorCommand) {
        if self.commands.push(cmd).is_err() {
            warn!("FSM: command buffer full, dropping {:?}", cmd);
        }
    }

    /// Forget commands from a previous entry action.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Take the pending commands, leaving the buffer empty.
    pub fn take_commands(&mut self) -> Vec<IndicatorCommand, MAX_COMMANDS> {
        core::mem::take(&mut self.commands)
    }
}
