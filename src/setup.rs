//! One-time group selection, run before the engine exists.
//!
//! The unit shows a digit; the joystick moves it and the middle button
//! confirms:
//!
//! | Press        | Effect                  |
//! |--------------|-------------------------|
//! | Up / Right   | +1, wraps 9 → 0         |
//! | Down / Left  | −1, wraps 0 → 9         |
//! | Middle       | confirm, clear display  |
//!
//! The result is an immutable [`GroupId`] used for the idle glyph and the
//! network channel name.

use core::fmt;
use std::time::Duration;

use log::info;

use crate::app::ports::{Direction, DisplayPort, InputError, InputPort, JoystickEvent};
use crate::config::Rgb;

/// A group number in `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u8);

impl GroupId {
    pub const MAX: u8 = 9;

    pub fn new(n: u8) -> Option<Self> {
        (n <= Self::MAX).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The digit rendered for this group.
    pub fn glyph(self) -> char {
        char::from(b'0' + self.0)
    }

    /// Network channel for this group under `prefix`.
    pub fn channel(self, prefix: &str) -> String {
        format!("{}/{}", prefix, self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Selector ──────────────────────────────────────────────────

/// Outcome of feeding one joystick event to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorStep {
    /// The shown digit changed.
    Changed(GroupId),
    /// The user confirmed this group.
    Confirmed(GroupId),
    /// Nothing to do (release, hold).
    Unchanged,
}

/// Pure selection logic, separated from polling so it can be tested.
#[derive(Debug, Clone)]
pub struct GroupSelector {
    current: u8,
}

impl GroupSelector {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    pub fn current(&self) -> GroupId {
        GroupId(self.current)
    }

    pub fn apply(&mut self, event: JoystickEvent) -> SelectorStep {
        if !event.is_press() {
            return SelectorStep::Unchanged;
        }
        match event.direction {
            Direction::Up | Direction::Right => {
                self.current = if self.current >= GroupId::MAX { 0 } else { self.current + 1 };
                SelectorStep::Changed(self.current())
            }
            Direction::Down | Direction::Left => {
                self.current = if self.current == 0 { GroupId::MAX } else { self.current - 1 };
                SelectorStep::Changed(self.current())
            }
            Direction::Middle => SelectorStep::Confirmed(self.current()),
        }
    }
}

impl Default for GroupSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until the user confirms a group on `input`.
///
/// Polls every `poll_interval`.  Returns [`InputError::Closed`] if the
/// device closes before a confirmation.
pub fn select_group(
    input: &mut impl InputPort,
    display: &mut impl DisplayPort,
    colour: Rgb,
    poll_interval: Duration,
) -> Result<GroupId, InputError> {
    let mut selector = GroupSelector::new();
    display.render(selector.current().glyph(), colour);

    loop {
        while let Some(event) = input.poll()? {
            match selector.apply(event) {
                SelectorStep::Changed(group) => display.render(group.glyph(), colour),
                SelectorStep::Confirmed(group) => {
                    display.clear();
                    info!("Setup: group {} selected", group);
                    return Ok(group);
                }
                SelectorStep::Unchanged => {}
            }
        }
        std::thread::sleep(poll_interval);
    }
}
