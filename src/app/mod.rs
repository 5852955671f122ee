//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the indicator: FSM
//! orchestration and the translation of entry-action commands into
//! display and timer calls.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
