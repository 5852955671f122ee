//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real display,
//! joystick or network required.

mod mock_hw;
mod producer_tests;
mod runtime_tests;
mod service_tests;
mod setup_tests;
