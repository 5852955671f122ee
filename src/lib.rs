//! HelpBeacon library.
//!
//! Exposes the engine, the producer loops and the host adapters for the
//! binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod input;
pub mod network;
pub mod router;
pub mod runtime;
pub mod setup;
pub mod timer;
pub mod worker;
