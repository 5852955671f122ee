//! HelpBeacon main entry point
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  ConsoleDisplay    ThreadedJoystick    UdpBus    LogEventSink │
//! │  (DisplayPort)     (InputPort)         (Inbound+Publish)      │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ──────────────────      │
//! │                                                               │
//! │  ┌────────────────────────────────────────────────────────┐   │
//! │  │           BeaconService (pure logic) · FSM             │   │
//! │  └────────────────────────────────────────────────────────┘   │
//! │                                                               │
//! │  Router · TimerService · NetworkListener · InputPoller        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `helpbeacon [config.json]`.  Log level follows `RUST_LOG`.
//! Without `network.peers` the unit broadcasts on its bind port, so every
//! unit on the subnet using the same port hears it.

#![deny(unused_must_use)]

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use helpbeacon::adapters::console_display::ConsoleDisplay;
use helpbeacon::adapters::joystick::ThreadedJoystick;
use helpbeacon::adapters::udp_bus::UdpBus;
use helpbeacon::config::{BeaconConfig, JoystickSource};
use helpbeacon::error::Error;
use helpbeacon::runtime::BeaconRuntime;
use helpbeacon::setup::{GroupId, select_group};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("HelpBeacon v{} starting", env!("CARGO_PKG_VERSION"));

    // ── Configuration ─────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => BeaconConfig::load(Path::new(&path))
            .map_err(Error::from)
            .with_context(|| format!("loading {}", path))?,
        None => {
            warn!("No config file given, using defaults");
            BeaconConfig::default()
        }
    };

    // ── Adapters ──────────────────────────────────────────────
    let mut display = ConsoleDisplay::stdout();
    let mut joystick = match &config.joystick {
        JoystickSource::Stdin => ThreadedJoystick::stdin(),
        JoystickSource::Evdev { path } => ThreadedJoystick::evdev(path),
    }
    .context("opening joystick")?;
    let publisher = UdpBus::bind(&config.network)
        .map_err(Error::from)
        .context("binding UDP transport")?;
    let inbound = publisher
        .try_clone()
        .map_err(Error::from)
        .context("cloning UDP socket")?;

    // ── Identity ──────────────────────────────────────────────
    let group = match config.group.and_then(GroupId::new) {
        Some(group) => {
            info!("Group {} from config", group);
            group
        }
        None => select_group(
            &mut joystick,
            &mut display,
            config.setup_colour,
            config.input_poll_interval(),
        )
        .map_err(Error::from)
        .context("group selection")?,
    };

    // ── Run ───────────────────────────────────────────────────
    let runtime = BeaconRuntime::start(&config, group, display, joystick, publisher, inbound)
        .context("starting runtime")?;
    info!("Ready: press middle to request assistance");

    match runtime.wait() {
        Some(report) => info!(
            "Exited in {:?} after {} events",
            report.final_state, report.delivered
        ),
        None => warn!("Engine did not report on exit"),
    }
    Ok(())
}
