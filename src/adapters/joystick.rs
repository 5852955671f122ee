//! Joystick input adapter.
//!
//! A reader thread blocks on the device and forwards decoded events into a
//! queue; [`InputPort::poll`] drains that queue without blocking.  When the
//! reader hits end-of-stream the queue disconnects and `poll` reports
//! [`InputError::Closed`].
//!
//! Two sources:
//! - a Linux evdev node through the `evdev` crate (the Sense HAT joystick
//!   reports arrow keys and Enter for the middle button)
//! - text lines on stdin, one direction per line, for hosts without one
//!
//! The reader thread is never joined: a blocking read on stdin or a device
//! node cannot be interrupted, and the process exits with it.

use std::io::{self, BufRead, BufReader};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::app::ports::{Direction, InputError, InputPort, JoystickEvent};
use crate::error::{Error, Result};
use crate::worker::spawn_named;

const READER_STACK_KB: usize = 16;

// ── evdev decoding ────────────────────────────────────────────

/// Map one evdev event to a joystick event.  Non-key events and unmapped
/// keys yield `None`.
#[cfg(target_os = "linux")]
pub fn decode_evdev(event: &evdev::InputEvent) -> Option<JoystickEvent> {
    use crate::app::ports::Action;
    use evdev::{EventType, Key};

    if event.event_type() != EventType::KEY {
        return None;
    }
    let direction = match Key::new(event.code()) {
        Key::KEY_UP => Direction::Up,
        Key::KEY_DOWN => Direction::Down,
        Key::KEY_LEFT => Direction::Left,
        Key::KEY_RIGHT => Direction::Right,
        Key::KEY_ENTER => Direction::Middle,
        _ => return None,
    };
    // 0 = release, 1 = press, 2 = autorepeat
    let action = match event.value() {
        0 => Action::Released,
        1 => Action::Pressed,
        2 => Action::Held,
        _ => return None,
    };
    Some(JoystickEvent { direction, action })
}

// ── line decoding ─────────────────────────────────────────────

/// Parse one stdin line into a press.  Case-insensitive.
pub fn parse_line(line: &str) -> Option<JoystickEvent> {
    let direction = match line.trim().to_ascii_lowercase().as_str() {
        "up" | "u" => Direction::Up,
        "down" | "d" => Direction::Down,
        "left" | "l" => Direction::Left,
        "right" | "r" => Direction::Right,
        "middle" | "m" => Direction::Middle,
        _ => return None,
    };
    Some(JoystickEvent::pressed(direction))
}

// ── adapter ───────────────────────────────────────────────────

pub struct ThreadedJoystick {
    events: Receiver<JoystickEvent>,
    _reader: JoinHandle<()>,
}

impl ThreadedJoystick {
    /// Read direction lines from standard input.
    pub fn stdin() -> Result<Self> {
        info!("Joystick: reading lines from stdin (u/d/l/r/m)");
        Self::from_lines(BufReader::new(io::stdin()))
    }

    /// Read direction lines from any buffered reader.
    pub fn from_lines<R>(reader: R) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        Self::spawn_reader(move |tx| read_lines(reader, &tx))
    }

    /// Read key events from an evdev node.
    #[cfg(target_os = "linux")]
    pub fn evdev(path: &str) -> Result<Self> {
        let device = evdev::Device::open(path).map_err(|e| {
            warn!("Joystick: open {} failed: {}", path, e);
            Error::Input(InputError::OpenFailed)
        })?;
        info!(
            "Joystick: reading evdev {} ({})",
            path,
            device.name().unwrap_or("unnamed")
        );
        Self::spawn_reader(move |tx| read_device(device, &tx))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn evdev(path: &str) -> Result<Self> {
        warn!("Joystick: evdev {} unavailable on this platform", path);
        Err(Error::Input(InputError::OpenFailed))
    }

    fn spawn_reader<F>(body: F) -> Result<Self>
    where
        F: FnOnce(Sender<JoystickEvent>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let reader = spawn_named("joystick", READER_STACK_KB, move || body(tx))?;
        Ok(Self {
            events: rx,
            _reader: reader,
        })
    }
}

impl InputPort for ThreadedJoystick {
    fn poll(&mut self) -> core::result::Result<Option<JoystickEvent>, InputError> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(InputError::Closed),
        }
    }
}

fn read_lines(reader: impl BufRead, tx: &Sender<JoystickEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Joystick: read failed: {}", e);
                break;
            }
        };
        match parse_line(&line) {
            Some(event) => {
                if tx.send(event).is_err() {
                    return;
                }
            }
            None if line.trim().is_empty() => {}
            None => debug!("Joystick: unrecognised line '{}'", line.trim()),
        }
    }
    info!("Joystick: input closed");
}

#[cfg(target_os = "linux")]
fn read_device(mut device: evdev::Device, tx: &Sender<JoystickEvent>) {
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Joystick: read failed: {}", e);
                break;
            }
        };
        for event in events {
            let Some(event) = decode_evdev(&event) else {
                continue;
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
    info!("Joystick: device closed");
}
