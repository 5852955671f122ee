//! System configuration parameters
//!
//! All tunable parameters for the HelpBeacon unit.  Loaded from a JSON file
//! given on the command line; every field has a default so a partial file
//! (or no file at all) is valid.

use core::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    // --- Network ---
    /// Channel prefix; the unit listens and publishes on `<prefix>/<group>`.
    pub topic_prefix: String,
    /// Datagram transport addresses.
    pub network: NetworkConfig,

    // --- Identity ---
    /// Fixed group number (0-9).  `None` runs the interactive selection.
    pub group: Option<u8>,

    // --- Timing ---
    /// Blink half-period (milliseconds).
    pub blink_period_ms: u32,
    /// Joystick poll interval (milliseconds).
    pub input_poll_interval_ms: u32,
    /// Upper bound on one network receive wait (milliseconds).
    pub network_poll_timeout_ms: u32,

    // --- Display ---
    /// Glyph colour while idle.
    pub calm_colour: Rgb,
    /// Glyph colour while assistance is requested.
    pub alert_colour: Rgb,
    /// Digit colour during group selection.
    pub setup_colour: Rgb,

    // --- Input ---
    pub joystick: JoystickSource,
}

/// Datagram transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Local address to receive on.
    pub bind_addr: String,
    /// Addresses every publication is sent to.  Empty means broadcast on
    /// the bind port, see [`NetworkConfig::publish_targets`].
    pub peers: Vec<String>,
}

/// Where joystick events come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum JoystickSource {
    /// Line-oriented simulation on standard input.
    Stdin,
    /// Linux evdev device (e.g. the Sense HAT joystick).
    Evdev { path: String },
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            // Network
            topic_prefix: "raspberrypi".to_string(),
            network: NetworkConfig::default(),

            // Identity
            group: None,

            // Timing
            blink_period_ms: 1000,
            input_poll_interval_ms: 100,
            network_poll_timeout_ms: 100,

            // Display
            calm_colour: (0, 255, 0),
            alert_colour: (255, 0, 0),
            setup_colour: (255, 255, 255),

            // Input
            joystick: JoystickSource::Stdin,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:47800".to_string(),
            peers: Vec::new(),
        }
    }
}

impl NetworkConfig {
    /// Where publications go: the configured peers, or the IPv4 broadcast
    /// address on the bind port when none are listed.  An ephemeral bind
    /// port (0) has no broadcast counterpart.
    ///
    /// Invalid entries are skipped; [`BeaconConfig::validate`] reports them.
    pub fn publish_targets(&self) -> Vec<SocketAddr> {
        if self.peers.is_empty() {
            return self
                .bind_addr
                .parse::<SocketAddr>()
                .ok()
                .filter(|bind| bind.port() != 0)
                .map(|bind| vec![SocketAddr::from((Ipv4Addr::BROADCAST, bind.port()))])
                .unwrap_or_default();
        }
        self.peers.iter().filter_map(|p| p.parse().ok()).collect()
    }
}

impl BeaconConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(raw).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic_prefix.is_empty() {
            return Err(ConfigError::ValidationFailed("topic_prefix must not be empty"));
        }
        if self.topic_prefix.contains('/') {
            return Err(ConfigError::ValidationFailed("topic_prefix must not contain '/'"));
        }
        if self.group.is_some_and(|g| g > 9) {
            return Err(ConfigError::ValidationFailed("group must be 0-9"));
        }
        if self.blink_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("blink_period_ms must be > 0"));
        }
        if self.input_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("input_poll_interval_ms must be > 0"));
        }
        if self.network_poll_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("network_poll_timeout_ms must be > 0"));
        }
        if self.network.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationFailed("network.bind_addr is not a socket address"));
        }
        if self.network.peers.iter().any(|p| p.parse::<SocketAddr>().is_err()) {
            return Err(ConfigError::ValidationFailed("network.peers contains an invalid address"));
        }
        Ok(())
    }

    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.blink_period_ms))
    }

    pub fn input_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.input_poll_interval_ms))
    }

    pub fn network_poll_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.network_poll_timeout_ms))
    }
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No config file at the given path.
    NotFound,
    /// The file is not valid JSON for this schema.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
