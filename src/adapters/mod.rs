//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements               | Connects to               |
//! |-------------------|--------------------------|---------------------------|
//! | `console_display` | DisplayPort              | ANSI terminal             |
//! | `joystick`        | InputPort                | evdev device or stdin     |
//! | `log_sink`        | EventSink                | `log` facade              |
//! | `udp_bus`         | InboundPort, PublishPort | UDP datagrams to peers    |

pub mod console_display;
pub mod joystick;
pub mod log_sink;
pub mod udp_bus;
