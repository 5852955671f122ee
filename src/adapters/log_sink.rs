//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade (stderr via `env_logger` in the binary).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to, trigger } => {
                info!("STATE | {:?} -[{}]-> {:?}", from, trigger, to);
            }
            AppEvent::Ignored { state, trigger } => {
                debug!("IGNORE | {} in {:?}", trigger, state);
            }
        }
    }
}
