//! Runtime: puts every component on its thread and tears them down in
//! order.
//!
//! ```text
//!  ┌──────────────┐ submit ┌────────┐ run ┌───────────────────────────┐
//!  │ net-listener │──────▶│        │────▶│ engine thread             │
//!  ├──────────────┤        │ Router │     │  BeaconService            │
//!  │ input-poller │──────▶│        │     │   ├─ DisplayPort          │
//!  └──────────────┘        │        │     │   └─ TimerService ──┐     │
//!                          │        │◀────┼─────────────────────┘     │
//!                          └────────┘     └───────────────────────────┘
//! ```
//!
//! Shutdown order: listener, poller, router stop marker.  The engine thread
//! then drains what was queued before the marker, cancels the blink timer,
//! stops the timer worker and closes the router.

use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use log::{info, warn};

use crate::adapters::log_sink::LogEventSink;
use crate::app::ports::{DisplayPort, InboundPort, InputError, InputPort, PublishPort};
use crate::app::service::{BeaconService, StateSnapshot};
use crate::config::BeaconConfig;
use crate::error::Result;
use crate::events::Event;
use crate::fsm::StateId;
use crate::input::InputPoller;
use crate::network::NetworkListener;
use crate::router::{EventRouter, RouterHandle};
use crate::setup::GroupId;
use crate::timer::TimerService;
use crate::worker::{Worker, spawn_named};

const ENGINE_STACK_KB: usize = 64;

/// What the engine thread reports when it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineReport {
    /// Events delivered by the router.
    pub delivered: u64,
    /// Matched transitions, self-loops included.
    pub transitions: u64,
    /// State at shutdown.
    pub final_state: StateId,
}

pub struct BeaconRuntime {
    group: GroupId,
    router: RouterHandle,
    snapshot: StateSnapshot,
    listener: Option<Worker>,
    poller: Option<Worker>,
    engine: Option<JoinHandle<EngineReport>>,
    input_done: Receiver<core::result::Result<(), InputError>>,
}

impl BeaconRuntime {
    /// Build the engine and start all threads.
    ///
    /// Idle's entry action has already been applied to `display` when
    /// this returns.
    pub fn start<D, I, P, N>(
        config: &BeaconConfig,
        group: GroupId,
        display: D,
        input: I,
        publisher: P,
        inbound: N,
    ) -> Result<Self>
    where
        D: DisplayPort + Send + 'static,
        I: InputPort + Send + 'static,
        P: PublishPort + Send + 'static,
        N: InboundPort + Send + 'static,
    {
        let router = EventRouter::new();
        let handle = router.handle();
        let channel = group.channel(&config.topic_prefix);

        let timer_handle = router.handle();
        // A full router refuses the expiry and the timer retries it.  Once
        // the router is closed there is nobody left to deliver to.
        let timer = TimerService::spawn(move |name| {
            if timer_handle.submit(Event::TimerExpired) {
                return true;
            }
            if timer_handle.is_closed() {
                warn!("Runtime: expiry of '{}' after close", name);
                return true;
            }
            false
        })?;

        let service = BeaconService::new(config, group, display, timer, LogEventSink::new());
        let snapshot = service.snapshot();

        let engine = spawn_named("engine", ENGINE_STACK_KB, move || run_engine(router, service))?;

        let (done_tx, input_done) = mpsc::channel();
        // From here on, an early return drops `runtime`, which stops the
        // engine again.
        let mut runtime = Self {
            group,
            router: handle.clone(),
            snapshot: snapshot.clone(),
            listener: None,
            poller: None,
            engine: Some(engine),
            input_done,
        };

        runtime.listener = Some(
            NetworkListener::new(channel.clone(), handle.clone())
                .spawn(inbound, config.network_poll_timeout())?,
        );
        runtime.poller = Some(
            InputPoller::new(channel.clone(), publisher, handle, snapshot).spawn(
                input,
                config.input_poll_interval(),
                move |outcome| {
                    let _ = done_tx.send(outcome);
                },
            )?,
        );

        info!("Runtime: group {} on channel {}", group, channel);
        Ok(runtime)
    }

    /// Current engine state.
    pub fn state(&self) -> StateId {
        self.snapshot.load()
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// A producer handle on the router, for injecting events.
    pub fn router(&self) -> &RouterHandle {
        &self.router
    }

    /// Block until the input device closes, then shut down.
    pub fn wait(mut self) -> Option<EngineReport> {
        match self.input_done.recv() {
            Ok(Ok(())) => info!("Runtime: poller stopped"),
            Ok(Err(e)) => info!("Runtime: {}, shutting down", e),
            Err(_) => warn!("Runtime: poller exited without reporting"),
        }
        self.stop_all()
    }

    /// Ordered shutdown.  Returns once every thread has been joined.
    ///
    /// `None` if the engine thread panicked.
    pub fn shutdown(mut self) -> Option<EngineReport> {
        self.stop_all()
    }

    fn stop_all(&mut self) -> Option<EngineReport> {
        let engine = self.engine.take()?;

        if let Some(listener) = self.listener.take() {
            listener.stop();
        }
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.router.request_stop();

        match engine.join() {
            Ok(report) => {
                info!(
                    "Runtime: stopped in {:?} ({} events, {} transitions)",
                    report.final_state, report.delivered, report.transitions
                );
                Some(report)
            }
            Err(_) => {
                warn!("Runtime: engine thread panicked");
                None
            }
        }
    }
}

impl Drop for BeaconRuntime {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn run_engine<D: DisplayPort>(
    router: EventRouter,
    mut service: BeaconService<D, TimerService, LogEventSink>,
) -> EngineReport {
    let delivered = router.run(|event| {
        service.handle(event);
    });
    let transitions = service.transition_count();
    let final_state = service.state();

    let (_display, mut timer, _sink) = service.shutdown();
    timer.shutdown();
    router.close();

    EngineReport {
        delivered,
        transitions,
        final_state,
    }
}
