//! Named worker threads with a cooperative stop flag.
//!
//! Every long-running loop in the crate (network listener, input poller,
//! timer, engine) runs on its own named thread.  Producer loops check a
//! [`StopSignal`] between blocking calls; [`Worker::stop`] raises the flag
//! and joins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use log::{info, warn};

use crate::error::{Error, Result};

/// Default stack for worker threads.
pub const WORKER_STACK_KB: usize = 64;

/// Spawn a named thread with an explicit stack size.
pub fn spawn_named<T, F>(name: &'static str, stack_kb: usize, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    info!("Spawning '{}' (stack={}KB)", name, stack_kb);
    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Read side of a stop flag, handed to the worker body.
#[derive(Debug, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A producer thread that runs until its body returns or it is stopped.
pub struct Worker {
    name: &'static str,
    stop: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start `body` on a new thread.  The body must return promptly once
    /// the signal it is given is raised.
    pub fn spawn<F>(name: &'static str, body: F) -> Result<Self>
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let stop = StopSignal::new();
        let signal = stop.clone();
        let thread = spawn_named(name, WORKER_STACK_KB, move || body(signal))?;
        Ok(Self {
            name,
            stop,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `true` once the body has returned on its own.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Raise the stop flag and wait for the thread to exit.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.raise();
        if thread.join().is_err() {
            warn!("Worker '{}' panicked", self.name);
        } else {
            info!("Worker '{}' stopped", self.name);
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
