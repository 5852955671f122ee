//! Named one-shot timers on a dedicated worker thread.
//!
//! The worker sleeps on a condition variable until the earliest pending
//! deadline, then invokes the expiry callback for every timer that is due.
//! Expired timers are removed and the callback runs while the table lock
//! is held, so `start`/`cancel` from the engine thread and firing from the
//! worker are serialized: once `cancel` returns, that timer's callback will
//! not run.
//!
//! The callback reports whether the expiry was delivered.  A refused
//! expiry is put back with a short [`REDELIVERY_DELAY`] instead of being
//! lost, so a momentarily full consumer queue only delays it.
//!
//! ```text
//!  engine ──start/cancel──▶ Mutex<TimerTable> ◀──wait_timeout── worker
//!                                                                  │
//!                                            on_expiry(name) ◀─────┘
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use heapless::FnvIndexMap;
use log::{debug, info, warn};

use crate::app::ports::{TimerName, TimerPort};
use crate::error::Result;
use crate::worker::spawn_named;

/// Distinct timer names that may be pending at once.
pub const MAX_TIMERS: usize = 4;

/// Retry interval for an expiry the callback refused.
pub const REDELIVERY_DELAY: Duration = Duration::from_millis(10);

const TIMER_STACK_KB: usize = 32;

struct TimerTable {
    pending: FnvIndexMap<TimerName, Instant, MAX_TIMERS>,
    shutdown: bool,
}

struct Shared {
    table: Mutex<TimerTable>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the worker thread.  Implements [`TimerPort`] for the engine.
pub struct TimerService {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl TimerService {
    /// Start the worker.  `on_expiry` runs on the worker thread with the
    /// table locked and must not block; returning `false` re-arms the
    /// timer for [`REDELIVERY_DELAY`].
    pub fn spawn<F>(on_expiry: F) -> Result<Self>
    where
        F: Fn(TimerName) -> bool + Send + 'static,
    {
        let shared = Arc::new(Shared {
            table: Mutex::new(TimerTable {
                pending: FnvIndexMap::new(),
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = spawn_named("timer", TIMER_STACK_KB, move || {
            run_worker(&worker_shared, on_expiry);
        })?;
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// `true` if `name` has a pending deadline.
    pub fn is_pending(&self, name: TimerName) -> bool {
        self.shared.lock().pending.contains_key(&name)
    }

    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Cancel everything and join the worker.  Idempotent.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            let mut table = self.shared.lock();
            table.pending.clear();
            table.shutdown = true;
        }
        self.shared.wake.notify_all();
        if worker.join().is_err() {
            warn!("Timer: worker panicked");
        } else {
            info!("Timer: stopped");
        }
    }
}

impl TimerPort for TimerService {
    fn start(&mut self, name: TimerName, duration: Duration) {
        let deadline = Instant::now() + duration;
        {
            let mut table = self.shared.lock();
            if table.shutdown {
                warn!("Timer: '{}' started after shutdown", name);
                return;
            }
            if table.pending.insert(name, deadline).is_err() {
                warn!("Timer: table full, '{}' not scheduled", name);
                return;
            }
        }
        debug!("Timer: '{}' armed for {:?}", name, duration);
        self.shared.wake.notify_one();
    }

    fn cancel(&mut self, name: TimerName) {
        let removed = self.shared.lock().pending.remove(&name).is_some();
        if removed {
            debug!("Timer: '{}' cancelled", name);
            self.shared.wake.notify_one();
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(shared: &Shared, on_expiry: impl Fn(TimerName) -> bool) {
    let mut table = shared.lock();
    loop {
        if table.shutdown {
            return;
        }

        let now = Instant::now();
        let due: heapless::Vec<TimerName, MAX_TIMERS> = table
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(name, _)| *name)
            .collect();
        for name in due {
            table.pending.remove(&name);
            debug!("Timer: '{}' expired", name);
            if on_expiry(name) {
                continue;
            }
            // Just removed, so there is room.
            let retry = Instant::now() + REDELIVERY_DELAY;
            if table.pending.insert(name, retry).is_err() {
                warn!("Timer: '{}' could not be re-armed", name);
            } else {
                debug!("Timer: '{}' refused, retrying in {:?}", name, REDELIVERY_DELAY);
            }
        }

        let next_deadline = table.pending.values().min().copied();
        table = match next_deadline {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                shared
                    .wake
                    .wait_timeout(table, wait)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
            None => shared.wake.wait(table).unwrap_or_else(PoisonError::into_inner),
        };
    }
}
