//! Periodic broadcast scheduling
//!
//! A single background task drives the cycles. Cycles run inline on that
//! task, which is what guarantees at most one in flight: a timer firing
//! that lands while a cycle is still running is simply observed late, and
//! late firings beyond the misfire grace window are skipped. Missed slots
//! collapse into at most one catch-up run.
//!
//! The scheduler is an owned instance handed to whoever exposes the
//! controls; there is no process-wide singleton. Pausing only suppresses
//! future timer firings; it neither cancels an in-flight cycle nor blocks
//! an explicit `trigger_now`.

use crate::cycle::RaEngine;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, error, warn};

/// What the control plane sees of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Is a future firing scheduled?
    pub running: bool,
    /// Wall-clock time of the next firing, when one is scheduled.
    pub next_run_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Shared {
    next_wall: Option<DateTime<Utc>>,
    cycle_in_flight: bool,
}

/// The periodic broadcast job.
pub struct BroadcastScheduler {
    engine: Arc<RaEngine>,
    interval: Duration,
    misfire_grace: Duration,
}

impl BroadcastScheduler {
    pub fn new(engine: Arc<RaEngine>, interval: Duration, misfire_grace: Duration) -> Self {
        Self {
            engine,
            interval,
            misfire_grace,
        }
    }

    /// Start the scheduler.
    ///
    /// The first firing happens immediately, then every interval. Returns
    /// the control handle and the task to await at shutdown; the task
    /// exits when `shutdown` flips to true.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> (SchedulerHandle, JoinHandle<()>) {
        let paused = Arc::new(AtomicBool::new(false));
        let trigger = Arc::new(Notify::new());
        let shared = Arc::new(Mutex::new(Shared::default()));
        let alive = Arc::new(AtomicBool::new(true));

        let handle = SchedulerHandle {
            paused: paused.clone(),
            trigger: trigger.clone(),
            shared: shared.clone(),
            alive: alive.clone(),
        };

        let task = tokio::spawn(run_loop(
            self.engine,
            self.interval,
            self.misfire_grace,
            paused,
            trigger,
            shared,
            alive,
            shutdown,
        ));

        (handle, task)
    }
}

/// Cloneable control handle for a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    paused: Arc<AtomicBool>,
    trigger: Arc<Notify>,
    shared: Arc<Mutex<Shared>>,
    alive: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Suppress future timer firings. Idempotent; does not interrupt a
    /// cycle already underway.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Allow timer firings again. Idempotent.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Request one immediate run, regardless of timer phase or pause
    /// state. If a cycle is executing right now, the extra run happens
    /// as soon as it finishes.
    pub fn trigger_now(&self) {
        self.trigger.notify_one();
    }

    /// Current job status.
    pub fn status(&self) -> SchedulerStatus {
        let scheduled =
            self.alive.load(Ordering::Relaxed) && !self.paused.load(Ordering::Relaxed);
        SchedulerStatus {
            running: scheduled,
            next_run_time: if scheduled {
                self.shared.lock().next_wall
            } else {
                None
            },
        }
    }

    /// Is a cycle executing at this moment?
    pub fn cycle_in_flight(&self) -> bool {
        self.shared.lock().cycle_in_flight
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    engine: Arc<RaEngine>,
    interval: Duration,
    misfire_grace: Duration,
    paused: Arc<AtomicBool>,
    trigger: Arc<Notify>,
    shared: Arc<Mutex<Shared>>,
    alive: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
) {
    // Armed on start: the first firing is immediate
    let mut next_deadline = Instant::now();

    loop {
        shared.lock().next_wall = Some(wall_time_of(next_deadline));

        tokio::select! {
            _ = time::sleep_until(next_deadline) => {
                let now = Instant::now();
                let lateness = now.saturating_duration_since(next_deadline);

                // Advance the schedule before running; slots already in
                // the past collapse into this single firing
                next_deadline += interval;
                while next_deadline <= now {
                    next_deadline += interval;
                }

                if paused.load(Ordering::Relaxed) {
                    continue;
                }
                if lateness > misfire_grace {
                    warn!(
                        late_ms = lateness.as_millis() as u64,
                        "firing missed its grace window, skipping"
                    );
                    continue;
                }

                run_once(&engine, &shared).await;
            }
            _ = trigger.notified() => {
                run_once(&engine, &shared).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    alive.store(false, Ordering::Relaxed);
    shared.lock().next_wall = None;
    debug!("broadcast scheduler stopped");
}

async fn run_once(engine: &RaEngine, shared: &Mutex<Shared>) {
    shared.lock().cycle_in_flight = true;

    match engine.run_cycle().await {
        Ok(report) => debug!(
            cycle = %report.id,
            sent = report.sent(),
            skipped = report.skipped(),
            failed = report.failed(),
            "cycle complete"
        ),
        // A lost snapshot costs one cycle; the schedule keeps going
        Err(e) => error!(error = %e, "cycle aborted"),
    }

    shared.lock().cycle_in_flight = false;
}

fn wall_time_of(deadline: Instant) -> DateTime<Utc> {
    let pending = deadline.saturating_duration_since(Instant::now());
    Utc::now() + chrono::Duration::from_std(pending).unwrap_or_else(|_| chrono::Duration::zero())
}
