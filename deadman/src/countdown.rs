//! The countdown state machine and its expiry watcher.
//!
//! All state lives behind one async mutex. `arm` flips `Disarmed -> Armed` and
//! spawns a watcher; the watcher flips `Armed -> Disarmed` only after the
//! deletion pass has finished, inside the same critical section. Because the
//! `Armed` state gates `arm`, at most one watcher exists per armed period and
//! no second countdown can start while files are still being removed.
//!
//! Status reads take the same lock, so they stall while a deletion pass runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::SwitchConfig;
use crate::deletion::DeletionExecutor;

/// How often the watcher checks the deadline.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Countdown state. `expiry` only exists while armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Disarmed,
    Armed {
        /// Monotonic deadline the watcher compares against.
        expiry: Instant,
        /// Wall-clock rendering of `expiry`, for logs and status output.
        deadline: DateTime<Local>,
    },
}

impl CountdownState {
    fn remaining_seconds(&self, now: Instant) -> u64 {
        match self {
            CountdownState::Disarmed => 0,
            CountdownState::Armed { expiry, .. } => expiry.saturating_duration_since(now).as_secs(),
        }
    }
}

/// Result of an `arm` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A new countdown started.
    Armed { deadline: DateTime<Local> },
    /// A countdown was already running; nothing changed.
    AlreadyArmed { deadline: DateTime<Local> },
}

/// Consistent view of the countdown taken in one critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub armed: bool,
    pub remaining_seconds: u64,
    pub deadline: Option<DateTime<Local>>,
}

/// Owns the countdown state and the deletion executor it fires.
pub struct CountdownController {
    state: Arc<Mutex<CountdownState>>,
    executor: DeletionExecutor,
    poll_interval: Duration,
}

impl CountdownController {
    pub fn new(executor: DeletionExecutor) -> Self {
        Self {
            state: Arc::new(Mutex::new(CountdownState::Disarmed)),
            executor,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start the countdown for `config` unless one is already running.
    ///
    /// Re-arming a running countdown leaves its deadline and roots untouched.
    pub async fn arm(&self, config: &SwitchConfig) -> ArmOutcome {
        let mut state = self.state.lock().await;
        if let CountdownState::Armed { deadline, .. } = *state {
            debug!(deadline = %deadline.format(DEADLINE_FORMAT), "countdown already armed");
            return ArmOutcome::AlreadyArmed { deadline };
        }

        let limit = config.time_limit();
        let expiry = Instant::now() + limit;
        // `validate` caps the limit at MAX_TIME_LIMIT_SECONDS, well inside both clocks.
        let deadline = Local::now() + TimeDelta::seconds(config.time_limit_seconds as i64);
        *state = CountdownState::Armed { expiry, deadline };
        drop(state);

        info!(
            deadline = %deadline.format(DEADLINE_FORMAT),
            time_limit_secs = config.time_limit_seconds,
            "countdown started"
        );
        self.spawn_watcher(config.clone(), expiry);
        ArmOutcome::Armed { deadline }
    }

    /// Whole seconds until expiry, or 0 when disarmed or already past due.
    pub async fn remaining_seconds(&self) -> u64 {
        self.state.lock().await.remaining_seconds(Instant::now())
    }

    pub async fn is_armed(&self) -> bool {
        matches!(*self.state.lock().await, CountdownState::Armed { .. })
    }

    pub async fn snapshot(&self) -> CountdownSnapshot {
        let state = self.state.lock().await;
        let deadline = match *state {
            CountdownState::Armed { deadline, .. } => Some(deadline),
            CountdownState::Disarmed => None,
        };
        CountdownSnapshot {
            armed: deadline.is_some(),
            remaining_seconds: state.remaining_seconds(Instant::now()),
            deadline,
        }
    }

    fn spawn_watcher(&self, config: SwitchConfig, expiry: Instant) {
        let state = Arc::clone(&self.state);
        let executor = self.executor.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The guard that observes expiry is held until the state is reset.
            let mut guard = loop {
                ticker.tick().await;
                let guard = state.lock().await;
                if Instant::now() > expiry {
                    break guard;
                }
            };

            info!("countdown expired, deleting files");
            let roots = config.roots();
            match tokio::task::spawn_blocking(move || executor.delete_all(&roots)).await {
                Ok(reports) => {
                    let removed: usize = reports.iter().map(|r| r.files_removed).sum();
                    let failures: usize = reports.iter().map(|r| r.errors.len()).sum();
                    if failures == 0 {
                        info!(files_removed = removed, "deletion finished");
                    } else {
                        warn!(files_removed = removed, failures, "deletion finished with errors");
                    }
                }
                Err(err) => error!(error = %err, "deletion task failed"),
            }

            *guard = CountdownState::Disarmed;
            debug!("countdown disarmed");
        });
    }
}
