//! Periodic refresh of one area with atomic publication of each result.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;

use crate::model::{AreaId, ScheduleResult};
use crate::ports::PortError;
use crate::service::KerbsideService;

/// Time between two scheduled refreshes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);
/// Longest a single refresh may take before it is abandoned.
pub const DEFAULT_CYCLE_DEADLINE: Duration = Duration::from_secs(30);

/// Source of the reference time handed to each cycle.
pub trait Clock: Send + Sync {
    /// Current civil date and time.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall clock in the system's local timezone.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Cadence and deadline for the refresh loop.
pub struct PollerConfig {
    /// Time between two scheduled refreshes.
    pub interval: Duration,
    /// Longest a single refresh may take.
    pub deadline: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_UPDATE_INTERVAL,
            deadline: DEFAULT_CYCLE_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A complete result together with the reference time it was computed for.
pub struct Published {
    /// Next pickups per category.
    pub result: ScheduleResult,
    /// Reference time of the cycle that produced `result`.
    pub fetched_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
/// What observers see: the last good result and the last failure, if newer.
pub struct PollState {
    /// Last successfully completed cycle.
    pub latest: Option<Published>,
    /// Message of the last failed cycle; cleared by the next success.
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of asking for a refresh.
pub enum CycleOutcome {
    /// A new result was published.
    Published,
    /// Another cycle for this area was already running.
    Skipped,
}

/// Runs refresh cycles for one area, one at a time.
pub struct Poller {
    service: Arc<KerbsideService>,
    area: AreaId,
    config: PollerConfig,
    in_flight: Mutex<()>,
    state: watch::Sender<PollState>,
}

impl Poller {
    /// Create a poller for `area`. Nothing is fetched until a cycle runs.
    #[must_use]
    pub fn new(service: Arc<KerbsideService>, area: AreaId, config: PollerConfig) -> Self {
        let (state, _initial) = watch::channel(PollState::default());
        Self {
            service,
            area,
            config,
            in_flight: Mutex::new(()),
            state,
        }
    }

    /// Area this poller refreshes.
    #[must_use]
    pub fn area(&self) -> &AreaId {
        &self.area
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Current published state.
    #[must_use]
    pub fn snapshot(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Run one refresh cycle unless one is already in flight.
    ///
    /// On failure the previously published result stays untouched and only
    /// [`PollState::last_error`] changes.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Timeout`] when the deadline passes, or the error
    /// raised by the source.
    pub async fn run_cycle(&self, reference_now: NaiveDateTime) -> Result<CycleOutcome, PortError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!(area = %self.area, "refresh already in flight");
            return Ok(CycleOutcome::Skipped);
        };

        let refresh = self.service.refresh(&self.area, reference_now);
        let outcome = match tokio::time::timeout(self.config.deadline, refresh).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(PortError::Timeout(self.config.deadline)),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(area = %self.area, ?result, "published schedule");
                self.state.send_modify(|state| {
                    state.latest = Some(Published {
                        result,
                        fetched_at: reference_now,
                    });
                    state.last_error = None;
                });
                Ok(CycleOutcome::Published)
            }
            Err(err) => {
                tracing::warn!(area = %self.area, error = %err, "refresh failed");
                let message = err.to_string();
                self.state
                    .send_modify(|state| state.last_error = Some(message));
                Err(err)
            }
        }
    }

    /// Refresh now and then on every interval, forever.
    ///
    /// Failed cycles are logged and the loop carries on.
    #[expect(clippy::infinite_loop, reason = "runs until the owning task is aborted")]
    pub async fn run<C: Clock>(self: Arc<Self>, clock: C) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // Failures are already logged and published by the cycle.
            let _outcome: Result<CycleOutcome, PortError> = self.run_cycle(clock.now()).await;
        }
    }
}
