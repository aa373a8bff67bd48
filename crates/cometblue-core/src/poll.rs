//! Refresh throttling.
//!
//! Talking to a CometBlue thermostat is slow and drains its battery, so the
//! host's update ticks only reach the radio when the cached state is stale:
//! either [`MIN_TIME_BETWEEN_UPDATES`] has passed since the last successful
//! refresh, or the driver itself asks for one.
//!
//! A failed refresh does not move the timestamp, so every following tick
//! retries. There is no backoff and no retry ceiling.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::traits::ThermostatDriver;

/// Minimum time between two refreshes the poller starts on its own.
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(300);

/// What a call to [`PollCoordinator::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// State was fresh; the driver was not touched.
    Skipped,
    /// The driver refreshed successfully.
    Refreshed,
    /// The driver refresh failed; the next tick will retry.
    Failed,
}

/// Decides when a driver refresh is due and performs it.
#[derive(Debug, Clone)]
pub struct PollCoordinator {
    interval: Duration,
    last_refresh: Option<Instant>,
}

impl Default for PollCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PollCoordinator {
    /// Create a coordinator using [`MIN_TIME_BETWEEN_UPDATES`].
    ///
    /// A new coordinator has never refreshed, so its first poll is always due.
    pub fn new() -> Self {
        Self::with_interval(MIN_TIME_BETWEEN_UPDATES)
    }

    /// Create a coordinator with a custom refresh interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_refresh: None,
        }
    }

    /// The refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the last successful refresh finished.
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Whether a refresh is due at `now`.
    pub fn is_due(&self, driver_wants_update: bool, now: Instant) -> bool {
        driver_wants_update
            || self
                .last_refresh
                .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Record a successful refresh at `now`.
    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
    }

    /// Run one update tick against `driver`.
    ///
    /// Driver errors are logged at `warn` with the device address and
    /// swallowed.
    pub async fn poll<D>(&mut self, driver: &mut D, address: &str) -> PollOutcome
    where
        D: ThermostatDriver + ?Sized,
    {
        if !self.is_due(driver.should_update(), Instant::now()) {
            debug!("State for {} is fresh, skipping refresh", address);
            return PollOutcome::Skipped;
        }

        match driver.update().await {
            Ok(()) => {
                self.mark_refreshed(Instant::now());
                debug!("Refreshed state for {}", address);
                PollOutcome::Refreshed
            }
            Err(e) => {
                warn!("Updating state for {} failed: {}", address, e);
                PollOutcome::Failed
            }
        }
    }
}
