//! Application state shared across handlers.
//!
//! Every configured thermostat is held behind its own async mutex
//! ([`SharedEntity`]). Handlers and the collector lock it for the whole of a
//! read-modify-write, so a mode change and a background refresh never
//! interleave on the same device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use cometblue_core::{ClimateEntity, SharedEntity};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// Configuration (RwLock for runtime reads by handlers).
    pub config: RwLock<Config>,
    /// Thermostats, in configuration order.
    pub thermostats: Vec<ThermostatHandle>,
    /// Collector control state.
    pub collector: CollectorState,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: Config, entities: Vec<Box<dyn ClimateEntity>>) -> Arc<Self> {
        let thermostats: Vec<ThermostatHandle> =
            entities.into_iter().map(ThermostatHandle::new).collect();
        let collector = CollectorState::new(&thermostats);

        Arc::new(Self {
            config: RwLock::new(config),
            thermostats,
            collector,
        })
    }

    /// Look up a thermostat by name or address, ignoring case.
    pub fn find(&self, id: &str) -> Option<&ThermostatHandle> {
        self.thermostats.iter().find(|t| t.matches(id))
    }
}

/// A thermostat plus the identifiers used to route requests to it.
///
/// Name and address never change after setup, so they are copied out of the
/// entity to allow lookups without taking the lock.
#[derive(Clone)]
pub struct ThermostatHandle {
    /// Display name.
    pub name: String,
    /// Bluetooth address.
    pub unique_id: String,
    /// The entity itself.
    pub entity: SharedEntity,
}

impl ThermostatHandle {
    /// Wrap an entity for sharing.
    pub fn new(entity: Box<dyn ClimateEntity>) -> Self {
        Self {
            name: entity.name().to_string(),
            unique_id: entity.unique_id().to_string(),
            entity: Arc::new(Mutex::new(entity)),
        }
    }

    /// Whether `id` names this thermostat.
    pub fn matches(&self, id: &str) -> bool {
        self.name.eq_ignore_ascii_case(id) || self.unique_id.eq_ignore_ascii_case(id)
    }
}

/// State for tracking and controlling the collector.
pub struct CollectorState {
    /// Whether the collector is currently running.
    running: AtomicBool,
    /// When the collector was started (Unix timestamp).
    started_at: AtomicU64,
    /// Cancelled to stop every collector task.
    cancel: CancellationToken,
    /// Per-thermostat update stats, same order as `AppState::thermostats`.
    pub stats: RwLock<Vec<UpdateStats>>,
}

impl CollectorState {
    /// Create collector state with one stats slot per thermostat.
    pub fn new(thermostats: &[ThermostatHandle]) -> Self {
        let stats = thermostats
            .iter()
            .map(|t| UpdateStats::new(&t.name, &t.unique_id))
            .collect();
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            stats: RwLock::new(stats),
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the collector start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Token the collector tasks watch for shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal all collector tasks to stop.
    pub fn signal_stop(&self) {
        self.cancel.cancel();
        self.running.store(false, Ordering::SeqCst);
    }

    /// Record the result of one update tick.
    pub async fn record_tick(&self, index: usize, available: bool) {
        let mut stats = self.stats.write().await;
        if let Some(entry) = stats.get_mut(index) {
            entry.record(available);
        }
    }
}

/// Update statistics for a single thermostat.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UpdateStats {
    /// Display name.
    pub name: String,
    /// Bluetooth address.
    pub unique_id: String,
    /// Update ticks delivered so far.
    pub ticks: u64,
    /// Ticks after which the thermostat was unavailable.
    pub unavailable_ticks: u64,
    /// Availability after the last tick.
    pub available: bool,
    /// Time of the last tick.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_tick_at: Option<OffsetDateTime>,
}

impl UpdateStats {
    fn new(name: &str, unique_id: &str) -> Self {
        Self {
            name: name.to_string(),
            unique_id: unique_id.to_string(),
            ticks: 0,
            unavailable_ticks: 0,
            available: false,
            last_tick_at: None,
        }
    }

    fn record(&mut self, available: bool) {
        self.ticks += 1;
        if !available {
            self.unavailable_ticks += 1;
        }
        self.available = available;
        self.last_tick_at = Some(OffsetDateTime::now_utc());
    }
}
