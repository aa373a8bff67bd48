//! Background update loop.
//!
//! The host side of the poll contract: every `host.scan_interval` seconds each
//! entity's `update` hook runs. The entity decides for itself whether that
//! tick actually reaches the device.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use cometblue_core::ClimateEntity;

use crate::state::{AppState, ThermostatHandle};

/// Background collector that drives every thermostat's update hook.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start one update task per thermostat.
    ///
    /// Returns immediately; the tasks run until
    /// [`CollectorState::signal_stop`](crate::state::CollectorState::signal_stop).
    pub async fn start(&self) {
        if self.state.thermostats.is_empty() {
            info!("No thermostats configured for collection");
            return;
        }

        let scan_interval = self.state.config.read().await.host.scan_interval.max(1);
        info!(
            "Starting collector for {} thermostat(s), every {}s",
            self.state.thermostats.len(),
            scan_interval
        );

        self.state.collector.set_running(true);
        for (index, handle) in self.state.thermostats.iter().enumerate() {
            let state = Arc::clone(&self.state);
            let handle = handle.clone();
            tokio::spawn(async move {
                update_loop(state, index, handle, Duration::from_secs(scan_interval)).await;
            });
        }
    }
}

/// Tick one thermostat until cancelled.
async fn update_loop(
    state: Arc<AppState>,
    index: usize,
    handle: ThermostatHandle,
    period: Duration,
) {
    let cancel = state.collector.cancel_token();
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut was_available = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Collector for {} stopped", handle.name);
                break;
            }
            _ = timer.tick() => {}
        }

        let available = {
            let mut entity = handle.entity.lock().await;
            entity.update().await;
            entity.available()
        };

        match (was_available, available) {
            (Some(true), false) => warn!("{} became unavailable", handle.name),
            (Some(false) | None, true) => info!("{} is available", handle.name),
            _ => {}
        }
        was_available = Some(available);

        state.collector.record_tick(index, available).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use cometblue_core::{
        ClimateEntity, CometBlueThermostat, MockThermostat, ThermostatIdentity,
    };

    fn state_with(entities: Vec<Box<dyn ClimateEntity>>) -> Arc<AppState> {
        let mut config = Config::default();
        config.host.scan_interval = 30;
        AppState::new(config, entities)
    }

    fn thermostat(name: &str, driver: MockThermostat) -> Box<dyn ClimateEntity> {
        let identity = ThermostatIdentity::new(driver.address(), 0, name);
        Box::new(CometBlueThermostat::new(identity, driver))
    }

    #[tokio::test(start_paused = true)]
    async fn test_collector_ticks_and_stops() {
        let state = state_with(vec![thermostat("Office", MockThermostat::new("11:22:33:44:55:66"))]);
        let collector = Collector::new(Arc::clone(&state));
        collector.start().await;
        assert!(state.collector.is_running());

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        {
            let stats = state.collector.stats.read().await;
            assert_eq!(stats[0].ticks, 1);
            assert!(stats[0].available);
        }
        assert!(state.thermostats[0].entity.lock().await.available());

        tokio::time::sleep(Duration::from_secs(60)).await;
        let ticks = state.collector.stats.read().await[0].ticks;
        assert_eq!(ticks, 3);

        state.collector.signal_stop();
        assert!(!state.collector.is_running());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(state.collector.stats.read().await[0].ticks, ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collector_records_unavailable_devices() {
        let mut broken = MockThermostat::new("AA:BB:CC:DD:EE:FF");
        broken.set_should_fail(true, Some("out of range"));
        let state = state_with(vec![thermostat("Garage", broken)]);

        Collector::new(Arc::clone(&state)).start().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let stats = state.collector.stats.read().await;
        assert_eq!(stats[0].ticks, 1);
        assert_eq!(stats[0].unavailable_ticks, 1);
        assert!(!stats[0].available);
        drop(stats);
        state.collector.signal_stop();
    }

    #[tokio::test]
    async fn test_collector_with_no_thermostats() {
        let state = state_with(Vec::new());
        Collector::new(Arc::clone(&state)).start().await;
        assert!(!state.collector.is_running());
    }
}
