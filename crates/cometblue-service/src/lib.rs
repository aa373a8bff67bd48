//! Host service for CometBlue thermostats.
//!
//! This crate plays the home-automation host around the climate entities in
//! `cometblue-core`:
//! - Builds one entity per configured thermostat
//! - Ticks every entity's update hook on a fixed interval
//! - Exposes a REST API for reading state and changing setpoints and modes
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/status` - Collector status and per-thermostat update stats
//! - `GET /api/thermostats` - Snapshot of every thermostat
//! - `GET /api/thermostats/{id}` - Snapshot of one thermostat (name or address)
//! - `POST /api/thermostats/{id}/temperature` - `{"temperature": 21.5}`
//! - `POST /api/thermostats/{id}/hvac_mode` - `{"hvac_mode": "heat"}`
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/cometblue/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [host]
//! scan_interval = 30
//!
//! [devices.living_room]
//! mac = "11:22:33:44:55:66"
//! pin = 0
//! fake_manual_mode = false
//! ```

use std::sync::Arc;

use cometblue_core::{ClimateEntity, DeviceResolver, DriverFactory, setup_platform};

pub mod api;
pub mod collector;
pub mod config;
pub mod state;

pub use collector::Collector;
pub use config::{Config, ConfigError, HostConfig, ServerConfig};
pub use state::{AppState, ThermostatHandle};

/// Set up every configured thermostat with `factory` and wrap them in
/// application state.
pub fn build_state<F: DriverFactory>(
    config: Config,
    factory: &F,
    resolver: &DeviceResolver,
) -> cometblue_core::Result<Arc<AppState>> {
    let entities: Vec<Box<dyn ClimateEntity>> = setup_platform(&config.devices, factory, resolver)?
        .into_iter()
        .map(|entity| Box::new(entity) as Box<dyn ClimateEntity>)
        .collect();
    Ok(AppState::new(config, entities))
}
