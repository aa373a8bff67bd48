//! Platform setup: turning configured devices into climate entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use cometblue_types::ThermostatIdentity;

use crate::entity::CometBlueThermostat;
use crate::error::Result;
use crate::resolver::DeviceResolver;
use crate::traits::DriverFactory;

/// Configuration for one thermostat.
///
/// ```toml
/// [devices.living_room]
/// mac = "11:22:33:44:55:66"
/// pin = 0
/// fake_manual_mode = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Bluetooth address.
    #[serde(alias = "mac")]
    pub address: String,
    /// Access code.
    #[serde(default)]
    pub pin: u32,
    /// Present the device as always heating manually and mirror target
    /// temperatures into the band setpoints.
    #[serde(default)]
    pub fake_manual_mode: bool,
}

impl DeviceConfig {
    /// Configuration with default PIN and no override.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            pin: 0,
            fake_manual_mode: false,
        }
    }
}

/// Create one entity per configured device, in name order.
///
/// Each driver is built by `factory` with the device's address, PIN and a
/// clone of `resolver`. The first factory error aborts setup.
pub fn setup_platform<F: DriverFactory>(
    devices: &BTreeMap<String, DeviceConfig>,
    factory: &F,
    resolver: &DeviceResolver,
) -> Result<Vec<CometBlueThermostat<F::Driver>>> {
    let mut entities = Vec::with_capacity(devices.len());

    for (name, config) in devices {
        let driver = factory.create(&config.address, config.pin, resolver.clone())?;
        let identity = ThermostatIdentity::new(config.address.clone(), config.pin, name.clone());
        info!(
            "Set up thermostat {} ({}, fake manual mode: {})",
            name, config.address, config.fake_manual_mode
        );
        entities.push(
            CometBlueThermostat::new(identity, driver)
                .with_fake_manual_mode(config.fake_manual_mode),
        );
    }

    Ok(entities)
}
