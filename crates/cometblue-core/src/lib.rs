//! Climate-entity adapter for CometBlue Bluetooth thermostats.
//!
//! This crate plugs a CometBlue driver (Eurotronic CometBlue and the
//! identical Sygonix and Xavax thermostats) into a home-automation host. The
//! Bluetooth protocol itself lives in the driver behind the
//! [`ThermostatDriver`] trait; this crate maps the driver's state onto the
//! host's climate model and throttles how often the radio is used.
//!
//! # Features
//!
//! - **Mode mirroring**: derive OFF / HEAT / AUTO from the driver's flags and
//!   translate mode changes back into ordered flag writes
//! - **Fake manual mode**: present a single always-heating mode and mirror
//!   targets into the band setpoints, for firmware that ignores plain manual
//!   mode
//! - **Poll throttling**: refresh at most every five minutes unless the
//!   driver asks for it; failed refreshes retry on the next tick
//! - **Mock driver**: test and demo without hardware
//!
//! # Quick Start
//!
//! ```
//! use cometblue_core::{ClimateEntity, CometBlueThermostat, MockThermostat};
//! use cometblue_types::{HvacMode, ThermostatIdentity};
//!
//! #[tokio::main]
//! async fn main() -> cometblue_core::Result<()> {
//!     let identity = ThermostatIdentity::new("11:22:33:44:55:66", 0, "Living Room");
//!     let driver = MockThermostat::new(&identity.address);
//!     let mut thermostat = CometBlueThermostat::new(identity, driver);
//!
//!     thermostat.update().await;
//!     thermostat.set_hvac_mode(HvacMode::Heat).await?;
//!     thermostat.set_temperature(21.5).await?;
//!
//!     assert_eq!(thermostat.hvac_mode(), HvacMode::Heat);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;
pub mod mock;
pub mod mode;
pub mod platform;
pub mod poll;
pub mod resolver;
pub mod traits;
pub mod util;

// Core exports
pub use entity::{CometBlueThermostat, SUPPORT_FLAGS};
pub use error::{Error, Result};
pub use mock::{DriverWrite, MockDriverFactory, MockThermostat, MockThermostatBuilder};
pub use mode::{FlagWrite, ModeFlags};
pub use platform::{DeviceConfig, setup_platform};
pub use poll::{MIN_TIME_BETWEEN_UPDATES, PollCoordinator, PollOutcome};
pub use resolver::DeviceResolver;
pub use traits::{ClimateEntity, DriverFactory, ThermostatDriver};

// Re-export from cometblue-types
pub use cometblue_types::{
    ClimateFeatures, ClimateState, ExtraStateAttributes, HvacMode, Precision, TemperatureUnit,
    ThermostatIdentity,
};

/// A climate entity shared between the host's tasks.
///
/// The host serializes calls per entity through the mutex.
pub type SharedEntity = std::sync::Arc<tokio::sync::Mutex<Box<dyn ClimateEntity>>>;
