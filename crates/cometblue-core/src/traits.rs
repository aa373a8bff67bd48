//! Trait seams between the adapter, the thermostat driver and the host.
//!
//! - [`ThermostatDriver`] is the narrow capability surface the adapter needs
//!   from a Bluetooth driver. Real drivers and [`crate::MockThermostat`] both
//!   implement it.
//! - [`DriverFactory`] builds a driver for a configured device.
//! - [`ClimateEntity`] is what the adapter offers the host.

use async_trait::async_trait;

use cometblue_types::{
    ClimateFeatures, ClimateState, ExtraStateAttributes, HvacMode, Precision, TemperatureUnit,
};

use crate::error::Result;
use crate::resolver::DeviceResolver;

/// Capability interface of an external CometBlue driver.
///
/// Getters return the driver's cached state and never touch the radio.
/// Setters record the new value with the driver; when it reaches the device
/// is up to the driver (typically on the next [`update`](Self::update)).
/// Only `update` suspends.
///
/// # Example
///
/// ```ignore
/// use cometblue_core::{ThermostatDriver, Result};
///
/// async fn refresh_and_print<D: ThermostatDriver>(driver: &mut D) -> Result<()> {
///     driver.update().await?;
///     println!("current: {:?}", driver.current_temperature());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ThermostatDriver: Send + Sync {
    /// Whether the device answered the last refresh.
    fn available(&self) -> bool;

    // --- Temperatures ---

    /// Measured room temperature in °C.
    fn current_temperature(&self) -> Option<f32>;

    /// Manual-mode target temperature in °C.
    fn target_temperature(&self) -> Option<f32>;

    /// Set the manual-mode target temperature.
    fn set_target_temperature(&mut self, value: f32) -> Result<()>;

    /// Upper band setpoint ("comfort" temperature) in °C.
    fn target_temperature_high(&self) -> Option<f32>;

    /// Set the upper band setpoint.
    fn set_target_temperature_high(&mut self, value: f32) -> Result<()>;

    /// Lower band setpoint ("eco" temperature) in °C.
    fn target_temperature_low(&self) -> Option<f32>;

    /// Set the lower band setpoint.
    fn set_target_temperature_low(&mut self, value: f32) -> Result<()>;

    /// Calibration offset applied to the measured temperature.
    fn offset_temperature(&self) -> Option<f32>;

    // --- Mode flags ---

    /// Whether heating is switched off.
    fn is_off(&self) -> bool;

    /// Switch heating off or back on.
    fn set_off(&mut self, off: bool) -> Result<()>;

    /// Whether the device is in manual mode (as opposed to its schedule).
    fn manual_mode(&self) -> bool;

    /// Enter or leave manual mode.
    fn set_manual_mode(&mut self, manual: bool) -> Result<()>;

    // --- Status ---

    fn locked(&self) -> Option<bool>;

    fn low_battery(&self) -> Option<bool>;

    fn window_open(&self) -> Option<bool>;

    /// Battery charge in percent.
    fn battery_level(&self) -> Option<u8>;

    /// Human-readable status summary.
    fn status(&self) -> Option<String>;

    /// Firmware revision string.
    fn firmware_rev(&self) -> Option<String>;

    // --- Refresh ---

    /// The driver's own hint that its cached state is outdated, for example
    /// because nothing has been read yet or writes are pending.
    fn should_update(&self) -> bool;

    /// Talk to the device: flush pending writes and re-read its state.
    async fn update(&mut self) -> Result<()>;
}

/// Builds drivers for configured thermostats.
///
/// The resolver is passed in explicitly so drivers never look up radio
/// handles through global state.
pub trait DriverFactory: Send + Sync {
    /// Driver type produced by this factory.
    type Driver: ThermostatDriver + 'static;

    /// Create a driver for the thermostat at `address` using access code `pin`.
    fn create(&self, address: &str, pin: u32, resolver: DeviceResolver) -> Result<Self::Driver>;
}

/// The climate-entity surface the host drives.
///
/// The host calls every method of one entity serially; mutating calls take
/// `&mut self` so that ordering is enforced by ownership.
#[async_trait]
pub trait ClimateEntity: Send + Sync {
    /// Stable identifier (the Bluetooth address).
    fn unique_id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    fn supported_features(&self) -> ClimateFeatures;

    fn temperature_unit(&self) -> TemperatureUnit;

    fn precision(&self) -> Precision;

    fn current_temperature(&self) -> Option<f32>;

    fn target_temperature(&self) -> Option<f32>;

    fn min_temp(&self) -> f32;

    fn max_temp(&self) -> f32;

    /// Current operating mode.
    fn hvac_mode(&self) -> HvacMode;

    /// Modes the host may offer for this entity.
    fn hvac_modes(&self) -> &'static [HvacMode];

    fn extra_state_attributes(&self) -> ExtraStateAttributes;

    /// Set the target temperature.
    async fn set_temperature(&mut self, temperature: f32) -> Result<()>;

    /// Switch the operating mode.
    async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<()>;

    /// Periodic update hook. Never fails; errors are logged by the entity.
    async fn update(&mut self);

    /// Collect the current state into a serializable snapshot.
    fn state(&self) -> ClimateState {
        ClimateState {
            unique_id: self.unique_id().to_string(),
            name: self.name().to_string(),
            available: self.available(),
            supported_features: self.supported_features(),
            temperature_unit: self.temperature_unit(),
            precision: self.precision(),
            current_temperature: self.current_temperature(),
            target_temperature: self.target_temperature(),
            min_temp: self.min_temp(),
            max_temp: self.max_temp(),
            hvac_mode: self.hvac_mode(),
            hvac_modes: self.hvac_modes().to_vec(),
            attributes: self.extra_state_attributes(),
        }
    }
}
