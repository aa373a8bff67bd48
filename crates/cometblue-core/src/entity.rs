//! The CometBlue climate entity.
//!
//! [`CometBlueThermostat`] is the proxy the host talks to. It owns one
//! driver, passes reads straight through, and adds only two pieces of
//! logic: the derived operating mode and the fake-manual override, which
//! mirrors every target temperature into the band setpoints for firmware
//! that ignores plain manual mode.

use async_trait::async_trait;
use tracing::debug;

use cometblue_types::{
    ClimateFeatures, ExtraStateAttributes, HvacMode, MAX_TEMP, MIN_TEMP, Precision,
    TemperatureUnit, ThermostatIdentity,
};

use crate::error::{Error, Result};
use crate::mode::{FlagWrite, ModeFlags, allowed_modes, plan_transition};
use crate::poll::{PollCoordinator, PollOutcome};
use crate::traits::{ClimateEntity, ThermostatDriver};

/// Features every CometBlue entity advertises.
pub const SUPPORT_FLAGS: ClimateFeatures = ClimateFeatures::TARGET_TEMPERATURE;

/// A CometBlue thermostat exposed as a climate entity.
#[derive(Debug)]
pub struct CometBlueThermostat<D> {
    identity: ThermostatIdentity,
    fake_manual_mode: bool,
    driver: D,
    poller: PollCoordinator,
}

impl<D: ThermostatDriver> CometBlueThermostat<D> {
    /// Wrap `driver` under the given identity.
    pub fn new(identity: ThermostatIdentity, driver: D) -> Self {
        Self {
            identity,
            fake_manual_mode: false,
            driver,
            poller: PollCoordinator::new(),
        }
    }

    /// Present the device as always heating manually.
    pub fn with_fake_manual_mode(mut self, enabled: bool) -> Self {
        self.fake_manual_mode = enabled;
        self
    }

    /// Replace the poll coordinator, e.g. to change the refresh interval.
    pub fn with_poller(mut self, poller: PollCoordinator) -> Self {
        self.poller = poller;
        self
    }

    pub fn identity(&self) -> &ThermostatIdentity {
        &self.identity
    }

    pub fn fake_manual_mode(&self) -> bool {
        self.fake_manual_mode
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn poller(&self) -> &PollCoordinator {
        &self.poller
    }

    /// The mode flags as currently cached by the driver.
    pub fn mode_flags(&self) -> ModeFlags {
        ModeFlags::from_driver(&self.driver, self.fake_manual_mode)
    }

    /// Run one update tick and report what happened.
    pub async fn poll(&mut self) -> PollOutcome {
        self.poller
            .poll(&mut self.driver, &self.identity.address)
            .await
    }

    fn apply(&mut self, write: FlagWrite) -> Result<()> {
        debug!("{}: {:?}", self.identity.address, write);
        match write {
            FlagWrite::Off(value) => self.driver.set_off(value),
            FlagWrite::ManualMode(value) => self.driver.set_manual_mode(value),
        }
    }
}

#[async_trait]
impl<D: ThermostatDriver> ClimateEntity for CometBlueThermostat<D> {
    fn unique_id(&self) -> &str {
        &self.identity.address
    }

    fn name(&self) -> &str {
        &self.identity.name
    }

    fn available(&self) -> bool {
        self.driver.available()
    }

    fn supported_features(&self) -> ClimateFeatures {
        SUPPORT_FLAGS
    }

    fn temperature_unit(&self) -> TemperatureUnit {
        TemperatureUnit::Celsius
    }

    fn precision(&self) -> Precision {
        Precision::Halves
    }

    fn current_temperature(&self) -> Option<f32> {
        self.driver.current_temperature()
    }

    fn target_temperature(&self) -> Option<f32> {
        self.driver.target_temperature()
    }

    fn min_temp(&self) -> f32 {
        MIN_TEMP
    }

    fn max_temp(&self) -> f32 {
        MAX_TEMP
    }

    fn hvac_mode(&self) -> HvacMode {
        self.mode_flags().hvac_mode()
    }

    fn hvac_modes(&self) -> &'static [HvacMode] {
        allowed_modes(self.fake_manual_mode)
    }

    fn extra_state_attributes(&self) -> ExtraStateAttributes {
        ExtraStateAttributes {
            battery_level: self.driver.battery_level(),
            battery_low: self.driver.low_battery(),
            locked: self.driver.locked(),
            offset: self.driver.offset_temperature(),
            status: self.driver.status(),
            window_open: self.driver.window_open(),
            model_type: self.driver.firmware_rev(),
        }
    }

    async fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.driver.set_target_temperature(temperature)?;
        if self.fake_manual_mode {
            // This firmware only honours a band, not a single setpoint.
            self.driver.set_target_temperature_high(temperature)?;
            self.driver.set_target_temperature_low(temperature)?;
        }
        Ok(())
    }

    async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<()> {
        // The flags were read just now; a change between this read and the
        // writes below is not detected.
        let current = self.hvac_mode();
        if mode == current {
            return Ok(());
        }

        let allowed = self.hvac_modes();
        if !allowed.contains(&mode) {
            return Err(Error::UnsupportedMode {
                mode,
                allowed: allowed.to_vec(),
            });
        }

        for write in plan_transition(current, mode) {
            self.apply(write)?;
        }
        Ok(())
    }

    async fn update(&mut self) {
        self.poll().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DriverWrite, MockThermostat};

    const ADDRESS: &str = "11:22:33:44:55:66";

    fn entity(driver: MockThermostat, fake_manual_mode: bool) -> CometBlueThermostat<MockThermostat> {
        CometBlueThermostat::new(ThermostatIdentity::new(ADDRESS, 0, "Living Room"), driver)
            .with_fake_manual_mode(fake_manual_mode)
    }

    fn driver(off: bool, manual: bool) -> MockThermostat {
        MockThermostat::builder()
            .address(ADDRESS)
            .off(off)
            .manual_mode(manual)
            .build()
    }

    #[test]
    fn test_identity_and_constants() {
        let thermostat = entity(driver(false, false), false);
        assert_eq!(thermostat.unique_id(), ADDRESS);
        assert_eq!(thermostat.name(), "Living Room");
        assert_eq!(thermostat.supported_features(), ClimateFeatures::TARGET_TEMPERATURE);
        assert_eq!(thermostat.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(thermostat.precision(), Precision::Halves);
        assert_eq!(thermostat.min_temp(), 8.0);
        assert_eq!(thermostat.max_temp(), 28.0);
    }

    #[test]
    fn test_hvac_mode_follows_flags() {
        assert_eq!(entity(driver(false, false), false).hvac_mode(), HvacMode::Auto);
        assert_eq!(entity(driver(false, true), false).hvac_mode(), HvacMode::Heat);
        assert_eq!(entity(driver(true, true), false).hvac_mode(), HvacMode::Off);
        assert_eq!(entity(driver(false, false), true).hvac_mode(), HvacMode::Heat);
        assert_eq!(entity(driver(true, false), true).hvac_mode(), HvacMode::Off);
    }

    #[test]
    fn test_hvac_modes_with_override() {
        assert_eq!(entity(driver(false, false), true).hvac_modes(), &[HvacMode::Heat]);
        assert_eq!(
            entity(driver(false, false), false).hvac_modes(),
            &[HvacMode::Heat, HvacMode::Auto, HvacMode::Off]
        );
    }

    #[tokio::test]
    async fn test_set_same_mode_writes_nothing() {
        let mut thermostat = entity(driver(false, true), false);
        thermostat.set_hvac_mode(HvacMode::Heat).await.unwrap();
        assert!(thermostat.driver().writes().is_empty());

        let mut thermostat = entity(driver(true, false), false);
        thermostat.set_hvac_mode(HvacMode::Off).await.unwrap();
        assert!(thermostat.driver().writes().is_empty());
    }

    #[tokio::test]
    async fn test_off_to_auto() {
        let mut thermostat = entity(driver(true, false), false);
        thermostat.set_hvac_mode(HvacMode::Auto).await.unwrap();

        assert_eq!(
            thermostat.driver().writes(),
            &[DriverWrite::Off(false), DriverWrite::ManualMode(false)]
        );
        assert!(!thermostat.driver().is_off());
        assert!(!thermostat.driver().manual_mode());
        assert_eq!(thermostat.hvac_mode(), HvacMode::Auto);
    }

    #[tokio::test]
    async fn test_off_to_heat_in_one_call() {
        let mut thermostat = entity(driver(true, false), false);
        thermostat.set_hvac_mode(HvacMode::Heat).await.unwrap();
        assert_eq!(thermostat.hvac_mode(), HvacMode::Heat);
    }

    #[tokio::test]
    async fn test_auto_to_off() {
        let mut thermostat = entity(driver(false, false), false);
        thermostat.set_hvac_mode(HvacMode::Off).await.unwrap();

        assert_eq!(thermostat.driver().writes(), &[DriverWrite::Off(true)]);
        assert_eq!(thermostat.hvac_mode(), HvacMode::Off);
    }

    #[tokio::test]
    async fn test_override_rejects_unreachable_modes() {
        let mut thermostat = entity(driver(false, false), true);

        for mode in [HvacMode::Auto, HvacMode::Off] {
            let err = thermostat.set_hvac_mode(mode).await.unwrap_err();
            assert!(matches!(err, Error::UnsupportedMode { .. }));
        }
        assert!(thermostat.driver().writes().is_empty());
    }

    #[tokio::test]
    async fn test_override_resending_off_is_noop() {
        // A device switched off at the thermostat still reads OFF with the
        // override set; echoing that mode back must not be rejected.
        let mut thermostat = entity(driver(true, false), true);
        assert_eq!(thermostat.hvac_mode(), HvacMode::Off);

        thermostat.set_hvac_mode(HvacMode::Off).await.unwrap();
        assert!(thermostat.driver().writes().is_empty());
        assert_eq!(thermostat.hvac_mode(), HvacMode::Off);
    }

    #[tokio::test]
    async fn test_override_leaves_off_with_heat() {
        let mut thermostat = entity(driver(true, false), true);
        thermostat.set_hvac_mode(HvacMode::Heat).await.unwrap();

        assert_eq!(
            thermostat.driver().writes(),
            &[DriverWrite::Off(false), DriverWrite::ManualMode(true)]
        );
        assert_eq!(thermostat.hvac_mode(), HvacMode::Heat);
    }

    #[tokio::test]
    async fn test_set_temperature_without_override() {
        let mut thermostat = entity(driver(false, true), false);
        thermostat.set_temperature(21.5).await.unwrap();

        assert_eq!(
            thermostat.driver().writes(),
            &[DriverWrite::TargetTemperature(21.5)]
        );
        assert_eq!(thermostat.target_temperature(), Some(21.5));
        assert_eq!(thermostat.driver().target_temperature_high(), Some(21.0));
        assert_eq!(thermostat.driver().target_temperature_low(), Some(17.0));
    }

    #[tokio::test]
    async fn test_set_temperature_with_override_mirrors_band() {
        let mut thermostat = entity(driver(false, false), true);
        thermostat.set_temperature(21.5).await.unwrap();

        assert_eq!(
            thermostat.driver().writes(),
            &[
                DriverWrite::TargetTemperature(21.5),
                DriverWrite::TargetTemperatureHigh(21.5),
                DriverWrite::TargetTemperatureLow(21.5),
            ]
        );
        assert_eq!(thermostat.driver().target_temperature(), Some(21.5));
        assert_eq!(thermostat.driver().target_temperature_high(), Some(21.5));
        assert_eq!(thermostat.driver().target_temperature_low(), Some(21.5));
    }

    #[tokio::test]
    async fn test_write_errors_propagate() {
        let mut thermostat = entity(driver(false, false), false);
        thermostat.driver_mut().set_fail_writes(true);

        assert!(matches!(
            thermostat.set_temperature(20.0).await,
            Err(Error::Driver(_))
        ));
        assert!(matches!(
            thermostat.set_hvac_mode(HvacMode::Heat).await,
            Err(Error::Driver(_))
        ));
    }

    #[test]
    fn test_extra_state_attributes() {
        let mut mock = driver(false, false);
        mock.state_mut().window_open = Some(true);
        mock.state_mut().offset_temperature = Some(-1.5);
        let attrs = entity(mock, false).extra_state_attributes();

        assert_eq!(attrs.battery_level, Some(85));
        assert_eq!(attrs.battery_low, Some(false));
        assert_eq!(attrs.locked, Some(false));
        assert_eq!(attrs.offset, Some(-1.5));
        assert_eq!(attrs.status.as_deref(), Some("ok"));
        assert_eq!(attrs.window_open, Some(true));
        assert_eq!(attrs.model_type.as_deref(), Some("COBL0126"));
    }

    #[tokio::test]
    async fn test_update_refreshes_and_swallows_errors() {
        let mut thermostat = entity(driver(false, false), false);
        assert!(!thermostat.available());

        thermostat.update().await;
        assert!(thermostat.available());

        thermostat.driver_mut().set_should_fail(true, None);
        thermostat.driver_mut().set_stale(true);
        thermostat.update().await;
        assert!(!thermostat.available());
        assert_eq!(thermostat.driver().update_count(), 2);
    }

    #[tokio::test]
    async fn test_state_snapshot() {
        let mut thermostat = entity(driver(false, false), true);
        thermostat.update().await;

        let state = thermostat.state();
        assert_eq!(state.unique_id, ADDRESS);
        assert!(state.available);
        assert_eq!(state.hvac_mode, HvacMode::Heat);
        assert_eq!(state.hvac_modes, vec![HvacMode::Heat]);
        assert_eq!(state.current_temperature, Some(20.5));
    }
}
