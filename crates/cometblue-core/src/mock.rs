//! Mock thermostat driver for testing.
//!
//! This module provides a driver that can be used for unit testing and for
//! running the host without Bluetooth hardware.
//!
//! The [`MockThermostat`] implements the [`ThermostatDriver`] trait, allowing
//! it to be used interchangeably with real drivers in generic code.
//!
//! # Features
//!
//! - **Failure injection**: fail refreshes permanently, a fixed number of
//!   times, or fail every write
//! - **Write log**: every setter call is recorded as a [`DriverWrite`]
//! - **Latency simulation**: delay refreshes to mimic a slow radio link
//! - **Simulation**: drift the room temperature towards the target on each
//!   refresh, for demo hosts

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resolver::DeviceResolver;
use crate::traits::{DriverFactory, ThermostatDriver};

/// Step by which a simulated room temperature approaches its target.
const SIMULATED_DRIFT: f32 = 0.5;

/// Most recent writes kept in a mock's write log; older entries are dropped.
pub const WRITE_LOG_CAPACITY: usize = 256;

/// Cached device state held by a [`MockThermostat`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockState {
    pub available: bool,
    pub current_temperature: Option<f32>,
    pub target_temperature: Option<f32>,
    pub target_temperature_high: Option<f32>,
    pub target_temperature_low: Option<f32>,
    pub offset_temperature: Option<f32>,
    pub is_off: bool,
    pub manual_mode: bool,
    pub locked: Option<bool>,
    pub low_battery: Option<bool>,
    pub window_open: Option<bool>,
    pub battery_level: Option<u8>,
    pub status: Option<String>,
    pub firmware_rev: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            available: false,
            current_temperature: Some(20.5),
            target_temperature: Some(21.0),
            target_temperature_high: Some(21.0),
            target_temperature_low: Some(17.0),
            offset_temperature: Some(0.0),
            is_off: false,
            manual_mode: false,
            locked: Some(false),
            low_battery: Some(false),
            window_open: Some(false),
            battery_level: Some(85),
            status: Some("ok".to_string()),
            firmware_rev: Some("COBL0126".to_string()),
        }
    }
}

/// A setter call recorded by [`MockThermostat`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverWrite {
    TargetTemperature(f32),
    TargetTemperatureHigh(f32),
    TargetTemperatureLow(f32),
    Off(bool),
    ManualMode(bool),
}

/// A mock CometBlue driver.
///
/// Implements [`ThermostatDriver`] for use in generic code and testing.
///
/// # Example
///
/// ```
/// use cometblue_core::{MockThermostat, ThermostatDriver};
///
/// #[tokio::main]
/// async fn main() {
///     let mut driver = MockThermostat::new("11:22:33:44:55:66");
///     assert!(driver.should_update());
///
///     driver.update().await.unwrap();
///     assert!(driver.available());
///     assert!(!driver.should_update());
/// }
/// ```
#[derive(Debug)]
pub struct MockThermostat {
    address: String,
    pin: u32,
    state: MockState,
    stale: bool,
    writes: Vec<DriverWrite>,
    update_count: u32,
    should_fail: bool,
    fail_message: String,
    /// Number of refreshes to fail before succeeding again.
    remaining_failures: u32,
    fail_writes: bool,
    update_latency: Duration,
    simulate: bool,
}

impl MockThermostat {
    /// Create a mock driver with default state.
    ///
    /// The state starts stale and unavailable, as a real driver's would
    /// before its first refresh.
    pub fn new(address: &str) -> Self {
        MockThermostatBuilder::new().address(address).build()
    }

    /// Start building a mock driver.
    pub fn builder() -> MockThermostatBuilder {
        MockThermostatBuilder::new()
    }

    /// The device address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The access code the driver was created with.
    pub fn pin(&self) -> u32 {
        self.pin
    }

    fn record(&mut self, write: DriverWrite) -> Result<()> {
        if self.fail_writes {
            return Err(Error::driver(self.fail_message.clone()));
        }

        match write {
            DriverWrite::TargetTemperature(v) => self.state.target_temperature = Some(v),
            DriverWrite::TargetTemperatureHigh(v) => self.state.target_temperature_high = Some(v),
            DriverWrite::TargetTemperatureLow(v) => self.state.target_temperature_low = Some(v),
            DriverWrite::Off(v) => self.state.is_off = v,
            DriverWrite::ManualMode(v) => self.state.manual_mode = v,
        }
        if self.writes.len() == WRITE_LOG_CAPACITY {
            self.writes.remove(0);
        }
        self.writes.push(write);
        // Pending writes are flushed on the next refresh.
        self.stale = true;
        Ok(())
    }

    fn drift(&mut self) {
        if self.state.is_off {
            return;
        }
        let target = if self.state.manual_mode {
            self.state.target_temperature
        } else {
            self.state.target_temperature_high
        };
        if let (Some(current), Some(target)) = (self.state.current_temperature, target) {
            let step = (target - current).clamp(-SIMULATED_DRIFT, SIMULATED_DRIFT);
            self.state.current_temperature = Some(current + step);
        }
    }

    // --- Test control methods ---

    /// Current cached state.
    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// Mutable access to the cached state, bypassing the write log.
    pub fn state_mut(&mut self) -> &mut MockState {
        &mut self.state
    }

    /// All setter calls so far, in order.
    pub fn writes(&self) -> &[DriverWrite] {
        &self.writes
    }

    /// Forget recorded writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Number of refresh attempts, successful or not.
    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    /// Set the driver's own staleness hint.
    pub fn set_stale(&mut self, stale: bool) {
        self.stale = stale;
    }

    /// Make every refresh fail (or succeed again).
    pub fn set_should_fail(&mut self, fail: bool, message: Option<&str>) {
        self.should_fail = fail;
        if let Some(msg) = message {
            self.fail_message = msg.to_string();
        }
    }

    /// Fail the next `count` refreshes, then succeed.
    pub fn set_transient_failures(&mut self, count: u32) {
        self.remaining_failures = count;
    }

    /// Make every setter fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Delay each refresh by `latency`.
    pub fn set_update_latency(&mut self, latency: Duration) {
        self.update_latency = latency;
    }
}

#[async_trait]
impl ThermostatDriver for MockThermostat {
    fn available(&self) -> bool {
        self.state.available
    }

    fn current_temperature(&self) -> Option<f32> {
        self.state.current_temperature
    }

    fn target_temperature(&self) -> Option<f32> {
        self.state.target_temperature
    }

    fn set_target_temperature(&mut self, value: f32) -> Result<()> {
        self.record(DriverWrite::TargetTemperature(value))
    }

    fn target_temperature_high(&self) -> Option<f32> {
        self.state.target_temperature_high
    }

    fn set_target_temperature_high(&mut self, value: f32) -> Result<()> {
        self.record(DriverWrite::TargetTemperatureHigh(value))
    }

    fn target_temperature_low(&self) -> Option<f32> {
        self.state.target_temperature_low
    }

    fn set_target_temperature_low(&mut self, value: f32) -> Result<()> {
        self.record(DriverWrite::TargetTemperatureLow(value))
    }

    fn offset_temperature(&self) -> Option<f32> {
        self.state.offset_temperature
    }

    fn is_off(&self) -> bool {
        self.state.is_off
    }

    fn set_off(&mut self, off: bool) -> Result<()> {
        self.record(DriverWrite::Off(off))
    }

    fn manual_mode(&self) -> bool {
        self.state.manual_mode
    }

    fn set_manual_mode(&mut self, manual: bool) -> Result<()> {
        self.record(DriverWrite::ManualMode(manual))
    }

    fn locked(&self) -> Option<bool> {
        self.state.locked
    }

    fn low_battery(&self) -> Option<bool> {
        self.state.low_battery
    }

    fn window_open(&self) -> Option<bool> {
        self.state.window_open
    }

    fn battery_level(&self) -> Option<u8> {
        self.state.battery_level
    }

    fn status(&self) -> Option<String> {
        self.state.status.clone()
    }

    fn firmware_rev(&self) -> Option<String> {
        self.state.firmware_rev.clone()
    }

    fn should_update(&self) -> bool {
        self.stale
    }

    async fn update(&mut self) -> Result<()> {
        self.update_count += 1;

        if !self.update_latency.is_zero() {
            tokio::time::sleep(self.update_latency).await;
        }

        if self.remaining_failures > 0 {
            self.remaining_failures -= 1;
            self.state.available = false;
            return Err(Error::driver(self.fail_message.clone()));
        }

        if self.should_fail {
            self.state.available = false;
            return Err(Error::driver(self.fail_message.clone()));
        }

        if self.simulate {
            self.drift();
        }
        self.state.available = true;
        self.stale = false;
        debug!("Mock thermostat {} refreshed", self.address);
        Ok(())
    }
}

/// Builder for creating mock drivers with custom state.
#[derive(Debug)]
pub struct MockThermostatBuilder {
    address: String,
    pin: u32,
    state: MockState,
    simulate: bool,
}

impl Default for MockThermostatBuilder {
    fn default() -> Self {
        Self {
            address: format!("MOCK-{:06X}", rand::random::<u32>() % 0xFFFFFF),
            pin: 0,
            state: MockState::default(),
            simulate: false,
        }
    }
}

impl MockThermostatBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device address.
    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    /// Set the access code.
    pub fn pin(mut self, pin: u32) -> Self {
        self.pin = pin;
        self
    }

    /// Set the measured temperature.
    pub fn current_temperature(mut self, temp: f32) -> Self {
        self.state.current_temperature = Some(temp);
        self
    }

    /// Set the manual target temperature.
    pub fn target_temperature(mut self, temp: f32) -> Self {
        self.state.target_temperature = Some(temp);
        self
    }

    /// Set the off flag.
    pub fn off(mut self, off: bool) -> Self {
        self.state.is_off = off;
        self
    }

    /// Set the manual-mode flag.
    pub fn manual_mode(mut self, manual: bool) -> Self {
        self.state.manual_mode = manual;
        self
    }

    /// Set the battery level.
    pub fn battery_level(mut self, level: u8) -> Self {
        self.state.battery_level = Some(level);
        self
    }

    /// Drift the room temperature towards the target on every refresh.
    pub fn simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    /// Build the mock driver.
    pub fn build(self) -> MockThermostat {
        MockThermostat {
            address: self.address,
            pin: self.pin,
            state: self.state,
            stale: true,
            writes: Vec::new(),
            update_count: 0,
            should_fail: false,
            fail_message: "Mock failure".to_string(),
            remaining_failures: 0,
            fail_writes: false,
            update_latency: Duration::ZERO,
            simulate: self.simulate,
        }
    }
}

/// Factory producing simulated [`MockThermostat`] drivers.
///
/// The resolver is accepted and dropped; mock drivers never open a radio
/// connection.
#[derive(Debug, Clone, Default)]
pub struct MockDriverFactory {
    simulate: bool,
}

impl MockDriverFactory {
    /// Factory for plain mock drivers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory for drivers whose room temperature follows the target.
    pub fn simulated() -> Self {
        Self { simulate: true }
    }
}

impl DriverFactory for MockDriverFactory {
    type Driver = MockThermostat;

    fn create(&self, address: &str, pin: u32, _resolver: DeviceResolver) -> Result<MockThermostat> {
        Ok(MockThermostat::builder()
            .address(address)
            .pin(pin)
            .simulate(self.simulate)
            .build())
    }
}
