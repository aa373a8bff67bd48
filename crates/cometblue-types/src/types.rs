//! Core types for the climate-entity model of CometBlue thermostats.

use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Lowest target temperature the thermostat accepts, in °C.
pub const MIN_TEMP: f32 = 8.0;

/// Highest target temperature the thermostat accepts, in °C.
pub const MAX_TEMP: f32 = 28.0;

/// Operating mode presented to the host.
///
/// The mode is never stored on the device as such; it is derived from the
/// driver's off and manual-mode flags (see `cometblue_core::mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HvacMode {
    /// Heating disabled.
    Off,
    /// Manual heating to a fixed target temperature.
    Heat,
    /// The thermostat follows its own weekly schedule.
    Auto,
}

impl HvacMode {
    /// Every mode, in the order offered to the host when no override is active.
    pub const ALL: [HvacMode; 3] = [HvacMode::Heat, HvacMode::Auto, HvacMode::Off];

    /// The lowercase name used on the wire and in configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Auto => "auto",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ParseError;

    /// Parse a mode name, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use cometblue_types::HvacMode;
    ///
    /// assert_eq!("heat".parse::<HvacMode>(), Ok(HvacMode::Heat));
    /// assert_eq!("AUTO".parse::<HvacMode>(), Ok(HvacMode::Auto));
    /// assert!("cool".parse::<HvacMode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(HvacMode::Off),
            "heat" => Ok(HvacMode::Heat),
            "auto" => Ok(HvacMode::Auto),
            _ => Err(ParseError::UnknownHvacMode(s.to_string())),
        }
    }
}

/// Unit in which temperatures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit symbol, e.g. `°C`.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Step in which temperatures are displayed and set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Precision {
    Tenths,
    Halves,
    Whole,
}

impl Precision {
    /// The step as a number (0.1, 0.5 or 1.0).
    #[must_use]
    pub fn step(&self) -> f32 {
        match self {
            Precision::Tenths => 0.1,
            Precision::Halves => 0.5,
            Precision::Whole => 1.0,
        }
    }
}

/// Capability flags a climate entity advertises to the host.
///
/// Bit values match the host's climate feature numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClimateFeatures(u32);

impl ClimateFeatures {
    /// A single target temperature can be set.
    pub const TARGET_TEMPERATURE: ClimateFeatures = ClimateFeatures(1);
    /// A low/high target temperature range can be set.
    pub const TARGET_TEMPERATURE_RANGE: ClimateFeatures = ClimateFeatures(2);

    /// No features.
    #[must_use]
    pub const fn empty() -> Self {
        ClimateFeatures(0)
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(&self, other: ClimateFeatures) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ClimateFeatures {
    type Output = ClimateFeatures;

    fn bitor(self, rhs: Self) -> Self::Output {
        ClimateFeatures(self.0 | rhs.0)
    }
}

/// Identity of a configured thermostat. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThermostatIdentity {
    /// Bluetooth address, e.g. `11:22:33:44:55:66`.
    pub address: String,
    /// Access code (PIN) sent to the thermostat on connect.
    pub pin: u32,
    /// Display name.
    pub name: String,
}

impl ThermostatIdentity {
    /// Create a new identity.
    pub fn new(address: impl Into<String>, pin: u32, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            pin,
            name: name.into(),
        }
    }
}

/// Extended state attributes reported next to the climate state.
///
/// Every value is a read-through of the driver's cached state; `None` means
/// the driver has not read it yet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtraStateAttributes {
    /// Battery charge in percent.
    pub battery_level: Option<u8>,
    /// Low-battery warning flag.
    pub battery_low: Option<bool>,
    /// Whether the keypad is locked.
    pub locked: Option<bool>,
    /// Temperature calibration offset in °C.
    pub offset: Option<f32>,
    /// Free-form status text from the driver.
    pub status: Option<String>,
    /// Whether an open window was detected.
    pub window_open: Option<bool>,
    /// Firmware revision, used as the model identifier.
    pub model_type: Option<String>,
}

/// Snapshot of everything a climate entity exposes to the host.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClimateState {
    pub unique_id: String,
    pub name: String,
    pub available: bool,
    pub supported_features: ClimateFeatures,
    pub temperature_unit: TemperatureUnit,
    pub precision: Precision,
    pub current_temperature: Option<f32>,
    pub target_temperature: Option<f32>,
    pub min_temp: f32,
    pub max_temp: f32,
    pub hvac_mode: HvacMode,
    pub hvac_modes: Vec<HvacMode>,
    pub attributes: ExtraStateAttributes,
}
