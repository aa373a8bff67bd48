//! Platform-agnostic types for CometBlue Bluetooth thermostats.
//!
//! This crate holds the climate-entity model shared by the driver adapter
//! (cometblue-core) and the host service (cometblue-service): operating
//! modes, capability flags, units and the serializable state snapshot.
//!
//! # Example
//!
//! ```
//! use cometblue_types::{ClimateFeatures, HvacMode};
//!
//! let mode: HvacMode = "heat".parse().unwrap();
//! assert_eq!(mode, HvacMode::Heat);
//! assert!(ClimateFeatures::TARGET_TEMPERATURE.contains(ClimateFeatures::TARGET_TEMPERATURE));
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    ClimateFeatures, ClimateState, ExtraStateAttributes, HvacMode, MAX_TEMP, MIN_TEMP, Precision,
    TemperatureUnit, ThermostatIdentity,
};

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_hvac_mode_serializes_lowercase() {
        let json = serde_json::to_string(&HvacMode::Auto).unwrap();
        assert_eq!(json, "\"auto\"");

        let mode: HvacMode = serde_json::from_str("\"off\"").unwrap();
        assert_eq!(mode, HvacMode::Off);
    }

    #[test]
    fn test_features_serialize_as_bits() {
        let json = serde_json::to_string(&ClimateFeatures::TARGET_TEMPERATURE).unwrap();
        assert_eq!(json, "1");
    }

    #[test]
    fn test_extra_attributes_keys() {
        let attrs = ExtraStateAttributes {
            battery_level: Some(80),
            battery_low: Some(false),
            locked: Some(true),
            offset: Some(-0.5),
            status: Some("ok".to_string()),
            window_open: Some(false),
            model_type: Some("COBL0126".to_string()),
        };
        let value = serde_json::to_value(&attrs).unwrap();

        for key in [
            "battery_level",
            "battery_low",
            "locked",
            "offset",
            "status",
            "window_open",
            "model_type",
        ] {
            assert!(value.get(key).is_some(), "missing attribute {key}");
        }
        assert_eq!(value["locked"], true);
        assert_eq!(value["model_type"], "COBL0126");
    }

    #[test]
    fn test_climate_state_serialization() {
        let state = ClimateState {
            unique_id: "11:22:33:44:55:66".to_string(),
            name: "Living Room".to_string(),
            available: true,
            supported_features: ClimateFeatures::TARGET_TEMPERATURE,
            temperature_unit: TemperatureUnit::Celsius,
            precision: Precision::Halves,
            current_temperature: Some(20.5),
            target_temperature: Some(21.0),
            min_temp: MIN_TEMP,
            max_temp: MAX_TEMP,
            hvac_mode: HvacMode::Heat,
            hvac_modes: vec![HvacMode::Heat],
            attributes: ExtraStateAttributes::default(),
        };

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["hvac_mode"], "heat");
        assert_eq!(value["hvac_modes"], serde_json::json!(["heat"]));
        assert_eq!(value["precision"], "halves");
        assert_eq!(value["temperature_unit"], "celsius");
        assert_eq!(value["supported_features"], 1);

        let back: ClimateState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }
}
