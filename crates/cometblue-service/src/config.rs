//! Server configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cometblue_core::DeviceConfig;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Host behaviour.
    pub host: HostConfig,
    /// Thermostats keyed by display name.
    pub devices: BTreeMap<String, DeviceConfig>,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// How the host drives its entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Seconds between update ticks. Each entity still refreshes its device
    /// at most every five minutes unless the driver asks for more.
    pub scan_interval: u64,
}

/// Default update tick, matching the host's climate platform default.
pub const DEFAULT_SCAN_INTERVAL: u64 = 30;

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cometblue")
        .join("server.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.host.scan_interval, 30);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_device_config_defaults() {
        let toml = r#"mac = "11:22:33:44:55:66""#;
        let config: DeviceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.address, "11:22:33:44:55:66");
        assert_eq!(config.pin, 0);
        assert!(!config.fake_manual_mode);
    }

    #[test]
    fn test_device_config_accepts_address_key() {
        let toml = r#"
            address = "11:22:33:44:55:66"
            pin = 1234
            fake_manual_mode = true
        "#;
        let config: DeviceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pin, 1234);
        assert!(config.fake_manual_mode);
    }

    #[test]
    fn test_device_config_requires_address() {
        let result: Result<DeviceConfig, _> = toml::from_str("pin = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_pin_rejected() {
        let result: Result<DeviceConfig, _> = toml::from_str(
            r#"
            mac = "11:22:33:44:55:66"
            pin = -1
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:8123"

            [host]
            scan_interval = 60

            [devices.living_room]
            mac = "11:22:33:44:55:66"
            pin = 0

            [devices.bedroom]
            mac = "AA:BB:CC:DD:EE:FF"
            pin = 4321
            fake_manual_mode = true
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8123");
        assert_eq!(config.host.scan_interval, 60);
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.devices["bedroom"].pin, 4321);
        assert!(config.devices["bedroom"].fake_manual_mode);
        assert!(!config.devices["living_room"].fake_manual_mode);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("server.toml");

        let mut config = Config::default();
        config.server.bind = "0.0.0.0:9090".to_string();
        config.devices.insert(
            "office".to_string(),
            DeviceConfig {
                address: "11:22:33:44:55:66".to_string(),
                pin: 7,
                fake_manual_mode: true,
            },
        );

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert_eq!(loaded.devices["office"], config.devices["office"]);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("cometblue/server.toml"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Read {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let display = format!("{}", error);
        assert!(display.contains("/test/path"));
        assert!(display.contains("not found"));
    }
}
