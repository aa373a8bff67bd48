//! Error types for cometblue-core.
//!
//! The adapter defines almost no failure modes of its own. Driver errors are
//! handed back to the caller unchanged, with one exception: a failed refresh
//! inside [`crate::PollCoordinator`] is logged and swallowed so the next
//! update tick can retry.
//!
//! | Error Type | Raised by | Notes |
//! |------------|-----------|-------|
//! | [`Error::Bluetooth`] | address resolver, drivers | Wrapped `btleplug` error |
//! | [`Error::DeviceNotFound`] | address resolver, drivers | Nothing connectable at that address |
//! | [`Error::Driver`] | drivers | Any other driver-side failure |
//! | [`Error::UnsupportedMode`] | [`crate::CometBlueThermostat`] | Mode not in `hvac_modes()` |

use thiserror::Error;

use cometblue_types::HvacMode;

/// Errors that can occur while driving a CometBlue thermostat.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No connectable device was found for the address.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The driver failed to read, write or refresh.
    #[error("Driver error: {0}")]
    Driver(String),

    /// The requested mode is not offered by this entity.
    #[error("HVAC mode '{mode}' is not supported (allowed: {})", format_modes(.allowed))]
    UnsupportedMode {
        /// The mode that was requested.
        mode: HvacMode,
        /// The modes the entity offers.
        allowed: Vec<HvacMode>,
    },
}

fn format_modes(modes: &[HvacMode]) -> String {
    modes
        .iter()
        .map(HvacMode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a device not found error for an address.
    pub fn device_not_found(address: impl Into<String>) -> Self {
        Self::DeviceNotFound(address.into())
    }

    /// Create a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }
}

/// Result type alias using cometblue-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
