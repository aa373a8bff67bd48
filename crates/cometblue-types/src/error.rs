//! Error types for value parsing in cometblue-types.

use thiserror::Error;

/// Errors that can occur when parsing climate values from text.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in cometblue-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string does not name a known HVAC mode.
    #[error("Unknown HVAC mode: '{0}'")]
    UnknownHvacMode(String),
}

/// Result type alias using cometblue-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
