//! Utility functions for cometblue-core.
//!
//! This module contains shared utility functions used across the crate.

use btleplug::platform::PeripheralId;

/// Address reported by platforms that hide the real Bluetooth address.
pub const HIDDEN_ADDRESS: &str = "00:00:00:00:00:00";

/// Format a peripheral ID as a string.
///
/// On macOS, peripheral IDs are UUIDs. On other platforms, they may be
/// MAC addresses or other formats. This function extracts the useful
/// identifier string.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Normalize a Bluetooth address for comparison.
///
/// Lowercases and strips `:` and `-` separators, so `11:22:33:AA:BB:CC`,
/// `11-22-33-aa-bb-cc` and `112233aabbcc` all compare equal.
pub fn normalize_address(address: &str) -> String {
    address
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether two addresses name the same device.
///
/// The hidden all-zero address never matches anything.
pub fn addresses_match(a: &str, b: &str) -> bool {
    let a = normalize_address(a);
    !a.is_empty() && a != normalize_address(HIDDEN_ADDRESS) && a == normalize_address(b)
}
