//! Operating-mode derivation.
//!
//! CometBlue thermostats have no single "mode" register. The host-facing
//! [`HvacMode`] is computed from the driver's off and manual-mode flags plus
//! the locally configured fake-manual override, and mode changes are
//! expressed as an ordered list of flag writes.

use cometblue_types::HvacMode;

use crate::traits::ThermostatDriver;

const OVERRIDE_MODES: &[HvacMode] = &[HvacMode::Heat];

/// The three booleans an operating mode is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    /// Driver reports heating switched off.
    pub is_off: bool,
    /// Driver reports manual mode.
    pub manual_mode: bool,
    /// Local override: always present the device as heating manually.
    pub fake_manual_mode: bool,
}

impl ModeFlags {
    /// Read the flags from a driver's cached state.
    pub fn from_driver<D: ThermostatDriver + ?Sized>(driver: &D, fake_manual_mode: bool) -> Self {
        Self {
            is_off: driver.is_off(),
            manual_mode: driver.manual_mode(),
            fake_manual_mode,
        }
    }

    /// Derive the operating mode.
    ///
    /// Off always wins; otherwise manual mode or the override give `Heat`,
    /// and the weekly schedule gives `Auto`.
    ///
    /// ```
    /// use cometblue_core::mode::ModeFlags;
    /// use cometblue_types::HvacMode;
    ///
    /// let flags = ModeFlags { is_off: false, manual_mode: false, fake_manual_mode: true };
    /// assert_eq!(flags.hvac_mode(), HvacMode::Heat);
    /// ```
    #[must_use]
    pub const fn hvac_mode(&self) -> HvacMode {
        if self.is_off {
            HvacMode::Off
        } else if self.manual_mode || self.fake_manual_mode {
            HvacMode::Heat
        } else {
            HvacMode::Auto
        }
    }
}

/// Modes that may be offered to the host.
#[must_use]
pub fn allowed_modes(fake_manual_mode: bool) -> &'static [HvacMode] {
    if fake_manual_mode {
        OVERRIDE_MODES
    } else {
        &HvacMode::ALL
    }
}

/// A single flag write on the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagWrite {
    Off(bool),
    ManualMode(bool),
}

/// Flag writes that take the device from `current` to `target`, in order.
///
/// Leaving `Off` clears the off flag before the mode flag is written, so a
/// direct jump from `Off` to `Auto` or `Heat` lands in one call.
#[must_use]
pub fn plan_transition(current: HvacMode, target: HvacMode) -> Vec<FlagWrite> {
    if current == target {
        return Vec::new();
    }

    let mut writes = Vec::with_capacity(2);
    if current == HvacMode::Off {
        writes.push(FlagWrite::Off(false));
    }
    writes.push(match target {
        HvacMode::Auto => FlagWrite::ManualMode(false),
        HvacMode::Heat => FlagWrite::ManualMode(true),
        HvacMode::Off => FlagWrite::Off(true),
    });
    writes
}
