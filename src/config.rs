//! # Configuration
//! Settings generated by `build.rs` from `config/alarm_config.json`, and the slice of
//! them the controller needs.
use crate::drivers::hbridge::StopMode;
use crate::time::{InvalidSnoozeOffset, SnoozeOffset};
use core::num::NonZeroU8;

/// Constants generated from `config/alarm_config.json`
#[allow(clippy::missing_docs_in_private_items)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/alarm_config.rs"));
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Delay added to the current time on snooze
    pub snooze_offset: SnoozeOffset,
    /// Minutes after which a ring ends by itself, `None` rings until stopped
    pub ring_timeout: Option<NonZeroU8>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            snooze_offset: SnoozeOffset::DEFAULT,
            ring_timeout: None,
        }
    }
}

/// All build time settings, typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Name advertised over BLE
    pub device_name: &'static str,
    /// Controller tuning
    pub controller: ControllerConfig,
    /// Seconds between two clock samples of the poll loop, `1..=60`
    pub tick_interval_secs: u64,
    /// How the motor is stopped
    pub motor_stop_mode: StopMode,
    /// Pulse motor and indicator once before the poll loop starts
    pub self_test_on_boot: bool,
}

impl Settings {
    /// Settings from the generated constants.
    ///
    /// # Errors
    /// [`InvalidSnoozeOffset`] if the snooze setting is out of range. `build.rs` already
    /// refuses such a config, so this only fails for a hand edited generated file.
    pub const fn from_build_config() -> Result<Self, InvalidSnoozeOffset> {
        let snooze_offset = match SnoozeOffset::new(generated::SNOOZE_MINUTES) {
            Ok(offset) => offset,
            Err(e) => return Err(e),
        };
        Ok(Self {
            device_name: generated::DEVICE_NAME,
            controller: ControllerConfig {
                snooze_offset,
                // 0 in the config disables the timeout
                ring_timeout: NonZeroU8::new(generated::RING_TIMEOUT_MINUTES),
            },
            tick_interval_secs: generated::TICK_INTERVAL_SECS,
            motor_stop_mode: StopMode::from_brake_flag(generated::MOTOR_BRAKE_ON_STOP),
            self_test_on_boot: generated::SELF_TEST_ON_BOOT,
        })
    }
}
