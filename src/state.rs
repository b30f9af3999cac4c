//! # State of the alarm
//! The two pieces of state the [`AlarmController`](crate::controller::AlarmController) owns:
//! when to ring ([`AlarmConfig`]) and what it is doing right now ([`AlarmRuntimeState`]).
//!
//! Both only change through the controller. The types here carry no behaviour beyond
//! accessors, the transitions live in `controller.rs`.
use crate::time::ClockTime;

/// The scheduled trigger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// Hour and minute of the next ring
    time: ClockTime,
}

impl AlarmConfig {
    /// Create a new `AlarmConfig` ringing at `time`
    #[must_use]
    pub const fn new(time: ClockTime) -> Self {
        Self { time }
    }

    /// Get the alarm time
    #[must_use]
    pub const fn time(&self) -> ClockTime {
        self.time
    }

    /// Get the alarm hour
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.time.hour()
    }

    /// Get the alarm minute
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.time.minute()
    }

    /// Overwrite the alarm time
    pub(crate) const fn set_time(&mut self, time: ClockTime) {
        self.time = time;
    }
}

/// What the alarm is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMode {
    /// Waiting for the configured time (if armed)
    #[default]
    Idle,
    /// The motor is running
    Ringing,
    /// The ring was snoozed, waiting for the recomputed time
    Snoozed,
}

/// Armed flag plus mode.
///
/// Holds `Snoozed => armed` and `!armed => Idle`, the controller keeps both true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRuntimeState {
    /// Whether trigger checking is active
    pub armed: bool,
    /// Current mode
    pub mode: AlarmMode,
}

impl AlarmRuntimeState {
    /// Whether the motor is supposed to run in this state
    #[must_use]
    pub const fn motor_on(&self) -> bool {
        matches!(self.mode, AlarmMode::Ringing)
    }

    /// Whether the indicator is supposed to be lit in this state
    #[must_use]
    pub const fn indicator_on(&self) -> bool {
        self.armed || self.motor_on()
    }

    /// Check the mode/armed invariants
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        match self.mode {
            AlarmMode::Idle | AlarmMode::Ringing => true,
            AlarmMode::Snoozed => self.armed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_midnight_unarmed_idle() {
        let config = AlarmConfig::default();
        assert_eq!((config.hour(), config.minute()), (0, 0));
        let state = AlarmRuntimeState::default();
        assert!(!state.armed);
        assert_eq!(state.mode, AlarmMode::Idle);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_outputs_follow_state() {
        let ringing = AlarmRuntimeState { armed: false, mode: AlarmMode::Ringing };
        assert!(ringing.motor_on());
        assert!(ringing.indicator_on());

        let armed_idle = AlarmRuntimeState { armed: true, mode: AlarmMode::Idle };
        assert!(!armed_idle.motor_on());
        assert!(armed_idle.indicator_on());

        let snoozed = AlarmRuntimeState { armed: true, mode: AlarmMode::Snoozed };
        assert!(!snoozed.motor_on());
    }

    #[test]
    fn test_snoozed_requires_armed() {
        let state = AlarmRuntimeState { armed: false, mode: AlarmMode::Snoozed };
        assert!(!state.is_consistent());
    }
}
