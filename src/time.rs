//! # Wall clock time
//! Hour and minute of day as seen by the alarm, and the snooze offset arithmetic on it.
//!
//! Only validated values can be constructed, so everything holding a [`ClockTime`]
//! can rely on `hour <= 23` and `minute <= 59`.

use core::fmt;

/// Minutes in one day, the modulus of all time arithmetic here
const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error for an hour/minute pair outside `0..=23` / `0..=59`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidTime {
    /// The rejected hour
    pub hour: u8,
    /// The rejected minute
    pub minute: u8,
}

impl fmt::Display for InvalidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time {:02}:{:02}", self.hour, self.minute)
    }
}

/// A valid time of day, truncated to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    /// Hour of day, `0..=23`
    hour: u8,
    /// Minute of hour, `0..=59`
    minute: u8,
}

impl ClockTime {
    /// Midnight, the power-on alarm time
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Create a time of day.
    ///
    /// # Errors
    /// [`InvalidTime`] if `hour > 23` or `minute > 59`.
    pub const fn new(hour: u8, minute: u8) -> Result<Self, InvalidTime> {
        if hour > 23 || minute > 59 {
            return Err(InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// Hour of day
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute of hour
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since midnight
    #[must_use]
    pub const fn minute_of_day(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Inverse of [`Self::minute_of_day`], wrapping at one day
    // both casts are in range: minutes < 1440
    #[allow(clippy::cast_possible_truncation)]
    const fn from_minute_of_day(minutes: u16) -> Self {
        let minutes = minutes % MINUTES_PER_DAY;
        Self {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        }
    }

    /// The time `offset` minutes later; the minute carry goes into the hour and the
    /// hour wraps past midnight (23:57 + 5 = 00:02).
    #[must_use]
    pub const fn plus(self, offset: SnoozeOffset) -> Self {
        Self::from_minute_of_day(self.minute_of_day() + offset.minutes() as u16)
    }

    /// Minutes from `earlier` to `self`, going forward across midnight if needed.
    #[must_use]
    pub const fn minutes_since(self, earlier: Self) -> u16 {
        (self.minute_of_day() + MINUTES_PER_DAY - earlier.minute_of_day()) % MINUTES_PER_DAY
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Error for a snooze offset outside `1..=59`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidSnoozeOffset(pub u8);

impl fmt::Display for InvalidSnoozeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snooze offset must be 1..=59 minutes, got {}", self.0)
    }
}

/// Delay added to the current time on snooze. Always less than one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SnoozeOffset(u8);

impl SnoozeOffset {
    /// Five minutes
    pub const DEFAULT: Self = Self(5);

    /// # Errors
    /// [`InvalidSnoozeOffset`] for `0` or anything above 59.
    pub const fn new(minutes: u8) -> Result<Self, InvalidSnoozeOffset> {
        if minutes == 0 || minutes > 59 {
            return Err(InvalidSnoozeOffset(minutes));
        }
        Ok(Self(minutes))
    }

    /// Offset in minutes
    #[must_use]
    pub const fn minutes(self) -> u8 {
        self.0
    }
}

impl Default for SnoozeOffset {
    fn default() -> Self {
        Self::DEFAULT
    }
}
