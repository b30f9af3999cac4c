//! # Clock boundary
//! Where the current time of day comes from, and the latch the poll loop uses so a
//! matching minute starts at most one ring.
use crate::time::ClockTime;
use core::fmt;

/// Errors of a clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The clock was never set since power on
    NotRunning,
    /// The clock returned something that is not a time of day
    InvalidReading,
    /// The clock refused the new time
    WriteRejected,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "clock not running"),
            Self::InvalidReading => write!(f, "clock returned an invalid time"),
            Self::WriteRejected => write!(f, "clock rejected the new time"),
        }
    }
}

/// A source of the current hour and minute.
///
/// Readings must roll over at 23:59 -> 00:00.
pub trait Clock {
    /// Read the current time
    ///
    /// # Errors
    /// [`ClockError`] if the clock cannot produce a time.
    fn read_time(&mut self) -> Result<ClockTime, ClockError>;

    /// Set the current time; seconds restart at zero
    ///
    /// # Errors
    /// [`ClockError::WriteRejected`] if the clock refuses the value.
    fn set_time(&mut self, time: ClockTime) -> Result<(), ClockError>;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn read_time(&mut self) -> Result<ClockTime, ClockError> {
        (**self).read_time()
    }

    fn set_time(&mut self, time: ClockTime) -> Result<(), ClockError> {
        (**self).set_time(time)
    }
}

/// Remembers the minute in which the alarm started ringing from a tick.
///
/// Readings inside that minute are held back from the controller, so a ring stopped
/// inside its own minute does not start again. Any other minute clears the latch.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingLatch {
    /// Minute of the last tick that started a ring
    fired: Option<ClockTime>,
}

impl RingLatch {
    /// Create an open latch
    #[must_use]
    pub const fn new() -> Self {
        Self { fired: None }
    }

    /// Whether the controller may be ticked at `now`
    pub fn admits(&mut self, now: ClockTime) -> bool {
        match self.fired {
            Some(minute) if minute == now => false,
            Some(_) => {
                self.fired = None;
                true
            }
            None => true,
        }
    }

    /// A tick at `now` started a ring
    pub const fn latch(&mut self, now: ClockTime) {
        self.fired = Some(now);
    }

    /// Open the latch, the next reading is admitted whatever it is
    pub const fn reset(&mut self) {
        self.fired = None;
    }
}
