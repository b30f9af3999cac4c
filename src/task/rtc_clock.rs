//! # RTC clock
//! [`Clock`] on top of the RP2040 real time clock.
//!
//! The RTC keeps a full date, the alarm only cares about hour and minute. Setting the
//! time keeps the current date when the RTC is running, otherwise it starts from
//! [`FALLBACK_DATE`].
use defmt::warn;
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc, RtcError};
use pico_haptic_alarm::{Clock, ClockError, ClockTime};

/// Date used when the time is set on a stopped RTC
const FALLBACK_DATE: DateTime = DateTime {
    year: 2025,
    month: 1,
    day: 1,
    day_of_week: DayOfWeek::Wednesday,
    hour: 0,
    minute: 0,
    second: 0,
};

/// The RP2040 RTC as alarm clock source
pub struct RtcClock {
    /// The RTC peripheral driver
    rtc: Rtc<'static, RTC>,
}

impl RtcClock {
    /// Create a new `RtcClock`
    pub const fn new(rtc: Rtc<'static, RTC>) -> Self {
        Self { rtc }
    }
}

impl Clock for RtcClock {
    fn read_time(&mut self) -> Result<ClockTime, ClockError> {
        let now = self.rtc.now().map_err(|e| match e {
            RtcError::NotRunning => ClockError::NotRunning,
            RtcError::InvalidDateTime(_) => ClockError::InvalidReading,
        })?;
        ClockTime::new(now.hour, now.minute).map_err(|_| ClockError::InvalidReading)
    }

    fn set_time(&mut self, time: ClockTime) -> Result<(), ClockError> {
        let date = self.rtc.now().unwrap_or(FALLBACK_DATE);
        let new_time = DateTime {
            hour: time.hour(),
            minute: time.minute(),
            second: 0,
            ..date
        };
        self.rtc.set_datetime(new_time).map_err(|e| {
            warn!("RTC rejected {:?}: {:?}", time, defmt::Debug2Format(&e));
            ClockError::WriteRejected
        })
    }
}
