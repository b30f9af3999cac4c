//! # Command dispatcher
//! Turns decoded (or rejected) frames into controller calls. This is the only code outside
//! the tick path that mutates the controller.
//!
//! A rejected frame is logged and counted, it never reaches the controller.
use crate::actuator::Actuator;
use crate::clock::{Clock, ClockError};
use crate::command::{self, Command, MalformedCommand};
use crate::controller::AlarmController;
use crate::event::Inbound;
use crate::{log_debug, log_info, log_warn};
use core::fmt;

/// Why a frame had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The frame did not decode
    Malformed(MalformedCommand),
    /// `SetClock` decoded but the clock refused it
    Clock(ClockError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed command: {e}"),
            Self::Clock(e) => write!(f, "clock update failed: {e}"),
        }
    }
}

impl From<MalformedCommand> for DispatchError {
    fn from(e: MalformedCommand) -> Self {
        Self::Malformed(e)
    }
}

impl From<ClockError> for DispatchError {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

/// Counters for diagnostics, saturating at `u32::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchStats {
    /// Commands that reached the controller or the clock
    pub applied: u32,
    /// Frames dropped as malformed
    pub rejected: u32,
    /// `SetClock` commands the clock refused
    pub clock_failures: u32,
}

/// Applies commands to a controller, counting the outcome
#[derive(Debug, Default)]
pub struct Dispatcher {
    /// Outcome counters
    stats: DispatchStats,
}

impl Dispatcher {
    /// Create a dispatcher with zeroed counters
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stats: DispatchStats {
                applied: 0,
                rejected: 0,
                clock_failures: 0,
            },
        }
    }

    /// Decode `frame` and apply it.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn dispatch<A: Actuator, C: Clock>(
        &mut self,
        frame: &[u8],
        controller: &mut AlarmController<A>,
        clock: &mut C,
    ) -> Result<Command, DispatchError> {
        self.apply(command::decode(frame), controller, clock)
    }

    /// Apply an already decoded frame.
    ///
    /// # Errors
    /// [`DispatchError::Malformed`] if the frame was rejected by the decoder (state is
    /// untouched), [`DispatchError::Clock`] if a `SetClock` could not be written.
    pub fn apply<A: Actuator, C: Clock>(
        &mut self,
        inbound: Inbound,
        controller: &mut AlarmController<A>,
        clock: &mut C,
    ) -> Result<Command, DispatchError> {
        let command = match inbound {
            Ok(command) => command,
            Err(e) => {
                self.stats.rejected = self.stats.rejected.saturating_add(1);
                log_warn!("Dropping malformed command: {:?}", e);
                return Err(e.into());
            }
        };

        log_debug!("Applying opcode {:#x}", command.opcode());
        match command {
            Command::SetAlarm(time) => {
                // ClockTime is always in range, this cannot fail
                let _ = controller.set_alarm(time.hour(), time.minute());
            }
            Command::Arm => controller.arm(),
            Command::Disarm => controller.disarm(),
            Command::Snooze => controller.snooze(),
            Command::Stop => controller.stop(),
            Command::Test => controller.test(),
            Command::SetClock(time) => {
                if let Err(e) = clock.set_time(time) {
                    self.stats.clock_failures = self.stats.clock_failures.saturating_add(1);
                    log_warn!("Clock update to {:02}:{:02} failed: {:?}", time.hour(), time.minute(), e);
                    return Err(e.into());
                }
                log_info!("Clock set to {:02}:{:02}", time.hour(), time.minute());
            }
        }
        self.stats.applied = self.stats.applied.saturating_add(1);
        Ok(command)
    }

    /// Outcome counters so far
    #[must_use]
    pub const fn stats(&self) -> DispatchStats {
        self.stats
    }
}
