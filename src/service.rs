//! # Alarm service
//! One step of the poll loop: either sample the clock and tick the controller, or apply
//! one inbound command. The firmware owns one `AlarmService` in its poll loop task and
//! feeds it one [`Event`] per cycle, so the controller is never mutated concurrently.
use crate::actuator::Actuator;
use crate::clock::{Clock, RingLatch};
use crate::command::Command;
use crate::controller::AlarmController;
use crate::dispatch::{DispatchError, DispatchStats, Dispatcher};
use crate::event::{Event, Inbound};
use crate::state::AlarmMode;
use crate::{log_debug, log_warn};

/// Controller, clock and dispatcher, stepped by the poll loop
pub struct AlarmService<A: Actuator, C: Clock> {
    /// The alarm state machine
    controller: AlarmController<A>,
    /// Time source, also written by `SetClock`
    clock: C,
    /// Applies inbound commands
    dispatcher: Dispatcher,
    /// Holds back the rest of a minute that started a ring
    latch: RingLatch,
    /// Failed clock reads, saturating
    clock_read_failures: u32,
}

impl<A: Actuator, C: Clock> AlarmService<A, C> {
    /// Create a new `AlarmService`
    pub const fn new(controller: AlarmController<A>, clock: C) -> Self {
        Self {
            controller,
            clock,
            dispatcher: Dispatcher::new(),
            latch: RingLatch::new(),
            clock_read_failures: 0,
        }
    }

    /// Process one event.
    ///
    /// Returns the outcome for an inbound frame, `None` for a tick.
    pub fn handle(&mut self, event: Event) -> Option<Result<Command, DispatchError>> {
        match event {
            Event::Tick => {
                self.tick();
                None
            }
            Event::Inbound(inbound) => Some(self.command(inbound)),
        }
    }

    /// Sample the clock and tick the controller, unless this minute already started a ring
    pub fn tick(&mut self) {
        match self.clock.read_time() {
            Ok(now) => {
                if !self.latch.admits(now) {
                    return;
                }
                let was_ringing = self.controller.mode() == AlarmMode::Ringing;
                self.controller.tick_at(now);
                if !was_ringing && self.controller.mode() == AlarmMode::Ringing {
                    self.latch.latch(now);
                }
            }
            Err(e) => {
                self.clock_read_failures = self.clock_read_failures.saturating_add(1);
                log_warn!("Clock read failed: {:?}", e);
            }
        }
    }

    /// Apply one inbound frame.
    ///
    /// The controller is told the current time first, so a snooze is computed from
    /// the clock and not from the last tick.
    ///
    /// # Errors
    /// See [`Dispatcher::apply`].
    pub fn command(&mut self, inbound: Inbound) -> Result<Command, DispatchError> {
        if inbound.is_ok() {
            match self.clock.read_time() {
                Ok(now) => self.controller.note_time(now),
                Err(e) => log_debug!("No clock reading before command: {:?}", e),
            }
        }
        let result = self
            .dispatcher
            .apply(inbound, &mut self.controller, &mut self.clock);
        if let Ok(Command::SetClock(_) | Command::SetAlarm(_)) = result {
            // a new clock or alarm time may match the held back minute
            self.latch.reset();
        }
        result
    }

    /// The alarm state machine
    pub const fn controller(&self) -> &AlarmController<A> {
        &self.controller
    }

    /// Mutable access to the state machine
    pub const fn controller_mut(&mut self) -> &mut AlarmController<A> {
        &mut self.controller
    }

    /// The time source
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the time source
    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Dispatch counters
    #[must_use]
    pub const fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Failed clock reads so far
    #[must_use]
    pub const fn clock_read_failures(&self) -> u32 {
        self.clock_read_failures
    }
}
