//! # Alarm controller
//! The alarm state machine. Owns the alarm time and the runtime state, evaluates clock
//! ticks against the schedule and executes the remote commands.
//!
//! | State   | tick match          | snooze               | stop  | disarm          | test      |
//! |---------|---------------------|----------------------|-------|-----------------|-----------|
//! | Idle    | Ringing (if armed)  |                      |       | Idle, unarmed   | Ringing   |
//! | Ringing | (latched)           | Snoozed, reschedule  | Idle  | Idle, unarmed   |           |
//! | Snoozed | Ringing             |                      | Idle  | Idle, unarmed   | Ringing   |
//!
//! Every transition commands the actuator right away: the motor runs exactly while the
//! mode is `Ringing`, the indicator is lit while armed or ringing.
use crate::actuator::Actuator;
use crate::config::ControllerConfig;
use crate::state::{AlarmConfig, AlarmMode, AlarmRuntimeState};
use crate::time::{ClockTime, InvalidTime};
use crate::{log_debug, log_info, log_warn};

/// The alarm state machine, driving actuator `A`.
pub struct AlarmController<A: Actuator> {
    /// Motor and indicator outputs
    actuator: A,
    /// When to ring
    config: AlarmConfig,
    /// Armed flag and mode
    state: AlarmRuntimeState,
    /// Snooze offset and ring timeout
    settings: ControllerConfig,
    /// Most recent time seen through `tick` or `note_time`
    now: Option<ClockTime>,
    /// Minute the current ring started, `None` while not ringing
    ringing_since: Option<ClockTime>,
}

impl<A: Actuator> AlarmController<A> {
    /// Create a controller at 00:00, unarmed, idle, with both outputs off
    pub fn new(mut actuator: A, settings: ControllerConfig) -> Self {
        actuator.set_motor(false);
        actuator.set_indicator(false);
        Self {
            actuator,
            config: AlarmConfig::default(),
            state: AlarmRuntimeState::default(),
            settings,
            now: None,
            ringing_since: None,
        }
    }

    /// Set the alarm time. Armed flag and mode are left alone.
    ///
    /// # Errors
    /// [`InvalidTime`] if `hour > 23` or `minute > 59`; the previous time is kept.
    pub fn set_alarm(&mut self, hour: u8, minute: u8) -> Result<(), InvalidTime> {
        let time = ClockTime::new(hour, minute).inspect_err(|e| {
            log_warn!("Rejected alarm time {:?}", e);
        })?;
        self.config.set_time(time);
        log_info!("Alarm time set to {:02}:{:02}", time.hour(), time.minute());
        Ok(())
    }

    /// Enable trigger checking and light the indicator
    pub fn arm(&mut self) {
        if self.state.armed {
            log_debug!("Already armed");
        } else {
            self.state.armed = true;
            log_info!("Alarm armed for {:02}:{:02}", self.config.hour(), self.config.minute());
        }
        self.actuator.set_indicator(true);
    }

    /// Disable trigger checking, go idle and switch both outputs off
    pub fn disarm(&mut self) {
        if self.state.armed || self.state.mode != AlarmMode::Idle {
            log_info!("Alarm disarmed from {:?}", self.state.mode);
        }
        self.state = AlarmRuntimeState {
            armed: false,
            mode: AlarmMode::Idle,
        };
        self.ringing_since = None;
        self.actuator.set_motor(false);
        self.actuator.set_indicator(false);
    }

    /// Silence a ringing alarm and reschedule it `snooze_offset` minutes after the
    /// current time. Does nothing unless ringing.
    pub fn snooze(&mut self) {
        if self.state.mode != AlarmMode::Ringing {
            log_debug!("Snooze ignored in {:?}", self.state.mode);
            return;
        }
        let base = self.now.unwrap_or_else(|| self.config.time());
        let next = base.plus(self.settings.snooze_offset);
        self.config.set_time(next);
        // a test ring may have started unarmed, a snoozed alarm is always armed
        self.state.armed = true;
        self.enter(AlarmMode::Snoozed);
        log_info!("Snoozed until {:02}:{:02}", next.hour(), next.minute());
    }

    /// Silence a ringing or snoozed alarm, keeping the armed flag
    pub fn stop(&mut self) {
        match self.state.mode {
            AlarmMode::Idle => log_debug!("Stop ignored, alarm idle"),
            AlarmMode::Ringing | AlarmMode::Snoozed => {
                log_info!("Alarm stopped from {:?}", self.state.mode);
                self.enter(AlarmMode::Idle);
            }
        }
    }

    /// Ring now, regardless of armed flag and schedule
    pub fn test(&mut self) {
        if self.state.mode == AlarmMode::Ringing {
            log_debug!("Test ignored, already ringing");
            return;
        }
        log_info!("Test ring");
        self.enter(AlarmMode::Ringing);
    }

    /// Evaluate the clock reading `hour:minute` against the schedule.
    ///
    /// Must be called at least once per clock minute. Out of range readings are
    /// logged and dropped.
    pub fn tick(&mut self, hour: u8, minute: u8) {
        match ClockTime::new(hour, minute) {
            Ok(now) => self.tick_at(now),
            Err(e) => log_warn!("Ignoring tick with {:?}", e),
        }
    }

    /// [`Self::tick`] with an already validated time
    pub fn tick_at(&mut self, now: ClockTime) {
        self.now = Some(now);
        match self.state.mode {
            AlarmMode::Idle | AlarmMode::Snoozed => {
                if self.state.armed && now == self.config.time() {
                    log_info!("Alarm time {:02}:{:02} reached", now.hour(), now.minute());
                    self.enter(AlarmMode::Ringing);
                }
            }
            AlarmMode::Ringing => self.check_ring_timeout(now),
        }
    }

    /// Record the current time without evaluating the schedule
    pub const fn note_time(&mut self, now: ClockTime) {
        self.now = Some(now);
    }

    /// The configured alarm time
    #[must_use]
    pub const fn get_config(&self) -> AlarmConfig {
        self.config
    }

    /// Armed flag and mode
    #[must_use]
    pub const fn state(&self) -> AlarmRuntimeState {
        self.state
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> AlarmMode {
        self.state.mode
    }

    /// Whether trigger checking is active
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.state.armed
    }

    /// The driven actuator
    pub const fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Mutable access to the driven actuator, e.g. for a boot self test
    pub const fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// End a ring that lasted the configured timeout
    fn check_ring_timeout(&mut self, now: ClockTime) {
        let Some(timeout) = self.settings.ring_timeout else {
            return;
        };
        // a test ring has no start minute yet, it starts counting now
        let since = *self.ringing_since.get_or_insert(now);
        if now.minutes_since(since) >= u16::from(timeout.get()) {
            log_info!("Ring timed out after {} minutes", timeout.get());
            self.enter(AlarmMode::Idle);
        }
    }

    /// Switch mode and bring the outputs in line with the new state
    fn enter(&mut self, mode: AlarmMode) {
        self.state.mode = mode;
        if mode != AlarmMode::Ringing {
            self.ringing_since = None;
        } else if self.ringing_since.is_none() {
            self.ringing_since = self.now;
        }
        self.actuator.set_motor(self.state.motor_on());
        self.actuator.set_indicator(self.state.indicator_on());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SnoozeOffset;
    use core::num::NonZeroU8;

    /// Actuator mock recording the last levels and the number of motor writes
    #[derive(Debug, Default)]
    struct Outputs {
        motor: bool,
        indicator: bool,
        motor_writes: usize,
    }

    impl Actuator for Outputs {
        fn set_motor(&mut self, on: bool) {
            self.motor = on;
            self.motor_writes += 1;
        }

        fn set_indicator(&mut self, on: bool) {
            self.indicator = on;
        }
    }

    fn controller() -> AlarmController<Outputs> {
        AlarmController::new(Outputs::default(), ControllerConfig::default())
    }

    fn ringing_at(hour: u8, minute: u8) -> AlarmController<Outputs> {
        let mut c = controller();
        c.set_alarm(hour, minute).unwrap();
        c.arm();
        c.tick(hour, minute);
        assert_eq!(c.mode(), AlarmMode::Ringing);
        c
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert!(!c.is_armed());
        assert_eq!((c.get_config().hour(), c.get_config().minute()), (0, 0));
        assert!(!c.actuator().motor);
        assert!(!c.actuator().indicator);
    }

    #[test]
    fn test_set_alarm_keeps_mode_and_armed() {
        let mut c = ringing_at(6, 0);
        c.set_alarm(7, 15).unwrap();
        assert_eq!(c.mode(), AlarmMode::Ringing);
        assert!(c.is_armed());
        assert_eq!(c.get_config().time(), ClockTime::new(7, 15).unwrap());
    }

    #[test]
    fn test_set_alarm_invalid_keeps_previous() {
        let mut c = controller();
        c.set_alarm(6, 30).unwrap();
        assert_eq!(c.set_alarm(24, 0), Err(InvalidTime { hour: 24, minute: 0 }));
        assert_eq!(c.set_alarm(6, 60), Err(InvalidTime { hour: 6, minute: 60 }));
        assert_eq!((c.get_config().hour(), c.get_config().minute()), (6, 30));
    }

    #[test]
    fn test_arm_lights_indicator() {
        let mut c = controller();
        c.arm();
        c.arm();
        assert!(c.is_armed());
        assert!(c.actuator().indicator);
        assert!(!c.actuator().motor);
        assert_eq!(c.mode(), AlarmMode::Idle);
    }

    #[test]
    fn test_tick_unarmed_does_not_ring() {
        let mut c = controller();
        c.set_alarm(6, 0).unwrap();
        c.tick(6, 0);
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert!(!c.actuator().motor);
    }

    #[test]
    fn test_tick_rings_once() {
        let mut c = ringing_at(6, 0);
        assert!(c.actuator().motor);
        let writes = c.actuator().motor_writes;
        c.tick(6, 0);
        c.tick(6, 0);
        assert_eq!(c.mode(), AlarmMode::Ringing);
        assert_eq!(c.actuator().motor_writes, writes);
    }

    #[test]
    fn test_tick_other_minute_does_nothing() {
        let mut c = controller();
        c.set_alarm(6, 0).unwrap();
        c.arm();
        c.tick(5, 59);
        c.tick(6, 1);
        assert_eq!(c.mode(), AlarmMode::Idle);
    }

    #[test]
    fn test_tick_invalid_is_ignored() {
        let mut c = controller();
        c.arm();
        c.tick(0, 0);
        c.stop();
        c.tick(25, 0);
        c.tick(0, 99);
        assert_eq!(c.mode(), AlarmMode::Idle);
    }

    #[test]
    fn test_disarm_from_ringing() {
        let mut c = ringing_at(6, 0);
        c.disarm();
        assert_eq!(c.state(), AlarmRuntimeState::default());
        assert!(!c.actuator().motor);
        assert!(!c.actuator().indicator);
        c.disarm();
        assert_eq!(c.state(), AlarmRuntimeState::default());
    }

    #[test]
    fn test_snooze_reschedules() {
        let mut c = ringing_at(7, 58);
        c.snooze();
        assert_eq!(c.mode(), AlarmMode::Snoozed);
        assert!(c.is_armed());
        assert!(!c.actuator().motor);
        assert_eq!(c.get_config().time(), ClockTime::new(8, 3).unwrap());
        c.tick(8, 3);
        assert_eq!(c.mode(), AlarmMode::Ringing);
    }

    #[test]
    fn test_snooze_uses_latest_time() {
        let mut c = ringing_at(7, 0);
        c.tick(7, 4);
        c.snooze();
        assert_eq!(c.get_config().time(), ClockTime::new(7, 9).unwrap());
    }

    #[test]
    fn test_snooze_wraps_midnight() {
        let mut c = ringing_at(23, 57);
        c.snooze();
        assert_eq!((c.get_config().hour(), c.get_config().minute()), (0, 2));
    }

    #[test]
    fn test_snooze_custom_offset() {
        let settings = ControllerConfig {
            snooze_offset: SnoozeOffset::new(10).unwrap(),
            ring_timeout: None,
        };
        let mut c = AlarmController::new(Outputs::default(), settings);
        c.set_alarm(6, 55).unwrap();
        c.arm();
        c.tick(6, 55);
        c.snooze();
        assert_eq!(c.get_config().time(), ClockTime::new(7, 5).unwrap());
    }

    #[test]
    fn test_snooze_not_ringing_is_noop() {
        let mut c = controller();
        c.set_alarm(6, 0).unwrap();
        c.snooze();
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert_eq!(c.get_config().time(), ClockTime::new(6, 0).unwrap());

        let mut c = ringing_at(6, 0);
        c.snooze();
        let snoozed_until = c.get_config();
        c.snooze();
        assert_eq!(c.mode(), AlarmMode::Snoozed);
        assert_eq!(c.get_config(), snoozed_until);
    }

    #[test]
    fn test_stop_keeps_armed_and_retriggers() {
        let mut c = ringing_at(6, 0);
        c.stop();
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert!(c.is_armed());
        assert!(!c.actuator().motor);
        assert!(c.actuator().indicator);
        c.tick(6, 0);
        assert_eq!(c.mode(), AlarmMode::Ringing);
    }

    #[test]
    fn test_stop_from_snoozed_keeps_snooze_time() {
        let mut c = ringing_at(6, 0);
        c.snooze();
        c.stop();
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert!(c.is_armed());
        assert_eq!(c.get_config().time(), ClockTime::new(6, 5).unwrap());
    }

    #[test]
    fn test_stop_idle_is_noop() {
        let mut c = controller();
        let writes = c.actuator().motor_writes;
        c.stop();
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert_eq!(c.actuator().motor_writes, writes);
    }

    #[test]
    fn test_test_rings_unarmed() {
        let mut c = controller();
        c.test();
        assert_eq!(c.mode(), AlarmMode::Ringing);
        assert!(!c.is_armed());
        assert!(c.actuator().motor);
        assert!(c.actuator().indicator);
    }

    #[test]
    fn test_test_from_snoozed() {
        let mut c = ringing_at(6, 0);
        c.snooze();
        c.test();
        assert_eq!(c.mode(), AlarmMode::Ringing);
        assert!(c.actuator().motor);
    }

    #[test]
    fn test_snooze_after_test_arms() {
        let mut c = controller();
        c.note_time(ClockTime::new(12, 0).unwrap());
        c.test();
        c.snooze();
        assert_eq!(c.mode(), AlarmMode::Snoozed);
        assert!(c.is_armed());
        assert!(c.state().is_consistent());
        assert_eq!(c.get_config().time(), ClockTime::new(12, 5).unwrap());
    }

    #[test]
    fn test_ring_timeout() {
        let settings = ControllerConfig {
            snooze_offset: SnoozeOffset::DEFAULT,
            ring_timeout: NonZeroU8::new(5),
        };
        let mut c = AlarmController::new(Outputs::default(), settings);
        c.set_alarm(23, 58).unwrap();
        c.arm();
        c.tick(23, 58);
        c.tick(0, 2);
        assert_eq!(c.mode(), AlarmMode::Ringing);
        c.tick(0, 3);
        assert_eq!(c.mode(), AlarmMode::Idle);
        assert!(c.is_armed());
        assert!(!c.actuator().motor);
    }

    #[test]
    fn test_ring_timeout_counts_test_ring_from_first_tick() {
        let settings = ControllerConfig {
            snooze_offset: SnoozeOffset::DEFAULT,
            ring_timeout: NonZeroU8::new(1),
        };
        let mut c = AlarmController::new(Outputs::default(), settings);
        c.test();
        c.tick(10, 0);
        assert_eq!(c.mode(), AlarmMode::Ringing);
        c.tick(10, 1);
        assert_eq!(c.mode(), AlarmMode::Idle);
    }

    #[test]
    fn test_shortest_ring_timeout_holds_through_ring_minute() {
        let settings = ControllerConfig {
            snooze_offset: SnoozeOffset::DEFAULT,
            ring_timeout: Some(NonZeroU8::MIN),
        };
        let mut c = AlarmController::new(Outputs::default(), settings);
        c.set_alarm(6, 0).unwrap();
        c.arm();
        for _ in 0..4 {
            c.tick(6, 0);
        }
        assert_eq!(c.mode(), AlarmMode::Ringing);
        // off from new(), on from the trigger
        assert_eq!(c.actuator().motor_writes, 2);
        c.tick(6, 1);
        assert_eq!(c.mode(), AlarmMode::Idle);
    }

    #[test]
    fn test_outputs_match_state_after_every_step() {
        let mut c = controller();
        c.set_alarm(6, 0).unwrap();
        let steps: [fn(&mut AlarmController<Outputs>); 8] = [
            |c| c.arm(),
            |c| c.tick(6, 0),
            |c| c.snooze(),
            |c| c.test(),
            |c| c.stop(),
            |c| c.tick(6, 5),
            |c| c.disarm(),
            |c| c.test(),
        ];
        for step in steps {
            step(&mut c);
            assert_eq!(c.actuator().motor, c.mode() == AlarmMode::Ringing);
            assert_eq!(c.actuator().indicator, c.state().indicator_on());
            assert!(c.state().is_consistent());
        }
    }
}
