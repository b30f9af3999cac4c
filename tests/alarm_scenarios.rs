//! End to end alarm scenarios through the public API: frames in, actuator levels out.
use pico_haptic_alarm::command::MalformedCommand;
use pico_haptic_alarm::{
    Actuator, AlarmController, AlarmMode, AlarmService, Clock, ClockError, ClockTime, Command, ControllerConfig,
    DispatchError, Dispatcher, Event, InvalidTime,
};

/// Actuator recording every write
#[derive(Debug, Default)]
struct Recorder {
    motor: bool,
    indicator: bool,
    motor_log: Vec<bool>,
}

impl Actuator for Recorder {
    fn set_motor(&mut self, on: bool) {
        self.motor = on;
        self.motor_log.push(on);
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator = on;
    }
}

/// Clock that stays where the test puts it
#[derive(Debug, Default)]
struct ManualClock {
    now: Option<ClockTime>,
}

impl ManualClock {
    fn at(hour: u8, minute: u8) -> Self {
        Self {
            now: Some(ClockTime::new(hour, minute).unwrap()),
        }
    }
}

impl Clock for ManualClock {
    fn read_time(&mut self) -> Result<ClockTime, ClockError> {
        self.now.ok_or(ClockError::NotRunning)
    }

    fn set_time(&mut self, time: ClockTime) -> Result<(), ClockError> {
        self.now = Some(time);
        Ok(())
    }
}

fn controller() -> AlarmController<Recorder> {
    AlarmController::new(Recorder::default(), ControllerConfig::default())
}

fn hm(controller: &AlarmController<Recorder>) -> (u8, u8) {
    let config = controller.get_config();
    (config.hour(), config.minute())
}

#[test]
fn set_alarm_then_get_config_returns_the_pair() {
    let mut c = controller();
    for hour in 0..24 {
        for minute in 0..60 {
            c.set_alarm(hour, minute).unwrap();
            assert_eq!(hm(&c), (hour, minute));
        }
    }
}

#[test]
fn invalid_set_alarm_keeps_previous_config() {
    let mut c = controller();
    c.set_alarm(6, 45).unwrap();
    for (hour, minute) in [(24, 0), (0, 60), (99, 99), (255, 0), (23, 255)] {
        assert_eq!(c.set_alarm(hour, minute), Err(InvalidTime { hour, minute }));
        assert_eq!(hm(&c), (6, 45));
    }
}

#[test]
fn armed_alarm_rings_exactly_once_per_matching_minute() {
    let mut c = controller();
    c.set_alarm(6, 30).unwrap();
    c.arm();
    c.tick(6, 30);
    c.tick(6, 30);
    c.tick(6, 30);
    assert_eq!(c.mode(), AlarmMode::Ringing);
    // one off from new(), one on from the trigger
    assert_eq!(c.actuator().motor_log, vec![false, true]);
}

#[test]
fn disarm_from_any_state_is_idempotent() {
    let setups: [fn(&mut AlarmController<Recorder>); 4] = [
        |_| {},
        |c| c.arm(),
        |c| c.test(),
        |c| {
            c.arm();
            c.test();
            c.snooze();
        },
    ];
    for setup in setups {
        let mut c = controller();
        setup(&mut c);
        for _ in 0..2 {
            c.disarm();
            assert_eq!(c.mode(), AlarmMode::Idle);
            assert!(!c.is_armed());
            assert!(!c.actuator().motor);
            assert!(!c.actuator().indicator);
        }
    }
}

#[test]
fn snooze_round_trip() {
    let mut c = controller();
    c.set_alarm(7, 58).unwrap();
    c.arm();
    c.tick(7, 58);
    c.snooze();
    assert_eq!(hm(&c), (8, 3));
    assert_eq!(c.mode(), AlarmMode::Snoozed);
    assert!(!c.actuator().motor);

    c.tick(8, 2);
    assert_eq!(c.mode(), AlarmMode::Snoozed);
    c.tick(8, 3);
    assert_eq!(c.mode(), AlarmMode::Ringing);
    assert!(c.actuator().motor);
}

#[test]
fn snooze_rolls_over_midnight() {
    let mut c = controller();
    c.set_alarm(23, 57).unwrap();
    c.arm();
    c.tick(23, 57);
    c.snooze();
    assert_eq!(hm(&c), (0, 2));
    c.tick(0, 2);
    assert_eq!(c.mode(), AlarmMode::Ringing);
}

#[test]
fn stop_keeps_armed_unlike_disarm() {
    let mut c = controller();
    c.set_alarm(6, 0).unwrap();
    c.arm();
    c.tick(6, 0);
    c.stop();
    assert_eq!(c.mode(), AlarmMode::Idle);
    assert!(c.is_armed());
    c.tick(6, 0);
    assert_eq!(c.mode(), AlarmMode::Ringing);

    c.disarm();
    c.tick(6, 0);
    assert_eq!(c.mode(), AlarmMode::Idle);
}

#[test]
fn short_set_alarm_frame_is_rejected_without_side_effects() {
    let mut c = controller();
    c.set_alarm(6, 0).unwrap();
    c.arm();
    let before = (c.get_config(), c.state());
    let mut dispatcher = Dispatcher::new();
    let mut clock = ManualClock::default();

    let result = dispatcher.dispatch(&[0x01, 5], &mut c, &mut clock);
    assert_eq!(
        result,
        Err(DispatchError::Malformed(MalformedCommand::LengthMismatch {
            opcode: 0x01,
            expected: 3,
            actual: 2,
        }))
    );
    assert_eq!((c.get_config(), c.state()), before);
    assert_eq!(dispatcher.stats().rejected, 1);
}

#[test]
fn test_command_rings_while_unarmed() {
    let mut c = controller();
    c.test();
    assert_eq!(c.mode(), AlarmMode::Ringing);
    assert!(!c.is_armed());
    assert!(c.actuator().motor);
}

#[test]
fn morning_through_the_service() {
    let mut service = AlarmService::new(controller(), ManualClock::at(6, 58));
    let frames: [&[u8]; 2] = [&[0x01, 7, 0], &[0x02]];
    for frame in frames {
        let inbound = pico_haptic_alarm::event::decode_frame(frame);
        assert!(service.handle(Event::Inbound(inbound)).is_some_and(|r| r.is_ok()));
    }

    service.handle(Event::Tick);
    assert_eq!(service.controller().mode(), AlarmMode::Idle);

    service.clock_mut().now = ClockTime::new(7, 0).ok();
    service.handle(Event::Tick);
    assert_eq!(service.controller().mode(), AlarmMode::Ringing);

    // snooze two minutes into the ring
    service.clock_mut().now = ClockTime::new(7, 2).ok();
    let outcome = service.handle(Event::Inbound(Ok(Command::Snooze)));
    assert_eq!(outcome, Some(Ok(Command::Snooze)));
    assert_eq!(hm(service.controller()), (7, 7));

    service.clock_mut().now = ClockTime::new(7, 7).ok();
    service.handle(Event::Tick);
    assert_eq!(service.controller().mode(), AlarmMode::Ringing);

    service.handle(Event::Inbound(Ok(Command::Disarm)));
    assert!(!service.controller().actuator().motor);
    assert!(!service.controller().actuator().indicator);
    assert_eq!(service.stats().applied, 4);
}

#[test]
fn set_clock_frame_moves_the_clock() {
    let mut service = AlarmService::new(controller(), ManualClock::default());
    let inbound = pico_haptic_alarm::event::decode_frame(&[0x07, 5, 59]);
    assert!(service.handle(Event::Inbound(inbound)).is_some_and(|r| r.is_ok()));
    assert_eq!(service.clock().now, ClockTime::new(5, 59).ok());
}

#[test]
fn arming_during_the_alarm_minute_still_rings() {
    let mut service = AlarmService::new(controller(), ManualClock::at(6, 30));
    service.handle(Event::Tick);
    service.handle(Event::Inbound(Ok(Command::SetAlarm(ClockTime::new(6, 30).unwrap()))));
    service.handle(Event::Inbound(Ok(Command::Arm)));
    for _ in 0..4 {
        service.handle(Event::Tick);
    }
    assert_eq!(service.controller().mode(), AlarmMode::Ringing);
    assert_eq!(service.controller().actuator().motor_log, vec![false, true]);
}
