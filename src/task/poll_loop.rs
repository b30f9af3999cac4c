//! # Poll loop task
//! Owns the alarm service and feeds it one event per cycle: a clock tick when the ticker
//! fires, otherwise the next frame from the command channel. Nothing else touches the
//! controller, the RTC or the motor pins.
use crate::task::indicator::signal_indicator;
use crate::task::rtc_clock::RtcClock;
use crate::task::watchdog::{TaskId, report_task_success};
use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker, Timer};
use pico_haptic_alarm::drivers::hbridge::HBridgeMotor;
use pico_haptic_alarm::{Actuator, AlarmService, Event, event};

/// Indicator blink of the boot self test
const SELF_TEST_BLINK: Duration = Duration::from_secs(1);
/// Motor run of the boot self test
const SELF_TEST_BUZZ: Duration = Duration::from_secs(2);

/// The vibration motor on GPIO 13/12 and the CYW43 LED
pub struct BoardActuator {
    /// H-bridge motor, IN1 = GPIO 13, IN2 = GPIO 12
    motor: HBridgeMotor<Output<'static>, Output<'static>>,
}

impl BoardActuator {
    /// Create a new `BoardActuator`
    pub const fn new(motor: HBridgeMotor<Output<'static>, Output<'static>>) -> Self {
        Self { motor }
    }
}

impl Actuator for BoardActuator {
    fn set_motor(&mut self, on: bool) {
        self.motor.set_running(on);
    }

    fn set_indicator(&mut self, on: bool) {
        signal_indicator(on);
    }
}

/// Service type driven by the poll loop
pub type BoardService = AlarmService<BoardActuator, RtcClock>;

/// Blink the indicator, then run the motor, then leave both off
async fn self_test(actuator: &mut BoardActuator) {
    info!("Self test: indicator");
    actuator.set_indicator(true);
    Timer::after(SELF_TEST_BLINK).await;
    actuator.set_indicator(false);

    info!("Self test: motor");
    actuator.set_motor(true);
    Timer::after(SELF_TEST_BUZZ).await;
    actuator.set_motor(false);
}

#[embassy_executor::task]
pub async fn poll_loop(mut service: BoardService, tick_interval: Duration, run_self_test: bool) {
    info!("Poll loop started, ticking every {}s", tick_interval.as_secs());

    if run_self_test {
        self_test(service.controller_mut().actuator_mut()).await;
    }

    // evaluate the current minute right away, the ticker fires only after one interval
    service.handle(Event::Tick);
    let mut ticker = Ticker::every(tick_interval);

    loop {
        let event = match select(ticker.next(), event::receive_inbound()).await {
            Either::First(()) => Event::Tick,
            Either::Second(inbound) => Event::Inbound(inbound),
        };

        if let Some(Ok(command)) = service.handle(event) {
            let state = service.controller().state();
            info!("Applied {:?}, now {:?}", command, state);
        }

        report_task_success(TaskId::PollLoop).await;
    }
}
