//! H-bridge vibration motor driver
//!
//! The motor sits between the two outputs of a DRV8837 style bridge, driven by two plain
//! GPIOs (IN1, IN2). The alarm only needs on and off, so there is no PWM here.
//!
//! ## Truth table
//!
//! | IN1 | IN2 | Motor state                                |
//! |-----|-----|--------------------------------------------|
//! | 1   | 0   | Running                                    |
//! | 0   | 0   | Coast (High-Z, motor spins down freely)    |
//! | 1   | 1   | Brake (short brake, motor stops at once)   |

use embedded_hal::digital::OutputPin;

/// How the motor is stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopMode {
    /// Both inputs low
    Coast,
    /// Both inputs high
    #[default]
    Brake,
}

impl StopMode {
    /// Stop mode from the `MOTOR_BRAKE_ON_STOP` build setting
    #[must_use]
    pub const fn from_brake_flag(brake: bool) -> Self {
        if brake { Self::Brake } else { Self::Coast }
    }
}

/// Two-pin H-bridge motor
///
/// # Type Parameters
///
/// * `IN1` - output pin for bridge input 1
/// * `IN2` - output pin for bridge input 2
pub struct HBridgeMotor<IN1, IN2>
where
    IN1: OutputPin,
    IN2: OutputPin,
{
    /// Bridge input 1
    in1: IN1,
    /// Bridge input 2
    in2: IN2,
    /// Level pair used for off
    stop_mode: StopMode,
    /// Last commanded state
    running: bool,
}

impl<IN1, IN2> HBridgeMotor<IN1, IN2>
where
    IN1: OutputPin,
    IN2: OutputPin,
{
    /// Create the driver and put the bridge into the stopped state
    pub fn new(in1: IN1, in2: IN2, stop_mode: StopMode) -> Self {
        let mut motor = Self {
            in1,
            in2,
            stop_mode,
            running: false,
        };
        motor.stop();
        motor
    }

    /// Run (`true`) or stop (`false`) the motor.
    ///
    /// Pin errors are logged and otherwise ignored, a half applied level pair is
    /// corrected by the next call.
    pub fn set_running(&mut self, on: bool) {
        if on {
            self.run();
        } else {
            self.stop();
        }
    }

    /// Whether the motor was last commanded to run
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// IN1 high, IN2 low
    fn run(&mut self) {
        // IN2 first, so the bridge never passes through brake on the way up
        let in2 = self.in2.set_low().is_ok();
        let in1 = self.in1.set_high().is_ok();
        if !(in1 && in2) {
            crate::log_error!("Motor: failed to drive bridge to run");
        }
        self.running = true;
    }

    /// Both inputs to the stop mode's level
    fn stop(&mut self) {
        let ok = match self.stop_mode {
            StopMode::Coast => self.in1.set_low().is_ok() & self.in2.set_low().is_ok(),
            StopMode::Brake => self.in1.set_high().is_ok() & self.in2.set_high().is_ok(),
        };
        if !ok {
            crate::log_error!("Motor: failed to drive bridge to {:?}", self.stop_mode);
        }
        self.running = false;
    }

    /// Give the pins back
    pub fn release(self) -> (IN1, IN2) {
        (self.in1, self.in2)
    }
}
