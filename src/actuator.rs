//! # Actuator boundary
//! The outputs the alarm drives: the vibration motor and the indicator light.
//!
//! Implementations must accept redundant calls, the controller may command the same
//! level twice (`disarm` always switches both off).

/// Motor and indicator outputs.
pub trait Actuator {
    /// Run or stop the vibration motor
    fn set_motor(&mut self, on: bool);

    /// Light or clear the indicator
    fn set_indicator(&mut self, on: bool);
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn set_motor(&mut self, on: bool) {
        (**self).set_motor(on);
    }

    fn set_indicator(&mut self, on: bool) {
        (**self).set_indicator(on);
    }
}
