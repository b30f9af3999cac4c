//! Tasks that make up the firmware and the resources they use.
pub mod ble;
pub mod indicator;
pub mod poll_loop;
pub mod rtc_clock;
pub mod watchdog;
