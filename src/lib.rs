//! # Pico haptic alarm
//! Core of the Pico W vibration alarm: the alarm state machine, the remote command
//! dispatcher and the pieces that connect them to a clock, a motor and a command queue.
//!
//! Everything in here is target independent and tested on the host. The firmware
//! binary (`src/main.rs`, feature `rp2040`) only wires these types to the RP2040 RTC,
//! the motor pins, the CYW43 LED and the BLE stack.
#![cfg_attr(not(test), no_std)]

pub mod logging;

pub mod actuator;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod drivers;
pub mod event;
pub mod service;
pub mod state;
pub mod time;

pub use actuator::Actuator;
pub use clock::{Clock, ClockError, RingLatch};
pub use command::{Command, Frame, MalformedCommand, MAX_FRAME_LEN};
pub use config::{ControllerConfig, Settings};
pub use controller::AlarmController;
pub use dispatch::{DispatchError, DispatchStats, Dispatcher};
pub use event::{Event, Inbound, QueueFull};
pub use service::AlarmService;
pub use state::{AlarmConfig, AlarmMode, AlarmRuntimeState};
pub use time::{ClockTime, InvalidSnoozeOffset, InvalidTime, SnoozeOffset};
