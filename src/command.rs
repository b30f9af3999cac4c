//! # Remote commands
//! Decoding of the byte frames written by the phone app.
//!
//! Byte 0 is the opcode, the rest is the payload. Every opcode has exactly one valid
//! frame length:
//!
//! | Opcode | Command  | Length | Payload          |
//! |--------|----------|--------|------------------|
//! | 0x01   | SetAlarm | 3      | hour, minute     |
//! | 0x02   | Arm      | 1      |                  |
//! | 0x03   | Disarm   | 1      |                  |
//! | 0x04   | Snooze   | 1      |                  |
//! | 0x05   | Stop     | 1      |                  |
//! | 0x06   | Test     | 1      |                  |
//! | 0x07   | SetClock | 3      | hour, minute     |
use crate::time::ClockTime;
use core::fmt;

/// Largest frame accepted, one default ATT write
pub const MAX_FRAME_LEN: usize = 20;

/// Raw command bytes as delivered by the command channel
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Opcode of [`Command::SetAlarm`]
pub const OP_SET_ALARM: u8 = 0x01;
/// Opcode of [`Command::Arm`]
pub const OP_ARM: u8 = 0x02;
/// Opcode of [`Command::Disarm`]
pub const OP_DISARM: u8 = 0x03;
/// Opcode of [`Command::Snooze`]
pub const OP_SNOOZE: u8 = 0x04;
/// Opcode of [`Command::Stop`]
pub const OP_STOP: u8 = 0x05;
/// Opcode of [`Command::Test`]
pub const OP_TEST: u8 = 0x06;
/// Opcode of [`Command::SetClock`]
pub const OP_SET_CLOCK: u8 = 0x07;

/// A decoded remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the alarm time
    SetAlarm(ClockTime),
    /// Enable trigger checking
    Arm,
    /// Disable trigger checking and silence everything
    Disarm,
    /// Push a ringing alarm back by the snooze offset
    Snooze,
    /// Silence a ringing or snoozed alarm, stay armed
    Stop,
    /// Ring now
    Test,
    /// Set the wall clock
    SetClock(ClockTime),
}

impl Command {
    /// The opcode byte of this command
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::SetAlarm(_) => OP_SET_ALARM,
            Self::Arm => OP_ARM,
            Self::Disarm => OP_DISARM,
            Self::Snooze => OP_SNOOZE,
            Self::Stop => OP_STOP,
            Self::Test => OP_TEST,
            Self::SetClock(_) => OP_SET_CLOCK,
        }
    }
}

/// Why a frame was not turned into a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MalformedCommand {
    /// The frame had no bytes
    Empty,
    /// Byte 0 is not a known opcode
    UnknownOpcode(u8),
    /// The frame length does not match the opcode
    LengthMismatch {
        /// Opcode of the frame
        opcode: u8,
        /// Length the opcode requires
        expected: usize,
        /// Length received
        actual: usize,
    },
    /// Hour or minute payload out of range
    PayloadOutOfRange {
        /// Opcode of the frame
        opcode: u8,
        /// Received hour byte
        hour: u8,
        /// Received minute byte
        minute: u8,
    },
    /// Longer than [`MAX_FRAME_LEN`], rejected before decoding
    Oversized(usize),
}

impl fmt::Display for MalformedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op:#04x}"),
            Self::LengthMismatch {
                opcode,
                expected,
                actual,
            } => write!(f, "opcode {opcode:#04x} needs {expected} bytes, got {actual}"),
            Self::PayloadOutOfRange {
                opcode,
                hour,
                minute,
            } => write!(f, "opcode {opcode:#04x} payload {hour}:{minute} out of range"),
            Self::Oversized(len) => write!(f, "frame of {len} bytes exceeds {MAX_FRAME_LEN}"),
        }
    }
}

/// Required frame length for a known opcode
const fn frame_len(opcode: u8) -> Option<usize> {
    match opcode {
        OP_SET_ALARM | OP_SET_CLOCK => Some(3),
        OP_ARM | OP_DISARM | OP_SNOOZE | OP_STOP | OP_TEST => Some(1),
        _ => None,
    }
}

/// Decode one frame.
///
/// # Errors
/// [`MalformedCommand`] for an empty frame, an unknown opcode, a length that does not
/// match the opcode or an hour/minute payload out of range.
pub fn decode(frame: &[u8]) -> Result<Command, MalformedCommand> {
    let (&opcode, payload) = frame.split_first().ok_or(MalformedCommand::Empty)?;
    let expected = frame_len(opcode).ok_or(MalformedCommand::UnknownOpcode(opcode))?;
    if frame.len() != expected {
        return Err(MalformedCommand::LengthMismatch {
            opcode,
            expected,
            actual: frame.len(),
        });
    }

    let command = match (opcode, payload) {
        (OP_SET_ALARM | OP_SET_CLOCK, &[hour, minute]) => {
            let time = ClockTime::new(hour, minute).map_err(|_| MalformedCommand::PayloadOutOfRange {
                opcode,
                hour,
                minute,
            })?;
            if opcode == OP_SET_ALARM {
                Command::SetAlarm(time)
            } else {
                Command::SetClock(time)
            }
        }
        (OP_ARM, _) => Command::Arm,
        (OP_DISARM, _) => Command::Disarm,
        (OP_SNOOZE, _) => Command::Snooze,
        (OP_STOP, _) => Command::Stop,
        (OP_TEST, _) => Command::Test,
        // length was checked against the opcode table above
        _ => return Err(MalformedCommand::UnknownOpcode(opcode)),
    };
    Ok(command)
}

/// Build a frame from an opcode and a payload written without one.
///
/// # Errors
/// [`MalformedCommand::Oversized`] if opcode and payload exceed [`MAX_FRAME_LEN`].
pub fn frame_with_opcode(opcode: u8, payload: &[u8]) -> Result<Frame, MalformedCommand> {
    let oversized = MalformedCommand::Oversized(payload.len() + 1);
    let mut frame = Frame::new();
    frame.push(opcode).map_err(|_| oversized)?;
    frame.extend_from_slice(payload).map_err(|_| oversized)?;
    Ok(frame)
}
