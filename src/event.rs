//! Inbound command queue and the events the poll loop feeds into the service
//!
//! The BLE task decodes every written frame and queues the outcome, good or bad. The
//! poll loop is the single consumer and applies one entry per cycle.

use crate::command::{self, Command, MalformedCommand, MAX_FRAME_LEN};
use crate::log_warn;
use core::fmt;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// A frame after decoding: the command, or why it was rejected
pub type Inbound = Result<Command, MalformedCommand>;

/// The capacity of the command channel
pub const COMMAND_CHANNEL_CAPACITY: usize = 4;

/// Command channel between the BLE task and the poll loop
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Inbound, COMMAND_CHANNEL_CAPACITY> =
    Channel::new();

/// The command queue was full, the frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command queue full")
    }
}

/// Decode raw bytes for the queue. Frames over [`MAX_FRAME_LEN`] are rejected unread.
#[must_use]
pub fn decode_frame(bytes: &[u8]) -> Inbound {
    if bytes.len() > MAX_FRAME_LEN {
        return Err(MalformedCommand::Oversized(bytes.len()));
    }
    command::decode(bytes)
}

/// Decode `bytes` and queue the outcome without waiting.
///
/// # Errors
/// [`QueueFull`] if the poll loop has not drained the queue; the frame is lost.
pub fn submit_frame(bytes: &[u8]) -> Result<(), QueueFull> {
    submit(decode_frame(bytes))
}

/// Queue an already decoded frame without waiting.
///
/// # Errors
/// [`QueueFull`] if the poll loop has not drained the queue; the frame is lost.
pub fn submit(inbound: Inbound) -> Result<(), QueueFull> {
    COMMAND_CHANNEL.try_send(inbound).map_err(|_| {
        log_warn!("Command queue full, dropping frame");
        QueueFull
    })
}

/// Waits for the next queued frame
pub async fn receive_inbound() -> Inbound {
    COMMAND_CHANNEL.receive().await
}

/// The next queued frame, if any
pub fn try_receive_inbound() -> Option<Inbound> {
    COMMAND_CHANNEL.try_receive().ok()
}

/// One unit of work for the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The tick interval elapsed, sample the clock
    Tick,
    /// A frame arrived from the command channel
    Inbound(Inbound),
}
