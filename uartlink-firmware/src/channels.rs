//! Inter-task communication channels
//!
//! Accepted frames travel from the link task to the application task here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use uartlink_protocol::Frame;

/// Channel capacity for accepted frames
const PAYLOAD_CHANNEL_SIZE: usize = 4;

/// Frames accepted by the link engine, awaiting the application
pub static PAYLOAD_CHANNEL: Channel<CriticalSectionRawMutex, Frame, PAYLOAD_CHANNEL_SIZE> =
    Channel::new();
