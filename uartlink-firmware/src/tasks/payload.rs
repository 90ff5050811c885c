//! Application consumer for accepted frames

use defmt::*;

use crate::channels::PAYLOAD_CHANNEL;

/// Payload task - hands accepted frames to the application
#[embassy_executor::task]
pub async fn payload_task() {
    info!("Payload task started");

    loop {
        let frame = PAYLOAD_CHANNEL.receive().await;
        info!(
            "Valid packet ({} bytes): {=[u8]:a}",
            frame.payload.len(),
            &frame.payload[..]
        );
    }
}
