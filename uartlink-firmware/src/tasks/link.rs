//! Link UART task
//!
//! Reads raw bytes from the host, runs them through the protocol engine and
//! writes ACK/NACK/handshake replies back.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Duration, Instant};
use embedded_io_async::{Read, Write};

use uartlink_protocol::{FrameError, LinkConfig, LinkEngine, LinkEvent};

use crate::channels::PAYLOAD_CHANNEL;
use crate::link_config::{INACTIVITY_TIMEOUT_MS, MAX_FRAME_LEN};
use crate::reply::ReplyBuffer;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Bounded wait for inbound bytes before checking for stalled frames
const READ_WAIT: Duration = Duration::from_millis(100);

/// How often link counters are logged
const STATS_INTERVAL: Duration = Duration::from_secs(30);

/// Link task - owns the engine for the host link
#[embassy_executor::task]
pub async fn link_task(mut rx: BufferedUartRx, mut tx: BufferedUartTx) {
    info!("Link task started");

    let config = LinkConfig {
        max_frame_len: MAX_FRAME_LEN,
        inactivity_timeout_ms: INACTIVITY_TIMEOUT_MS,
    };
    let mut engine = match LinkEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            // build.rs validates link.toml, so this only trips on a stale build
            error!("Invalid link config: {:?}", e);
            return;
        }
    };

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut replies = ReplyBuffer::<RX_BUF_SIZE>::new();
    let mut last_tick = Instant::now();
    let mut last_report = Instant::now();

    loop {
        match with_timeout(READ_WAIT, rx.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => {
                trace!("RX: {} bytes", n);

                if let Err(e) = engine.process(&buf[..n], &mut replies, handle_event) {
                    warn!("Reply buffer overflow: {:?}", e);
                }
                if !replies.is_empty() {
                    if let Err(e) = tx.write_all(replies.as_slice()).await {
                        warn!("Failed to send replies: {:?}", e);
                    }
                    replies.clear();
                }
                last_tick = Instant::now();
            }
            Ok(Ok(_)) => {
                // No bytes read, continue
            }
            Ok(Err(e)) => {
                warn!("UART read error: {:?}", e);
            }
            Err(_) => {
                let now = Instant::now();
                let idle_ms = (now - last_tick).as_millis() as u32;
                last_tick = now;
                if let Some(event) = engine.update_time(idle_ms) {
                    handle_event(&event);
                }
            }
        }

        if last_report.elapsed() >= STATS_INTERVAL {
            let stats = engine.stats();
            debug!(
                "Link stats: {:?} ({} rejected)",
                stats,
                stats.frames_rejected()
            );
            last_report = Instant::now();
        }
    }
}

/// Log an engine event and forward accepted frames
fn handle_event(event: &LinkEvent) {
    match event {
        LinkEvent::HandshakeAnswered => {
            info!("Handshake successful");
        }
        LinkEvent::Accepted(frame) => {
            debug!("Frame accepted: {} byte payload", frame.payload.len());
            // Send to payload channel, dropping if full
            if PAYLOAD_CHANNEL.try_send(frame.clone()).is_err() {
                warn!("Payload channel full, dropping frame");
            }
        }
        LinkEvent::Rejected(FrameError::LengthOutOfRange { declared }) => {
            warn!("Length mismatch! Declared={}", declared);
        }
        LinkEvent::Rejected(FrameError::CrcMismatch { expected, received }) => {
            warn!(
                "CRC mismatch! Got=0x{=u8:02X} Expected=0x{=u8:02X}",
                *received, *expected
            );
        }
        LinkEvent::Rejected(e) => {
            warn!("Frame rejected: {:?}", e);
        }
        LinkEvent::Evicted { buffered } => {
            warn!("Stalled frame dropped after {} bytes", buffered);
        }
    }
}
