//! Protocol engine
//!
//! Routes inbound bytes to the handshake negotiator or the frame parser and
//! answers every terminated frame attempt with exactly one ACK or NACK.
//!
//! The engine is synchronous and never blocks. Whoever owns it supplies
//! bytes in whatever chunks the transport produced, and optionally reports
//! elapsed time so stalled partial frames can be evicted.

use uartlink_hal::{UartRx, UartTx};

use crate::config::{ConfigError, LinkConfig};
use crate::control::{ACK, HANDSHAKE_RESP, NACK};
use crate::frame::{Frame, FrameError, FrameParser, ParseState};
use crate::handshake::Handshake;
use crate::stats::LinkStats;

/// Something the engine decided about the inbound stream
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A handshake request was answered
    HandshakeAnswered,
    /// A frame passed framing and CRC checks
    Accepted(Frame),
    /// A frame attempt was rejected
    Rejected(FrameError),
    /// A stalled partial frame was discarded by the inactivity timeout
    Evicted { buffered: usize },
}

impl LinkEvent {
    /// Byte to send back to the peer for this event
    pub fn reply(&self) -> Option<u8> {
        match self {
            LinkEvent::HandshakeAnswered => Some(HANDSHAKE_RESP),
            LinkEvent::Accepted(_) => Some(ACK),
            LinkEvent::Rejected(_) => Some(NACK),
            LinkEvent::Evicted { .. } => None,
        }
    }

    /// Payload of an accepted frame
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            LinkEvent::Accepted(frame) => Some(&frame.payload),
            _ => None,
        }
    }
}

/// Error from [`LinkEngine::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError<R, T> {
    /// Reading from the byte source failed
    Rx(R),
    /// Writing a reply to the byte sink failed
    Tx(T),
}

/// Protocol engine for one serial link
///
/// Each instance owns its parser state, so one engine per port can run side
/// by side without interference.
#[derive(Debug, Clone)]
pub struct LinkEngine {
    parser: FrameParser,
    handshake: Handshake,
    config: LinkConfig,
    stats: LinkStats,
    idle_ms: u32,
}

impl Default for LinkEngine {
    fn default() -> Self {
        Self::with_valid_config(LinkConfig::default())
    }
}

impl LinkEngine {
    /// Create an engine after validating `config`
    pub fn new(config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: LinkConfig) -> Self {
        Self {
            parser: FrameParser::with_max_frame_len(config.max_frame_len),
            handshake: Handshake::new(),
            config,
            stats: LinkStats::new(),
            idle_ms: 0,
        }
    }

    /// Feed one inbound byte
    ///
    /// Returns an event when the byte answered a handshake or terminated a
    /// frame attempt.
    pub fn feed(&mut self, byte: u8) -> Option<LinkEvent> {
        self.idle_ms = 0;

        let was_idle = self.parser.is_idle();
        if self.handshake.offer(byte, was_idle) {
            self.stats.handshakes = self.stats.handshakes.saturating_add(1);
            return Some(LinkEvent::HandshakeAnswered);
        }

        match self.parser.feed(byte) {
            Ok(Some(frame)) => {
                self.stats.frames_accepted = self.stats.frames_accepted.saturating_add(1);
                Some(LinkEvent::Accepted(frame))
            }
            Ok(None) => {
                if was_idle && self.parser.is_idle() {
                    self.stats.noise_bytes = self.stats.noise_bytes.saturating_add(1);
                }
                None
            }
            Err(e) => {
                self.stats.record_rejection(&e);
                Some(LinkEvent::Rejected(e))
            }
        }
    }

    /// Process a chunk of inbound bytes
    ///
    /// Hands each event to `on_event`, so accepted payloads reach the
    /// application, then writes its reply to `tx` in the order the
    /// terminating bytes arrived. The whole chunk is always consumed: a
    /// failed write does not stop parsing or later replies, and the first
    /// sink error is returned once the chunk is done. The sink is flushed
    /// once if anything was written. Returns the number of reply bytes
    /// written.
    pub fn process<T, F>(
        &mut self,
        bytes: &[u8],
        tx: &mut T,
        mut on_event: F,
    ) -> Result<usize, T::Error>
    where
        T: UartTx,
        F: FnMut(&LinkEvent),
    {
        let mut written = 0;
        let mut first_error = None;
        for &byte in bytes {
            let Some(event) = self.feed(byte) else {
                continue;
            };
            on_event(&event);
            if let Some(reply) = event.reply() {
                match tx.write_blocking(&[reply]) {
                    Ok(()) => written += 1,
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        if written > 0 {
            if let Err(e) = tx.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    /// Read once from `rx` into `buf` and process what arrived
    ///
    /// Returns the number of bytes read, zero when the line was quiet.
    pub fn poll<R, T, F>(
        &mut self,
        rx: &mut R,
        tx: &mut T,
        buf: &mut [u8],
        on_event: F,
    ) -> Result<usize, PollError<R::Error, T::Error>>
    where
        R: UartRx,
        T: UartTx,
        F: FnMut(&LinkEvent),
    {
        let n = rx.read_available(buf).map_err(PollError::Rx)?.min(buf.len());
        self.process(&buf[..n], tx, on_event).map_err(PollError::Tx)?;
        Ok(n)
    }

    /// Report time elapsed without new bytes
    ///
    /// With an inactivity timeout configured, a partial frame that has seen
    /// no bytes for that long is discarded and [`LinkEvent::Evicted`] is
    /// returned. Nothing is sent to the peer for an eviction.
    pub fn update_time(&mut self, delta_ms: u32) -> Option<LinkEvent> {
        self.idle_ms = self.idle_ms.saturating_add(delta_ms);

        let timeout = self.config.inactivity_timeout_ms?;
        if self.parser.is_idle() || self.idle_ms < timeout {
            return None;
        }

        let buffered = self.parser.buffered();
        self.parser.reset();
        self.idle_ms = 0;
        self.stats.evictions = self.stats.evictions.saturating_add(1);
        Some(LinkEvent::Evicted { buffered })
    }

    /// Drop any partial frame
    ///
    /// Handshake state and counters are kept.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.idle_ms = 0;
    }

    /// True once a handshake request has been answered
    pub fn is_negotiated(&self) -> bool {
        self.handshake.is_negotiated()
    }

    /// Current frame parser mode
    pub fn parser_state(&self) -> ParseState {
        self.parser.state()
    }

    /// Bytes of the in-flight frame collected so far
    pub fn buffered(&self) -> usize {
        self.parser.buffered()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::HANDSHAKE_REQ;
    use heapless::Vec;

    const HELLO_FRAME: [u8; 9] = [0xAA, 0x09, b'H', b'e', b'l', b'l', b'o', 0xF6, 0xBB];

    #[derive(Default)]
    struct ReplySink {
        bytes: Vec<u8, 64>,
        flushes: usize,
    }

    impl UartTx for ReplySink {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.bytes.extend_from_slice(data)
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_full_sink_does_not_stop_chunk() {
        let mut engine = LinkEngine::default();
        let mut sink: Vec<u8, 1> = Vec::new();
        let mut events = 0;

        struct OneByte<'a>(&'a mut Vec<u8, 1>);
        impl UartTx for OneByte<'_> {
            type Error = ();
            fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
                self.0.extend_from_slice(data)
            }
            fn flush(&mut self) -> Result<(), ()> {
                Ok(())
            }
        }

        let mut chunk = [0u8; 10];
        chunk[0] = HANDSHAKE_REQ;
        chunk[1..].copy_from_slice(&HELLO_FRAME);
        let result = engine.process(&chunk, &mut OneByte(&mut sink), |_| events += 1);

        assert_eq!(result, Err(()));
        assert_eq!(events, 2);
        assert_eq!(&sink[..], &[HANDSHAKE_RESP]);
        assert_eq!(engine.stats().frames_accepted, 1);
        assert!(engine.is_negotiated());
    }

    #[test]
    fn test_accept_emits_ack() {
        let mut engine = LinkEngine::default();
        let mut sink = ReplySink::default();
        let mut payloads = 0;

        let written = engine
            .process(&HELLO_FRAME, &mut sink, |event| {
                assert_eq!(event.payload(), Some(&b"Hello"[..]));
                payloads += 1;
            })
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(&sink.bytes[..], &[ACK]);
        assert_eq!(sink.flushes, 1);
        assert_eq!(payloads, 1);
        assert_eq!(engine.stats().frames_accepted, 1);
    }

    #[test]
    fn test_reject_emits_nack() {
        let mut engine = LinkEngine::default();
        let mut sink = ReplySink::default();
        let mut frame = HELLO_FRAME;
        frame[7] ^= 0x80;

        let mut events: Vec<LinkEvent, 4> = Vec::new();
        engine
            .process(&frame, &mut sink, |event| {
                let _ = events.push(event.clone());
            })
            .unwrap();

        assert_eq!(&sink.bytes[..], &[NACK]);
        assert!(matches!(
            events[..],
            [LinkEvent::Rejected(FrameError::CrcMismatch { .. })]
        ));
        assert_eq!(engine.stats().crc_mismatch, 1);
    }

    #[test]
    fn test_quiet_chunk_does_not_flush() {
        let mut engine = LinkEngine::default();
        let mut sink = ReplySink::default();
        assert_eq!(engine.process(&HELLO_FRAME[..5], &mut sink, |_| {}), Ok(0));
        assert_eq!(sink.flushes, 0);
    }

    #[test]
    fn test_handshake_reply() {
        let mut engine = LinkEngine::default();
        assert_eq!(engine.feed(HANDSHAKE_REQ), Some(LinkEvent::HandshakeAnswered));
        assert!(engine.is_negotiated());
        assert_eq!(engine.parser_state(), ParseState::WaitingForHeader);
    }

    #[test]
    fn test_handshake_byte_inside_frame() {
        let frame = Frame::new(&[HANDSHAKE_REQ]).unwrap().encode_to_vec().unwrap();
        let mut engine = LinkEngine::default();
        let mut sink = ReplySink::default();

        engine.process(&frame, &mut sink, |_| {}).unwrap();
        assert_eq!(&sink.bytes[..], &[ACK]);
        assert!(!engine.is_negotiated());
    }

    #[test]
    fn test_noise_counted() {
        let mut engine = LinkEngine::default();
        for byte in [0x00, 0x01, 0x02] {
            assert_eq!(engine.feed(byte), None);
        }
        assert_eq!(engine.stats().noise_bytes, 3);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LinkConfig {
            max_frame_len: 2,
            ..LinkConfig::default()
        };
        assert_eq!(
            LinkEngine::new(config).err(),
            Some(ConfigError::FrameLimitTooSmall { max_frame_len: 2 })
        );
    }

    #[test]
    fn test_configured_limit_applies() {
        let mut engine = LinkEngine::new(LinkConfig {
            max_frame_len: 8,
            ..LinkConfig::default()
        })
        .unwrap();
        let mut sink = ReplySink::default();
        engine.process(&HELLO_FRAME, &mut sink, |_| {}).unwrap();
        // LEN rejected at byte 1; the rest of the frame is noise
        assert_eq!(&sink.bytes[..], &[NACK]);
        assert_eq!(engine.stats().length_out_of_range, 1);
    }

    #[test]
    fn test_eviction_after_timeout() {
        let mut engine = LinkEngine::new(LinkConfig {
            inactivity_timeout_ms: Some(500),
            ..LinkConfig::default()
        })
        .unwrap();

        for &byte in &HELLO_FRAME[..4] {
            engine.feed(byte);
        }
        assert_eq!(engine.update_time(300), None);
        assert_eq!(engine.update_time(200), Some(LinkEvent::Evicted { buffered: 4 }));
        assert_eq!(engine.parser_state(), ParseState::WaitingForHeader);
        assert_eq!(engine.stats().evictions, 1);

        // Fresh frame parses normally after eviction
        let mut sink = ReplySink::default();
        engine.process(&HELLO_FRAME, &mut sink, |_| {}).unwrap();
        assert_eq!(&sink.bytes[..], &[ACK]);
    }

    #[test]
    fn test_bytes_restart_idle_timer() {
        let mut engine = LinkEngine::new(LinkConfig {
            inactivity_timeout_ms: Some(500),
            ..LinkConfig::default()
        })
        .unwrap();

        engine.feed(HELLO_FRAME[0]);
        assert_eq!(engine.update_time(400), None);
        engine.feed(HELLO_FRAME[1]);
        assert_eq!(engine.update_time(400), None);
        assert_eq!(engine.buffered(), 2);
    }

    #[test]
    fn test_idle_parser_never_evicts() {
        let mut engine = LinkEngine::new(LinkConfig {
            inactivity_timeout_ms: Some(10),
            ..LinkConfig::default()
        })
        .unwrap();
        assert_eq!(engine.update_time(1000), None);
        assert_eq!(engine.stats().evictions, 0);
    }

    #[test]
    fn test_no_timeout_keeps_partial_frame() {
        let mut engine = LinkEngine::default();
        engine.feed(HELLO_FRAME[0]);
        engine.feed(HELLO_FRAME[1]);
        assert_eq!(engine.update_time(u32::MAX), None);
        assert_eq!(engine.buffered(), 2);
    }

    #[test]
    fn test_reset_keeps_handshake() {
        let mut engine = LinkEngine::default();
        engine.feed(HANDSHAKE_REQ);
        engine.feed(HELLO_FRAME[0]);
        engine.reset();
        assert!(engine.is_negotiated());
        assert_eq!(engine.buffered(), 0);
    }

    #[test]
    fn test_event_replies() {
        assert_eq!(LinkEvent::HandshakeAnswered.reply(), Some(HANDSHAKE_RESP));
        assert_eq!(LinkEvent::Accepted(Frame::empty()).reply(), Some(ACK));
        assert_eq!(
            LinkEvent::Rejected(FrameError::BadFraming { end: 0 }).reply(),
            Some(NACK)
        );
        assert_eq!(LinkEvent::Evicted { buffered: 3 }.reply(), None);
    }
}
