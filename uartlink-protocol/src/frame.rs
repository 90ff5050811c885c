//! Frame encoding and decoding for the serial link.
//!
//! Frame format:
//! - HEADER (1 byte): 0xAA synchronization byte
//! - LEN (1 byte): total frame length in bytes, framing included (4-255)
//! - PAYLOAD (0-251 bytes): application data
//! - CRC (1 byte): CRC-8 of PAYLOAD
//! - END (1 byte): 0xBB terminator

use core::fmt;
use core::slice;

use heapless::Vec;

use crate::crc::crc8;

/// Frame synchronization byte
pub const FRAME_HEADER: u8 = 0xAA;

/// Frame terminator byte
pub const FRAME_END: u8 = 0xBB;

/// Framing bytes around the payload (HEADER + LEN + CRC + END)
pub const FRAME_OVERHEAD: usize = 4;

/// Smallest valid frame: no payload
pub const MIN_FRAME_SIZE: usize = FRAME_OVERHEAD;

/// Largest frame the 8-bit LEN field can describe
pub const MAX_FRAME_SIZE: usize = u8::MAX as usize;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Last byte of the declared span was not END
    BadFraming { end: u8 },
    /// Declared LEN below the minimum frame or above the configured limit
    LengthOutOfRange { declared: u8 },
    /// CRC byte does not match the payload
    CrcMismatch { expected: u8, received: u8 },
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl FrameError {
    /// Returns true for errors raised against received bytes
    ///
    /// These are the ones answered with a NACK; the rest come from
    /// building a frame locally.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FrameError::BadFraming { .. }
                | FrameError::LengthOutOfRange { .. }
                | FrameError::CrcMismatch { .. }
        )
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BadFraming { end } => {
                write!(f, "bad framing: expected end 0x{:02X}, got 0x{:02X}", FRAME_END, end)
            }
            FrameError::LengthOutOfRange { declared } => {
                write!(f, "declared length {} out of range", declared)
            }
            FrameError::CrcMismatch { expected, received } => write!(
                f,
                "crc mismatch: got 0x{:02X}, expected 0x{:02X}",
                received, expected
            ),
            FrameError::PayloadTooLarge => f.write_str("payload too large"),
            FrameError::BufferTooSmall => f.write_str("buffer too small"),
        }
    }
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame carrying `payload`
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty() -> Self {
        Self {
            payload: Vec::new(),
        }
    }

    /// Total bytes this frame occupies on the wire (the LEN field)
    pub fn wire_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// CRC byte sent with this frame
    pub fn crc(&self) -> u8 {
        crc8(&self.payload)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let payload_end = 2 + self.payload.len();
        buffer[0] = FRAME_HEADER;
        buffer[1] = frame_len as u8;
        buffer[2..payload_end].copy_from_slice(&self.payload);
        buffer[payload_end] = self.crc();
        buffer[payload_end + 1] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Check a complete frame span (HEADER through END)
    fn validate(span: &[u8]) -> Result<Self, FrameError> {
        match span {
            [_, _, payload @ .., received, end] => {
                if *end != FRAME_END {
                    return Err(FrameError::BadFraming { end: *end });
                }
                let expected = crc8(payload);
                if *received != expected {
                    return Err(FrameError::CrcMismatch {
                        expected,
                        received: *received,
                    });
                }
                Frame::new(payload)
            }
            _ => Err(FrameError::LengthOutOfRange {
                declared: span.len() as u8,
            }),
        }
    }
}

/// State machine for parsing incoming frames
///
/// Bytes are fed one at a time; every completed or rejected frame attempt
/// puts the parser back in [`ParseState::WaitingForHeader`].
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    expected_length: u8,
    max_frame_len: u8,
}

/// Parser mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Discarding bytes until HEADER
    WaitingForHeader,
    /// Got HEADER, next byte is LEN
    WaitingForLength,
    /// Collecting payload, CRC and END until LEN bytes are buffered
    ReadingBody,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser accepting frames up to [`MAX_FRAME_SIZE`]
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_SIZE as u8)
    }

    /// Create a parser that rejects any declared LEN above `max_frame_len`
    pub fn with_max_frame_len(max_frame_len: u8) -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            buffer: Vec::new(),
            expected_length: 0,
            max_frame_len,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.buffer.clear();
        self.expected_length = 0;
    }

    /// Current parser mode
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// True when no frame attempt is in progress
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForHeader
    }

    /// Bytes of the in-flight frame collected so far
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the frame
    /// attempt was rejected.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader => {
                if byte == FRAME_HEADER {
                    self.buffer.clear();
                    let _ = self.buffer.push(byte);
                    self.state = ParseState::WaitingForLength;
                }
                // Silently ignore non-HEADER bytes while waiting
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if (byte as usize) < MIN_FRAME_SIZE || byte > self.max_frame_len {
                    // The byte is consumed as the bad LEN, never re-read as HEADER
                    self.reset();
                    return Err(FrameError::LengthOutOfRange { declared: byte });
                }
                self.expected_length = byte;
                let _ = self.buffer.push(byte);
                self.state = ParseState::ReadingBody;
                Ok(None)
            }
            ParseState::ReadingBody => {
                // Cannot fail: expected_length never exceeds MAX_FRAME_SIZE
                let _ = self.buffer.push(byte);
                if self.buffer.len() < self.expected_length as usize {
                    return Ok(None);
                }

                let result = Frame::validate(&self.buffer);
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed a chunk of bytes to the parser
    ///
    /// Yields one outcome per frame attempt that terminates inside the
    /// chunk, in order. Bytes after the last terminated attempt are still
    /// consumed and stay buffered for the next call.
    pub fn feed_bytes<'a>(&'a mut self, bytes: &'a [u8]) -> Outcomes<'a> {
        Outcomes {
            parser: self,
            bytes: bytes.iter(),
        }
    }
}

/// Iterator over the frame outcomes of one input chunk
pub struct Outcomes<'a> {
    parser: &'a mut FrameParser,
    bytes: slice::Iter<'a, u8>,
}

impl Iterator for Outcomes<'_> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            match self.parser.feed(byte) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
