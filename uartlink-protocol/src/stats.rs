//! Link diagnostics counters
//!
//! The wire protocol only tells the peer ACK or NACK; these counters keep
//! the local distinction between rejection kinds.

use crate::frame::FrameError;

/// Saturating per-engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub frames_accepted: u32,
    pub bad_framing: u32,
    pub length_out_of_range: u32,
    pub crc_mismatch: u32,
    pub handshakes: u32,
    /// Bytes discarded while hunting for a frame header
    pub noise_bytes: u32,
    /// Partial frames dropped by the inactivity timeout
    pub evictions: u32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            frames_accepted: 0,
            bad_framing: 0,
            length_out_of_range: 0,
            crc_mismatch: 0,
            handshakes: 0,
            noise_bytes: 0,
            evictions: 0,
        }
    }

    /// Count a rejected frame attempt
    pub fn record_rejection(&mut self, error: &FrameError) {
        let counter = match error {
            FrameError::BadFraming { .. } => &mut self.bad_framing,
            FrameError::LengthOutOfRange { .. } => &mut self.length_out_of_range,
            FrameError::CrcMismatch { .. } => &mut self.crc_mismatch,
            // Encode-side errors never come off the wire
            FrameError::PayloadTooLarge | FrameError::BufferTooSmall => return,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total frame attempts answered with NACK
    pub fn frames_rejected(&self) -> u32 {
        self.bad_framing
            .saturating_add(self.length_out_of_range)
            .saturating_add(self.crc_mismatch)
    }
}
