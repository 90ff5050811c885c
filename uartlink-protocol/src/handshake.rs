//! Handshake negotiation
//!
//! The peer may send a lone [`HANDSHAKE_REQ`] between frames to check the
//! link is alive. The engine answers it with
//! [`HANDSHAKE_RESP`](crate::control::HANDSHAKE_RESP). Frames are
//! accepted whether or not a handshake ever happened.

use crate::control::HANDSHAKE_REQ;

/// Handshake state owned by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handshake {
    negotiated: bool,
}

impl Handshake {
    pub const fn new() -> Self {
        Self { negotiated: false }
    }

    /// Offer a byte to the negotiator
    ///
    /// `parser_idle` must be true only when no frame attempt is in
    /// progress; inside a frame 0xB1 is ordinary data. Returns true when
    /// the byte was consumed as a request.
    pub fn offer(&mut self, byte: u8, parser_idle: bool) -> bool {
        if !parser_idle || byte != HANDSHAKE_REQ {
            return false;
        }
        self.negotiated = true;
        true
    }

    /// True once any handshake request has been answered
    pub fn is_negotiated(&self) -> bool {
        self.negotiated
    }
}
