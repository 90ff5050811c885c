//! Single-byte control symbols exchanged outside of frames

/// Handshake request, sent by the peer
pub const HANDSHAKE_REQ: u8 = 0xB1;
/// Handshake response, sent by the engine
pub const HANDSHAKE_RESP: u8 = 0x55;
/// Frame accepted
pub const ACK: u8 = 0x06;
/// Frame rejected
pub const NACK: u8 = 0x15;

/// Control bytes of the link protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlByte {
    /// Peer asks whether the link is ready
    HandshakeRequest,
    /// Link is ready
    HandshakeResponse,
    /// Last frame was accepted
    Ack,
    /// Last frame was rejected
    Nack,
}

impl ControlByte {
    /// Parse a control symbol from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            HANDSHAKE_REQ => Some(ControlByte::HandshakeRequest),
            HANDSHAKE_RESP => Some(ControlByte::HandshakeResponse),
            ACK => Some(ControlByte::Ack),
            NACK => Some(ControlByte::Nack),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            ControlByte::HandshakeRequest => HANDSHAKE_REQ,
            ControlByte::HandshakeResponse => HANDSHAKE_RESP,
            ControlByte::Ack => ACK,
            ControlByte::Nack => NACK,
        }
    }
}
