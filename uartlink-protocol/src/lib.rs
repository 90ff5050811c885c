//! Serial Link Protocol Engine
//!
//! This crate implements the device side of a point-to-point UART link: a
//! host sends length-delimited, CRC-protected frames and the device answers
//! each one with ACK or NACK. A one-byte handshake lets the host confirm the
//! device is listening before it starts sending.
//!
//! # Protocol Overview
//!
//! Frames use a simple binary format:
//! ```text
//! ┌────────┬─────┬─────────────┬─────┬─────┐
//! │ HEADER │ LEN │ PAYLOAD     │ CRC │ END │
//! │ 0xAA   │ 1B  │ 0–251B      │ 1B  │ 0xBB│
//! └────────┴─────┴─────────────┴─────┴─────┘
//! ```
//!
//! `LEN` counts the whole frame, framing included. `CRC` is CRC-8
//! (polynomial 0x07) over the payload only.
//!
//! Control bytes outside frames:
//!
//! | Byte | Direction | Meaning |
//! |------|-----------|---------|
//! | 0xB1 | host → device | handshake request |
//! | 0x55 | device → host | handshake response |
//! | 0x06 | device → host | frame accepted |
//! | 0x15 | device → host | frame rejected |
//!
//! Reads from a serial port are not aligned to frames, so [`LinkEngine`]
//! is a streaming parser: feed it chunks of any size and it resynchronizes
//! on the header byte by itself.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod crc;
pub mod engine;
pub mod frame;
pub mod handshake;
pub mod stats;

pub use config::{ConfigError, LinkConfig};
pub use control::{ControlByte, ACK, HANDSHAKE_REQ, HANDSHAKE_RESP, NACK};
pub use crc::{crc8, Crc8};
pub use engine::{LinkEngine, LinkEvent, PollError};
pub use frame::{
    Frame, FrameError, FrameParser, ParseState, FRAME_END, FRAME_HEADER, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE,
};
pub use handshake::Handshake;
pub use stats::LinkStats;
