//! uartlink Hardware Abstraction Layer
//!
//! This crate defines the byte source and byte sink traits the protocol
//! engine is driven through. Chip-specific code (or a host-side serial port,
//! or a test double) implements them; the engine never touches a peripheral
//! directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (uartlink-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartlink-protocol (LinkEngine)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Byte sink for protocol replies
//! - [`uart::UartRx`] - Byte source for inbound traffic

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
