//! Reply staging between the synchronous engine and the async UART

use heapless::Vec;
use uartlink_hal::UartTx;

/// Replies did not fit the staging buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReplyOverflow;

/// Collects reply bytes while the engine processes one read
///
/// The engine emits at most one reply per input byte, so a buffer as large
/// as the read buffer never overflows.
pub struct ReplyBuffer<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> ReplyBuffer<N> {
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl<const N: usize> UartTx for ReplyBuffer<N> {
    type Error = ReplyOverflow;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bytes.extend_from_slice(data).map_err(|_| ReplyOverflow)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Drained by the link task with an async write
        Ok(())
    }
}
