//! UART serial communication abstractions
//!
//! Provides the blocking transport traits that the protocol engine writes
//! replies to and reads raw traffic from.

/// UART transmitter
///
/// Byte sink for ACK, NACK and handshake replies.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Byte source for inbound traffic. Serial reads are not aligned to
/// protocol frames: a single read may return part of a frame, several
/// frames, or line noise.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read whatever bytes arrive within the receiver's bounded wait
    ///
    /// Returns the number of bytes written into `buf`, which may be zero
    /// when the line stayed quiet.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
