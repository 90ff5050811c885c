//! CRC-8 checksum over frame payloads
//!
//! Polynomial 0x07, initial value 0x00, MSB first, no reflection and no
//! final XOR (the CRC-8/SMBUS parameter set).

/// CRC-8 generator polynomial
pub const CRC8_POLY: u8 = 0x07;

/// Compute the CRC-8 of `data`
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = Crc8::new();
    crc.update(data);
    crc.finish()
}

/// Incremental CRC-8 accumulator
///
/// Feeding the input in any number of pieces yields the same value as
/// [`crc8`] over the concatenation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc8 {
    register: u8,
}

impl Crc8 {
    pub const fn new() -> Self {
        Self { register: 0 }
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.register ^= byte;
            for _ in 0..8 {
                if self.register & 0x80 != 0 {
                    self.register = (self.register << 1) ^ CRC8_POLY;
                } else {
                    self.register <<= 1;
                }
            }
        }
    }

    pub const fn finish(&self) -> u8 {
        self.register
    }
}
