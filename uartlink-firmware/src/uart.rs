//! Mapping from link UART settings to the RP2040 peripheral config

use embassy_rp::uart::{Config, DataBits as RpDataBits, Parity as RpParity, StopBits as RpStopBits};
use uartlink_hal::{DataBits, Parity, StopBits, UartConfig};

/// Build the RP2040 UART config
///
/// Returns `None` for framings the PL011 cannot produce (nine data bits).
pub fn rp_config(config: &UartConfig) -> Option<Config> {
    let data_bits = match config.data_bits {
        DataBits::Seven => RpDataBits::DataBits7,
        DataBits::Eight => RpDataBits::DataBits8,
        DataBits::Nine => return None,
    };
    let parity = match config.parity {
        Parity::None => RpParity::ParityNone,
        Parity::Even => RpParity::ParityEven,
        Parity::Odd => RpParity::ParityOdd,
    };
    let stop_bits = match config.stop_bits {
        StopBits::One => RpStopBits::STOP1,
        StopBits::Two => RpStopBits::STOP2,
    };

    let mut rp = Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = data_bits;
    rp.parity = parity;
    rp.stop_bits = stop_bits;
    Some(rp)
}
