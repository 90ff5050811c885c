//! uartlink - Serial Link Firmware
//!
//! Device side of the uartlink protocol for RP2040 boards. The host sends
//! framed messages over UART0; every frame is answered with ACK or NACK and
//! accepted payloads are handed to the application task.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use uartlink_hal::UartConfig;

mod channels;
mod reply;
mod tasks;
mod uart;

/// Constants generated by build.rs from link.toml
mod link_config {
    include!(concat!(env!("OUT_DIR"), "/link_config.rs"));
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("uartlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // 8N1, no flow control
    let link_uart = UartConfig::with_baudrate(link_config::UART_BAUDRATE);
    let uart_config = match uart::rp_config(&link_uart) {
        Some(config) => config,
        None => defmt::panic!("Unsupported UART framing: {:?}", link_uart),
    };

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    // UART0: TX=GPIO16, RX=GPIO17
    let uart = Uart::new_blocking(p.UART0, p.PIN_16, p.PIN_17, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized: {:?}", link_uart);

    spawner.spawn(tasks::payload_task()).unwrap();
    spawner.spawn(tasks::link_task(rx, tx)).unwrap();

    info!("All tasks spawned");
}
