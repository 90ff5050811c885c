//! Build script for uartlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml and compiles it into `link_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use uartlink_protocol::LinkConfig;

/// Baud rates the RP2040 UART divider hits within 1%
const SUPPORTED_BAUDRATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinkToml {
    #[serde(default)]
    uart: UartSection,
    #[serde(default)]
    link: LinkConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UartSection {
    baudrate: u32,
}

impl Default for UartSection {
    fn default() -> Self {
        Self { baudrate: 115200 }
    }
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    let config = validate_config();
    write_config(&out_dir, &config);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml configuration at compile time
fn validate_config() -> LinkToml {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: link.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a link.toml configuration file.           ║\n\
            ║  Please create one in the uartlink-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read link.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: LinkToml = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid link.toml                                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    if !SUPPORTED_BAUDRATES.contains(&config.uart.baudrate) {
        errors.push(format!(
            "[uart] baudrate {} is not a supported rate",
            config.uart.baudrate
        ));
    }
    if let Err(e) = config.link.validate() {
        errors.push(format!("[link] {}", e));
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid link configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit the validated values as constants for `include!`
fn write_config(out_dir: &Path, config: &LinkToml) {
    let timeout = match config.link.inactivity_timeout_ms {
        Some(ms) => format!("Some({})", ms),
        None => "None".to_string(),
    };

    let generated = format!(
        "/// UART baud rate from link.toml\n\
         pub const UART_BAUDRATE: u32 = {};\n\
         /// Largest accepted frame from link.toml\n\
         pub const MAX_FRAME_LEN: u8 = {};\n\
         /// Partial frame inactivity timeout from link.toml\n\
         pub const INACTIVITY_TIMEOUT_MS: Option<u32> = {};\n",
        config.uart.baudrate, config.link.max_frame_len, timeout
    );

    let mut f = File::create(out_dir.join("link_config.rs")).unwrap();
    f.write_all(generated.as_bytes()).unwrap();
}
