//! Link engine configuration
//!
//! The firmware loads these values from `link.toml` at build time; host
//! tools may build them directly or deserialize them with the `serde`
//! feature.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::frame::{MAX_FRAME_SIZE, MIN_FRAME_SIZE};

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LinkConfig {
    /// Largest LEN accepted; frames declaring more are rejected
    pub max_frame_len: u8,
    /// Discard a partial frame after this long without new bytes (ms)
    ///
    /// `None` keeps a partial frame buffered until it completes.
    pub inactivity_timeout_ms: Option<u32>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_SIZE as u8,
            inactivity_timeout_ms: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `max_frame_len` cannot hold an empty frame
    FrameLimitTooSmall { max_frame_len: u8 },
    /// A zero timeout would evict every partial frame immediately
    ZeroTimeout,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::FrameLimitTooSmall { max_frame_len } => write!(
                f,
                "max_frame_len {} is below the minimum frame size {}",
                max_frame_len, MIN_FRAME_SIZE
            ),
            ConfigError::ZeroTimeout => f.write_str("inactivity_timeout_ms must be non-zero"),
        }
    }
}

impl LinkConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.max_frame_len as usize) < MIN_FRAME_SIZE {
            return Err(ConfigError::FrameLimitTooSmall {
                max_frame_len: self.max_frame_len,
            });
        }
        if self.inactivity_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
