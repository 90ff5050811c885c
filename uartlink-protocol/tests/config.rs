//! Loading `LinkConfig` from TOML
#![cfg(feature = "serde")]

use uartlink_protocol::{ConfigError, LinkConfig, LinkEngine};

#[test]
fn test_full_table() {
    let config: LinkConfig = toml::from_str(
        r#"
        max_frame_len = 64
        inactivity_timeout_ms = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.max_frame_len, 64);
    assert_eq!(config.inactivity_timeout_ms, Some(250));
    assert!(LinkEngine::new(config).is_ok());
}

#[test]
fn test_missing_fields_use_defaults() {
    let config: LinkConfig = toml::from_str("").unwrap();
    assert_eq!(config, LinkConfig::default());
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<LinkConfig, _> = toml::from_str("baud = 9600");
    assert!(result.is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let config: LinkConfig = toml::from_str("max_frame_len = 2").unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::FrameLimitTooSmall { max_frame_len: 2 })
    );
}
