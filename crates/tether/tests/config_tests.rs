//! Tests for TOML configuration.

use std::time::Duration;

use tether::Error;
use tether::anchor::{AnchorPosition, FlipPolicy};
use tether::config::InteractionConfig;
use tether::roving::Orientation;

#[test]
fn test_full_document() {
    let config = InteractionConfig::from_toml_str(
        r#"
        [hover]
        start_delay_ms = 100
        end_delay_ms = 250

        [press]
        enter = false

        [roving]
        orientation = "both"
        wrap = true
        home_end = false
        rtl = true

        [anchor]
        position = "bottom-end"
        inline = true
        shift = true
        flip = ["top-end", "left"]
        offset = 8.0
        "#,
    )
    .unwrap();

    assert_eq!(config.hover.start_delay, Duration::from_millis(100));
    assert_eq!(config.hover.end_delay, Duration::from_millis(250));
    assert!(!config.press.enter);
    assert_eq!(config.roving.orientation, Orientation::Both);
    assert!(config.roving.wrap && config.roving.rtl && !config.roving.home_end);
    assert_eq!(config.anchor.position, AnchorPosition::BottomEnd);
    assert!(config.anchor.inline && config.anchor.shift);
    assert_eq!(
        config.anchor.flip,
        FlipPolicy::Fallbacks(vec![AnchorPosition::TopEnd, AnchorPosition::Left])
    );
    assert_eq!(config.anchor.offset, 8.0);
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(InteractionConfig::from_toml_str("").unwrap(), InteractionConfig::default());
}

#[test]
fn test_survives_a_round_trip() {
    let config = InteractionConfig::from_toml_str("[anchor]\nflip = true\n[roving]\nwrap = true\n").unwrap();
    let text = config.to_toml_string().unwrap();
    assert_eq!(InteractionConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_bad_values_are_config_errors() {
    let err = InteractionConfig::from_toml_str("[anchor]\nposition = \"sideways\"\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
