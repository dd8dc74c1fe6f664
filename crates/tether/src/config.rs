//! Interaction configuration, loadable from TOML.
//!
//! ```
//! use std::time::Duration;
//! use tether::config::InteractionConfig;
//!
//! let config = InteractionConfig::from_toml_str(r#"
//!     [hover]
//!     start_delay_ms = 500
//!
//!     [roving]
//!     orientation = "horizontal"
//!     wrap = true
//!
//!     [anchor]
//!     position = "top"
//!     flip = true
//! "#).unwrap();
//!
//! assert_eq!(config.hover.start_delay, Duration::from_millis(500));
//! assert!(config.roving.wrap);
//! ```

use serde::{Deserialize, Serialize};
use tether_core::logging::targets;

use crate::anchor::AnchorOptions;
use crate::controller::{HoverConfig, PressConfig};
use crate::error::Result;
use crate::roving::RovingConfig;

/// Configuration for every interaction component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover: HoverConfig,
    pub press: PressConfig,
    pub roving: RovingConfig,
    pub anchor: AnchorOptions,
}

impl InteractionConfig {
    /// Parse a TOML document. Missing tables and keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(s)?;
        tracing::debug!(target: targets::CONFIG, ?config, "configuration loaded");
        Ok(config)
    }

    /// Serialize to pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_hover(mut self, hover: HoverConfig) -> Self {
        self.hover = hover;
        self
    }

    pub fn with_press(mut self, press: PressConfig) -> Self {
        self.press = press;
        self
    }

    pub fn with_roving(mut self, roving: RovingConfig) -> Self {
        self.roving = roving;
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorOptions) -> Self {
        self.anchor = anchor;
        self
    }
}

/// `Duration` as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
