// Beacon Configuration
// Timing, stability and advertisement-format settings for a controller

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Bytes in one decoded broadcast frame (24 encrypted + 1 plaintext trailer)
pub const FRAME_LEN: usize = 25;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// ADVERTISEMENT FORMAT
// ============================================================================

/// Shape of the textual advertisement record delivered by the radio stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertFormat {
    /// Records shorter than this (in characters) are not protocol messages
    pub min_length: usize,
    /// Substring every protocol record must contain
    pub marker: String,
    /// Separator character preceding the payload region
    pub delimiter: char,
    /// Characters between the delimiter and the first payload digit
    pub payload_offset: usize,
    /// Maximum hex digits read from the payload region (spaces excluded)
    pub max_hex_chars: usize,
}

impl Default for AdvertFormat {
    fn default() -> Self {
        Self {
            min_length: 69,
            marker: "0770".to_string(),
            delimiter: '\\',
            payload_offset: 11,
            max_hex_chars: FRAME_LEN * 2,
        }
    }
}

impl AdvertFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = marker.to_string();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_payload_offset(mut self, offset: usize) -> Self {
        self.payload_offset = offset;
        self
    }

    /// Validate the format
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::Invalid("marker cannot be empty".to_string()));
        }
        if self.max_hex_chars % 2 != 0 || self.max_hex_chars < FRAME_LEN * 2 {
            return Err(ConfigError::Invalid(format!(
                "max_hex_chars must be even and at least {}",
                FRAME_LEN * 2
            )));
        }
        Ok(())
    }
}

// ============================================================================
// BEACON CONFIG
// ============================================================================

/// Configuration for a [`crate::BeaconController`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Advertisements from the same peer required before it is trusted
    pub stability_threshold: u32,
    /// Advertisement-loss watchdog in milliseconds
    pub advertisement_timeout_ms: u64,
    /// Connect (link + channel discovery) timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Advertisement text format
    pub advert: AdvertFormat,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 20,
            advertisement_timeout_ms: 2_000,
            connect_timeout_ms: 5_000,
            advert: AdvertFormat::default(),
        }
    }
}

impl BeaconConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stability_threshold(mut self, threshold: u32) -> Self {
        self.stability_threshold = threshold;
        self
    }

    pub fn with_advertisement_timeout_ms(mut self, ms: u64) -> Self {
        self.advertisement_timeout_ms = ms;
        self
    }

    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn with_advert_format(mut self, advert: AdvertFormat) -> Self {
        self.advert = advert;
        self
    }

    pub fn advertisement_timeout(&self) -> Duration {
        Duration::from_millis(self.advertisement_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.advertisement_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "advertisement_timeout_ms cannot be 0".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid("connect_timeout_ms cannot be 0".to_string()));
        }
        self.advert.validate()
    }
}
