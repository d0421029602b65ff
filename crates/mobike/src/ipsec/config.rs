//! MOBIKE Configuration
//!
//! Per-connection MOBIKE settings with a builder in the style of the
//! client/server configuration builders.

use super::{Error, Result};

/// MOBIKE settings of a connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MobikeConfig {
    /// Offer and accept MOBIKE on this connection
    pub enabled: bool,

    /// Re-run NAT detection on every address update
    pub nat_detection: bool,
}

impl Default for MobikeConfig {
    fn default() -> Self {
        MobikeConfig {
            enabled: true,
            nat_detection: false,
        }
    }
}

impl MobikeConfig {
    /// Create builder for MOBIKE configuration
    pub fn builder() -> MobikeConfigBuilder {
        MobikeConfigBuilder::new()
    }

    /// Configuration with MOBIKE switched off
    pub fn disabled() -> Self {
        MobikeConfig {
            enabled: false,
            nat_detection: false,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.nat_detection && !self.enabled {
            return Err(Error::InvalidParameter(
                "nat_detection requires MOBIKE to be enabled".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for MobikeConfig
#[derive(Default)]
pub struct MobikeConfigBuilder {
    enabled: Option<bool>,
    nat_detection: Option<bool>,
}

impl MobikeConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable MOBIKE
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Enable or disable NAT detection on address updates
    pub fn with_nat_detection(mut self, nat_detection: bool) -> Self {
        self.nat_detection = Some(nat_detection);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<MobikeConfig> {
        let defaults = MobikeConfig::default();
        let config = MobikeConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            nat_detection: self.nat_detection.unwrap_or(defaults.nat_detection),
        };
        config.validate()?;
        Ok(config)
    }
}
