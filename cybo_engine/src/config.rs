//! Engine configuration.
//!
//! Parsed from TOML handed across the boundary as bytes. The engine never
//! reads configuration from disk or the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload of the well-known string when no configuration overrides it.
pub const DEFAULT_WELL_KNOWN_TEXT: &str = "hello";

/// Largest texture edge accepted by default.
pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_texture_dimension must be at least 1")]
    ZeroTextureLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Payload stored under the well-known string id.
    pub well_known_text: String,
    /// Strings registered at creation, in order, after the well-known one.
    pub seed_strings: Vec<String>,
    pub max_texture_dimension: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            well_known_text: DEFAULT_WELL_KNOWN_TEXT.to_string(),
            seed_strings: Vec::new(),
            max_texture_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML given as raw bytes.
    pub fn from_toml_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let content = std::str::from_utf8(bytes)?;
        Self::from_toml_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_texture_dimension == 0 {
            return Err(ConfigError::ZeroTextureLimit);
        }
        Ok(())
    }
}
