//! Plugin configuration
//!
//! All knobs are optional; a missing file or missing key falls back to the
//! defaults the plugin shipped with.

use serde::{Deserialize, Serialize};

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Texture sampler settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Linear min/mag filtering; nearest when false.
    pub linear_filtering: bool,
    /// Enable anisotropic filtering.
    pub anisotropy_enable: bool,
    /// Maximum anisotropy, used when enabled.
    pub max_anisotropy: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            linear_filtering: true,
            anisotropy_enable: true,
            max_anisotropy: 16.0,
        }
    }
}

/// Top-level plugin configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PluginConfig {
    /// Descriptor sets the pool can hand out before binding fails.
    pub descriptor_pool_max_sets: u32,
    /// Override color clear values with a debug green on intercepted render
    /// pass begins.
    pub override_clear_color: bool,
    /// Texture sampler settings.
    pub sampler: SamplerConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            descriptor_pool_max_sets: 5,
            override_clear_color: false,
            sampler: SamplerConfig::default(),
        }
    }
}

impl PluginConfig {
    /// Parse a TOML document; unknown keys are ignored, missing keys default.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
