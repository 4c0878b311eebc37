//! Plugin error types
//!
//! Failures fall into three classes with different handling rules:
//! setup failures are fatal for the resource being built and propagate to the
//! caller; per-frame conditions (no recording context, transient buffer
//! creation failure) are handled locally by skipping the frame and never
//! surface through these types; contract violations (an unsupported layout
//! transition) are fatal for that call and are not retried.

use ash::vk;
use thiserror::Error;

/// Vulkan plugin error types
#[derive(Error, Debug)]
pub enum PluginError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// No suitable memory type found for an allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,

    /// A zero-byte buffer was requested
    #[error("Buffer creation requires a non-zero size")]
    ZeroSizeBuffer,

    /// A layout transition outside the fixed legal set was requested
    #[error("Unsupported image layout transition: {old:?} -> {new:?}")]
    UnsupportedLayoutTransition {
        /// Layout the image is currently in
        old: vk::ImageLayout,
        /// Layout that was requested
        new: vk::ImageLayout,
    },

    /// Decoding texture pixel data failed
    #[error("Texture load failed: {0}")]
    TextureLoad(String),

    /// One-time initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

impl From<vk::Result> for PluginError {
    fn from(result: vk::Result) -> Self {
        PluginError::Api(result)
    }
}

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;
