//! Texture pixel loading
//!
//! Decodes image files into the RGBA8 layout the upload path expects.

use std::path::Path;

use crate::error::{PluginError, PluginResult};

/// Decoded RGBA8 pixel data ready for GPU upload.
#[derive(Debug, Clone)]
pub struct PixelData {
    /// Raw RGBA bytes, `width * height * 4` of them
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelData {
    /// Decode an image file, converting whatever format it is in to RGBA8.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PluginResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| PluginError::TextureLoad(format!("{}: {e}", path.display())))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded {width}x{height} texture from {}", path.display());
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Decode an image already in memory.
    pub fn from_bytes(bytes: &[u8]) -> PluginResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PluginError::TextureLoad(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// A solid-color image, the fallback when no texture file is configured.
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self {
            data,
            width,
            height,
        }
    }
}
