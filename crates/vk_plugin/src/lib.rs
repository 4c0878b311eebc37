//! # vk_plugin
//!
//! A Vulkan rendering plugin that lives inside a host engine's frame loop.
//!
//! The host owns the instance, device, swapchain, and command submission;
//! the plugin borrows entry points through the host's loader, records work
//! into host command buffers, and manages only its own resources: a sampled
//! texture, a render-pass-keyed draw pipeline, transient vertex buffers, and
//! staging buffers for streaming host resources.
//!
//! ## Lifetime safety
//!
//! The GPU may still be reading a buffer several frames after the plugin is
//! done with it. Retired resources go through [`reclaim::ReclamationQueue`],
//! keyed by the frame that last used them, and are destroyed only once the
//! host reports that frame complete.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ash::vk;
//! use vk_plugin::{ApiLoader, HostContext, PluginConfig, RenderPlugin, ResolverFn};
//! # struct NullHost;
//! # impl HostContext for NullHost {
//! #     fn recording_state(&self) -> Option<vk_plugin::RecordingState> { None }
//! #     fn ensure_outside_render_pass(&self) {}
//! #     fn access_texture(&self, _: vk_plugin::TextureHandle, _: vk::ImageLayout,
//! #         _: vk::PipelineStageFlags, _: vk::AccessFlags) -> Option<vk_plugin::HostImage> { None }
//! #     fn access_buffer(&self, _: vk_plugin::BufferHandle, _: vk::PipelineStageFlags,
//! #         _: vk::AccessFlags, _: vk_plugin::ResourceAccess) -> Option<vk_plugin::HostBuffer> { None }
//! # }
//! # fn host_instance() -> vk_plugin::HostVulkanInstance { unimplemented!() }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let instance = host_instance();
//! let mut loader = ApiLoader::new(ResolverFn::new(instance.get_instance_proc_addr));
//! let api = loader.instance_created(&instance)?;
//!
//! let pixels = vec![0u8; 64 * 64 * 4];
//! let plugin = RenderPlugin::initialize(
//!     api,
//!     NullHost,
//!     &PluginConfig::default(),
//!     &pixels,
//!     64,
//!     64,
//! )?;
//! # drop(plugin);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]

pub mod api;
pub mod buffer;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod image;
pub mod intercept;
pub mod loader;
pub mod memory;
pub mod pipeline;
pub mod pixels;
pub mod plugin;
pub mod reclaim;
pub mod shaders;
pub mod transfer;
pub mod vertex;

pub use api::DeviceApi;
pub use config::{PluginConfig, SamplerConfig};
pub use error::{PluginError, PluginResult};
pub use host::{
    BufferHandle, HostBuffer, HostContext, HostImage, HostVulkanInstance, RecordingState,
    ResourceAccess, TextureHandle,
};
pub use loader::{ApiLoader, EntryResolver, ResolverFn, VulkanApi};
pub use pixels::PixelData;
pub use plugin::RenderPlugin;
pub use vertex::Vertex;
