//! Plugin orchestration
//!
//! [`RenderPlugin`] ties the pieces together: one sampled texture bound
//! through a descriptor set, a render-pass-keyed pipeline, a per-draw
//! transient vertex buffer, and the frame-deferred reclamation queue that
//! keeps retired buffers alive until the host reports their frames complete.

use ash::vk;
use nalgebra::Matrix4;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::buffer::Buffer;
use crate::commands::CommandPool;
use crate::config::PluginConfig;
use crate::descriptor::DescriptorBindings;
use crate::error::{PluginError, PluginResult};
use crate::host::{BufferHandle, HostContext, RecordingState, ResourceAccess, TextureHandle};
use crate::image::Image;
use crate::intercept;
use crate::pipeline::PipelineCache;
use crate::reclaim::ReclamationQueue;
use crate::transfer;
use crate::vertex::Vertex;

/// Texel format of the plugin-owned texture.
pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

const BYTES_PER_TEXEL: u64 = 4;

/// The rendering plugin's complete device-side state.
///
/// Fields drop in declaration order, which is the reverse of construction:
/// pipeline before the texture it samples, descriptors before the pool-less
/// resources they reference, the command pool last among device objects.
pub struct RenderPlugin<A: DeviceApi, H: HostContext> {
    pipeline: PipelineCache<A>,
    texture: Image<A>,
    descriptors: DescriptorBindings<A>,
    texture_staging: HashMap<TextureHandle, Buffer<A>>,
    retired: ReclamationQueue<Buffer<A>>,
    command_pool: CommandPool<A>,
    api: Arc<A>,
    host: H,
}

impl<A: DeviceApi, H: HostContext> RenderPlugin<A, H> {
    /// Bring up all device-side state: upload the texture, bind it to a
    /// descriptor set, and prepare the (still empty) pipeline cache.
    ///
    /// `pixels` holds `width * height` RGBA8 texels.
    pub fn initialize(
        api: Arc<A>,
        host: H,
        config: &PluginConfig,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> PluginResult<Self> {
        let expected = u64::from(width) * u64::from(height) * BYTES_PER_TEXEL;
        if pixels.len() as u64 != expected {
            return Err(PluginError::InitializationFailed(format!(
                "texture needs {expected} bytes of RGBA8 texels, got {}",
                pixels.len()
            )));
        }

        let command_pool = CommandPool::new(&api)?;

        let mut texture = Image::new(&api, width, height, TEXTURE_FORMAT)?;
        transfer::upload_pixels(&api, &command_pool, &mut texture, pixels)?;
        texture.create_view()?;
        texture.create_sampler(&config.sampler)?;

        let mut descriptors = DescriptorBindings::new(&api, config.descriptor_pool_max_sets)?;
        descriptors.bind_image(&texture)?;

        let pipeline = PipelineCache::new(&api);

        intercept::set_clear_color_override(config.override_clear_color);
        if intercept::register_begin_render_pass_hook(&host) {
            log::debug!("render pass begin interception registered");
        }

        log::info!("render plugin initialized with a {width}x{height} texture");
        Ok(Self {
            pipeline,
            texture,
            descriptors,
            texture_staging: HashMap::new(),
            retired: ReclamationQueue::new(),
            command_pool,
            api,
            host,
        })
    }

    /// Like [`initialize`], but decoding the texture from an image file.
    ///
    /// [`initialize`]: Self::initialize
    pub fn initialize_with_texture_file(
        api: Arc<A>,
        host: H,
        config: &PluginConfig,
        path: &str,
    ) -> PluginResult<Self> {
        let pixels = crate::pixels::PixelData::from_file(path)?;
        Self::initialize(api, host, config, &pixels.data, pixels.width, pixels.height)
    }

    /// Record a draw of `vertices` (a whole number of triangles) with
    /// `transform` as the vertex-stage push constant.
    ///
    /// A no-op when the host is not recording, or when the pipeline for the
    /// current render pass could not be built. The transient vertex buffer is
    /// retired at the current frame and reclaimed once that frame is safe; a
    /// buffer that cannot be created costs this frame's triangles, nothing
    /// more.
    pub fn draw(&mut self, transform: &Matrix4<f32>, vertices: &[Vertex]) -> PluginResult<()> {
        let Some(state) = self.host.recording_state() else {
            return Ok(());
        };

        if let Some((pipeline, layout)) =
            self.pipeline
                .ensure(state.render_pass, self.descriptors.layout(), state.current_frame)
        {
            if !vertices.is_empty() {
                // The host calls again next frame; one skipped draw is
                // recoverable.
                if let Err(e) = self.record_triangles(&state, pipeline, layout, transform, vertices)
                {
                    log::warn!("skipping draw, transient vertex buffer unavailable: {e}");
                }
            }
        }

        self.pipeline.sweep(state.safe_frame);
        self.retired.sweep(state.safe_frame);
        Ok(())
    }

    fn record_triangles(
        &mut self,
        state: &RecordingState,
        pipeline: vk::Pipeline,
        layout: vk::PipelineLayout,
        transform: &Matrix4<f32>,
        vertices: &[Vertex],
    ) -> PluginResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let buffer = Buffer::new(
            &self.api,
            bytes.len() as vk::DeviceSize,
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;
        buffer.write(bytes)?;

        let cmd = state.command_buffer;
        self.api.cmd_bind_pipeline(cmd, pipeline);
        self.api.cmd_bind_vertex_buffer(cmd, buffer.handle());
        self.api.cmd_push_constants(
            cmd,
            layout,
            vk::ShaderStageFlags::VERTEX,
            bytemuck::cast_slice(transform.as_slice()),
        );
        self.api.cmd_bind_descriptor_set(cmd, layout, self.descriptors.set());
        self.api.cmd_draw(cmd, vertices.len() as u32);

        // The GPU reads this buffer until frame `current_frame` retires.
        self.retired.retire(state.current_frame, buffer);
        Ok(())
    }

    /// Reclaim retired resources whose frames the host reports complete.
    /// A no-op when no recording state (and thus no safe frame) is available.
    pub fn collect(&mut self) {
        if let Some(state) = self.host.recording_state() {
            self.pipeline.sweep(state.safe_frame);
            self.retired.sweep(state.safe_frame);
        }
    }

    /// Start streaming new contents for a host texture.
    ///
    /// Any staging buffer from a previous cycle for the same texture is
    /// retired at the current frame; a fresh mapped staging buffer is
    /// created for the caller to fill. Returns the write pointer and the row
    /// pitch in bytes, or `None` when the host is not recording or the
    /// buffer could not be created.
    pub fn begin_modify_texture(
        &mut self,
        handle: TextureHandle,
        width: u32,
        height: u32,
    ) -> Option<(*mut c_void, u64)> {
        let state = self.host.recording_state()?;

        if let Some(previous) = self.texture_staging.remove(&handle) {
            self.retired.retire(state.current_frame, previous);
        }

        let row_pitch = u64::from(width) * BYTES_PER_TEXEL;
        let size = row_pitch * u64::from(height);
        let staging = match Buffer::new(&self.api, size, vk::BufferUsageFlags::TRANSFER_SRC) {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("texture staging buffer creation failed: {e}");
                return None;
            }
        };

        let mapped = staging.mapped_ptr();
        self.texture_staging.insert(handle, staging);
        Some((mapped, row_pitch))
    }

    /// Finish a texture streaming cycle: flush the staging buffer and record
    /// a copy into the host texture. Returns whether the copy was recorded.
    ///
    /// The staging buffer stays alive until the next [`begin_modify_texture`]
    /// for the same handle retires it; the recorded copy may still be in
    /// flight when this returns.
    ///
    /// [`begin_modify_texture`]: Self::begin_modify_texture
    pub fn end_modify_texture(&mut self, handle: TextureHandle, width: u32, height: u32) -> bool {
        let Some(staging) = self.texture_staging.get(&handle) else {
            return false;
        };

        // Resource uploads are illegal inside a render pass.
        self.host.ensure_outside_render_pass();

        let Some(target) = self.host.access_texture(
            handle,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::PipelineStageFlags::TRANSFER,
            vk::AccessFlags::TRANSFER_WRITE,
        ) else {
            return false;
        };
        let Some(state) = self.host.recording_state() else {
            return false;
        };

        if let Err(e) = staging.flush() {
            log::error!("texture staging flush failed: {e}");
            return false;
        }

        let region = vk::BufferImageCopy::builder()
            .buffer_offset(0)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            })
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .build();
        self.api.cmd_copy_buffer_to_image(
            state.command_buffer,
            staging.handle(),
            target.image,
            target.layout,
            &region,
        );
        true
    }

    /// Start streaming new contents for a host vertex buffer.
    ///
    /// The buffer may still be read by in-flight frames, so the host is asked
    /// to recreate it; the previous incarnation stays alive on the host side
    /// until unused. Returns the mapped write pointer and the usable size in
    /// bytes.
    pub fn begin_modify_vertex_buffer(
        &mut self,
        handle: BufferHandle,
    ) -> Option<(*mut c_void, u64)> {
        self.host.recording_state()?;

        let current = self.host.access_buffer(
            handle,
            vk::PipelineStageFlags::empty(),
            vk::AccessFlags::empty(),
            ResourceAccess::ObserveOnly,
        )?;
        if current.mapped.is_null() {
            return None;
        }

        let recreated = self.host.access_buffer(
            handle,
            vk::PipelineStageFlags::HOST,
            vk::AccessFlags::HOST_WRITE,
            ResourceAccess::Recreate,
        )?;

        Some((recreated.mapped, current.size_in_bytes))
    }

    /// Finish a vertex buffer streaming cycle, flushing the written range
    /// when the backing memory is not host-coherent.
    pub fn end_modify_vertex_buffer(&mut self, handle: BufferHandle) {
        let Some(buffer) = self.host.access_buffer(
            handle,
            vk::PipelineStageFlags::empty(),
            vk::AccessFlags::empty(),
            ResourceAccess::ObserveOnly,
        ) else {
            return;
        };

        if !buffer.flags.contains(vk::MemoryPropertyFlags::HOST_COHERENT) {
            // Offset and size come pre-aligned from the host.
            let range = vk::MappedMemoryRange::builder()
                .memory(buffer.memory)
                .offset(buffer.offset)
                .size(buffer.size)
                .build();
            if let Err(e) = self.api.flush_mapped_memory_ranges(&[range]) {
                log::error!("vertex buffer flush failed: {e}");
            }
        }
    }

    /// Handle of the plugin-owned texture, for hosts that want to sample it.
    pub fn native_texture(&self) -> vk::Image {
        self.texture.handle()
    }

    /// Tear everything down. Waits for the device to go idle, force-sweeps
    /// every retired resource, then releases the long-lived objects in
    /// reverse construction order.
    pub fn shutdown(self) -> PluginResult<()> {
        let Self {
            pipeline,
            texture,
            descriptors,
            texture_staging,
            mut retired,
            command_pool,
            api,
            host: _,
        } = self;

        api.device_wait_idle()?;

        drop(texture_staging);
        let reclaimed = retired.sweep_all();
        drop(pipeline);
        drop(texture);
        drop(descriptors);
        drop(command_pool);
        log::info!("render plugin shut down, {reclaimed} retired resources reclaimed");
        Ok(())
    }
}
