//! Host engine interface
//!
//! The plugin never owns a window, swapchain, or submission scheduler; the
//! host engine does. Everything the plugin needs from the host flows through
//! the [`HostContext`] trait: the current command-recording state (including
//! the frame counter used as the reclamation epoch), explicit out-of-render-
//! pass requests for resource uploads, and guarded access to host-owned
//! textures and buffers with an explicit layout/stage/access request.
//!
//! The boundary is a trait so tests can drive the steady-state path against a
//! scripted host without a live engine.

use ash::vk;
use std::ffi::c_void;

/// Device handles the host hands the plugin at initialization.
///
/// The resolver in `get_instance_proc_addr` is the only way the plugin
/// obtains Vulkan entry points; it is never statically linked against the
/// loader.
#[derive(Copy, Clone)]
pub struct HostVulkanInstance {
    /// The loader's entry-point resolver
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    /// Instance the host created
    pub instance: vk::Instance,
    /// Physical device backing the host's device
    pub physical_device: vk::PhysicalDevice,
    /// Logical device owned by the host
    pub device: vk::Device,
    /// Queue the plugin submits one-time transfer work to
    pub graphics_queue: vk::Queue,
    /// Queue family of `graphics_queue`
    pub queue_family_index: u32,
}

/// Snapshot of the host's current command-recording state.
#[derive(Copy, Clone, Debug)]
pub struct RecordingState {
    /// Command buffer the host is currently recording into
    pub command_buffer: vk::CommandBuffer,
    /// Render pass currently being recorded; the pipeline cache's key
    pub render_pass: vk::RenderPass,
    /// Frame counter value for work recorded now
    pub current_frame: u64,
    /// Highest frame number whose GPU work is guaranteed complete
    pub safe_frame: u64,
}

/// Opaque host texture identifier passed through the streaming interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque host buffer identifier passed through the streaming interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// How the plugin intends to touch a host-owned resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceAccess {
    /// Read back resource metadata without synchronizing
    ObserveOnly,
    /// Host inserts a pipeline barrier for the requested stage/access
    PipelineBarrier,
    /// Host recreates the resource, keeping the old one alive while in use
    Recreate,
}

/// Host-owned image exposed for a transfer recorded by the plugin.
#[derive(Copy, Clone, Debug)]
pub struct HostImage {
    /// Image handle, already transitioned to the requested layout
    pub image: vk::Image,
    /// Layout the host left the image in
    pub layout: vk::ImageLayout,
}

/// Host-owned buffer exposed for direct memory writes by the plugin.
#[derive(Copy, Clone, Debug)]
pub struct HostBuffer {
    /// Buffer handle
    pub buffer: vk::Buffer,
    /// Backing memory allocation
    pub memory: vk::DeviceMemory,
    /// Offset of the buffer within the allocation
    pub offset: vk::DeviceSize,
    /// Size of the mapped region; offset and size are already aligned to the
    /// device's non-coherent atom size by the host
    pub size: vk::DeviceSize,
    /// Persistent host mapping, null if the memory is not mapped
    pub mapped: *mut c_void,
    /// Property flags of the backing memory type
    pub flags: vk::MemoryPropertyFlags,
    /// Usable byte size of the buffer contents
    pub size_in_bytes: vk::DeviceSize,
}

/// The host engine surface the plugin calls out to.
pub trait HostContext {
    /// Query the current recording state. `None` means no command buffer is
    /// being recorded right now; per-frame work is skipped for this call.
    fn recording_state(&self) -> Option<RecordingState>;

    /// Ask the host to end any active render pass before a resource upload.
    fn ensure_outside_render_pass(&self);

    /// Access a host texture for a transfer, requesting the given layout,
    /// pipeline stage, and access mask. Returns `None` if the resource is
    /// unavailable this frame.
    fn access_texture(
        &self,
        handle: TextureHandle,
        layout: vk::ImageLayout,
        stage: vk::PipelineStageFlags,
        access: vk::AccessFlags,
    ) -> Option<HostImage>;

    /// Access a host buffer with the requested synchronization mode.
    fn access_buffer(
        &self,
        handle: BufferHandle,
        stage: vk::PipelineStageFlags,
        access: vk::AccessFlags,
        mode: ResourceAccess,
    ) -> Option<HostBuffer>;

    /// Splice `replacement` in front of the host's `vkCmdBeginRenderPass`
    /// dispatch. Returns the entry point the replacement must forward to, or
    /// `None` when the host does not support interception (the default).
    fn intercept_begin_render_pass(
        &self,
        replacement: vk::PFN_vkCmdBeginRenderPass,
    ) -> Option<vk::PFN_vkCmdBeginRenderPass> {
        let _ = replacement;
        None
    }
}
