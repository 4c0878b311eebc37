//! Device function table abstraction
//!
//! [`DeviceApi`] is the plugin's binding table made explicit: one method per
//! graphics entry point the plugin calls, handed by reference to every
//! component instead of living as process-global function pointers. The
//! production implementation ([`crate::loader::VulkanApi`]) forwards to ash
//! function tables resolved through the host's loader; tests substitute a
//! recording mock. Components treat the table as read-only — only the loader
//! fills it, exactly once.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::c_void;

/// Resolved graphics entry points, one method per call the plugin records.
///
/// Methods mirror the underlying entry points closely enough that the real
/// implementation is a thin forward; the few deviations bake in plugin-wide
/// policy (command buffers are always primary and one-time-submit, transient
/// submissions go to the host's graphics queue).
pub trait DeviceApi {
    /// Queue family one-time transfer work is submitted to
    fn queue_family_index(&self) -> u32;

    /// Enumerated memory types of the physical device
    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties;

    /// Block until the device is idle
    fn device_wait_idle(&self) -> VkResult<()>;

    // --- buffers and memory ---

    /// Create a buffer handle
    fn create_buffer(&self, info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer>;
    /// Destroy a buffer handle
    fn destroy_buffer(&self, buffer: vk::Buffer);
    /// Query a buffer's memory requirements
    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements;
    /// Allocate device memory
    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory>;
    /// Free device memory
    fn free_memory(&self, memory: vk::DeviceMemory);
    /// Map an allocation from its start for `size` bytes
    fn map_memory(&self, memory: vk::DeviceMemory, size: vk::DeviceSize)
        -> VkResult<*mut c_void>;
    /// Unmap a mapped allocation
    fn unmap_memory(&self, memory: vk::DeviceMemory);
    /// Bind a buffer to memory at offset zero
    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()>;
    /// Flush written ranges of non-coherent memory
    fn flush_mapped_memory_ranges(&self, ranges: &[vk::MappedMemoryRange]) -> VkResult<()>;

    // --- images ---

    /// Create an image handle
    fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image>;
    /// Destroy an image handle
    fn destroy_image(&self, image: vk::Image);
    /// Query an image's memory requirements
    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;
    /// Bind an image to memory at offset zero
    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory) -> VkResult<()>;
    /// Create an image view
    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;
    /// Destroy an image view
    fn destroy_image_view(&self, view: vk::ImageView);
    /// Create a sampler
    fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler>;
    /// Destroy a sampler
    fn destroy_sampler(&self, sampler: vk::Sampler);

    // --- descriptors ---

    /// Create a descriptor set layout
    fn create_descriptor_set_layout(
        &self,
        info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout>;
    /// Destroy a descriptor set layout
    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout);
    /// Create a descriptor pool
    fn create_descriptor_pool(
        &self,
        info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool>;
    /// Destroy a descriptor pool, freeing its sets
    fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool);
    /// Allocate descriptor sets from a pool
    fn allocate_descriptor_sets(
        &self,
        info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>>;
    /// Write descriptor updates
    fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]);

    // --- pipelines ---

    /// Create a pipeline layout
    fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout>;
    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    /// Create a shader module from SPIR-V words
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;
    /// Destroy a shader module
    fn destroy_shader_module(&self, module: vk::ShaderModule);
    /// Create one graphics pipeline
    fn create_graphics_pipeline(
        &self,
        info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline>;
    /// Destroy a pipeline
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    // --- commands and submission ---

    /// Create a command pool for the plugin's one-time submissions
    fn create_command_pool(&self, info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool>;
    /// Destroy a command pool
    fn destroy_command_pool(&self, pool: vk::CommandPool);
    /// Allocate one primary command buffer from a pool
    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer>;
    /// Return a command buffer to its pool
    fn free_command_buffer(&self, pool: vk::CommandPool, command_buffer: vk::CommandBuffer);
    /// Begin a one-time-submit recording
    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;
    /// End a recording
    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;
    /// Submit a command buffer to the graphics queue, no fence
    fn queue_submit(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;
    /// Block until the graphics queue drains
    fn queue_wait_idle(&self) -> VkResult<()>;

    /// Record an image memory barrier
    fn cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        barrier: &vk::ImageMemoryBarrier,
    );
    /// Record a buffer-to-image copy
    fn cmd_copy_buffer_to_image(
        &self,
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        image: vk::Image,
        layout: vk::ImageLayout,
        region: &vk::BufferImageCopy,
    );
    /// Bind a graphics pipeline
    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline);
    /// Bind one vertex buffer at binding 0, offset 0
    fn cmd_bind_vertex_buffer(&self, command_buffer: vk::CommandBuffer, buffer: vk::Buffer);
    /// Push constant bytes at offset 0
    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        data: &[u8],
    );
    /// Bind one descriptor set at set index 0
    fn cmd_bind_descriptor_set(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        set: vk::DescriptorSet,
    );
    /// Record a non-indexed draw of `vertex_count` vertices
    fn cmd_draw(&self, command_buffer: vk::CommandBuffer, vertex_count: u32);
}
