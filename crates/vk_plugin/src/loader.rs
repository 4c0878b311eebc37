//! Dynamic API binding
//!
//! The plugin is never linked against a Vulkan loader. The host hands it the
//! loader's `vkGetInstanceProcAddr` and, once an instance exists, every other
//! entry point is resolved against it. ash's generated function tables do the
//! per-name resolution loop; entry points the driver does not expose stay as
//! trapping placeholders, which this layer deliberately does not defend
//! against — calling one is an environment or programming error.
//!
//! [`ApiLoader`] decorates the raw resolver with the fill-once rule: the
//! first `instance_created` observation loads the full table, every later one
//! returns the same table untouched.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::{c_void, CStr};
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::error::{PluginError, PluginResult};
use crate::host::HostVulkanInstance;

/// Capability interface of the loader's entry-point resolver.
pub trait EntryResolver {
    /// Resolve `name` against `instance` (null instance for global-level
    /// entry points). Returns `None` when the loader does not know the name.
    fn resolve(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction;
}

/// The real resolver: a raw `vkGetInstanceProcAddr` obtained from the host.
#[derive(Copy, Clone)]
pub struct ResolverFn {
    get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
}

impl ResolverFn {
    /// Wrap the host-provided resolver function.
    pub fn new(get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr) -> Self {
        Self {
            get_instance_proc_addr,
        }
    }

    fn static_fn(&self) -> vk::StaticFn {
        vk::StaticFn {
            get_instance_proc_addr: self.get_instance_proc_addr,
        }
    }
}

impl EntryResolver for ResolverFn {
    fn resolve(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { (self.get_instance_proc_addr)(instance, name.as_ptr()) }
    }
}

/// Decorator around the real resolver that observes instance creation and
/// fills the binding table exactly once.
///
/// There is no invalidation path: resolved entry points stay valid until the
/// owning instance is destroyed, which outlives the plugin.
pub struct ApiLoader {
    resolver: ResolverFn,
    api: Option<Arc<VulkanApi>>,
}

impl ApiLoader {
    /// Compose the loader over the host's resolver.
    pub fn new(resolver: ResolverFn) -> Self {
        Self {
            resolver,
            api: None,
        }
    }

    /// Called once the host's instance and device exist. Loads the full
    /// binding table on the first call; later calls return the table already
    /// built, never re-resolving an entry.
    pub fn instance_created(
        &mut self,
        host: &HostVulkanInstance,
    ) -> PluginResult<Arc<VulkanApi>> {
        if let Some(api) = &self.api {
            return Ok(Arc::clone(api));
        }
        let api = Arc::new(VulkanApi::load(self.resolver, host)?);
        log::info!(
            "Vulkan binding table loaded (queue family {})",
            api.queue_family_index()
        );
        self.api = Some(Arc::clone(&api));
        Ok(api)
    }
}

impl EntryResolver for ApiLoader {
    fn resolve(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction {
        self.resolver.resolve(instance, name)
    }
}

/// ash-backed implementation of [`DeviceApi`].
///
/// Loading performs no Vulkan calls of its own; it only resolves function
/// pointers. Device state such as the memory-type table is queried at each
/// call site.
pub struct VulkanApi {
    instance: ash::Instance,
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    graphics_queue: vk::Queue,
    queue_family_index: u32,
}

impl VulkanApi {
    /// Resolve instance- and device-level entry points for the host's device.
    pub fn load(resolver: ResolverFn, host: &HostVulkanInstance) -> PluginResult<Self> {
        if host.instance == vk::Instance::null() || host.device == vk::Device::null() {
            return Err(PluginError::InitializationFailed(
                "host supplied a null instance or device".to_string(),
            ));
        }
        let static_fn = resolver.static_fn();
        let instance = unsafe { ash::Instance::load(&static_fn, host.instance) };
        let device = unsafe { ash::Device::load(instance.fp_v1_0(), host.device) };
        Ok(Self {
            instance,
            device,
            physical_device: host.physical_device,
            graphics_queue: host.graphics_queue,
            queue_family_index: host.queue_family_index,
        })
    }
}

impl DeviceApi for VulkanApi {
    fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        unsafe {
            self.instance
                .get_physical_device_memory_properties(self.physical_device)
        }
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.device_wait_idle() }
    }

    fn create_buffer(&self, info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer> {
        unsafe { self.device.create_buffer(info, None) }
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        unsafe { self.device.destroy_buffer(buffer, None) }
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        unsafe { self.device.get_buffer_memory_requirements(buffer) }
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory> {
        unsafe { self.device.allocate_memory(info, None) }
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        unsafe { self.device.free_memory(memory, None) }
    }

    fn map_memory(
        &self,
        memory: vk::DeviceMemory,
        size: vk::DeviceSize,
    ) -> VkResult<*mut c_void> {
        unsafe {
            self.device
                .map_memory(memory, 0, size, vk::MemoryMapFlags::empty())
        }
    }

    fn unmap_memory(&self, memory: vk::DeviceMemory) {
        unsafe { self.device.unmap_memory(memory) }
    }

    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()> {
        unsafe { self.device.bind_buffer_memory(buffer, memory, 0) }
    }

    fn flush_mapped_memory_ranges(&self, ranges: &[vk::MappedMemoryRange]) -> VkResult<()> {
        unsafe { self.device.flush_mapped_memory_ranges(ranges) }
    }

    fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image> {
        unsafe { self.device.create_image(info, None) }
    }

    fn destroy_image(&self, image: vk::Image) {
        unsafe { self.device.destroy_image(image, None) }
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        unsafe { self.device.get_image_memory_requirements(image) }
    }

    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory) -> VkResult<()> {
        unsafe { self.device.bind_image_memory(image, memory, 0) }
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        unsafe { self.device.create_image_view(info, None) }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        unsafe { self.device.create_sampler(info, None) }
    }

    fn destroy_sampler(&self, sampler: vk::Sampler) {
        unsafe { self.device.destroy_sampler(sampler, None) }
    }

    fn create_descriptor_set_layout(
        &self,
        info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout> {
        unsafe { self.device.create_descriptor_set_layout(info, None) }
    }

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        unsafe { self.device.destroy_descriptor_set_layout(layout, None) }
    }

    fn create_descriptor_pool(
        &self,
        info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool> {
        unsafe { self.device.create_descriptor_pool(info, None) }
    }

    fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        unsafe { self.device.destroy_descriptor_pool(pool, None) }
    }

    fn allocate_descriptor_sets(
        &self,
        info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>> {
        unsafe { self.device.allocate_descriptor_sets(info) }
    }

    fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]) {
        unsafe { self.device.update_descriptor_sets(writes, &[]) }
    }

    fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        unsafe { self.device.create_pipeline_layout(info, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let info = vk::ShaderModuleCreateInfo::builder().code(code);
        unsafe { self.device.create_shader_module(&info, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_graphics_pipeline(
        &self,
        info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(
                    vk::PipelineCache::null(),
                    std::slice::from_ref(info),
                    None,
                )
                .map_err(|(_, result)| result)?
        };
        Ok(pipelines[0])
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }

    fn create_command_pool(&self, info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool> {
        unsafe { self.device.create_command_pool(info, None) }
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe { self.device.destroy_command_pool(pool, None) }
    }

    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        let info = vk::CommandBufferAllocateInfo::builder()
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_pool(pool)
            .command_buffer_count(1);
        let buffers = unsafe { self.device.allocate_command_buffers(&info)? };
        Ok(buffers[0])
    }

    fn free_command_buffer(&self, pool: vk::CommandPool, command_buffer: vk::CommandBuffer) {
        unsafe { self.device.free_command_buffers(pool, &[command_buffer]) }
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { self.device.begin_command_buffer(command_buffer, &info) }
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device.end_command_buffer(command_buffer) }
    }

    fn queue_submit(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);
        unsafe {
            self.device.queue_submit(
                self.graphics_queue,
                std::slice::from_ref(&submit_info),
                vk::Fence::null(),
            )
        }
    }

    fn queue_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.queue_wait_idle(self.graphics_queue) }
    }

    fn cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        barrier: &vk::ImageMemoryBarrier,
    ) {
        unsafe {
            self.device.cmd_pipeline_barrier(
                command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                std::slice::from_ref(barrier),
            );
        }
    }

    fn cmd_copy_buffer_to_image(
        &self,
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        image: vk::Image,
        layout: vk::ImageLayout,
        region: &vk::BufferImageCopy,
    ) {
        unsafe {
            self.device.cmd_copy_buffer_to_image(
                command_buffer,
                buffer,
                image,
                layout,
                std::slice::from_ref(region),
            );
        }
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            self.device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline,
            );
        }
    }

    fn cmd_bind_vertex_buffer(&self, command_buffer: vk::CommandBuffer, buffer: vk::Buffer) {
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(command_buffer, 0, &[buffer], &[0]);
        }
    }

    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        data: &[u8],
    ) {
        unsafe {
            self.device
                .cmd_push_constants(command_buffer, layout, stages, 0, data);
        }
    }

    fn cmd_bind_descriptor_set(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        set: vk::DescriptorSet,
    ) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                layout,
                0,
                &[set],
                &[],
            );
        }
    }

    fn cmd_draw(&self, command_buffer: vk::CommandBuffer, vertex_count: u32) {
        unsafe { self.device.cmd_draw(command_buffer, vertex_count, 1, 0, 0) }
    }
}
