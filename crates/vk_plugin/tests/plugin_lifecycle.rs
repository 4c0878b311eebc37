//! End-to-end lifecycle tests driven through scripted device and host
//! doubles. The device double fabricates handles, backs mapped memory with
//! real allocations, and records an event log; the host double scripts the
//! per-frame recording state. No GPU or Vulkan loader is involved.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use nalgebra::Matrix4;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use vk_plugin::buffer::Buffer;
use vk_plugin::{
    BufferHandle, DeviceApi, HostBuffer, HostContext, HostImage, PluginConfig, PluginError,
    RecordingState, RenderPlugin, ResourceAccess, TextureHandle, Vertex,
};

/// Device-side observations the tests assert on.
#[derive(Clone, Debug, PartialEq)]
enum Event {
    CreateBuffer(u64),
    DestroyBuffer(u64),
    CreateImage(u64),
    DestroyImage(u64),
    CreatePipelineLayout,
    CreatePipeline(u64),
    DestroyPipeline(u64),
    Barrier {
        old: vk::ImageLayout,
        new: vk::ImageLayout,
    },
    CopyBufferToImage {
        src: u64,
        dst: u64,
    },
    WriteDescriptor {
        view: u64,
        layout: vk::ImageLayout,
    },
    BindVertexBuffer(u64),
    Draw(u32),
    FlushRanges(u64),
    DeviceWaitIdle,
}

#[derive(Default)]
struct MockState {
    next_handle: u64,
    events: Vec<Event>,
    buffer_sizes: HashMap<u64, vk::DeviceSize>,
    image_sizes: HashMap<u64, vk::DeviceSize>,
    allocations: HashMap<u64, Box<[u8]>>,
    live_shader_modules: i64,
    fail_buffer_creates: Option<vk::Result>,
}

impl MockState {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[derive(Default)]
struct MockDevice {
    state: Mutex<MockState>,
}

impl MockDevice {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    fn count(&self, matcher: impl Fn(&Event) -> bool) -> usize {
        self.lock().events.iter().filter(|e| matcher(e)).count()
    }

    fn live_buffers(&self) -> usize {
        self.lock().buffer_sizes.len()
    }

    fn live_allocations(&self) -> usize {
        self.lock().allocations.len()
    }

    fn live_images(&self) -> usize {
        self.lock().image_sizes.len()
    }

    fn live_shader_modules(&self) -> i64 {
        self.lock().live_shader_modules
    }
}

impl DeviceApi for MockDevice {
    fn queue_family_index(&self) -> u32 {
        7
    }

    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties::default();
        props.memory_type_count = 2;
        props.memory_types[0] = vk::MemoryType {
            property_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
            heap_index: 0,
        };
        props.memory_types[1] = vk::MemoryType {
            property_flags: vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
            heap_index: 0,
        };
        props.memory_heap_count = 1;
        props.memory_heaps[0] = vk::MemoryHeap {
            size: 1 << 30,
            flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
        };
        props
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.lock().events.push(Event::DeviceWaitIdle);
        Ok(())
    }

    fn create_buffer(&self, info: &vk::BufferCreateInfo) -> VkResult<vk::Buffer> {
        let mut s = self.lock();
        if let Some(err) = s.fail_buffer_creates {
            return Err(err);
        }
        let raw = s.next();
        s.buffer_sizes.insert(raw, info.size);
        s.events.push(Event::CreateBuffer(raw));
        Ok(vk::Buffer::from_raw(raw))
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        let mut s = self.lock();
        assert!(
            s.buffer_sizes.remove(&buffer.as_raw()).is_some(),
            "destroying unknown or already destroyed buffer"
        );
        s.events.push(Event::DestroyBuffer(buffer.as_raw()));
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        let s = self.lock();
        vk::MemoryRequirements {
            size: s.buffer_sizes[&buffer.as_raw()],
            alignment: 256,
            memory_type_bits: 0b11,
        }
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo) -> VkResult<vk::DeviceMemory> {
        let mut s = self.lock();
        let raw = s.next();
        s.allocations
            .insert(raw, vec![0u8; info.allocation_size as usize].into_boxed_slice());
        Ok(vk::DeviceMemory::from_raw(raw))
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        let mut s = self.lock();
        assert!(
            s.allocations.remove(&memory.as_raw()).is_some(),
            "double free of device memory"
        );
    }

    fn map_memory(
        &self,
        memory: vk::DeviceMemory,
        _size: vk::DeviceSize,
    ) -> VkResult<*mut c_void> {
        let mut s = self.lock();
        let backing = s
            .allocations
            .get_mut(&memory.as_raw())
            .expect("mapping unallocated memory");
        Ok(backing.as_mut_ptr().cast())
    }

    fn unmap_memory(&self, _memory: vk::DeviceMemory) {}

    fn bind_buffer_memory(&self, _buffer: vk::Buffer, _memory: vk::DeviceMemory) -> VkResult<()> {
        Ok(())
    }

    fn flush_mapped_memory_ranges(&self, ranges: &[vk::MappedMemoryRange]) -> VkResult<()> {
        let mut s = self.lock();
        for range in ranges {
            s.events.push(Event::FlushRanges(range.memory.as_raw()));
        }
        Ok(())
    }

    fn create_image(&self, info: &vk::ImageCreateInfo) -> VkResult<vk::Image> {
        let mut s = self.lock();
        let raw = s.next();
        let size = vk::DeviceSize::from(info.extent.width) * vk::DeviceSize::from(info.extent.height) * 4;
        s.image_sizes.insert(raw, size);
        s.events.push(Event::CreateImage(raw));
        Ok(vk::Image::from_raw(raw))
    }

    fn destroy_image(&self, image: vk::Image) {
        let mut s = self.lock();
        assert!(s.image_sizes.remove(&image.as_raw()).is_some());
        s.events.push(Event::DestroyImage(image.as_raw()));
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        let s = self.lock();
        vk::MemoryRequirements {
            size: s.image_sizes[&image.as_raw()],
            alignment: 256,
            memory_type_bits: 0b11,
        }
    }

    fn bind_image_memory(&self, _image: vk::Image, _memory: vk::DeviceMemory) -> VkResult<()> {
        Ok(())
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        // Views share the raw value of their image so descriptor writes can
        // be traced back to it.
        Ok(vk::ImageView::from_raw(info.image.as_raw()))
    }

    fn destroy_image_view(&self, _view: vk::ImageView) {}

    fn create_sampler(&self, _info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        let raw = self.lock().next();
        Ok(vk::Sampler::from_raw(raw))
    }

    fn destroy_sampler(&self, _sampler: vk::Sampler) {}

    fn create_descriptor_set_layout(
        &self,
        _info: &vk::DescriptorSetLayoutCreateInfo,
    ) -> VkResult<vk::DescriptorSetLayout> {
        let raw = self.lock().next();
        Ok(vk::DescriptorSetLayout::from_raw(raw))
    }

    fn destroy_descriptor_set_layout(&self, _layout: vk::DescriptorSetLayout) {}

    fn create_descriptor_pool(
        &self,
        _info: &vk::DescriptorPoolCreateInfo,
    ) -> VkResult<vk::DescriptorPool> {
        let raw = self.lock().next();
        Ok(vk::DescriptorPool::from_raw(raw))
    }

    fn destroy_descriptor_pool(&self, _pool: vk::DescriptorPool) {}

    fn allocate_descriptor_sets(
        &self,
        _info: &vk::DescriptorSetAllocateInfo,
    ) -> VkResult<Vec<vk::DescriptorSet>> {
        let raw = self.lock().next();
        Ok(vec![vk::DescriptorSet::from_raw(raw)])
    }

    fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]) {
        let mut s = self.lock();
        for write in writes {
            let info = unsafe { *write.p_image_info };
            s.events.push(Event::WriteDescriptor {
                view: info.image_view.as_raw(),
                layout: info.image_layout,
            });
        }
    }

    fn create_pipeline_layout(
        &self,
        _info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        let mut s = self.lock();
        let raw = s.next();
        s.events.push(Event::CreatePipelineLayout);
        Ok(vk::PipelineLayout::from_raw(raw))
    }

    fn destroy_pipeline_layout(&self, _layout: vk::PipelineLayout) {}

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        assert_eq!(code[0], 0x0723_0203, "not a SPIR-V module");
        let mut s = self.lock();
        let raw = s.next();
        s.live_shader_modules += 1;
        Ok(vk::ShaderModule::from_raw(raw))
    }

    fn destroy_shader_module(&self, _module: vk::ShaderModule) {
        self.lock().live_shader_modules -= 1;
    }

    fn create_graphics_pipeline(
        &self,
        _info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let mut s = self.lock();
        let raw = s.next();
        s.events.push(Event::CreatePipeline(raw));
        Ok(vk::Pipeline::from_raw(raw))
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.lock().events.push(Event::DestroyPipeline(pipeline.as_raw()));
    }

    fn create_command_pool(&self, _info: &vk::CommandPoolCreateInfo) -> VkResult<vk::CommandPool> {
        let raw = self.lock().next();
        Ok(vk::CommandPool::from_raw(raw))
    }

    fn destroy_command_pool(&self, _pool: vk::CommandPool) {}

    fn allocate_command_buffer(&self, _pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        let raw = self.lock().next();
        Ok(vk::CommandBuffer::from_raw(raw))
    }

    fn free_command_buffer(&self, _pool: vk::CommandPool, _command_buffer: vk::CommandBuffer) {}

    fn begin_command_buffer(&self, _command_buffer: vk::CommandBuffer) -> VkResult<()> {
        Ok(())
    }

    fn end_command_buffer(&self, _command_buffer: vk::CommandBuffer) -> VkResult<()> {
        Ok(())
    }

    fn queue_submit(&self, _command_buffer: vk::CommandBuffer) -> VkResult<()> {
        Ok(())
    }

    fn queue_wait_idle(&self) -> VkResult<()> {
        Ok(())
    }

    fn cmd_pipeline_barrier(
        &self,
        _command_buffer: vk::CommandBuffer,
        _src_stage: vk::PipelineStageFlags,
        _dst_stage: vk::PipelineStageFlags,
        barrier: &vk::ImageMemoryBarrier,
    ) {
        self.lock().events.push(Event::Barrier {
            old: barrier.old_layout,
            new: barrier.new_layout,
        });
    }

    fn cmd_copy_buffer_to_image(
        &self,
        _command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        image: vk::Image,
        _layout: vk::ImageLayout,
        _region: &vk::BufferImageCopy,
    ) {
        self.lock().events.push(Event::CopyBufferToImage {
            src: buffer.as_raw(),
            dst: image.as_raw(),
        });
    }

    fn cmd_bind_pipeline(&self, _command_buffer: vk::CommandBuffer, _pipeline: vk::Pipeline) {}

    fn cmd_bind_vertex_buffer(&self, _command_buffer: vk::CommandBuffer, buffer: vk::Buffer) {
        self.lock().events.push(Event::BindVertexBuffer(buffer.as_raw()));
    }

    fn cmd_push_constants(
        &self,
        _command_buffer: vk::CommandBuffer,
        _layout: vk::PipelineLayout,
        _stages: vk::ShaderStageFlags,
        data: &[u8],
    ) {
        assert_eq!(data.len(), 64, "push constant block must be one mat4");
    }

    fn cmd_bind_descriptor_set(
        &self,
        _command_buffer: vk::CommandBuffer,
        _layout: vk::PipelineLayout,
        set: vk::DescriptorSet,
    ) {
        assert_ne!(set, vk::DescriptorSet::null());
    }

    fn cmd_draw(&self, _command_buffer: vk::CommandBuffer, vertex_count: u32) {
        self.lock().events.push(Event::Draw(vertex_count));
    }
}

#[derive(Default)]
struct HostScript {
    recording: Option<RecordingState>,
    texture: Option<HostImage>,
    buffer: Option<HostBuffer>,
    outside_render_pass_calls: usize,
    begin_render_pass_hook: Option<vk::PFN_vkCmdBeginRenderPass>,
}

static HOST_BEGIN_RENDER_PASS_CALLS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "system" fn host_begin_render_pass(
    _command_buffer: vk::CommandBuffer,
    _begin_info: *const vk::RenderPassBeginInfo,
    _contents: vk::SubpassContents,
) {
    HOST_BEGIN_RENDER_PASS_CALLS.fetch_add(1, Ordering::SeqCst);
}

/// Host double; clones share the same script.
#[derive(Clone, Default)]
struct MockHost {
    script: Rc<RefCell<HostScript>>,
}

impl MockHost {
    fn frame(&self, render_pass: u64, current_frame: u64, safe_frame: u64) {
        self.script.borrow_mut().recording = Some(RecordingState {
            command_buffer: vk::CommandBuffer::from_raw(0x9999),
            render_pass: vk::RenderPass::from_raw(render_pass),
            current_frame,
            safe_frame,
        });
    }

    fn no_recording(&self) {
        self.script.borrow_mut().recording = None;
    }
}

impl HostContext for MockHost {
    fn recording_state(&self) -> Option<RecordingState> {
        self.script.borrow().recording
    }

    fn ensure_outside_render_pass(&self) {
        self.script.borrow_mut().outside_render_pass_calls += 1;
    }

    fn access_texture(
        &self,
        _handle: TextureHandle,
        layout: vk::ImageLayout,
        _stage: vk::PipelineStageFlags,
        _access: vk::AccessFlags,
    ) -> Option<HostImage> {
        assert_eq!(layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        self.script.borrow().texture
    }

    fn access_buffer(
        &self,
        _handle: BufferHandle,
        _stage: vk::PipelineStageFlags,
        _access: vk::AccessFlags,
        _mode: ResourceAccess,
    ) -> Option<HostBuffer> {
        self.script.borrow().buffer
    }

    fn intercept_begin_render_pass(
        &self,
        replacement: vk::PFN_vkCmdBeginRenderPass,
    ) -> Option<vk::PFN_vkCmdBeginRenderPass> {
        self.script.borrow_mut().begin_render_pass_hook = Some(replacement);
        Some(host_begin_render_pass)
    }
}

fn new_plugin() -> (Arc<MockDevice>, MockHost, RenderPlugin<MockDevice, MockHost>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let api = Arc::new(MockDevice::default());
    let host = MockHost::default();
    let pixels = vec![0x7fu8; 64 * 64 * 4];
    let plugin = RenderPlugin::initialize(
        Arc::clone(&api),
        host.clone(),
        &PluginConfig::default(),
        &pixels,
        64,
        64,
    )
    .expect("initialization");
    (api, host, plugin)
}

fn triangle() -> Vec<Vertex> {
    vec![
        Vertex {
            position: [0.0, 0.5, 0.0],
            color: [255, 0, 0, 255],
            uv: [0.5, 1.0],
        },
        Vertex {
            position: [-0.5, -0.5, 0.0],
            color: [0, 255, 0, 255],
            uv: [0.0, 0.0],
        },
        Vertex {
            position: [0.5, -0.5, 0.0],
            color: [0, 0, 255, 255],
            uv: [1.0, 0.0],
        },
    ]
}

fn position(events: &[Event], matcher: impl Fn(&Event) -> bool) -> usize {
    events
        .iter()
        .position(matcher)
        .unwrap_or_else(|| panic!("expected event missing from {events:?}"))
}

#[test]
fn initialization_uploads_and_binds_a_shader_readable_texture() {
    let (api, _host, _plugin) = new_plugin();
    let events = api.events();

    let to_dst = position(&events, |e| {
        matches!(e, Event::Barrier { old, new }
            if *old == vk::ImageLayout::UNDEFINED && *new == vk::ImageLayout::TRANSFER_DST_OPTIMAL)
    });
    let copy = position(&events, |e| matches!(e, Event::CopyBufferToImage { .. }));
    let to_read = position(&events, |e| {
        matches!(e, Event::Barrier { old, new }
            if *old == vk::ImageLayout::TRANSFER_DST_OPTIMAL
                && *new == vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
    });
    assert!(to_dst < copy && copy < to_read, "upload steps out of order");

    // The descriptor write sees the plugin's image view in its final layout.
    let image_raw = match &events[position(&events, |e| matches!(e, Event::CreateImage(_)))] {
        Event::CreateImage(raw) => *raw,
        _ => unreachable!(),
    };
    assert!(events.contains(&Event::WriteDescriptor {
        view: image_raw,
        layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    }));

    // The setup staging buffer dies synchronously during initialization.
    assert_eq!(api.live_buffers(), 0);
}

#[test]
fn draw_defers_vertex_buffer_destruction_until_its_frame_is_safe() {
    let (api, host, mut plugin) = new_plugin();
    let transform = Matrix4::identity();

    host.frame(0xA, 10, 8);
    plugin.draw(&transform, &triangle()).expect("first draw");
    assert_eq!(api.count(|e| matches!(e, Event::Draw(3))), 1);
    assert_eq!(api.live_buffers(), 1, "frame 10 buffer must stay alive");
    assert_eq!(api.count(|e| matches!(e, Event::DestroyBuffer(_))), 1); // init staging only

    host.frame(0xA, 11, 10);
    plugin.draw(&transform, &triangle()).expect("second draw");
    // Frame 10 is now safe: its buffer is reclaimed, frame 11's survives.
    assert_eq!(api.live_buffers(), 1);
    assert_eq!(api.count(|e| matches!(e, Event::DestroyBuffer(_))), 2);

    host.frame(0xA, 12, 11);
    plugin.collect();
    assert_eq!(api.live_buffers(), 0);

    // Same render pass throughout: the pipeline was built exactly once.
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipeline(_))), 1);
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipelineLayout)), 1);
}

#[test]
fn draw_without_recording_state_is_a_no_op() {
    let (api, host, mut plugin) = new_plugin();
    host.no_recording();
    let before = api.events().len();
    plugin.draw(&Matrix4::identity(), &triangle()).expect("draw");
    assert_eq!(api.events().len(), before);
}

#[test]
fn render_pass_change_rebuilds_the_pipeline_and_retires_the_old_one() {
    let (api, host, mut plugin) = new_plugin();
    let transform = Matrix4::identity();

    host.frame(0xA, 1, 0);
    plugin.draw(&transform, &triangle()).expect("pass A");
    host.frame(0xA, 2, 1);
    plugin.draw(&transform, &triangle()).expect("pass A again");
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipeline(_))), 1);

    // Frame 2 may still be executing with the old pipeline bound, so the
    // pass change must not destroy it yet.
    host.frame(0xB, 3, 2);
    plugin.draw(&transform, &triangle()).expect("pass B");
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipeline(_))), 2);
    assert_eq!(api.count(|e| matches!(e, Event::DestroyPipeline(_))), 0);

    // Once frame 3 is reported safe the retired pipeline is destroyed.
    host.frame(0xB, 4, 3);
    plugin.draw(&transform, &triangle()).expect("pass B again");
    assert_eq!(api.count(|e| matches!(e, Event::DestroyPipeline(_))), 1);
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipeline(_))), 2);

    // The layout is pass-independent and never rebuilt.
    assert_eq!(api.count(|e| matches!(e, Event::CreatePipelineLayout)), 1);
    // Shader modules only live for the duration of a build.
    assert_eq!(api.live_shader_modules(), 0);
}

#[test]
fn retired_pipeline_outlives_shutdown_wait_when_never_safe() {
    let (api, host, mut plugin) = new_plugin();
    let transform = Matrix4::identity();

    host.frame(0xA, 1, 0);
    plugin.draw(&transform, &triangle()).expect("pass A");
    host.frame(0xB, 2, 1);
    plugin.draw(&transform, &triangle()).expect("pass B");
    assert_eq!(api.count(|e| matches!(e, Event::DestroyPipeline(_))), 0);

    plugin.shutdown().expect("shutdown");

    let events = api.events();
    let wait = position(&events, |e| matches!(e, Event::DeviceWaitIdle));
    let first_destroy = position(&events, |e| matches!(e, Event::DestroyPipeline(_)));
    assert!(wait < first_destroy, "pipelines may only die after the idle wait");
    // Both the retired and the current pipeline are gone.
    assert_eq!(api.count(|e| matches!(e, Event::DestroyPipeline(_))), 2);
}

#[test]
fn transient_buffer_failure_skips_the_frame_without_surfacing() {
    let (api, host, mut plugin) = new_plugin();
    let transform = Matrix4::identity();

    host.frame(0xA, 1, 0);
    api.lock().fail_buffer_creates = Some(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
    plugin
        .draw(&transform, &triangle())
        .expect("a lost frame must not surface as an error");
    assert_eq!(api.count(|e| matches!(e, Event::Draw(_))), 0);

    // The next frame draws normally once allocation recovers.
    api.lock().fail_buffer_creates = None;
    host.frame(0xA, 2, 1);
    plugin.draw(&transform, &triangle()).expect("recovered draw");
    assert_eq!(api.count(|e| matches!(e, Event::Draw(3))), 1);
}

#[test]
fn texture_streaming_retires_the_previous_staging_buffer() {
    let (api, host, mut plugin) = new_plugin();
    let handle = TextureHandle(1);
    host.script.borrow_mut().texture = Some(HostImage {
        image: vk::Image::from_raw(0x777),
        layout: vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    });

    host.frame(0xA, 5, 3);
    let (ptr, row_pitch) = plugin
        .begin_modify_texture(handle, 16, 8)
        .expect("first begin");
    assert_eq!(row_pitch, 16 * 4);
    unsafe {
        std::ptr::write_bytes(ptr.cast::<u8>(), 0xab, (row_pitch * 8) as usize);
    }
    assert!(plugin.end_modify_texture(handle, 16, 8));
    assert!(api
        .events()
        .iter()
        .any(|e| matches!(e, Event::CopyBufferToImage { dst: 0x777, .. })));
    assert_eq!(host.script.borrow().outside_render_pass_calls, 1);
    assert_eq!(api.live_buffers(), 1);

    // A new cycle retires the old staging buffer but must not destroy it
    // while its frame is still in flight.
    host.frame(0xA, 6, 4);
    plugin
        .begin_modify_texture(handle, 16, 8)
        .expect("second begin");
    assert_eq!(api.live_buffers(), 2);

    host.frame(0xA, 7, 6);
    plugin.collect();
    assert_eq!(api.live_buffers(), 1, "only the current staging remains");
}

#[test]
fn end_modify_texture_without_a_begin_records_nothing() {
    let (api, host, mut plugin) = new_plugin();
    host.frame(0xA, 1, 0);
    host.script.borrow_mut().texture = Some(HostImage {
        image: vk::Image::from_raw(0x777),
        layout: vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    });
    let before = api.events().len();
    assert!(!plugin.end_modify_texture(TextureHandle(9), 16, 8));
    assert_eq!(api.events().len(), before);
}

#[test]
fn vertex_buffer_streaming_flushes_only_non_coherent_memory() {
    let (api, host, mut plugin) = new_plugin();
    let handle = BufferHandle(2);
    let mut backing = vec![0u8; 256];

    host.frame(0xA, 1, 0);
    host.script.borrow_mut().buffer = Some(HostBuffer {
        buffer: vk::Buffer::from_raw(0x556),
        memory: vk::DeviceMemory::from_raw(0x555),
        offset: 0,
        size: 256,
        mapped: backing.as_mut_ptr().cast(),
        flags: vk::MemoryPropertyFlags::HOST_VISIBLE,
        size_in_bytes: 240,
    });

    let (ptr, size) = plugin
        .begin_modify_vertex_buffer(handle)
        .expect("begin modify");
    assert_eq!(size, 240);
    assert!(!ptr.is_null());

    plugin.end_modify_vertex_buffer(handle);
    assert_eq!(api.count(|e| matches!(e, Event::FlushRanges(0x555))), 1);

    // Coherent memory needs no flush.
    host.script.borrow_mut().buffer.as_mut().unwrap().flags =
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
    plugin.end_modify_vertex_buffer(handle);
    assert_eq!(api.count(|e| matches!(e, Event::FlushRanges(0x555))), 1);
}

#[test]
fn initialization_rejects_pixel_data_of_the_wrong_length() {
    let api = Arc::new(MockDevice::default());
    let pixels = vec![0x7fu8; 64 * 64 * 4 - 1];
    let result = RenderPlugin::initialize(
        Arc::clone(&api),
        MockHost::default(),
        &PluginConfig::default(),
        &pixels,
        64,
        64,
    );
    assert!(matches!(result, Err(PluginError::InitializationFailed(_))));
    assert!(api.events().is_empty(), "no device objects may be created");
}

#[test]
fn initialization_registers_a_forwarding_render_pass_hook() {
    let (_api, host, _plugin) = new_plugin();
    let hook = host
        .script
        .borrow()
        .begin_render_pass_hook
        .expect("hook registered during initialization");

    let before = HOST_BEGIN_RENDER_PASS_CALLS.load(Ordering::SeqCst);
    let begin_info = vk::RenderPassBeginInfo::default();
    unsafe {
        hook(
            vk::CommandBuffer::from_raw(0x1),
            &begin_info,
            vk::SubpassContents::INLINE,
        );
    }
    assert_eq!(HOST_BEGIN_RENDER_PASS_CALLS.load(Ordering::SeqCst), before + 1);
}

#[test]
fn zero_size_buffer_is_rejected_before_any_device_call() {
    let api = Arc::new(MockDevice::default());
    let result = Buffer::new(&api, 0, vk::BufferUsageFlags::TRANSFER_SRC);
    assert!(matches!(result, Err(PluginError::ZeroSizeBuffer)));
    assert!(api.events().is_empty());
}

#[test]
fn shutdown_waits_for_idle_and_releases_everything() {
    let (api, host, mut plugin) = new_plugin();

    // Leave one retired buffer whose frame never becomes safe.
    host.frame(0xA, 1, 0);
    plugin
        .draw(&Matrix4::identity(), &triangle())
        .expect("draw");
    assert_eq!(api.live_buffers(), 1);

    plugin.shutdown().expect("shutdown");

    let events = api.events();
    let wait = position(&events, |e| matches!(e, Event::DeviceWaitIdle));
    let last_destroy = events
        .iter()
        .rposition(|e| matches!(e, Event::DestroyBuffer(_)))
        .expect("retired buffer destroyed");
    assert!(wait < last_destroy, "destruction must follow the idle wait");

    assert_eq!(api.live_buffers(), 0);
    assert_eq!(api.live_images(), 0);
    assert_eq!(api.live_allocations(), 0);
    assert_eq!(api.live_shader_modules(), 0);
}
