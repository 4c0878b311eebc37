//! Host-visible buffer resources
//!
//! A [`Buffer`] owns its handle, its device memory, and a persistent mapping
//! established once at creation. The mapping stays valid exactly as long as
//! the backing allocation is alive; it is never remapped. Destruction is
//! guarded per sub-handle so a partially constructed buffer tears down
//! cleanly through the same `Drop` path.

use ash::vk;
use std::ffi::c_void;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::error::{PluginError, PluginResult};
use crate::memory::find_memory_type_index;

/// A buffer with bound device memory and a persistent host mapping.
pub struct Buffer<A: DeviceApi> {
    api: Arc<A>,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    mapped: *mut c_void,
    size: vk::DeviceSize,
    memory_size: vk::DeviceSize,
    memory_flags: vk::MemoryPropertyFlags,
}

impl<A: DeviceApi> Buffer<A> {
    /// Create a buffer of `size` bytes in host-visible memory, map the whole
    /// allocation, and bind it.
    ///
    /// A zero-byte request is rejected before any API call. Any failing step
    /// releases whatever partial state was built; the caller never observes a
    /// half-constructed buffer.
    pub fn new(
        api: &Arc<A>,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> PluginResult<Self> {
        if size == 0 {
            return Err(PluginError::ZeroSizeBuffer);
        }

        // Null sub-handles from here on; an early return drops through the
        // guarded destructor.
        let mut buffer = Self {
            api: Arc::clone(api),
            buffer: vk::Buffer::null(),
            memory: vk::DeviceMemory::null(),
            mapped: std::ptr::null_mut(),
            size,
            memory_size: 0,
            memory_flags: vk::MemoryPropertyFlags::empty(),
        };

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        buffer.buffer = api.create_buffer(&buffer_info)?;

        let requirements = api.buffer_memory_requirements(buffer.buffer);
        let memory_properties = api.memory_properties();
        let type_index = find_memory_type_index(
            &memory_properties,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        )
        .ok_or(PluginError::NoSuitableMemoryType)?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(type_index);
        buffer.memory = api.allocate_memory(&alloc_info)?;
        buffer.memory_size = requirements.size;
        buffer.memory_flags = memory_properties.memory_types[type_index as usize].property_flags;

        buffer.mapped = api.map_memory(buffer.memory, vk::WHOLE_SIZE)?;
        api.bind_buffer_memory(buffer.buffer, buffer.memory)?;

        Ok(buffer)
    }

    /// Copy `data` into the mapping and, if the memory type is not coherent,
    /// flush the whole allocation so the device observes the write.
    pub fn write(&self, data: &[u8]) -> PluginResult<()> {
        debug_assert!(data.len() as vk::DeviceSize <= self.size);
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.mapped.cast::<u8>(), data.len());
        }
        self.flush()
    }

    /// Flush the mapped allocation if the memory type requires it.
    pub fn flush(&self) -> PluginResult<()> {
        if self
            .memory_flags
            .contains(vk::MemoryPropertyFlags::HOST_COHERENT)
        {
            return Ok(());
        }
        let range = vk::MappedMemoryRange::builder()
            .memory(self.memory)
            .offset(0)
            .size(self.memory_size)
            .build();
        self.api.flush_mapped_memory_ranges(&[range])?;
        Ok(())
    }

    /// Buffer handle for command recording
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Persistent host mapping, valid for the buffer's lifetime
    pub fn mapped_ptr(&self) -> *mut c_void {
        self.mapped
    }

    /// Requested byte size
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Property flags of the selected memory type
    pub fn memory_flags(&self) -> vk::MemoryPropertyFlags {
        self.memory_flags
    }
}

impl<A: DeviceApi> Drop for Buffer<A> {
    fn drop(&mut self) {
        if self.buffer != vk::Buffer::null() {
            self.api.destroy_buffer(self.buffer);
        }
        if !self.mapped.is_null() && self.memory != vk::DeviceMemory::null() {
            self.api.unmap_memory(self.memory);
        }
        if self.memory != vk::DeviceMemory::null() {
            self.api.free_memory(self.memory);
        }
    }
}
