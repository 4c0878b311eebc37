//! Memory-type selection
//!
//! Maps a resource's memory requirements onto the device's enumerated memory
//! types. Drivers order preferred types first, so the scan returns the lowest
//! qualifying index.

use ash::vk;

/// Select a memory type index for an allocation.
///
/// Scans the device's memory types in ascending index order and returns the
/// first index that is both eligible per `type_bits` (bit `i` set means type
/// `i` may back this resource) and carries every flag in `required`.
/// Returns `None` when no type qualifies.
pub fn find_memory_type_index(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    for i in 0..memory_properties.memory_type_count {
        if (type_bits & (1 << i)) != 0
            && memory_properties.memory_types[i as usize]
                .property_flags
                .contains(required)
        {
            return Some(i);
        }
    }
    None
}
