//! Fixed vertex layout for the draw pipeline
//!
//! One interleaved binding: position (3×f32 at offset 0), color (4×u8
//! normalized at offset 12), texcoord (2×f32 at offset 16), stride 24 bytes.
//! The layout is part of the bit-exact surface shared with the fixed shader
//! stages and must not change.

use ash::vk;
use bytemuck::{Pod, Zeroable};

/// Interleaved vertex as consumed by the fixed vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position, location 0
    pub position: [f32; 3],
    /// Normalized RGBA color, location 1
    pub color: [u8; 4],
    /// Texture coordinate, location 2
    pub uv: [f32; 2],
}

/// Byte stride of one vertex.
pub const VERTEX_STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

/// The single vertex buffer binding description.
pub fn binding_description() -> vk::VertexInputBindingDescription {
    vk::VertexInputBindingDescription {
        binding: 0,
        stride: VERTEX_STRIDE,
        input_rate: vk::VertexInputRate::VERTEX,
    }
}

/// Attribute descriptions for position, color, and texcoord.
pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 3] {
    [
        vk::VertexInputAttributeDescription {
            binding: 0,
            location: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 0,
        },
        vk::VertexInputAttributeDescription {
            binding: 0,
            location: 1,
            format: vk::Format::R8G8B8A8_UNORM,
            offset: 12,
        },
        vk::VertexInputAttributeDescription {
            binding: 0,
            location: 2,
            format: vk::Format::R32G32_SFLOAT,
            offset: 16,
        },
    ]
}
