//! Image layout transitions and the staged texture upload path
//!
//! Exactly three transitions are legal, each with a fixed stage/access pair.
//! Anything else is a static policy bug: the request fails without touching
//! the image, and is not retried.
//!
//! Upload is a one-time initialization path: staging buffer, transition to
//! transfer destination, whole-extent copy, transition to shader-read, then
//! the staging buffer is destroyed synchronously after a queue-wait rather
//! than going through the deferred reclamation queue.

use ash::vk;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::buffer::Buffer;
use crate::commands::CommandPool;
use crate::error::{PluginError, PluginResult};
use crate::image::Image;

/// Stage and access masks for one legal layout transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransitionMasks {
    /// Pipeline stage the barrier waits on
    pub src_stage: vk::PipelineStageFlags,
    /// Pipeline stage the barrier unblocks
    pub dst_stage: vk::PipelineStageFlags,
    /// Accesses that must complete before the transition
    pub src_access: vk::AccessFlags,
    /// Accesses that wait for the transition
    pub dst_access: vk::AccessFlags,
}

/// Map an (old, new) layout pair onto its fixed barrier masks.
///
/// The legal pairs are the three this plugin's lifecycle needs; any other
/// request is a contract violation surfaced as
/// [`PluginError::UnsupportedLayoutTransition`].
pub fn transition_masks(
    old: vk::ImageLayout,
    new: vk::ImageLayout,
) -> PluginResult<TransitionMasks> {
    match (old, new) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => {
            Ok(TransitionMasks {
                src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
                dst_stage: vk::PipelineStageFlags::TRANSFER,
                src_access: vk::AccessFlags::empty(),
                dst_access: vk::AccessFlags::TRANSFER_WRITE,
            })
        }
        (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
            Ok(TransitionMasks {
                src_stage: vk::PipelineStageFlags::TRANSFER,
                dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
                src_access: vk::AccessFlags::TRANSFER_WRITE,
                dst_access: vk::AccessFlags::SHADER_READ,
            })
        }
        // Reserved for attachment use.
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL) => {
            Ok(TransitionMasks {
                src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
                dst_stage: vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
                src_access: vk::AccessFlags::empty(),
                dst_access: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            })
        }
        _ => Err(PluginError::UnsupportedLayoutTransition { old, new }),
    }
}

/// Aspect mask for a transition target: depth(+stencil) for attachment
/// layouts, color otherwise.
pub fn transition_aspect(format: vk::Format, new: vk::ImageLayout) -> vk::ImageAspectFlags {
    if new == vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL {
        let mut aspect = vk::ImageAspectFlags::DEPTH;
        if has_stencil_component(format) {
            aspect |= vk::ImageAspectFlags::STENCIL;
        }
        aspect
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

fn has_stencil_component(format: vk::Format) -> bool {
    format == vk::Format::D32_SFLOAT_S8_UINT || format == vk::Format::D24_UNORM_S8_UINT
}

/// Transition `image` to `new`, recording the barrier into a single-use
/// command buffer and waiting for it. The image's layout field advances only
/// after the wait returns.
pub fn transition_layout<A: DeviceApi>(
    api: &Arc<A>,
    pool: &CommandPool<A>,
    image: &mut Image<A>,
    new: vk::ImageLayout,
) -> PluginResult<()> {
    let old = image.layout();
    let masks = transition_masks(old, new)?;
    let aspect = transition_aspect(image.format(), new);

    let barrier = vk::ImageMemoryBarrier::builder()
        .old_layout(old)
        .new_layout(new)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image.handle())
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(masks.src_access)
        .dst_access_mask(masks.dst_access)
        .build();

    pool.submit_once(|cmd| {
        api.cmd_pipeline_barrier(cmd, masks.src_stage, masks.dst_stage, &barrier);
    })?;

    image.set_layout(new);
    Ok(())
}

/// Move decoded pixels into `image` and leave it shader-readable.
///
/// `pixels` must hold the full extent's worth of tightly packed texel bytes.
pub fn upload_pixels<A: DeviceApi>(
    api: &Arc<A>,
    pool: &CommandPool<A>,
    image: &mut Image<A>,
    pixels: &[u8],
) -> PluginResult<()> {
    let staging = Buffer::new(
        api,
        pixels.len() as vk::DeviceSize,
        vk::BufferUsageFlags::TRANSFER_SRC,
    )?;
    staging.write(pixels)?;

    transition_layout(api, pool, image, vk::ImageLayout::TRANSFER_DST_OPTIMAL)?;
    copy_buffer_to_image(api, pool, &staging, image)?;
    transition_layout(api, pool, image, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)?;

    // One-time setup path: the copy has been waited on, so the staging
    // buffer can die here instead of through the reclamation queue.
    drop(staging);

    let (width, height) = image.extent();
    log::info!("uploaded {}x{} texture ({} bytes)", width, height, pixels.len());
    Ok(())
}

fn copy_buffer_to_image<A: DeviceApi>(
    api: &Arc<A>,
    pool: &CommandPool<A>,
    staging: &Buffer<A>,
    image: &Image<A>,
) -> PluginResult<()> {
    let (width, height) = image.extent();
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

    pool.submit_once(|cmd| {
        api.cmd_copy_buffer_to_image(
            cmd,
            staging.handle(),
            image.handle(),
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &region,
        );
    })
}
