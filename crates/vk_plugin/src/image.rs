//! Device-local image resources
//!
//! An [`Image`] owns the image handle, its memory, and the optional view and
//! sampler created once the pixel contents exist. The `layout` field is the
//! single source of truth for the GPU-side layout; only the transfer module
//! advances it, and only after the transition command has executed.

use ash::vk;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::config::SamplerConfig;
use crate::error::{PluginError, PluginResult};
use crate::memory::find_memory_type_index;

/// A 2D sampled image in device-local memory.
pub struct Image<A: DeviceApi> {
    api: Arc<A>,
    image: vk::Image,
    memory: vk::DeviceMemory,
    view: vk::ImageView,
    sampler: vk::Sampler,
    format: vk::Format,
    width: u32,
    height: u32,
    mip_levels: u32,
    layout: vk::ImageLayout,
    aspect: vk::ImageAspectFlags,
}

impl<A: DeviceApi> Image<A> {
    /// Create a single-mip 2D image tiled for device-local sampling and bind
    /// device-local memory to it. Fails with [`PluginError::NoSuitableMemoryType`]
    /// if the device exposes no compatible memory type.
    pub fn new(api: &Arc<A>, width: u32, height: u32, format: vk::Format) -> PluginResult<Self> {
        let mut image = Self {
            api: Arc::clone(api),
            image: vk::Image::null(),
            memory: vk::DeviceMemory::null(),
            view: vk::ImageView::null(),
            sampler: vk::Sampler::null(),
            format,
            width,
            height,
            mip_levels: 1,
            layout: vk::ImageLayout::UNDEFINED,
            aspect: vk::ImageAspectFlags::COLOR,
        };

        let image_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);
        image.image = api.create_image(&image_info)?;

        let requirements = api.image_memory_requirements(image.image);
        let memory_properties = api.memory_properties();
        let type_index = find_memory_type_index(
            &memory_properties,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )
        .ok_or(PluginError::NoSuitableMemoryType)?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(type_index);
        image.memory = api.allocate_memory(&alloc_info)?;
        api.bind_image_memory(image.image, image.memory)?;

        Ok(image)
    }

    /// Create the sampled-image view. Called once the contents exist.
    pub fn create_view(&mut self) -> PluginResult<()> {
        let view_info = vk::ImageViewCreateInfo::builder()
            .image(self.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(self.format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: self.aspect,
                base_mip_level: 0,
                level_count: self.mip_levels,
                base_array_layer: 0,
                layer_count: 1,
            });
        self.view = self.api.create_image_view(&view_info)?;
        Ok(())
    }

    /// Create the sampler used to read this image from the fragment stage.
    pub fn create_sampler(&mut self, config: &SamplerConfig) -> PluginResult<()> {
        let filter = if config.linear_filtering {
            vk::Filter::LINEAR
        } else {
            vk::Filter::NEAREST
        };
        let sampler_info = vk::SamplerCreateInfo::builder()
            .mag_filter(filter)
            .min_filter(filter)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(config.anisotropy_enable)
            .max_anisotropy(config.max_anisotropy)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR);
        self.sampler = self.api.create_sampler(&sampler_info)?;
        Ok(())
    }

    /// Image handle
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Sampled-image view, null until [`Image::create_view`]
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Sampler, null until [`Image::create_sampler`]
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler
    }

    /// Pixel format
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Image extent
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current GPU-side layout
    pub fn layout(&self) -> vk::ImageLayout {
        self.layout
    }

    /// Aspect flags (color vs depth/stencil)
    pub fn aspect(&self) -> vk::ImageAspectFlags {
        self.aspect
    }

    pub(crate) fn set_layout(&mut self, layout: vk::ImageLayout) {
        self.layout = layout;
    }
}

impl<A: DeviceApi> Drop for Image<A> {
    fn drop(&mut self) {
        if self.sampler != vk::Sampler::null() {
            self.api.destroy_sampler(self.sampler);
        }
        if self.view != vk::ImageView::null() {
            self.api.destroy_image_view(self.view);
        }
        if self.image != vk::Image::null() {
            self.api.destroy_image(self.image);
        }
        if self.memory != vk::DeviceMemory::null() {
            self.api.free_memory(self.memory);
        }
    }
}
