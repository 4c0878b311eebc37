//! Descriptor set management
//!
//! One combined image+sampler slot, fragment-stage visible, backed by a small
//! pool. The single steady-state set is allocated and written once, after the
//! image and its view/sampler exist, and never rebound.

use ash::vk;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::error::PluginResult;
use crate::image::Image;

/// Descriptor layout, pool, and the one set binding the static texture.
pub struct DescriptorBindings<A: DeviceApi> {
    api: Arc<A>,
    layout: vk::DescriptorSetLayout,
    pool: vk::DescriptorPool,
    set: vk::DescriptorSet,
}

impl<A: DeviceApi> DescriptorBindings<A> {
    /// Create the set layout (binding 0: combined image sampler, fragment
    /// stage) and a pool with capacity for `max_sets` sets.
    pub fn new(api: &Arc<A>, max_sets: u32) -> PluginResult<Self> {
        let mut bindings = Self {
            api: Arc::clone(api),
            layout: vk::DescriptorSetLayout::null(),
            pool: vk::DescriptorPool::null(),
            set: vk::DescriptorSet::null(),
        };

        let sampler_binding = vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT)
            .build();
        let layout_info =
            vk::DescriptorSetLayoutCreateInfo::builder().bindings(std::slice::from_ref(&sampler_binding));
        bindings.layout = api.create_descriptor_set_layout(&layout_info)?;

        let pool_size = vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: 1,
        };
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .pool_sizes(std::slice::from_ref(&pool_size))
            .max_sets(max_sets);
        bindings.pool = api.create_descriptor_pool(&pool_info)?;

        Ok(bindings)
    }

    /// Allocate the steady-state set and write the image's view and sampler
    /// into binding 0. Called once, after the image is fully constructed.
    pub fn bind_image(&mut self, image: &Image<A>) -> PluginResult<()> {
        let layouts = [self.layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);
        let sets = self.api.allocate_descriptor_sets(&alloc_info)?;
        self.set = sets[0];

        let image_info = vk::DescriptorImageInfo {
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            image_view: image.view(),
            sampler: image.sampler(),
        };
        let write = vk::WriteDescriptorSet::builder()
            .dst_set(self.set)
            .dst_binding(0)
            .dst_array_element(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(std::slice::from_ref(&image_info))
            .build();
        self.api.update_descriptor_sets(&[write]);
        Ok(())
    }

    /// Descriptor set layout, for pipeline layout creation
    pub fn layout(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    /// The bound set, null until [`DescriptorBindings::bind_image`]
    pub fn set(&self) -> vk::DescriptorSet {
        self.set
    }
}

impl<A: DeviceApi> Drop for DescriptorBindings<A> {
    fn drop(&mut self) {
        // Pool destruction frees the set; layout goes last.
        if self.pool != vk::DescriptorPool::null() {
            self.api.destroy_descriptor_pool(self.pool);
        }
        if self.layout != vk::DescriptorSetLayout::null() {
            self.api.destroy_descriptor_set_layout(self.layout);
        }
    }
}
