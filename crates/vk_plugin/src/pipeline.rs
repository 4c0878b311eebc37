//! Render-pass-keyed pipeline cache
//!
//! The plugin needs exactly one draw pipeline, but its render pass is owned
//! by the host and only known at draw time. The cache compares the pass
//! handle against the last one seen: the pipeline layout is pass-independent
//! and built at most once, while the pipeline object is rebuilt on every pass
//! identity change. The host guarantees render passes are never destroyed
//! and recreated with a different meaning, so identity equality is a
//! sufficient compatibility check.
//!
//! A replaced pipeline may still be bound by command buffers from frames the
//! host has not finished executing, so it is retired through a reclamation
//! queue and destroyed only once its frame is reported safe.

use ash::vk;
use std::ffi::CStr;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::error::PluginResult;
use crate::reclaim::ReclamationQueue;
use crate::shaders;
use crate::vertex;

const SHADER_ENTRY: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") };

/// Push constant block: one 4x4 f32 matrix.
pub const PUSH_CONSTANT_BYTES: u32 = 64;

/// A pipeline no longer bound for new draws but possibly still executing.
struct RetiredPipeline<A: DeviceApi> {
    api: Arc<A>,
    pipeline: vk::Pipeline,
}

impl<A: DeviceApi> Drop for RetiredPipeline<A> {
    fn drop(&mut self) {
        self.api.destroy_pipeline(self.pipeline);
    }
}

/// Lazily built (pipeline, layout) pair keyed by render pass identity.
pub struct PipelineCache<A: DeviceApi> {
    api: Arc<A>,
    layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    last_render_pass: vk::RenderPass,
    retired: ReclamationQueue<RetiredPipeline<A>>,
}

impl<A: DeviceApi> PipelineCache<A> {
    /// Empty cache; nothing is created until the first draw.
    pub fn new(api: &Arc<A>) -> Self {
        Self {
            api: Arc::clone(api),
            layout: vk::PipelineLayout::null(),
            pipeline: vk::Pipeline::null(),
            last_render_pass: vk::RenderPass::null(),
            retired: ReclamationQueue::new(),
        }
    }

    /// Make sure a pipeline exists for `render_pass`. A pipeline displaced by
    /// a pass identity change is retired at `current_frame`.
    ///
    /// Returns the handles to bind, or `None` when a build failed — the
    /// caller skips this frame's draw; the next pass identity change retries.
    pub fn ensure(
        &mut self,
        render_pass: vk::RenderPass,
        descriptor_layout: vk::DescriptorSetLayout,
        current_frame: u64,
    ) -> Option<(vk::Pipeline, vk::PipelineLayout)> {
        if render_pass != self.last_render_pass {
            if self.layout == vk::PipelineLayout::null() {
                match self.build_layout(descriptor_layout) {
                    Ok(layout) => self.layout = layout,
                    Err(e) => log::warn!("pipeline layout creation failed: {e}"),
                }
            }
            if self.layout != vk::PipelineLayout::null() {
                if self.pipeline != vk::Pipeline::null() {
                    // Frames recorded against the previous pass may still be
                    // executing with the old pipeline bound.
                    self.retired.retire(
                        current_frame,
                        RetiredPipeline {
                            api: Arc::clone(&self.api),
                            pipeline: self.pipeline,
                        },
                    );
                    self.pipeline = vk::Pipeline::null();
                }
                match self.build_pipeline(render_pass) {
                    Ok(pipeline) => {
                        log::debug!("rebuilt draw pipeline for new render pass");
                        self.pipeline = pipeline;
                    }
                    Err(e) => log::warn!("pipeline creation failed: {e}"),
                }
            }
            self.last_render_pass = render_pass;
        }

        if self.pipeline != vk::Pipeline::null() && self.layout != vk::PipelineLayout::null() {
            Some((self.pipeline, self.layout))
        } else {
            None
        }
    }

    /// Destroy retired pipelines whose frames the host reports complete.
    pub fn sweep(&mut self, safe_frame: u64) {
        self.retired.sweep(safe_frame);
    }

    fn build_layout(
        &self,
        descriptor_layout: vk::DescriptorSetLayout,
    ) -> PluginResult<vk::PipelineLayout> {
        let push_constant_range = vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size: PUSH_CONSTANT_BYTES,
        };
        let set_layouts = [descriptor_layout];
        let layout_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&set_layouts)
            .push_constant_ranges(std::slice::from_ref(&push_constant_range));
        Ok(self.api.create_pipeline_layout(&layout_info)?)
    }

    fn build_pipeline(&self, render_pass: vk::RenderPass) -> PluginResult<vk::Pipeline> {
        let vertex_module = self.api.create_shader_module(shaders::VERTEX_SHADER_SPIRV)?;
        let fragment_module = match self.api.create_shader_module(shaders::FRAGMENT_SHADER_SPIRV) {
            Ok(module) => module,
            Err(e) => {
                self.api.destroy_shader_module(vertex_module);
                return Err(e.into());
            }
        };

        let result = self.build_with_modules(render_pass, vertex_module, fragment_module);

        // Modules only feed the build; they die here on both paths.
        self.api.destroy_shader_module(vertex_module);
        self.api.destroy_shader_module(fragment_module);
        result
    }

    fn build_with_modules(
        &self,
        render_pass: vk::RenderPass,
        vertex_module: vk::ShaderModule,
        fragment_module: vk::ShaderModule,
    ) -> PluginResult<vk::Pipeline> {
        let stages = [
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_module)
                .name(SHADER_ENTRY)
                .build(),
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_module)
                .name(SHADER_ENTRY)
                .build(),
        ];

        let binding_descriptions = [vertex::binding_description()];
        let attribute_descriptions = vertex::attribute_descriptions();
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::builder()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .line_width(1.0);

        let blend_attachments = [vk::PipelineColorBlendAttachmentState {
            color_write_mask: vk::ColorComponentFlags::RGBA,
            blend_enable: vk::FALSE,
            ..Default::default()
        }];
        let color_blend_state =
            vk::PipelineColorBlendStateCreateInfo::builder().attachments(&blend_attachments);

        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        // Viewport and scissor are set per draw by the host, not baked here.
        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let stencil_op = vk::StencilOpState {
            fail_op: vk::StencilOp::KEEP,
            pass_op: vk::StencilOp::KEEP,
            compare_op: vk::CompareOp::ALWAYS,
            ..Default::default()
        };
        // The host uses reverse Z: greater depth is closer.
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::GREATER_OR_EQUAL)
            .front(stencil_op)
            .back(stencil_op);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::builder()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .rasterization_state(&rasterization_state)
            .color_blend_state(&color_blend_state)
            .multisample_state(&multisample_state)
            .viewport_state(&viewport_state)
            .depth_stencil_state(&depth_stencil_state)
            .dynamic_state(&dynamic_state)
            .layout(self.layout)
            .render_pass(render_pass);

        Ok(self.api.create_graphics_pipeline(&pipeline_info)?)
    }
}

impl<A: DeviceApi> Drop for PipelineCache<A> {
    fn drop(&mut self) {
        if self.pipeline != vk::Pipeline::null() {
            self.api.destroy_pipeline(self.pipeline);
        }
        if self.layout != vk::PipelineLayout::null() {
            self.api.destroy_pipeline_layout(self.layout);
        }
    }
}
