//! One-shot command execution
//!
//! Setup-path work (layout transitions, the initial pixel copy) records into
//! a freshly allocated single-use command buffer that is submitted and waited
//! on before being freed. This serializes setup against the rest of the
//! pipeline: correctness over throughput, off the steady-state draw path.

use ash::vk;
use std::sync::Arc;

use crate::api::DeviceApi;
use crate::error::PluginResult;

/// Command pool for the plugin's one-time submissions.
pub struct CommandPool<A: DeviceApi> {
    api: Arc<A>,
    pool: vk::CommandPool,
}

impl<A: DeviceApi> CommandPool<A> {
    /// Create a pool on the host's graphics queue family.
    pub fn new(api: &Arc<A>) -> PluginResult<Self> {
        let pool_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(api.queue_family_index());
        let pool = api.create_command_pool(&pool_info)?;
        Ok(Self {
            api: Arc::clone(api),
            pool,
        })
    }

    /// Record `record` into a fresh primary command buffer, submit it, and
    /// block until the queue drains. The command buffer is freed afterwards,
    /// success or failure.
    pub fn submit_once(&self, record: impl FnOnce(vk::CommandBuffer)) -> PluginResult<()> {
        let command_buffer = self.api.allocate_command_buffer(self.pool)?;
        let result = self.record_submit_wait(command_buffer, record);
        self.api.free_command_buffer(self.pool, command_buffer);
        result
    }

    fn record_submit_wait(
        &self,
        command_buffer: vk::CommandBuffer,
        record: impl FnOnce(vk::CommandBuffer),
    ) -> PluginResult<()> {
        self.api.begin_command_buffer(command_buffer)?;
        record(command_buffer);
        self.api.end_command_buffer(command_buffer)?;
        self.api.queue_submit(command_buffer)?;
        self.api.queue_wait_idle()?;
        Ok(())
    }
}

impl<A: DeviceApi> Drop for CommandPool<A> {
    fn drop(&mut self) {
        if self.pool != vk::CommandPool::null() {
            self.api.destroy_command_pool(self.pool);
        }
    }
}
