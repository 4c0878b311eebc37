//! Render-pass-begin interception
//!
//! The host dispatches `vkCmdBeginRenderPass` through a patchable table and
//! lets a plugin splice a replacement in front of the real entry point. The
//! replacement installed here forwards every call, optionally overriding the
//! color clear values with a debug green first. Registration happens once at
//! plugin initialization; the state lives in statics because the host calls
//! the replacement with no context pointer.

use ash::vk;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use crate::host::HostContext;

static REAL_BEGIN_RENDER_PASS: AtomicPtr<c_void> = AtomicPtr::new(std::ptr::null_mut());
static OVERRIDE_CLEAR_COLOR: AtomicBool = AtomicBool::new(false);

const OVERRIDE_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const MAX_CLEAR_VALUES: usize = 16;

/// Toggle the color clear override applied on intercepted begins.
pub fn set_clear_color_override(enabled: bool) {
    OVERRIDE_CLEAR_COLOR.store(enabled, Ordering::Relaxed);
}

/// Offer the forwarding replacement to `host`.
///
/// Returns whether the host accepted; a refusing host simply never routes
/// render pass begins through the plugin.
pub fn register_begin_render_pass_hook<H: HostContext>(host: &H) -> bool {
    match host.intercept_begin_render_pass(hook_begin_render_pass) {
        Some(real) => {
            REAL_BEGIN_RENDER_PASS.store(real as *const () as *mut c_void, Ordering::Release);
            true
        }
        None => false,
    }
}

unsafe extern "system" fn hook_begin_render_pass(
    command_buffer: vk::CommandBuffer,
    begin_info: *const vk::RenderPassBeginInfo,
    contents: vk::SubpassContents,
) {
    let real = REAL_BEGIN_RENDER_PASS.load(Ordering::Acquire);
    if real.is_null() {
        return;
    }
    let real: vk::PFN_vkCmdBeginRenderPass = std::mem::transmute(real);

    let begin = *begin_info;
    let count = begin.clear_value_count as usize;
    if OVERRIDE_CLEAR_COLOR.load(Ordering::Relaxed) && count > 0 && count <= MAX_CLEAR_VALUES {
        let mut clears = [vk::ClearValue::default(); MAX_CLEAR_VALUES];
        clears[..count].copy_from_slice(std::slice::from_raw_parts(begin.p_clear_values, count));
        // The last clear value belongs to the depth attachment; leave it.
        for clear in &mut clears[..count - 1] {
            clear.color.float32 = OVERRIDE_COLOR;
        }
        let mut patched = begin;
        patched.p_clear_values = clears.as_ptr();
        real(command_buffer, &patched, contents);
    } else {
        real(command_buffer, begin_info, contents);
    }
}
