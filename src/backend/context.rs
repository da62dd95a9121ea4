// Context bridge - turns borrowed Vulkan handles into a skia GPU canvas
//
// Steps (any failure aborts and releases what was built so far):
// 1. Resolver chain over the loader (device-level, then instance-level)
// 2. skia Vulkan backend context + DirectContext
// 3. Offscreen render target, BGRA8888 premultiplied

use ash::vk::Handle;
use ash::Entry;
use skia_safe::gpu::{self, vk as skvk};
use std::ffi::{c_void, CStr};
use std::ptr;

use super::loader::ResolverChain;
use crate::canvas::{CanvasSpec, GpuCanvas};
use crate::error::BridgeError;
use crate::locator::NativeHandleSet;

/// Builds the GPU canvas on the host's device. The handles stay owned by the host.
pub fn create_gpu_canvas(
    entry: &Entry,
    handles: &NativeHandleSet,
    spec: CanvasSpec,
) -> Result<GpuCanvas, BridgeError> {
    let resolver = ResolverChain::for_handles(entry, handles);
    let get_proc = |of: skvk::GetProcOf| -> *const c_void {
        let name = match of {
            skvk::GetProcOf::Instance(_, name) | skvk::GetProcOf::Device(_, name) => name,
        };
        // Safety: skia passes NUL-terminated entry point names
        let symbol = unsafe { CStr::from_ptr(name) };
        match resolver.resolve(symbol) {
            Some(f) => f as *const c_void,
            None => ptr::null(),
        }
    };

    let mut context = {
        // Safety: the handles were read from a live host device and outlive this bridge
        let backend = unsafe {
            skvk::BackendContext::new(
                handles.instance.as_raw() as usize as _,
                handles.physical_device.as_raw() as usize as _,
                handles.device.as_raw() as usize as _,
                (
                    handles.queue.as_raw() as usize as _,
                    handles.queue_family_index as usize,
                ),
                &get_proc,
            )
        };
        gpu::direct_contexts::make_vulkan(&backend, None).ok_or(BridgeError::ContextCreation)?
    };
    log::info!(
        "Created skia Vulkan context on host device (queue family {})",
        handles.queue_family_index
    );

    let surface = gpu::surfaces::render_target(
        &mut context,
        gpu::Budgeted::Yes,
        &spec.image_info(),
        None,
        gpu::SurfaceOrigin::TopLeft,
        None,
        false,
        None,
    );

    let Some(surface) = surface else {
        log::warn!("Render target allocation failed; releasing GPU context");
        context.free_gpu_resources();
        drop(context);
        return Err(BridgeError::SurfaceCreation {
            width: spec.width,
            height: spec.height,
        });
    };

    log::info!("Created {}x{} GPU surface", spec.width, spec.height);
    Ok(GpuCanvas::new(surface, context, spec))
}
