// Vulkan loader and procedure address resolution
//
// Skia asks for every Vulkan entry point by name. Some of them only resolve
// per-device, so lookups go device-level first and fall back to instance-level.

use ash::{vk, Entry};
use std::ffi::CStr;

use crate::error::BridgeError;
use crate::locator::NativeHandleSet;

/// Load the system Vulkan loader (`libvulkan.so.1`, `vulkan-1.dll`, ...).
pub fn load_vulkan_loader() -> Result<Entry, BridgeError> {
    // Safety: the loader is a well-known system library; ash only resolves
    // vkGetInstanceProcAddr from it.
    let entry = unsafe { Entry::load() }.map_err(|e| BridgeError::NativeLoad(e.to_string()))?;
    log::info!("Vulkan loader available");
    Ok(entry)
}

/// One step in the lookup chain.
pub trait ProcResolver {
    fn label(&self) -> &'static str;

    /// Address of `symbol`, or `None` if this resolver does not know it.
    fn resolve(&self, symbol: &CStr) -> vk::PFN_vkVoidFunction;
}

/// `vkGetDeviceProcAddr` on the borrowed device.
pub struct DeviceProcResolver {
    get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
    device: vk::Device,
}

impl DeviceProcResolver {
    pub fn new(entry: &Entry, instance: vk::Instance, device: vk::Device) -> Self {
        // Only reads the instance dispatch table; the instance stays owned by the host
        let instance_fns = unsafe { ash::Instance::load(entry.static_fn(), instance) };
        Self {
            get_device_proc_addr: instance_fns.fp_v1_0().get_device_proc_addr,
            device,
        }
    }
}

impl ProcResolver for DeviceProcResolver {
    fn label(&self) -> &'static str {
        "device"
    }

    fn resolve(&self, symbol: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { (self.get_device_proc_addr)(self.device, symbol.as_ptr()) }
    }
}

/// `vkGetInstanceProcAddr` on the borrowed instance.
pub struct InstanceProcResolver {
    entry: Entry,
    instance: vk::Instance,
}

impl InstanceProcResolver {
    pub fn new(entry: &Entry, instance: vk::Instance) -> Self {
        Self {
            entry: entry.clone(),
            instance,
        }
    }
}

impl ProcResolver for InstanceProcResolver {
    fn label(&self) -> &'static str {
        "instance"
    }

    fn resolve(&self, symbol: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { self.entry.get_instance_proc_addr(self.instance, symbol.as_ptr()) }
    }
}

/// Ordered list of resolvers; the first non-null address wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ProcResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device-level lookup first, then instance-level.
    pub fn for_handles(entry: &Entry, handles: &NativeHandleSet) -> Self {
        Self::new()
            .with(DeviceProcResolver::new(entry, handles.instance, handles.device))
            .with(InstanceProcResolver::new(entry, handles.instance))
    }

    pub fn with(mut self, resolver: impl ProcResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn resolve(&self, symbol: &CStr) -> vk::PFN_vkVoidFunction {
        for resolver in &self.resolvers {
            if let Some(f) = resolver.resolve(symbol) {
                log::trace!("resolved {:?} via {}", symbol, resolver.label());
                return Some(f);
            }
        }
        log::debug!("no resolver knows {:?}", symbol);
        None
    }
}
