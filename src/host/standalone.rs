// Standalone host - a minimal engine stand-in for running the bridge outside
// of a real engine.
//
// Owns its own headless Vulkan device and publishes the handles through an
// engine-shaped object graph, so the locator does real work:
//
//   Engine.Graphics.GraphicsDevice
//   ├── Adapter: Engine.Graphics.GraphicsAdapter { NativePhysicalDevice }
//   ├── NativeState: Engine.Graphics.Vulkan.DeviceState
//   │     { NativeInstance, NativeDevice, NativeCommandQueue, QueueFamilyIndex, Owner -> root }
//   └── Features: System.Collections.Generic.Dictionary (not traversed)

use ash::vk::Handle;
use std::rc::Rc;

use super::{GraphicsBackend, HostEngine};
use crate::backend::VulkanDevice;
use crate::locator::{DynamicObject, Member, MemberValue, ObjectRef};

pub struct StandaloneHost {
    // Declared before the device: the graph only mirrors raw handle values
    root: Option<Rc<DynamicObject>>,
    device: Option<VulkanDevice>,
}

impl StandaloneHost {
    /// Creates a Vulkan device if possible; otherwise the host reports no backend.
    pub fn new(app_name: &str, enable_validation: bool) -> Self {
        match VulkanDevice::new(app_name, enable_validation) {
            Ok(device) => {
                let root = Self::build_graph(&device);
                Self {
                    root: Some(root),
                    device: Some(device),
                }
            }
            Err(e) => {
                log::warn!("Standalone host has no Vulkan device: {:#}", e);
                Self::without_gpu()
            }
        }
    }

    /// A host that never offers a GPU.
    pub fn without_gpu() -> Self {
        Self {
            root: None,
            device: None,
        }
    }

    pub fn gpu_name(&self) -> Option<String> {
        self.device.as_ref().map(VulkanDevice::name)
    }

    fn build_graph(device: &VulkanDevice) -> Rc<DynamicObject> {
        let root = DynamicObject::new("Engine.Graphics.GraphicsDevice");

        let adapter = DynamicObject::new("Engine.Graphics.GraphicsAdapter");
        adapter.set_pointer("NativePhysicalDevice", "System.IntPtr", device.physical_device.as_raw());
        adapter.push(Member::new(
            "Description",
            "System.String",
            MemberValue::Unreadable("string members are not mirrored".into()),
        ));

        let state = DynamicObject::new("Engine.Graphics.Vulkan.DeviceState");
        state.set_pointer("NativeInstance", "Vortice.Vulkan.VkInstance", device.instance.handle().as_raw());
        state.set_pointer("NativeDevice", "Vortice.Vulkan.VkDevice", device.device.handle().as_raw());
        state.set_pointer("NativeCommandQueue", "Vortice.Vulkan.VkQueue", device.graphics_queue.as_raw());
        state.set_integer("QueueFamilyIndex", "System.UInt32", u64::from(device.graphics_queue_family));
        state.set_object("Owner", "Engine.Graphics.GraphicsDevice", root.clone());

        let features = DynamicObject::new("System.Collections.Generic.Dictionary");
        features.set_integer("Count", "System.Int32", 0);

        root.set_object("Adapter", "Engine.Graphics.GraphicsAdapter", adapter);
        root.set_object("NativeState", "Engine.Graphics.Vulkan.DeviceState", state);
        root.set_object("Features", "System.Collections.Generic.Dictionary", features);
        root.set_integer("FrameIndex", "System.Int64", 0);
        root
    }
}

impl HostEngine for StandaloneHost {
    fn graphics_backend(&self) -> GraphicsBackend {
        if self.device.is_some() {
            GraphicsBackend::Vulkan
        } else {
            GraphicsBackend::None
        }
    }

    fn device_object(&self) -> Option<ObjectRef> {
        self.root.clone().map(|root| root as ObjectRef)
    }
}

impl Drop for StandaloneHost {
    fn drop(&mut self) {
        // Break the Owner back reference so the graph is freed
        if let Some(root) = self.root.take() {
            root.clear();
        }
        if let Some(device) = &self.device {
            let _ = device.wait_idle();
        }
    }
}
