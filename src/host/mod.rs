// Host engine seam
//
// The bridge only needs three things from the engine: which graphics API is
// active, the device object to search for native handles, and a texture to
// upload into (see `upload::HostTexture`).

pub mod standalone;

use crate::locator::{HandleLocator, HandleSource, LocatorConfig, ObjectRef};

/// Graphics API the host engine is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBackend {
    Vulkan,
    Direct3D11,
    Direct3D12,
    OpenGl,
    Metal,
    None,
}

pub trait HostEngine {
    fn graphics_backend(&self) -> GraphicsBackend;

    /// Root of the engine's device object graph, if the engine has a device.
    fn device_object(&self) -> Option<ObjectRef>;

    /// Where the native handles come from.
    ///
    /// Defaults to walking `device_object()`; hosts with typed accessors override this.
    fn handle_source(&self, config: &LocatorConfig) -> Option<Box<dyn HandleSource>> {
        let root = self.device_object()?;
        let located = HandleLocator::new(config.clone()).locate(&root);
        Some(Box::new(located))
    }
}
