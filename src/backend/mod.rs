// Backend module - Vulkan plumbing
//
// loader  - loader library + device/instance procedure lookup chain
// context - skia GPU context and surface on borrowed handles
// device  - headless device owned by the standalone host

pub mod context;
pub mod device;
pub mod loader;

pub use device::VulkanDevice;
pub use loader::{load_vulkan_loader, ProcResolver, ResolverChain};
