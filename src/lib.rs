// =============================================================================
// SKIA / VULKAN BRIDGE
// =============================================================================
//
// Renders animated 2D content with skia and hands it to a host engine's
// texture, preferring to draw on the host's own Vulkan device.
//
// STARTUP (once):
// ┌─────────────────────────────────────────────────────────────────┐
// │  Host device object graph                                       │
// │    └── Handle locator (bounded BFS)  -> NativeHandleSet         │
// │          └── Context bridge (loader, resolver chain, skia ctx)  │
// │                └── Mode: GPU canvas, or CPU raster on failure   │
// └─────────────────────────────────────────────────────────────────┘
//
// EVERY FRAME:
// 1. Advance animation time by the host's delta
// 2. Draw into the active canvas
// 3. GPU: flush + synchronous readback / CPU: read pixels in place
// 4. Upload the full BGRA buffer to the host texture
//
// =============================================================================

pub mod backend;
pub mod bridge;
pub mod canvas;
pub mod config;
pub mod error;
pub mod frame;
pub mod host;
pub mod locator;
pub mod mode;
pub mod upload;

pub use bridge::{Bridge, BridgeStats};
pub use canvas::{Canvas, CanvasSpec, PixelSource};
pub use config::{BridgeConfig, Config};
pub use error::{BridgeError, HostError};
pub use frame::{progress_width, AnimationState, FrameRenderer};
pub use host::{GraphicsBackend, HostEngine};
pub use locator::{DynamicObject, HandleLocator, HandleSource, LocatorConfig, NativeHandleSet, ObjectRef, Role};
pub use mode::{Mode, ModeSelector, SelectorState};
pub use upload::{present, HostTexture, MemoryTexture, PixelBuffer, Presented};
