// Bridge - one run of the renderer inside a host engine
//
// initialize: decide the mode once, allocate everything reused per frame
// draw:       advance time, render, read back, upload
// shutdown:   release owned resources in a fixed order

use crate::canvas::{Canvas, CanvasSpec};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::frame::{AnimationState, FrameRenderer};
use crate::host::HostEngine;
use crate::mode::{Mode, ModeSelector};
use crate::upload::{present, HostTexture, PixelBuffer, Presented};

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub frames: u64,
    pub uploads: u64,
    /// Frames whose readback failed; the texture kept the previous frame.
    pub skipped_frames: u64,
    pub upload_errors: u64,
}

impl BridgeStats {
    /// Counts one presented frame.
    fn record(&mut self, outcome: Result<Presented, BridgeError>) -> Presented {
        self.frames += 1;
        match outcome {
            Ok(Presented::Uploaded) => {
                self.uploads += 1;
                Presented::Uploaded
            }
            Ok(Presented::Skipped) => {
                self.skipped_frames += 1;
                Presented::Skipped
            }
            Ok(Presented::UploadFailed) => {
                self.upload_errors += 1;
                Presented::UploadFailed
            }
            Err(e) => {
                log::error!("Frame {} not uploaded: {}", self.frames, e);
                self.upload_errors += 1;
                Presented::UploadFailed
            }
        }
    }
}

pub struct Bridge {
    // Drop order matches shutdown(): canvas first, paints and fonts last
    canvas: Canvas,
    buffer: PixelBuffer,
    renderer: FrameRenderer,
    animation: AnimationState,
    spec: CanvasSpec,
    fallback_reason: Option<String>,
    stats: BridgeStats,
}

impl Bridge {
    /// Decides GPU or CPU mode once and prepares the per-frame resources.
    ///
    /// Fails only if even the CPU canvas cannot be allocated.
    pub fn initialize(host: &dyn HostEngine, config: &BridgeConfig) -> Result<Self, BridgeError> {
        log::info!(
            "Initializing bridge: {}x{} canvas, host backend {:?}",
            config.spec.width,
            config.spec.height,
            host.graphics_backend()
        );

        let selection = ModeSelector::new().select(host, config)?;

        Ok(Self {
            canvas: selection.canvas,
            buffer: PixelBuffer::new(config.spec),
            renderer: FrameRenderer::new(config.background),
            animation: AnimationState::new(),
            spec: config.spec,
            fallback_reason: selection.fallback.map(|e| e.to_string()),
            stats: BridgeStats::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.canvas.mode()
    }

    /// Why GPU bridging was not used, if it was attempted and failed.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// The bytes most recently resolved from the canvas.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Per-frame callback: `delta` is the host's frame time in seconds.
    pub fn draw(&mut self, delta: f64, texture: &mut dyn HostTexture) -> Presented {
        self.animation.advance(delta);
        self.render_current();

        let outcome = present(&mut self.canvas, &mut self.buffer, texture);
        self.stats.record(outcome)
    }

    /// Draws the current animation state without advancing time or uploading.
    pub fn render_current(&mut self) {
        let mode = self.canvas.mode();
        let canvas = self.canvas.surface_canvas();
        self.renderer.draw(canvas, self.spec, &self.animation, mode);
    }

    /// End-of-run teardown: surface, context, CPU canvas, CPU bitmap, paints/fonts.
    pub fn shutdown(self) {
        let Self {
            canvas,
            buffer,
            renderer,
            stats,
            ..
        } = self;
        log::info!(
            "Shutting down bridge after {} frame(s): {} uploaded, {} skipped, {} upload error(s)",
            stats.frames,
            stats.uploads,
            stats.skipped_frames,
            stats.upload_errors
        );
        canvas.release();
        drop(buffer);
        log::info!("Releasing paint and font resources");
        drop(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PixelSource;
    use crate::host::GraphicsBackend;
    use crate::locator::ObjectRef;
    use crate::upload::MemoryTexture;

    struct Headless;

    impl HostEngine for Headless {
        fn graphics_backend(&self) -> GraphicsBackend {
            GraphicsBackend::None
        }

        fn device_object(&self) -> Option<ObjectRef> {
            None
        }
    }

    struct LostDevice;

    impl PixelSource for LostDevice {
        fn read_into(&mut self, _dst: &mut PixelBuffer) -> Result<(), BridgeError> {
            Err(BridgeError::Readback("device lost".into()))
        }
    }

    fn small() -> BridgeConfig {
        BridgeConfig {
            spec: CanvasSpec::new(32, 16),
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn failed_readback_is_counted_and_keeps_the_texture() {
        let mut bridge = Bridge::initialize(&Headless, &small()).unwrap();
        let mut texture = MemoryTexture::new(32, 16);
        assert_eq!(bridge.draw(0.25, &mut texture), Presented::Uploaded);
        let before = texture.bytes().to_vec();

        bridge.animation.advance(0.5);
        bridge.render_current();
        let outcome = present(&mut LostDevice, &mut bridge.buffer, &mut texture);
        assert_eq!(bridge.stats.record(outcome), Presented::Skipped);

        let stats = bridge.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.uploads, 1);
        assert_eq!(stats.skipped_frames, 1);
        assert_eq!(stats.upload_errors, 0);
        assert_eq!(texture.bytes(), &before[..]);
        assert_eq!(texture.uploads(), 1);
        bridge.shutdown();
    }

    #[test]
    fn rejected_upload_is_not_a_skipped_frame() {
        let mut bridge = Bridge::initialize(&Headless, &small()).unwrap();
        let mut texture = MemoryTexture::new(8, 8);
        assert_eq!(bridge.draw(0.1, &mut texture), Presented::UploadFailed);
        assert_eq!(bridge.stats().upload_errors, 1);
        assert_eq!(bridge.stats().skipped_frames, 0);
        bridge.shutdown();
    }
}
