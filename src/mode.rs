// Mode selector
//
// Init -> TryGpu -> GpuActive | CpuFallback, decided once at startup.
// Later GPU failures (readback) never send the run back through here.

use crate::backend::{context, loader};
use crate::canvas::{Canvas, CpuCanvas, GpuCanvas};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::host::{GraphicsBackend, HostEngine};
use crate::locator::{NativeHandleSet, Role};

/// Which canvas variant is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Gpu,
    Cpu,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Gpu => "GPU",
            Mode::Cpu => "CPU",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Init,
    TryGpu,
    GpuActive,
    CpuFallback,
}

/// Outcome of the one-shot mode decision.
pub struct Selection {
    pub canvas: Canvas,
    /// Why the GPU path was not taken, if it wasn't.
    pub fallback: Option<BridgeError>,
}

pub struct ModeSelector {
    state: SelectorState,
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeSelector {
    pub fn new() -> Self {
        Self {
            state: SelectorState::Init,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    fn transition(&mut self, next: SelectorState) {
        log::debug!("mode selector: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs the state machine to a terminal state.
    ///
    /// Only a failed CPU surface allocation is an error; every GPU failure
    /// lands in `CpuFallback` with the reason attached.
    pub fn select(&mut self, host: &dyn HostEngine, config: &BridgeConfig) -> Result<Selection, BridgeError> {
        let fallback = if config.prefer_gpu {
            self.transition(SelectorState::TryGpu);
            match Self::try_gpu(host, config) {
                Ok(gpu) => {
                    self.transition(SelectorState::GpuActive);
                    log::info!("Mode: GPU (sharing the host's Vulkan device)");
                    return Ok(Selection {
                        canvas: Canvas::Gpu(gpu),
                        fallback: None,
                    });
                }
                Err(e) => {
                    log::warn!("GPU bridging failed, falling back to CPU: {}", e);
                    Some(e)
                }
            }
        } else {
            log::info!("GPU bridging disabled by configuration");
            None
        };

        self.transition(SelectorState::CpuFallback);
        let cpu = CpuCanvas::new(config.spec)?;
        log::info!("Mode: CPU raster");
        Ok(Selection {
            canvas: Canvas::Cpu(cpu),
            fallback,
        })
    }

    fn try_gpu(host: &dyn HostEngine, config: &BridgeConfig) -> Result<GpuCanvas, BridgeError> {
        let handles = Self::resolve_handles(host, config)?;
        let entry = loader::load_vulkan_loader()?;
        context::create_gpu_canvas(&entry, &handles, config.spec)
    }

    /// Backend check plus handle discovery, without touching the GPU.
    pub fn resolve_handles(host: &dyn HostEngine, config: &BridgeConfig) -> Result<NativeHandleSet, BridgeError> {
        let backend = host.graphics_backend();
        if backend != GraphicsBackend::Vulkan {
            return Err(BridgeError::UnsupportedBackend(backend));
        }

        let source = host
            .handle_source(&config.locator)
            .ok_or_else(|| BridgeError::MissingMember {
                roles: Role::REQUIRED.to_vec(),
            })?;
        NativeHandleSet::collect(source.as_ref())
    }
}

