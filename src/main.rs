// =============================================================================
// STANDALONE DIAGNOSTIC HOST
// =============================================================================
//
// Runs the bridge without an engine: a headless Vulkan device plays the role
// of the engine's device, an in-memory texture plays the role of the engine's
// texture, and a fixed time step stands in for the frame callback.
//
// Usage: skia-vk-bridge [config.toml]
//
// =============================================================================

use anyhow::{Context, Result};
use skia_vk_bridge::host::standalone::StandaloneHost;
use skia_vk_bridge::{Bridge, Config, HostEngine, MemoryTexture, Presented};

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_or_default(path),
        None => Config::load(),
    };

    init_logging(&config);
    log::info!("Starting skia/vulkan bridge diagnostics");
    log::info!(
        "Canvas: {}x{}, {} frame(s) at {:.4}s",
        config.canvas.width,
        config.canvas.height,
        config.run.frames,
        config.run.frame_delta
    );

    let host = StandaloneHost::new("skia-vk-bridge", config.debug.validation_layers);
    match host.gpu_name() {
        Some(name) => log::info!("Host device: {} ({:?})", name, host.graphics_backend()),
        None => log::info!("Host has no GPU device"),
    }

    let bridge_config = config.bridge_config();
    let mut texture = MemoryTexture::new(config.canvas.width, config.canvas.height);
    let mut bridge = Bridge::initialize(&host, &bridge_config).context("Failed to initialize bridge")?;

    if let Some(reason) = bridge.fallback_reason() {
        log::info!("Running in CPU mode: {}", reason);
    }

    for frame in 1..=config.run.frames {
        let presented = bridge.draw(config.run.frame_delta, &mut texture);

        let report = config.run.report_every;
        if report > 0 && (frame % report == 0 || presented != Presented::Uploaded) {
            log::info!(
                "frame {:>5} t={:>7.2}s mode={} {:?} checksum={:08x}",
                frame,
                bridge.animation().elapsed(),
                bridge.mode().label(),
                presented,
                checksum(texture.bytes())
            );
        }
    }

    let stats = bridge.stats();
    bridge.shutdown();
    // Host (and its Vulkan device) outlives the bridge that borrowed its handles
    drop(host);

    log::info!(
        "Done: {} frames, {} uploads, {} skipped",
        stats.frames,
        stats.uploads,
        stats.skipped_frames
    );
    Ok(())
}

/// Initialize logging from config; RUST_LOG takes precedence
fn init_logging(config: &Config) {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or(config.logging.level.as_str())).init();
}

/// FNV-1a over the texture, enough to see frames change in the log
fn checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(*b)).wrapping_mul(0x0100_0193))
}
