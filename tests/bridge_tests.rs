//! End-to-end runs of the bridge against mock hosts.

use skia_vk_bridge::canvas::{Canvas, CanvasSpec, CpuCanvas};
use skia_vk_bridge::frame::{AnimationState, FrameRenderer};
use skia_vk_bridge::host::standalone::StandaloneHost;
use skia_vk_bridge::locator::{DynamicObject, ObjectRef};
use skia_vk_bridge::{
    Bridge, BridgeConfig, BridgeError, GraphicsBackend, HostEngine, MemoryTexture, Mode, ModeSelector, PixelBuffer,
    PixelSource, Presented, SelectorState,
};
use std::rc::Rc;

struct MockHost {
    backend: GraphicsBackend,
    root: Rc<DynamicObject>,
}

impl MockHost {
    /// Device object carrying only the given handle fields.
    fn with_fields(backend: GraphicsBackend, fields: &[&str]) -> Self {
        let root = DynamicObject::new("Engine.Graphics.GraphicsDevice");
        let state = DynamicObject::new("Engine.Graphics.Vulkan.DeviceState");
        for (i, name) in fields.iter().enumerate() {
            if *name == "QueueFamilyIndex" {
                state.set_integer(name, "System.UInt32", 1);
            } else {
                state.set_pointer(name, "System.IntPtr", 0x1000 * (i as u64 + 1));
            }
        }
        state.set_object("Owner", "Engine.Graphics.GraphicsDevice", root.clone());
        root.set_object("NativeState", "Engine.Graphics.Vulkan.DeviceState", state);
        Self { backend, root }
    }
}

impl HostEngine for MockHost {
    fn graphics_backend(&self) -> GraphicsBackend {
        self.backend
    }

    fn device_object(&self) -> Option<ObjectRef> {
        Some(self.root.clone() as ObjectRef)
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        self.root.clear();
    }
}

const ALL_FIELDS: [&str; 5] = [
    "NativeInstance",
    "NativePhysicalDevice",
    "NativeDevice",
    "NativeCommandQueue",
    "QueueFamilyIndex",
];

fn small_config() -> BridgeConfig {
    BridgeConfig {
        spec: CanvasSpec::new(96, 48),
        ..BridgeConfig::default()
    }
}

#[test]
fn host_without_handles_runs_on_cpu() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &[]);
    let config = small_config();
    let mut bridge = Bridge::initialize(&host, &config).unwrap();
    assert_eq!(bridge.mode(), Mode::Cpu);
    assert!(bridge.fallback_reason().unwrap().contains("missing required member"));

    let mut texture = MemoryTexture::new(96, 48);
    assert_eq!(bridge.draw(1.0 / 60.0, &mut texture), Presented::Uploaded);

    assert_eq!(bridge.pixels().len(), 96 * 48 * 4);
    assert_eq!(texture.bytes().len(), 96 * 48 * 4);
    assert!(texture.bytes().iter().any(|b| *b != 0));
    bridge.shutdown();
}

#[test]
fn background_colour_lands_in_bgra_order() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &[]);
    let config = small_config();
    let mut bridge = Bridge::initialize(&host, &config).unwrap();
    let mut texture = MemoryTexture::new(96, 48);
    // sin(2t) = -1: the bar has zero width
    bridge.draw(3.0 * std::f64::consts::FRAC_PI_4, &mut texture);

    let bg = config.background;
    let last = &texture.bytes()[texture.bytes().len() - 4..];
    assert_eq!(last, &[bg.b(), bg.g(), bg.r(), bg.a()]);
    bridge.shutdown();
}

#[test]
fn missing_any_required_handle_forces_cpu() {
    for skip in 0..4 {
        let fields: Vec<&str> = ALL_FIELDS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, f)| *f)
            .collect();
        let host = MockHost::with_fields(GraphicsBackend::Vulkan, &fields);
        let config = small_config();

        assert!(matches!(
            ModeSelector::resolve_handles(&host, &config),
            Err(BridgeError::MissingMember { .. })
        ));
        let bridge = Bridge::initialize(&host, &config).unwrap();
        assert_eq!(bridge.mode(), Mode::Cpu, "without {}", ALL_FIELDS[skip]);
        bridge.shutdown();
    }
}

#[test]
fn selector_ends_in_cpu_fallback_with_a_reason() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &ALL_FIELDS[1..]);
    let mut selector = ModeSelector::new();
    assert_eq!(selector.state(), SelectorState::Init);

    let selection = selector.select(&host, &small_config()).unwrap();
    assert_eq!(selector.state(), SelectorState::CpuFallback);
    assert_eq!(selection.canvas.mode(), Mode::Cpu);
    assert!(matches!(selection.fallback, Some(BridgeError::MissingMember { .. })));
    selection.canvas.release();
}

#[test]
fn selector_skips_gpu_when_disabled() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &ALL_FIELDS);
    let config = BridgeConfig {
        prefer_gpu: false,
        ..small_config()
    };
    let mut selector = ModeSelector::new();
    let selection = selector.select(&host, &config).unwrap();
    assert_eq!(selector.state(), SelectorState::CpuFallback);
    assert!(selection.fallback.is_none());
    selection.canvas.release();
}

#[test]
fn missing_queue_family_index_still_qualifies_for_gpu() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &ALL_FIELDS[..4]);
    let handles = ModeSelector::resolve_handles(&host, &small_config()).unwrap();
    assert_eq!(handles.queue_family_index, 0);
}

#[test]
fn non_vulkan_backend_skips_gpu() {
    let host = MockHost::with_fields(GraphicsBackend::Direct3D11, &ALL_FIELDS);
    let config = small_config();
    assert!(matches!(
        ModeSelector::resolve_handles(&host, &config),
        Err(BridgeError::UnsupportedBackend(GraphicsBackend::Direct3D11))
    ));
    let bridge = Bridge::initialize(&host, &config).unwrap();
    assert_eq!(bridge.mode(), Mode::Cpu);
    bridge.shutdown();
}

#[test]
fn prefer_gpu_false_never_tries() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &ALL_FIELDS);
    let config = BridgeConfig {
        prefer_gpu: false,
        ..small_config()
    };
    let bridge = Bridge::initialize(&host, &config).unwrap();
    assert_eq!(bridge.mode(), Mode::Cpu);
    assert!(bridge.fallback_reason().is_none());
    bridge.shutdown();
}

#[test]
fn same_time_renders_identical_bytes() {
    let host = MockHost::with_fields(GraphicsBackend::None, &[]);
    let config = small_config();

    let mut textures = Vec::new();
    for _ in 0..2 {
        let mut bridge = Bridge::initialize(&host, &config).unwrap();
        let mut texture = MemoryTexture::new(96, 48);
        bridge.draw(1.234, &mut texture);
        bridge.shutdown();
        textures.push(texture);
    }
    assert_eq!(textures[0].bytes(), textures[1].bytes());
}

#[test]
fn redraw_into_same_canvas_is_stable() {
    let spec = CanvasSpec::new(64, 64);
    let renderer = FrameRenderer::new(skia_safe::Color::from_argb(255, 40, 40, 40));
    let state = AnimationState::at(0.7);
    let mut canvas = Canvas::Cpu(CpuCanvas::new(spec).unwrap());

    let mut first = PixelBuffer::new(spec);
    let mut second = PixelBuffer::new(spec);
    renderer.draw(canvas.surface_canvas(), spec, &state, Mode::Cpu);
    canvas.read_into(&mut first).unwrap();
    renderer.draw(canvas.surface_canvas(), spec, &state, Mode::Cpu);
    canvas.read_into(&mut second).unwrap();

    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.len(), 64 * 64 * 4);
}

#[test]
fn frames_change_over_time_and_stats_count() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &[]);
    let mut bridge = Bridge::initialize(&host, &small_config()).unwrap();
    let mut texture = MemoryTexture::new(96, 48);

    bridge.draw(0.0, &mut texture);
    let first = texture.bytes().to_vec();
    bridge.draw(0.5, &mut texture);
    assert_ne!(first, texture.bytes());

    let stats = bridge.stats();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.uploads, 2);
    assert_eq!(stats.skipped_frames, 0);
    assert_eq!(texture.uploads(), 2);
    bridge.shutdown();
}

#[test]
fn wrong_texture_size_is_counted_not_fatal() {
    let host = MockHost::with_fields(GraphicsBackend::Vulkan, &[]);
    let mut bridge = Bridge::initialize(&host, &small_config()).unwrap();
    let mut texture = MemoryTexture::new(10, 10);

    assert_eq!(bridge.draw(0.1, &mut texture), Presented::UploadFailed);
    assert_eq!(bridge.stats().upload_errors, 1);
    assert_eq!(texture.uploads(), 0);
    bridge.shutdown();
}

#[test]
fn standalone_host_end_to_end() {
    // GPU mode when a Vulkan driver is present, CPU otherwise; both must upload
    let host = StandaloneHost::new("bridge-e2e", false);
    let config = small_config();
    let mut selector = ModeSelector::new();
    let selection = selector.select(&host, &config).unwrap();
    let expected = match selection.canvas.mode() {
        Mode::Gpu => SelectorState::GpuActive,
        Mode::Cpu => SelectorState::CpuFallback,
    };
    assert_eq!(selector.state(), expected);
    selection.canvas.release();

    let mut bridge = Bridge::initialize(&host, &config).unwrap();
    if host.graphics_backend() != GraphicsBackend::Vulkan {
        assert_eq!(bridge.mode(), Mode::Cpu);
    }

    let mut texture = MemoryTexture::new(96, 48);
    for _ in 0..3 {
        bridge.draw(1.0 / 30.0, &mut texture);
    }
    assert_eq!(bridge.stats().frames, 3);
    assert!(texture.bytes().iter().any(|b| *b != 0));
    bridge.shutdown();
    drop(host);
}
