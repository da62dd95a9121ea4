// Canvas abstraction
//
// One drawing surface regardless of mode. Exactly one variant is live per run:
// - Gpu: offscreen skia surface on the host's Vulkan device + CPU staging bitmap
// - Cpu: skia raster surface, pixels read in place

use skia_safe::{gpu, surfaces, AlphaType, ColorType, ImageInfo, Surface};

use crate::error::BridgeError;
use crate::mode::Mode;
use crate::upload::PixelBuffer;

/// Fixed canvas dimensions. Format is always BGRA8888, premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: i32,
    pub height: i32,
}

impl CanvasSpec {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn image_info(&self) -> ImageInfo {
        ImageInfo::new((self.width, self.height), ColorType::BGRA8888, AlphaType::Premul, None)
    }

    pub fn row_bytes(&self) -> usize {
        self.width.max(0) as usize * 4
    }

    pub fn byte_len(&self) -> usize {
        self.row_bytes() * self.height.max(0) as usize
    }
}

/// Anything that can copy the current frame into a [`PixelBuffer`].
pub trait PixelSource {
    fn read_into(&mut self, dst: &mut PixelBuffer) -> Result<(), BridgeError>;
}

/// CPU-resident copy target for GPU readback, same size and format as the surface.
pub struct ReadbackBitmap {
    info: ImageInfo,
    row_bytes: usize,
    pixels: Vec<u8>,
}

impl ReadbackBitmap {
    pub fn new(spec: CanvasSpec) -> Self {
        Self {
            info: spec.image_info(),
            row_bytes: spec.row_bytes(),
            pixels: vec![0; spec.byte_len()],
        }
    }
}

/// GPU-backed canvas. Field order is drop order: surface, context, bitmap.
pub struct GpuCanvas {
    surface: Surface,
    context: gpu::DirectContext,
    readback: ReadbackBitmap,
}

impl GpuCanvas {
    pub(crate) fn new(surface: Surface, context: gpu::DirectContext, spec: CanvasSpec) -> Self {
        Self {
            surface,
            context,
            readback: ReadbackBitmap::new(spec),
        }
    }

    fn release(self) {
        let Self {
            surface,
            mut context,
            readback,
        } = self;
        log::info!("Releasing GPU surface");
        drop(surface);
        log::info!("Releasing GPU context");
        context.free_gpu_resources();
        drop(context);
        log::info!("Releasing CPU bitmap");
        drop(readback);
    }
}

impl PixelSource for GpuCanvas {
    fn read_into(&mut self, dst: &mut PixelBuffer) -> Result<(), BridgeError> {
        // Surface work first, then everything else queued on the context
        self.context.flush_and_submit_surface(&mut self.surface, None);
        self.context.flush_and_submit();

        let src_row_bytes = self.surface.image_info().min_row_bytes();
        if src_row_bytes != self.readback.row_bytes {
            return Err(BridgeError::Readback(format!(
                "row stride mismatch: surface {} bytes, bitmap {} bytes",
                src_row_bytes, self.readback.row_bytes
            )));
        }

        let ReadbackBitmap {
            info,
            row_bytes,
            pixels,
        } = &mut self.readback;
        if !self.surface.read_pixels(info, pixels.as_mut_slice(), *row_bytes, (0, 0)) {
            return Err(BridgeError::Readback("surface refused read_pixels".into()));
        }

        dst.fill_from(pixels, *row_bytes)
    }
}

/// CPU raster canvas.
pub struct CpuCanvas {
    surface: Surface,
}

impl CpuCanvas {
    pub fn new(spec: CanvasSpec) -> Result<Self, BridgeError> {
        let surface = surfaces::raster(&spec.image_info(), spec.row_bytes(), None).ok_or(
            BridgeError::CpuSurface {
                width: spec.width,
                height: spec.height,
            },
        )?;
        Ok(Self { surface })
    }

    fn release(self) {
        log::info!("Releasing CPU canvas");
        // The raster surface owns its pixel storage
        drop(self.surface);
        log::info!("Releasing CPU bitmap");
    }
}

impl PixelSource for CpuCanvas {
    fn read_into(&mut self, dst: &mut PixelBuffer) -> Result<(), BridgeError> {
        let pixmap = self
            .surface
            .peek_pixels()
            .ok_or_else(|| BridgeError::Readback("raster surface has no addressable pixels".into()))?;
        let bytes = pixmap
            .bytes()
            .ok_or_else(|| BridgeError::Readback("raster pixmap is empty".into()))?;
        dst.fill_from(bytes, pixmap.row_bytes())
    }
}

/// The active canvas for this run.
pub enum Canvas {
    Gpu(GpuCanvas),
    Cpu(CpuCanvas),
}

impl Canvas {
    pub fn mode(&self) -> Mode {
        match self {
            Canvas::Gpu(_) => Mode::Gpu,
            Canvas::Cpu(_) => Mode::Cpu,
        }
    }

    /// The skia drawing surface, whichever backend holds it.
    pub fn surface_canvas(&mut self) -> &skia_safe::Canvas {
        match self {
            Canvas::Gpu(gpu) => gpu.surface.canvas(),
            Canvas::Cpu(cpu) => cpu.surface.canvas(),
        }
    }

    /// Explicit teardown: surface, context, CPU canvas, CPU bitmap.
    pub fn release(self) {
        match self {
            Canvas::Gpu(gpu) => gpu.release(),
            Canvas::Cpu(cpu) => cpu.release(),
        }
    }
}

impl PixelSource for Canvas {
    fn read_into(&mut self, dst: &mut PixelBuffer) -> Result<(), BridgeError> {
        match self {
            Canvas::Gpu(gpu) => gpu.read_into(dst),
            Canvas::Cpu(cpu) => cpu.read_into(dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skia_safe::Color;

    #[test]
    fn spec_sizes() {
        let spec = CanvasSpec::new(8, 3);
        assert_eq!(spec.row_bytes(), 32);
        assert_eq!(spec.byte_len(), 96);
        let info = spec.image_info();
        assert_eq!(info.color_type(), ColorType::BGRA8888);
        assert_eq!(info.alpha_type(), AlphaType::Premul);
    }

    #[test]
    fn cpu_canvas_reads_bgra() {
        let spec = CanvasSpec::new(4, 2);
        let mut canvas = Canvas::Cpu(CpuCanvas::new(spec).unwrap());
        assert_eq!(canvas.mode(), Mode::Cpu);
        canvas.surface_canvas().clear(Color::from_argb(255, 10, 20, 30));

        let mut buffer = PixelBuffer::new(spec);
        canvas.read_into(&mut buffer).unwrap();
        assert_eq!(&buffer.as_bytes()[..4], &[30, 20, 10, 255]);
        canvas.release();
    }

    #[test]
    fn cpu_canvas_rejects_empty_size() {
        assert!(matches!(
            CpuCanvas::new(CanvasSpec::new(0, 0)),
            Err(BridgeError::CpuSurface { .. })
        ));
    }
}
