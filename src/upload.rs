// Readback/upload path
//
// Whatever canvas is active, the frame ends up in one reusable BGRA buffer
// that is handed to the host texture in full.

use crate::canvas::{CanvasSpec, PixelSource};
use crate::error::{BridgeError, HostError};

/// Fixed-size BGRA8888 premultiplied pixel buffer. Length never changes.
pub struct PixelBuffer {
    spec: CanvasSpec,
    bytes: Box<[u8]>,
}

impl PixelBuffer {
    pub fn new(spec: CanvasSpec) -> Self {
        Self {
            spec,
            bytes: vec![0; spec.byte_len()].into_boxed_slice(),
        }
    }

    pub fn spec(&self) -> CanvasSpec {
        self.spec
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copies a full frame with the given source stride into the buffer.
    pub fn fill_from(&mut self, src: &[u8], src_row_bytes: usize) -> Result<(), BridgeError> {
        let row = self.spec.row_bytes();
        let rows = self.spec.height.max(0) as usize;
        if self.bytes.is_empty() {
            return Ok(());
        }

        if src_row_bytes == row && src.len() >= self.bytes.len() {
            self.bytes.copy_from_slice(&src[..self.bytes.len()]);
            return Ok(());
        }

        if src_row_bytes < row || src.len() < src_row_bytes * rows.saturating_sub(1) + row {
            return Err(BridgeError::Readback(format!(
                "source frame too small: {} bytes at stride {}, need {} rows of {}",
                src.len(),
                src_row_bytes,
                rows,
                row
            )));
        }

        for (dst_row, src_row) in self.bytes.chunks_exact_mut(row).zip(src.chunks(src_row_bytes)) {
            dst_row.copy_from_slice(&src_row[..row]);
        }
        Ok(())
    }
}

/// The host engine's texture resource.
pub trait HostTexture {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Overwrites the whole texture with `bgra` (width * height * 4 bytes).
    fn update(&mut self, bgra: &[u8]) -> Result<(), HostError>;
}

/// Texture kept in host memory.
pub struct MemoryTexture {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    uploads: u64,
}

impl MemoryTexture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes: vec![0; width as usize * height as usize * 4],
            uploads: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl HostTexture for MemoryTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn update(&mut self, bgra: &[u8]) -> Result<(), HostError> {
        if bgra.len() != self.bytes.len() {
            return Err(HostError::LengthMismatch {
                expected: self.bytes.len(),
                actual: bgra.len(),
            });
        }
        self.bytes.copy_from_slice(bgra);
        self.uploads += 1;
        Ok(())
    }
}

/// What happened to this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presented {
    Uploaded,
    /// Readback failed; the texture still shows the previous frame.
    Skipped,
    /// The host rejected the upload.
    UploadFailed,
}

/// Resolve the active canvas into `buffer` and upload it.
///
/// A readback failure is logged and swallowed; an upload failure is returned.
pub fn present(
    source: &mut dyn PixelSource,
    buffer: &mut PixelBuffer,
    texture: &mut dyn HostTexture,
) -> Result<Presented, BridgeError> {
    if let Err(e) = source.read_into(buffer) {
        log::error!("Readback failed, keeping previous texture contents: {}", e);
        return Ok(Presented::Skipped);
    }

    texture.update(buffer.as_bytes())?;
    Ok(Presented::Uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Solid(u8);

    impl PixelSource for Solid {
        fn read_into(&mut self, dst: &mut PixelBuffer) -> Result<(), BridgeError> {
            let src = vec![self.0; dst.len()];
            dst.fill_from(&src, dst.spec().row_bytes())
        }
    }

    struct Broken;

    impl PixelSource for Broken {
        fn read_into(&mut self, _dst: &mut PixelBuffer) -> Result<(), BridgeError> {
            Err(BridgeError::Readback("device lost".into()))
        }
    }

    #[test]
    fn fill_from_strips_row_padding() {
        let mut buffer = PixelBuffer::new(CanvasSpec::new(1, 2));
        let src = [1, 2, 3, 4, 0xee, 0xee, 5, 6, 7, 8];
        buffer.fill_from(&src, 6).unwrap();
        assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn fill_from_rejects_short_source() {
        let mut buffer = PixelBuffer::new(CanvasSpec::new(2, 2));
        assert!(buffer.fill_from(&[0; 8], 8).is_err());
        assert!(buffer.fill_from(&[0; 16], 4).is_err());
        assert_eq!(buffer.len(), 16);
    }

    #[test]
    fn present_uploads_full_buffer() {
        let spec = CanvasSpec::new(3, 2);
        let mut buffer = PixelBuffer::new(spec);
        let mut texture = MemoryTexture::new(3, 2);

        let outcome = present(&mut Solid(7), &mut buffer, &mut texture).unwrap();
        assert_eq!(outcome, Presented::Uploaded);
        assert_eq!(texture.uploads(), 1);
        assert!(texture.bytes().iter().all(|b| *b == 7));
    }

    #[test]
    fn readback_failure_keeps_previous_texture() {
        let spec = CanvasSpec::new(3, 2);
        let mut buffer = PixelBuffer::new(spec);
        let mut texture = MemoryTexture::new(3, 2);
        present(&mut Solid(9), &mut buffer, &mut texture).unwrap();

        let outcome = present(&mut Broken, &mut buffer, &mut texture).unwrap();
        assert_eq!(outcome, Presented::Skipped);
        assert_eq!(texture.uploads(), 1);
        assert!(texture.bytes().iter().all(|b| *b == 9));
    }

    #[test]
    fn wrong_size_texture_is_an_upload_error() {
        let mut buffer = PixelBuffer::new(CanvasSpec::new(3, 2));
        let mut texture = MemoryTexture::new(2, 2);
        let err = present(&mut Solid(1), &mut buffer, &mut texture).unwrap_err();
        assert!(matches!(err, BridgeError::Upload(HostError::LengthMismatch { .. })));
    }
}
