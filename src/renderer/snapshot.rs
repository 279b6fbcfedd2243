// ── Snapshots ─────────────────────────────────────────────────────────────────
//
// A snapshot request is held until the end of the frame; `post_render` reads
// the drawing buffer, flips it to a top-left origin and encodes it.  A newer
// request replaces a pending one, so each request's callback fires at most
// once and only the latest request is honoured.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{imageops, DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::{RenderError, Result};
use crate::gl::GlContext;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageKind {
    #[default]
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

/// An encoded capture of the drawing buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
    pub data: Vec<u8>,
}

pub type SnapshotCallback = Box<dyn FnOnce(Result<Snapshot>)>;

pub(crate) struct SnapshotRequest {
    pub callback: SnapshotCallback,
    pub kind: ImageKind,
    /// JPEG quality in `0.0..=1.0`. Ignored for PNG.
    pub quality: f32,
}

pub fn encode(image: RgbaImage, kind: ImageKind, quality: f32) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut out = Vec::new();
    match kind {
        ImageKind::Png => {
            PngEncoder::new(&mut out).write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
        ImageKind::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            JpegEncoder::new_with_quality(&mut out, q)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
    }
    Ok(out)
}

/// Read the whole drawing buffer and encode it.
pub(crate) fn capture(gl: &mut dyn GlContext, kind: ImageKind, quality: f32) -> Result<Snapshot> {
    let (width, height) = gl.drawing_buffer_size();
    let pixels = gl.read_pixels(0, 0, width, height);
    let mut image = RgbaImage::from_raw(width, height, pixels)
        .ok_or(RenderError::ResourceCreation("snapshot pixel buffer"))?;
    // GL rows start at the bottom.
    imageops::flip_vertical_in_place(&mut image);
    let data = encode(image, kind, quality)?;
    Ok(Snapshot { width, height, kind, data })
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::gl::headless::HeadlessContext;

    #[test]
    fn capture_puts_the_top_row_first() {
        // GL order, bottom row first: rows 0, 1, 2 hold 0, 1, 2.
        let mut gl = HeadlessContext::new(1, 3);
        gl.handle().set_pixels(vec![0, 0, 0, 255, 1, 1, 1, 255, 2, 2, 2, 255]);

        let shot = capture(&mut gl, ImageKind::Png, 1.0).unwrap();
        let decoded = image::load_from_memory(&shot.data).unwrap().to_rgba8();
        let column: Vec<u8> = decoded.pixels().map(|p| p[0]).collect();
        assert_eq!(column, vec![2, 1, 0]);
    }

    #[test]
    fn png_output_has_signature() {
        let data = encode(RgbaImage::from_pixel(2, 2, Rgba([255; 4])), ImageKind::Png, 1.0).unwrap();
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_output_has_soi_marker() {
        let data = encode(RgbaImage::from_pixel(4, 4, Rgba([128; 4])), ImageKind::Jpeg, 0.9).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
    }
}
