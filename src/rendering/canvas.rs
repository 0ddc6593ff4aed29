//! Downscaled canvas rendering ahead of color analysis.

use tiny_skia::{ColorU8, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

use crate::error::SampleError;
use crate::models::{ImageBuffer, BYTES_PER_PIXEL};

/// Uniform divisor that keeps both sides at or below `max_dimension`.
///
/// `ceil((max(width, height) + 1) / max_dimension)`, never less than 1.
pub fn scale_ratio(width: u32, height: u32, max_dimension: u32) -> u32 {
    let longest = width.max(height) as u64;
    let ratio = (longest + 1).div_ceil(max_dimension.max(1) as u64);
    ratio.clamp(1, u32::MAX as u64) as u32
}

/// Canvas size for a bitmap divided by `ratio`, at least 1×1
pub fn scaled_size(width: u32, height: u32, ratio: u32) -> (u32, u32) {
    let ratio = ratio.max(1);
    ((width / ratio).max(1), (height / ratio).max(1))
}

/// Draw `bitmap` onto a canvas `ratio` times smaller and read its pixels back.
///
/// Filtering is bilinear. The returned buffer has straight alpha.
pub fn render_scaled(bitmap: &ImageBuffer, ratio: u32) -> Result<ImageBuffer, SampleError> {
    let (width, height) = (bitmap.width(), bitmap.height());
    if width == 0 || height == 0 {
        return Err(SampleError::EmptyImage);
    }
    if !bitmap.is_well_formed() {
        return Err(SampleError::UnsupportedDimensions { width, height });
    }
    if ratio <= 1 {
        return Ok(bitmap.clone());
    }

    let source = to_pixmap(bitmap)?;
    let (canvas_w, canvas_h) = scaled_size(width, height, ratio);
    let mut canvas = Pixmap::new(canvas_w, canvas_h).ok_or(SampleError::CanvasAllocation)?;

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    let transform = Transform::from_scale(
        canvas_w as f32 / width as f32,
        canvas_h as f32 / height as f32,
    );
    canvas.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);

    tracing::trace!(
        width,
        height,
        canvas_w,
        canvas_h,
        ratio,
        "Rendered downscaled canvas"
    );

    Ok(from_pixmap(&canvas))
}

/// Premultiply straight RGBA into a tiny-skia pixmap
fn to_pixmap(bitmap: &ImageBuffer) -> Result<Pixmap, SampleError> {
    let size =
        IntSize::from_wh(bitmap.width(), bitmap.height()).ok_or(SampleError::CanvasAllocation)?;
    let data: Vec<u8> = bitmap
        .data()
        .chunks_exact(BYTES_PER_PIXEL)
        .flat_map(|px| {
            let p = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [p.red(), p.green(), p.blue(), p.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size).ok_or(SampleError::CanvasAllocation)
}

fn from_pixmap(pixmap: &Pixmap) -> ImageBuffer {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    ImageBuffer::from_rgba(pixmap.width(), pixmap.height(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rgb;

    #[test]
    fn test_scale_ratio_small_images_unscaled() {
        assert_eq!(scale_ratio(1, 1, 200), 1);
        assert_eq!(scale_ratio(199, 50, 200), 1);
    }

    #[test]
    fn test_scale_ratio_boundary() {
        // (200 + 1) / 200 rounds up to 2
        assert_eq!(scale_ratio(200, 10, 200), 2);
        assert_eq!(scale_ratio(10, 399, 200), 2);
        assert_eq!(scale_ratio(10, 400, 200), 3);
    }

    #[test]
    fn test_scale_ratio_large_image() {
        assert_eq!(scale_ratio(1920, 1080, 200), 10);
        assert_eq!(scale_ratio(4000, 3000, 200), 21);
    }

    #[test]
    fn test_scale_ratio_zero_cap() {
        assert_eq!(scale_ratio(10, 10, 0), 11);
    }

    #[test]
    fn test_scaled_size_fits_cap() {
        for (w, h) in [(200, 200), (1920, 1080), (399, 2), (4000, 3000), (201, 1)] {
            let ratio = scale_ratio(w, h, 200);
            let (sw, sh) = scaled_size(w, h, ratio);
            assert!(sw <= 200 && sh <= 200, "{w}x{h} -> {sw}x{sh}");
            assert!(sw >= 1 && sh >= 1);
        }
    }

    #[test]
    fn test_scaled_size_preserves_aspect() {
        assert_eq!(scaled_size(1920, 1080, 10), (192, 108));
        assert_eq!(scaled_size(400, 3, 3), (133, 1));
    }

    #[test]
    fn test_render_ratio_one_is_identity() {
        let mut bitmap = ImageBuffer::filled(3, 2, Rgb::new(1, 2, 3));
        bitmap.set_pixel(2, 1, Rgb::new(9, 9, 9));
        let out = render_scaled(&bitmap, 1).unwrap();
        assert_eq!(out, bitmap);
    }

    #[test]
    fn test_render_uniform_image_keeps_color() {
        let bitmap = ImageBuffer::filled(40, 20, Rgb::new(200, 40, 10));
        let out = render_scaled(&bitmap, 4).unwrap();

        assert_eq!((out.width(), out.height()), (10, 5));
        assert!(out.is_well_formed());

        let center = out.pixel(5, 2).unwrap();
        assert!(center.r.abs_diff(200) <= 1, "{center}");
        assert!(center.g.abs_diff(40) <= 1, "{center}");
        assert!(center.b.abs_diff(10) <= 1, "{center}");
    }

    #[test]
    fn test_render_rejects_empty() {
        let bitmap = ImageBuffer::from_rgba(0, 5, Vec::new());
        assert!(matches!(
            render_scaled(&bitmap, 2),
            Err(SampleError::EmptyImage)
        ));
    }

    #[test]
    fn test_render_rejects_short_buffer() {
        let bitmap = ImageBuffer::from_rgba(4, 4, vec![0; 12]);
        assert!(matches!(
            render_scaled(&bitmap, 2),
            Err(SampleError::UnsupportedDimensions {
                width: 4,
                height: 4
            })
        ));
    }
}
