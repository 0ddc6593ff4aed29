//! Bitmap decoding into straight-alpha RGBA buffers.

use std::io::Cursor;

use crate::error::SampleError;
use crate::models::ImageBuffer;

/// Decode PNG bytes into an RGBA [`ImageBuffer`].
///
/// Palette, grayscale and 16-bit images are normalized to 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<ImageBuffer, SampleError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.width == 0 || info.height == 0 {
        return Err(SampleError::EmptyImage);
    }

    let data: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        other => {
            return Err(SampleError::Decode(format!(
                "Unexpected output color type {other:?}"
            )))
        }
    };

    tracing::debug!(
        width = info.width,
        height = info.height,
        color_type = ?info.color_type,
        "Decoded PNG bitmap"
    );

    Ok(ImageBuffer::from_rgba(info.width, info.height, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rgb;

    fn encode(width: u32, height: u32, color_type: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color_type);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_decode_rgba() {
        let png = encode(1, 2, png::ColorType::Rgba, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let buf = decode_png(&png).unwrap();
        assert_eq!((buf.width(), buf.height()), (1, 2));
        assert_eq!(buf.data(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_decode_rgb_adds_opaque_alpha() {
        let png = encode(2, 1, png::ColorType::Rgb, &[10, 20, 30, 40, 50, 60]);
        let buf = decode_png(&png).unwrap();
        assert_eq!(buf.data(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_decode_grayscale() {
        let png = encode(2, 1, png::ColorType::Grayscale, &[0, 128]);
        let buf = decode_png(&png).unwrap();
        assert_eq!(buf.pixel(1, 0), Some(Rgb::new(128, 128, 128)));
        assert!(buf.is_well_formed());
    }

    #[test]
    fn test_decode_grayscale_alpha() {
        let png = encode(1, 1, png::ColorType::GrayscaleAlpha, &[77, 9]);
        let buf = decode_png(&png).unwrap();
        assert_eq!(buf.data(), &[77, 77, 77, 9]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_png(b"definitely not a png");
        assert!(matches!(result, Err(SampleError::Decode(_))));
    }
}
