//! Test fixtures: PNG images with known dominant colors.

/// Test colors
pub mod colors {
    pub const RED: [u8; 4] = [255, 0, 0, 255];
    pub const GREEN: [u8; 4] = [0, 255, 0, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const NEAR_BLACK: [u8; 4] = [10, 10, 10, 255];
}

/// Encode RGBA pixels produced by `pixel(x, y)` as a PNG
pub fn png_from_fn(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&pixel(x, y));
        }
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("PNG header");
        writer.write_image_data(&data).expect("PNG data");
    }
    out
}

/// Single-color PNG
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    png_from_fn(width, height, |_, _| color)
}

/// 10x10 PNG whose top seven rows are `top` and bottom three rows are
/// `bottom`. Sampled rows are 0, 3, 6 and 9, so `top` dominates.
pub fn banded_png(top: [u8; 4], bottom: [u8; 4]) -> Vec<u8> {
    png_from_fn(10, 10, |_, y| if y < 7 { top } else { bottom })
}
