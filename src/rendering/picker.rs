//! Point color picking for user-defined presets.

use crate::models::{ImageBuffer, Rgb};

/// Color under the pointer, or `None` outside the bitmap
pub fn pick_color(pixels: &ImageBuffer, x: u32, y: u32) -> Option<Rgb> {
    pixels.pixel(x, y)
}

/// Text color that stays readable over `background`
pub fn label_color(background: Rgb) -> &'static str {
    if background.brightness() < 128 {
        "white"
    } else {
        "black"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_color_inside() {
        let mut buf = ImageBuffer::filled(4, 4, Rgb::BLACK);
        buf.set_pixel(3, 1, Rgb::new(12, 34, 56));
        assert_eq!(pick_color(&buf, 3, 1), Some(Rgb::new(12, 34, 56)));
        assert_eq!(pick_color(&buf, 3, 1).unwrap().to_css(), "rgb(12,34,56)");
    }

    #[test]
    fn test_pick_color_outside() {
        let buf = ImageBuffer::filled(4, 4, Rgb::BLACK);
        assert_eq!(pick_color(&buf, 4, 0), None);
    }

    #[test]
    fn test_label_color_threshold() {
        assert_eq!(label_color(Rgb::new(0, 0, 0)), "white");
        assert_eq!(label_color(Rgb::new(127, 127, 127)), "white");
        assert_eq!(label_color(Rgb::new(128, 128, 128)), "black");
        assert_eq!(label_color(Rgb::new(255, 255, 0)), "black");
    }
}
