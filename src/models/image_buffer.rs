use crate::models::Rgb;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA pixel grid, 4 bytes per pixel, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// The length is not checked against `width * height`: buffers that
    /// arrive over the wire are analysed as-is and out-of-range samples are
    /// skipped by the clustering pass.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A buffer where every pixel has the same opaque color
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let data = std::iter::repeat([color.r, color.g, color.b, 255])
            .take(pixels)
            .flatten()
            .collect();
        Self::from_rgba(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Number of bytes a well-formed buffer of this size holds
    pub fn expected_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(BYTES_PER_PIXEL)
    }

    /// Is the byte length consistent with the dimensions?
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// Color of the pixel at `(x, y)`, or `None` if outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data
            .get(idx..idx + 3)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
    }

    /// Overwrite one pixel (opaque). Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        if let Some(px) = self.data.get_mut(idx..idx + BYTES_PER_PIXEL) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }
}
