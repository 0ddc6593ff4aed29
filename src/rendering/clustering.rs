//! Dominant-color extraction by first-fit clustering.
//!
//! The image is subsampled on a stride grid and every sample is assigned to
//! the *first* existing cluster (in creation order) whose running-mean
//! centroid lies within the threshold on all three channels. The most
//! populated cluster wins, ties going to the earliest created.
//!
//! Assignment is first-fit, not nearest-centroid: a sample near two
//! clusters always joins the older one, so results depend on scan order.

use crate::models::{ClusterParams, ImageBuffer, Rgb, BYTES_PER_PIXEL};

/// Running mean of the samples assigned so far
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCluster {
    pub centroid: [f64; 3],
    pub member_count: u32,
}

impl ColorCluster {
    fn seed(sample: [f64; 3]) -> Self {
        Self {
            centroid: sample,
            member_count: 1,
        }
    }

    fn accepts(&self, sample: &[f64; 3], threshold: f64) -> bool {
        self.centroid
            .iter()
            .zip(sample)
            .all(|(c, s)| (c - s).abs() < threshold)
    }

    fn absorb(&mut self, sample: &[f64; 3]) {
        let n = self.member_count as f64;
        for (c, s) in self.centroid.iter_mut().zip(sample) {
            *c = (*c * n + s) / (n + 1.0);
        }
        self.member_count += 1;
    }

    /// Centroid rounded to the nearest integer channel values
    pub fn color(&self) -> Rgb {
        let [r, g, b] = self.centroid.map(|c| c.round().clamp(0.0, 255.0) as u8);
        Rgb::new(r, g, b)
    }
}

/// `(x_stride, y_stride)`: the longer axis takes the long stride.
///
/// Square images count as tall.
pub fn sampling_strides(width: u32, height: u32, params: &ClusterParams) -> (usize, usize) {
    let long = params.long_stride.max(1) as usize;
    let short = params.short_stride.max(1) as usize;
    if width > height {
        (long, short)
    } else {
        (short, long)
    }
}

/// Group the stride samples of `pixels` into clusters, in creation order.
pub fn cluster_samples(pixels: &ImageBuffer, params: &ClusterParams) -> Vec<ColorCluster> {
    let (x_stride, y_stride) = sampling_strides(pixels.width(), pixels.height(), params);
    let w = pixels.width() as usize;
    let h = pixels.height() as usize;
    let data = pixels.data();
    let threshold = params.threshold as f64;

    let mut clusters: Vec<ColorCluster> = Vec::new();

    // Only rows that start inside the buffer can yield samples
    let row_bytes = w.saturating_mul(BYTES_PER_PIXEL);
    let rows = if row_bytes == 0 {
        0
    } else {
        h.min(data.len().div_ceil(row_bytes))
    };

    for y in (0..rows).step_by(y_stride) {
        for x in (0..w).step_by(x_stride) {
            let idx = (y * w + x) * BYTES_PER_PIXEL;
            // Offsets only grow along a row
            let Some(px) = data.get(idx..idx + 3) else {
                break;
            };
            let sample = [px[0] as f64, px[1] as f64, px[2] as f64];

            match clusters.iter_mut().find(|c| c.accepts(&sample, threshold)) {
                Some(cluster) => cluster.absorb(&sample),
                None => clusters.push(ColorCluster::seed(sample)),
            }
        }
    }

    clusters
}

/// Representative color of an image.
///
/// Returns [`Rgb::BLACK`] when no sample can be taken (zero-sized image or
/// a buffer too short to hold any sampled pixel).
pub fn dominant_color(pixels: &ImageBuffer, params: &ClusterParams) -> Rgb {
    let clusters = cluster_samples(pixels, params);

    // max_by_key keeps the last maximum, so fold to keep the first
    clusters
        .iter()
        .fold(None::<&ColorCluster>, |best, c| match best {
            Some(b) if b.member_count >= c.member_count => Some(b),
            _ => Some(c),
        })
        .map(ColorCluster::color)
        .unwrap_or(Rgb::BLACK)
}
