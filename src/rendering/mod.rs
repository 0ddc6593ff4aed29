pub mod bitmap;
pub mod canvas;
pub mod clustering;
pub mod picker;

pub use bitmap::decode_png;
pub use canvas::{render_scaled, scale_ratio, scaled_size};
pub use clustering::{cluster_samples, dominant_color, ColorCluster};
pub use picker::{label_color, pick_color};
