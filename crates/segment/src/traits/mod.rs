use image::GrayImage;
use crate::{error::Result, types::RasterImage};

/// Trait for a single pixel-classification step over a whole raster
pub trait Segmenter: Send + Sync {
    /// Produce a new raster (mask, posterized image or grid) from the input
    fn segment(&self, image: &RasterImage) -> Result<RasterImage>;
}

/// Trait for drawing a caption into the label strip of a comparison grid cell
pub trait LabelRenderer: Send + Sync {
    /// Draw `label` onto `strip` starting at `origin` (top-left, strip
    /// coordinates). The strip is white and exactly one cell wide; anything
    /// drawn past its bounds is clipped.
    fn render(&self, label: &str, origin: (u32, u32), strip: &mut GrayImage);
}
