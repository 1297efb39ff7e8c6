//! Sobel gradient magnitude binarized with Otsu's level.
//!
//! The 3×3 kernels read the field through edge replication, so a flat border
//! produces no gradient. Magnitudes are rescaled so the strongest edge maps
//! to 255 before the histogram is built.

use crate::{
    algorithms::{grayscale::intensity_field, histogram::otsu},
    error::Result,
    traits::Segmenter,
    types::{BinaryMask, IntensityField, RasterImage},
};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Unnormalized gradient magnitude `sqrt(gx² + gy²)` per sample.
pub fn sobel_magnitude(field: &IntensityField) -> IntensityField {
    if field.is_empty() {
        return field.clone();
    }
    IntensityField::from_fn(field.width(), field.height(), |x, y| {
        let mut gx = 0.0f32;
        let mut gy = 0.0f32;
        for (ky, (row_x, row_y)) in SOBEL_KERNEL_X.iter().zip(SOBEL_KERNEL_Y.iter()).enumerate() {
            let sy = y as i64 + ky as i64 - 1;
            for kx in 0..3 {
                let v = field.get_clamped(x as i64 + kx as i64 - 1, sy);
                gx += v * row_x[kx];
                gy += v * row_y[kx];
            }
        }
        gx.hypot(gy)
    })
}

/// Rescale so the maximum maps to 255; an all-zero field stays zero.
pub fn normalize_to_full_range(field: &IntensityField) -> IntensityField {
    let max = field.max();
    if max > 0.0 {
        let scale = 255.0 / max;
        field.map(|v| v * scale)
    } else {
        field.map(|_| 0.0)
    }
}

/// Edge mask: foreground where the normalized magnitude reaches Otsu's level.
pub fn sobel_edges(image: &RasterImage) -> BinaryMask {
    let magnitude = sobel_magnitude(&intensity_field(image));
    let normalized = normalize_to_full_range(&magnitude);
    let level = otsu(&normalized);
    tracing::debug!(
        max_magnitude = magnitude.max(),
        threshold = level,
        "sobel edge threshold selected"
    );
    let cut = level as f32;
    BinaryMask::from_field(&normalized, |v| v >= cut)
}

/// Sobel + Otsu edge segmentation
#[derive(Debug, Clone, Copy, Default)]
pub struct SobelEdgeSegmenter;

impl Segmenter for SobelEdgeSegmenter {
    fn segment(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(sobel_edges(image).into_raster())
    }
}
