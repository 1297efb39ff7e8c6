//! Global thresholds: one cut value for the whole image.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{grayscale::intensity_field, histogram::Histogram},
    error::Result,
    traits::Segmenter,
    types::{BinaryMask, IntensityField, RasterImage, quantize},
};

/// P-tile: the highest level whose foreground (I ≥ T) covers at least `p`
/// of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PTileParams {
    /// Target foreground fraction
    #[schemars(range(min = 0.0, max = 1.0))]
    pub p: f32,
}

impl Default for PTileParams {
    fn default() -> Self {
        Self { p: 0.30 }
    }
}

/// Highest level `T` with `count(I >= T) >= round(p * N)`.
///
/// 255 when the target is 0 (including an empty histogram).
pub fn ptile_level(histogram: &Histogram, p: f32) -> u8 {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    let at_or_above = histogram.suffix_counts();
    let target = (p as f64 * histogram.total() as f64).round_ties_even() as u64;

    (0..=255u8)
        .rev()
        .find(|&t| at_or_above[t as usize] >= target)
        .unwrap_or(u8::MAX)
}

pub fn ptile(image: &RasterImage, p: f32) -> BinaryMask {
    let field = intensity_field(image);
    let level = ptile_level(&Histogram::from_field(&field), p);
    tracing::debug!(p, threshold = level, "p-tile threshold selected");
    BinaryMask::from_field(&field, |v| quantize(v) >= level)
}

impl Segmenter for PTileParams {
    fn segment(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(ptile(image, self.p).into_raster())
    }
}

/// Isodata-style threshold refined from the image mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IterativeParams {
    /// Stop once the threshold moves by less than this
    #[schemars(range(min = 0.0))]
    pub tol: f32,
    #[schemars(range(min = 1, max = 10000))]
    pub max_iter: u32,
}

impl Default for IterativeParams {
    fn default() -> Self {
        Self {
            tol: 0.5,
            max_iter: 100,
        }
    }
}

/// Final threshold of the iterative scheme; foreground is `I > T`.
pub fn iterative_level(field: &IntensityField, tol: f32, max_iter: u32) -> f32 {
    let max_iter = max_iter.max(1);
    let mut threshold = field.mean();
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;
        let (mut low_sum, mut low_n, mut high_sum, mut high_n) = (0f64, 0u64, 0f64, 0u64);
        for &v in field.samples() {
            if v <= threshold {
                low_sum += v as f64;
                low_n += 1;
            } else {
                high_sum += v as f64;
                high_n += 1;
            }
        }
        if low_n == 0 || high_n == 0 {
            break;
        }

        let next = (0.5 * (low_sum / low_n as f64 + high_sum / high_n as f64)) as f32;
        let delta = (next - threshold).abs();
        threshold = next;
        if delta < tol {
            break;
        }
    }

    tracing::debug!(threshold, iterations, "iterative threshold converged");
    threshold
}

pub fn iterative(image: &RasterImage, tol: f32, max_iter: u32) -> BinaryMask {
    let field = intensity_field(image);
    let threshold = iterative_level(&field, tol, max_iter);
    BinaryMask::from_field(&field, |v| v > threshold)
}

impl Segmenter for IterativeParams {
    fn segment(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(iterative(image, self.tol, self.max_iter).into_raster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gradient_image() -> RasterImage {
        RasterImage::Luma(GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8])))
    }

    fn bimodal_field() -> IntensityField {
        IntensityField::from_fn(20, 10, |x, _| if x < 10 { 10.0 } else { 240.0 })
    }

    #[test]
    fn test_ptile_cut_is_tightest() {
        let field = intensity_field(&gradient_image());
        let hist = Histogram::from_field(&field);
        let at_or_above = hist.suffix_counts();
        for p in [0.0, 0.05, 0.3, 0.5, 0.77, 1.0] {
            let t = ptile_level(&hist, p);
            let target = (p as f64 * hist.total() as f64).round_ties_even() as u64;
            assert!(at_or_above[t as usize] >= target, "p={p} t={t}");
            if t < 255 {
                assert!(at_or_above[t as usize + 1] < target, "p={p} t={t}");
            }
        }
    }

    #[test]
    fn test_ptile_extremes() {
        let hist = Histogram::from_field(&intensity_field(&gradient_image()));
        assert_eq!(ptile_level(&hist, 0.0), 255);
        assert_eq!(ptile_level(&hist, 1.0), 0);
        assert_eq!(ptile_level(&hist, 7.0), 0);
        assert_eq!(ptile_level(&hist, -1.0), 255);
        assert_eq!(ptile_level(&Histogram::from_field(&IntensityField::new(0, 0)), 0.5), 255);
    }

    #[test]
    fn test_ptile_mask_area() {
        // 256 distinct levels, one sample each
        let mask = ptile(&gradient_image(), 0.25);
        assert_eq!(mask.foreground_count(), 64);
    }

    #[test]
    fn test_iterative_converges_between_modes() {
        let t = iterative_level(&bimodal_field(), 0.5, 100);
        assert!(t > 10.0 && t < 240.0, "threshold {t}");
        assert!((t - 125.0).abs() < 1e-3);
    }

    #[test]
    fn test_iterative_uniform_field_stops_at_mean() {
        let field = IntensityField::from_fn(4, 4, |_, _| 50.0);
        assert_eq!(iterative_level(&field, 0.5, 100), 50.0);
        let mask = BinaryMask::from_field(&field, |v| v > 50.0);
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_iterative_mask_separates_modes() {
        let img = RasterImage::Luma(GrayImage::from_fn(20, 10, |x, _| Luma([if x < 10 { 10 } else { 240 }])));
        let mask = iterative(&img, 0.5, 100);
        assert_eq!(mask.foreground_count(), 100);
        assert_eq!(mask.as_image().get_pixel(15, 3)[0], 255);
        assert_eq!(mask.as_image().get_pixel(2, 3)[0], 0);
    }

    #[test]
    fn test_iterative_empty_field() {
        assert_eq!(iterative_level(&IntensityField::new(0, 0), 0.5, 0), 0.0);
    }
}
