//! Adaptive thresholding against a scaled and offset local statistic:
//!
//! ```text
//! bright: I(x,y) >= C * S_k(x,y) + T
//! dark:   I(x,y) <= C * S_k(x,y) + T
//! ```
//!
//! The comparison sweeps vary exactly one of `k`, `C`, `T` and lay the masks
//! out side by side.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    algorithms::{
        grayscale::intensity_field,
        local_stat::{LocalStatistic, local_statistic, normalize_window},
    },
    compose::compose,
    error::Result,
    traits::{LabelRenderer, Segmenter},
    types::{BinaryMask, IntensityField, LabeledResult, RasterImage},
};

/// Which side of the cut counts as foreground
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Polarity {
    /// Objects brighter than their surroundings
    #[default]
    Bright,
    /// Objects darker than their surroundings
    Dark,
}

impl Polarity {
    /// Parse a polarity name; anything unrecognized means `Bright`.
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Polarity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdaptiveParams {
    /// Window side `k` (forced odd, at least 3)
    #[schemars(range(min = 3, max = 51))]
    pub window: u32,
    /// Multiplier `C` applied to the local statistic
    pub scale: f32,
    /// Offset `T` added after scaling
    pub offset: f32,
    pub stat: LocalStatistic,
    pub polarity: Polarity,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            window: 15,
            scale: 1.0,
            offset: 0.0,
            stat: LocalStatistic::Mean,
            polarity: Polarity::Bright,
        }
    }
}

fn threshold_against(
    field: &IntensityField,
    reference: &IntensityField,
    scale: f32,
    offset: f32,
    polarity: Polarity,
) -> BinaryMask {
    BinaryMask::from_fn(field.width(), field.height(), |x, y| {
        let cut = scale * reference.get(x, y) + offset;
        let v = field.get(x, y);
        match polarity {
            Polarity::Bright => v >= cut,
            Polarity::Dark => v <= cut,
        }
    })
}

pub fn adaptive(image: &RasterImage, params: &AdaptiveParams) -> BinaryMask {
    let field = intensity_field(image);
    let reference = local_statistic(&field, params.window, params.stat);
    threshold_against(&field, &reference, params.scale, params.offset, params.polarity)
}

impl Segmenter for AdaptiveParams {
    fn segment(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(adaptive(image, self).into_raster())
    }
}

/// Format like printf `%.3g` for magnitudes below 1000: three significant
/// digits, no trailing zeros.
pub fn short_number(v: f32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let magnitude = v.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, v);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// One mask per window size, labeled `k=<normalized k>`.
pub fn sweep_by_window(image: &RasterImage, windows: &[u32], base: &AdaptiveParams) -> Vec<LabeledResult> {
    let field = intensity_field(image);
    windows
        .iter()
        .map(|&k| {
            let k = normalize_window(k);
            let reference = local_statistic(&field, k, base.stat);
            let mask = threshold_against(&field, &reference, base.scale, base.offset, base.polarity);
            LabeledResult::new(format!("k={k}"), mask.into_image())
        })
        .collect()
}

/// One mask per scale `C`, sharing a single local statistic field.
pub fn sweep_by_scale(image: &RasterImage, scales: &[f32], base: &AdaptiveParams) -> Vec<LabeledResult> {
    let field = intensity_field(image);
    let reference = local_statistic(&field, base.window, base.stat);
    scales
        .iter()
        .map(|&c| {
            let mask = threshold_against(&field, &reference, c, base.offset, base.polarity);
            LabeledResult::new(format!("C={}", short_number(c)), mask.into_image())
        })
        .collect()
}

/// One mask per offset `T`, sharing a single local statistic field.
pub fn sweep_by_offset(image: &RasterImage, offsets: &[f32], base: &AdaptiveParams) -> Vec<LabeledResult> {
    let field = intensity_field(image);
    let reference = local_statistic(&field, base.window, base.stat);
    offsets
        .iter()
        .map(|&t| {
            let mask = threshold_against(&field, &reference, base.scale, t, base.polarity);
            LabeledResult::new(format!("T={}", short_number(t)), mask.into_image())
        })
        .collect()
}

pub fn compare_by_window(
    image: &RasterImage,
    windows: &[u32],
    base: &AdaptiveParams,
    renderer: &dyn LabelRenderer,
) -> Result<RasterImage> {
    compose(&sweep_by_window(image, windows, base), renderer)
}

pub fn compare_by_scale(
    image: &RasterImage,
    scales: &[f32],
    base: &AdaptiveParams,
    renderer: &dyn LabelRenderer,
) -> Result<RasterImage> {
    compose(&sweep_by_scale(image, scales, base), renderer)
}

pub fn compare_by_offset(
    image: &RasterImage,
    offsets: &[f32],
    base: &AdaptiveParams,
    renderer: &dyn LabelRenderer,
) -> Result<RasterImage> {
    compose(&sweep_by_offset(image, offsets, base), renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::NoLabelRenderer;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn uniform(v: u8) -> RasterImage {
        RasterImage::Luma(GrayImage::from_pixel(9, 7, Luma([v])))
    }

    /// Bright dot on a dim background
    fn spot() -> RasterImage {
        RasterImage::Luma(GrayImage::from_fn(11, 11, |x, y| {
            Luma([if x == 5 && y == 5 { 200 } else { 40 }])
        }))
    }

    #[test]
    fn test_uniform_field_follows_cut() {
        let v = 120.0;
        let stat = local_statistic(&intensity_field(&uniform(120)), 5, LocalStatistic::Mean);
        assert!(stat.samples().iter().all(|&s| s == v));

        for (scale, offset) in [(1.0, 0.0), (0.9, 5.0), (1.0, 1.0), (1.2, -10.0)] {
            let params = AdaptiveParams { window: 5, scale, offset, ..Default::default() };
            let mask = adaptive(&uniform(120), &params);
            let expected = if scale * v + offset <= v { 9 * 7 } else { 0 };
            assert_eq!(mask.foreground_count(), expected, "C={scale} T={offset}");
        }
    }

    #[test]
    fn test_uniform_color_image_is_all_foreground_at_default_window() {
        // luma 0.299*10 + 0.587*200 + 0.114*13 is not an integer
        let image = RasterImage::Rgba(RgbaImage::from_pixel(20, 20, Rgba([10, 200, 13, 255])));
        let field = intensity_field(&image);
        assert_ne!(field.get(0, 0).fract(), 0.0);

        for stat in [LocalStatistic::Mean, LocalStatistic::Median, LocalStatistic::Midrange] {
            let bright = AdaptiveParams { stat, ..Default::default() };
            assert_eq!(adaptive(&image, &bright).foreground_count(), 400, "{stat}");

            let dark = AdaptiveParams { polarity: Polarity::Dark, ..bright };
            assert_eq!(adaptive(&image, &dark).foreground_count(), 400, "{stat} dark");
        }
    }

    #[test]
    fn test_polarity_selects_side() {
        let base = AdaptiveParams { window: 3, offset: 10.0, ..Default::default() };
        let bright = adaptive(&spot(), &base);
        assert_eq!(bright.foreground_count(), 1);
        assert_eq!(bright.as_image().get_pixel(5, 5)[0], 255);

        let dark = adaptive(&spot(), &AdaptiveParams { polarity: Polarity::Dark, ..base });
        assert_eq!(dark.as_image().get_pixel(5, 5)[0], 0);
        assert_eq!(dark.as_image().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_every_statistic_yields_binary_mask() {
        for stat in [LocalStatistic::Mean, LocalStatistic::Median, LocalStatistic::Midrange] {
            let params = AdaptiveParams { window: 4, stat, ..Default::default() };
            let mask = adaptive(&spot(), &params);
            assert!(mask.as_image().pixels().all(|p| p[0] == 0 || p[0] == 255));
        }
    }

    #[test]
    fn test_polarity_parsing() {
        assert_eq!(Polarity::from_name("DARK"), Polarity::Dark);
        assert_eq!(Polarity::from_name("sideways"), Polarity::Bright);
    }

    #[test]
    fn test_short_number() {
        assert_eq!(short_number(0.8), "0.8");
        assert_eq!(short_number(1.0), "1");
        assert_eq!(short_number(1.25), "1.25");
        assert_eq!(short_number(-10.0), "-10");
        assert_eq!(short_number(0.0), "0");
        assert_eq!(short_number(12.345), "12.3");
    }

    #[test]
    fn test_sweep_labels() {
        let base = AdaptiveParams::default();
        let windows: Vec<_> = sweep_by_window(&spot(), &[2, 5, 8], &base)
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(windows, ["k=3", "k=5", "k=9"]);

        let scales: Vec<_> = sweep_by_scale(&spot(), &[0.8, 1.0, 1.2], &base)
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(scales, ["C=0.8", "C=1", "C=1.2"]);

        let offsets: Vec<_> = sweep_by_offset(&spot(), &[-10.0, 0.0, 10.0], &base)
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(offsets, ["T=-10", "T=0", "T=10"]);
    }

    #[test]
    fn test_compare_grid_size() {
        let grid = compare_by_offset(&spot(), &[-10.0, 0.0, 10.0], &AdaptiveParams::default(), &NoLabelRenderer)
            .unwrap();
        assert_eq!(grid.dimensions(), (11 * 3 + 12 * 2, 11 + 24));
    }

    #[test]
    fn test_empty_sweep_gives_placeholder() {
        let placeholder = RasterImage::Luma(GrayImage::from_pixel(1, 1, Luma([255])));
        let base = AdaptiveParams::default();
        assert_eq!(compare_by_window(&spot(), &[], &base, &NoLabelRenderer).unwrap(), placeholder);
        assert_eq!(compare_by_scale(&spot(), &[], &base, &NoLabelRenderer).unwrap(), placeholder);
        assert_eq!(compare_by_offset(&spot(), &[], &base, &NoLabelRenderer).unwrap(), placeholder);
    }
}
