use image::{Rgba, RgbaImage};

use crate::types::{IntensityField, RasterImage, quantize};

/// ITU-R BT.601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> f32 {
    r as f32 * LUMA_R + g as f32 * LUMA_G + b as f32 * LUMA_B
}

/// Alpha-free analysis field of a raster.
///
/// Luma rasters are copied sample for sample; RGBA rasters are reduced with
/// the BT.601 weights and their alpha is dropped.
pub fn intensity_field(image: &RasterImage) -> IntensityField {
    match image {
        RasterImage::Luma(gray) => {
            IntensityField::from_fn(gray.width(), gray.height(), |x, y| gray.get_pixel(x, y)[0] as f32)
        }
        RasterImage::Rgba(rgba) => IntensityField::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, _] = rgba.get_pixel(x, y).0;
            luma(r, g, b)
        }),
    }
}

/// Grayscale view meant for display: keeps the source alpha channel.
pub fn grayscale(image: &RasterImage) -> RasterImage {
    match image {
        RasterImage::Luma(gray) => RasterImage::Luma(gray.clone()),
        RasterImage::Rgba(rgba) => {
            let view = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                let v = quantize(luma(r, g, b));
                Rgba([v, v, v, a])
            });
            RasterImage::Rgba(view)
        }
    }
}

/// Single-channel 8-bit copy of a raster (alpha discarded).
pub fn to_luma8(image: &RasterImage) -> image::GrayImage {
    match image {
        RasterImage::Luma(gray) => gray.clone(),
        RasterImage::Rgba(_) => intensity_field(image).to_gray_image(),
    }
}
