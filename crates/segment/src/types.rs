use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};

/// Sample layout of a [`RasterImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// Single 8-bit intensity channel
    Luma,
    /// 8-bit color plus alpha
    Rgba,
}

/// Decoded raster handed to the engine.
///
/// Every operation returns a new raster; inputs are never modified.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterImage {
    Luma(GrayImage),
    Rgba(RgbaImage),
}

impl RasterImage {
    /// Wrap a decoded image. 8-bit luma stays single-channel, every other
    /// layout is converted to RGBA.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::Luma(gray),
            DynamicImage::ImageRgba8(rgba) => Self::Rgba(rgba),
            other => Self::Rgba(other.to_rgba8()),
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Self::Luma(gray) => DynamicImage::ImageLuma8(gray.clone()),
            Self::Rgba(rgba) => DynamicImage::ImageRgba8(rgba.clone()),
        }
    }

    pub fn channel_mode(&self) -> ChannelMode {
        match self {
            Self::Luma(_) => ChannelMode::Luma,
            Self::Rgba(_) => ChannelMode::Rgba,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Self::Luma(gray) => gray.width(),
            Self::Rgba(rgba) => rgba.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Luma(gray) => gray.height(),
            Self::Rgba(rgba) => rgba.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn as_luma(&self) -> Option<&GrayImage> {
        match self {
            Self::Luma(gray) => Some(gray),
            Self::Rgba(_) => None,
        }
    }
}

impl From<GrayImage> for RasterImage {
    fn from(image: GrayImage) -> Self {
        Self::Luma(image)
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(image: RgbaImage) -> Self {
        Self::Rgba(image)
    }
}

/// Row-major single-channel field of `f32` samples in [0, 255].
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityField {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl IntensityField {
    /// Zero-filled field of size `width × height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SegmentError::ImageProcessing(format!(
                "field of {}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Sample at (x, y) with out-of-range coordinates replicated from the
    /// nearest edge. Must not be called on an empty field.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(cx, cy)
    }

    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Arithmetic mean of all samples, 0 for an empty field
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }

    /// Round every sample to the nearest integer and clamp it into a byte.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([quantize(self.get(x, y))])
        })
    }
}

/// Nearest integer level in [0, 255], halves go to the even neighbour
#[inline]
pub(crate) fn quantize(v: f32) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

pub const BACKGROUND: u8 = 0;
pub const FOREGROUND: u8 = 255;

/// Single-channel image whose samples are exactly 0 or 255.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    pub fn from_fn<F>(width: u32, height: u32, mut is_foreground: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if is_foreground(x, y) { FOREGROUND } else { BACKGROUND }])
        }))
    }

    /// Foreground wherever `is_foreground` holds for the field sample.
    pub fn from_field<F>(field: &IntensityField, is_foreground: F) -> Self
    where
        F: Fn(f32) -> bool,
    {
        Self::from_fn(field.width(), field.height(), |x, y| {
            is_foreground(field.get(x, y))
        })
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn into_raster(self) -> RasterImage {
        RasterImage::Luma(self.0)
    }

    pub fn foreground_count(&self) -> usize {
        self.0.pixels().filter(|p| p[0] == FOREGROUND).count()
    }
}

/// A result raster paired with the caption drawn above it in a comparison grid
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledResult {
    pub label: String,
    pub image: RasterImage,
}

impl LabeledResult {
    pub fn new(label: impl Into<String>, image: impl Into<RasterImage>) -> Self {
        Self {
            label: label.into(),
            image: image.into(),
        }
    }
}
