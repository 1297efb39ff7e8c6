use std::fmt;

use ab_glyph::{FontRef, PxScale};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_text_mut;

use crate::{error::Result, traits::LabelRenderer};

/// DejaVu Sans, see `assets/DejaVuSans-LICENSE.txt`
static LABEL_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Draws captions with the embedded DejaVu Sans face.
///
/// Glyphs are anti-aliased and clipped to the strip.
#[derive(Clone)]
pub struct TextLabelRenderer {
    font: FontRef<'static>,
    /// Glyph height in pixels
    pub scale: f32,
    pub ink: u8,
}

impl TextLabelRenderer {
    pub const DEFAULT_SCALE: f32 = 16.0;

    /// Black captions at [`Self::DEFAULT_SCALE`]
    pub fn new() -> Result<Self> {
        Ok(Self {
            font: FontRef::try_from_slice(LABEL_FONT)?,
            scale: Self::DEFAULT_SCALE,
            ink: 0,
        })
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_ink(mut self, ink: u8) -> Self {
        self.ink = ink;
        self
    }
}

impl fmt::Debug for TextLabelRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLabelRenderer")
            .field("scale", &self.scale)
            .field("ink", &self.ink)
            .finish_non_exhaustive()
    }
}

impl LabelRenderer for TextLabelRenderer {
    fn render(&self, label: &str, origin: (u32, u32), strip: &mut GrayImage) {
        draw_text_mut(
            strip,
            Luma([self.ink]),
            origin.0 as i32,
            origin.1 as i32,
            PxScale::from(self.scale),
            &self.font,
            label,
        );
    }
}

/// Leaves every strip blank
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabelRenderer;

impl LabelRenderer for NoLabelRenderer {
    fn render(&self, _label: &str, _origin: (u32, u32), _strip: &mut GrayImage) {}
}
