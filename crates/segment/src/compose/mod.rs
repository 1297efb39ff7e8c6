//! Side-by-side comparison grids.
//!
//! [`GridLayout`] is pure geometry; [`compose`] paints it, delegating text to
//! a [`LabelRenderer`].

pub mod label;

pub use label::{NoLabelRenderer, TextLabelRenderer};

use image::{GrayImage, Luma, imageops};

use crate::{
    algorithms::grayscale::to_luma8,
    error::{Result, SegmentError},
    traits::LabelRenderer,
    types::{LabeledResult, RasterImage},
};

/// Height of the caption strip above every cell
pub const LABEL_STRIP_HEIGHT: u32 = 24;
/// Horizontal gap between cells
pub const CELL_GAP: u32 = 12;
/// Caption offset inside its strip
pub const LABEL_INSET: (u32, u32) = (6, 4);

const BACKGROUND: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Left edge of the cell on the canvas
    pub x: u32,
    /// Where the caption starts, canvas coordinates
    pub label_origin: (u32, u32),
    /// Where the sub-image's top-left pixel lands, canvas coordinates
    pub image_origin: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub cells: Vec<GridCell>,
}

impl GridLayout {
    /// Geometry for `n` cells of `cell_width × cell_height`. Zero cells give
    /// the 1×1 placeholder canvas.
    pub fn new(n: usize, cell_width: u32, cell_height: u32) -> Self {
        if n == 0 {
            return Self {
                canvas_width: 1,
                canvas_height: 1,
                cell_width,
                cell_height,
                cells: Vec::new(),
            };
        }

        let n32 = n as u32;
        let cells = (0..n32)
            .map(|i| {
                let x = i * (cell_width + CELL_GAP);
                GridCell {
                    x,
                    label_origin: (x + LABEL_INSET.0, LABEL_INSET.1),
                    image_origin: (x, LABEL_STRIP_HEIGHT),
                }
            })
            .collect();

        Self {
            canvas_width: cell_width * n32 + CELL_GAP * (n32 - 1),
            canvas_height: cell_height + LABEL_STRIP_HEIGHT,
            cell_width,
            cell_height,
            cells,
        }
    }
}

/// Lay the results out left to right under their captions on a white canvas.
///
/// Every image must match the first one's size; a mismatch is the caller's
/// error and is reported as [`SegmentError::DimensionMismatch`].
pub fn compose(results: &[LabeledResult], renderer: &dyn LabelRenderer) -> Result<RasterImage> {
    let Some(first) = results.first() else {
        tracing::warn!("comparison grid requested with no results");
        return Ok(RasterImage::Luma(GrayImage::from_pixel(1, 1, BACKGROUND)));
    };

    let (width, height) = first.image.dimensions();
    if let Some(bad) = results.iter().find(|r| r.image.dimensions() != (width, height)) {
        return Err(SegmentError::DimensionMismatch {
            label: bad.label.clone(),
            expected: (width, height),
            found: bad.image.dimensions(),
        });
    }

    let layout = GridLayout::new(results.len(), width, height);
    let mut canvas = GrayImage::from_pixel(layout.canvas_width, layout.canvas_height, BACKGROUND);

    for (cell, result) in layout.cells.iter().zip(results) {
        let mut strip = GrayImage::from_pixel(width, LABEL_STRIP_HEIGHT, BACKGROUND);
        let inset = (cell.label_origin.0 - cell.x, cell.label_origin.1);
        renderer.render(&result.label, inset, &mut strip);
        imageops::replace(&mut canvas, &strip, cell.x as i64, 0);

        let tile = to_luma8(&result.image);
        imageops::replace(
            &mut canvas,
            &tile,
            cell.image_origin.0 as i64,
            cell.image_origin.1 as i64,
        );
    }

    Ok(RasterImage::Luma(canvas))
}
