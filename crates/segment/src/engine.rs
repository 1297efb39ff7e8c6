use std::{fmt, sync::Arc};

use crate::{
    algorithms::{
        SobelEdgeSegmenter, compare_by_clusters, compare_by_offset, compare_by_scale,
        compare_by_window, grayscale,
    },
    compose::{NoLabelRenderer, TextLabelRenderer},
    error::Result,
    mode::ProcessingMode,
    traits::{LabelRenderer, Segmenter},
    types::RasterImage,
};

/// Runs a [`ProcessingMode`] against an image.
///
/// Holds no per-call state, so one engine can be shared between threads.
#[derive(Clone)]
pub struct SegmentationEngine {
    renderer: Arc<dyn LabelRenderer>,
}

impl SegmentationEngine {
    /// Engine with the embedded-font caption renderer. Grids go uncaptioned
    /// if the font cannot be loaded.
    pub fn new() -> Self {
        let renderer: Arc<dyn LabelRenderer> = match TextLabelRenderer::new() {
            Ok(renderer) => Arc::new(renderer),
            Err(err) => {
                tracing::warn!("{err}, comparison grids will have blank captions");
                Arc::new(NoLabelRenderer)
            }
        };
        Self { renderer }
    }

    /// Create an engine that captions comparison grids with a custom renderer
    pub fn with_label_renderer(renderer: impl LabelRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }

    pub fn process(&self, image: &RasterImage, mode: &ProcessingMode) -> Result<RasterImage> {
        let (width, height) = image.dimensions();
        let span = tracing::info_span!("process", mode = %mode, width, height);
        let _enter = span.enter();

        let renderer = self.renderer.as_ref();
        match mode {
            ProcessingMode::Original => Ok(image.clone()),
            ProcessingMode::Grayscale => Ok(grayscale(image)),
            ProcessingMode::SobelEdges => SobelEdgeSegmenter.segment(image),
            ProcessingMode::PTile(params) => params.segment(image),
            ProcessingMode::Iterative(params) => params.segment(image),
            ProcessingMode::KMeans(params) => params.segment(image),
            ProcessingMode::KMeansCompare(params) => compare_by_clusters(
                image,
                &params.clusters,
                params.max_iter,
                params.seed,
                renderer,
            ),
            ProcessingMode::Adaptive(params) => params.segment(image),
            ProcessingMode::AdaptiveCompareWindow(sweep) => {
                compare_by_window(image, &sweep.windows, &sweep.base, renderer)
            }
            ProcessingMode::AdaptiveCompareScale(sweep) => {
                compare_by_scale(image, &sweep.scales, &sweep.base, renderer)
            }
            ProcessingMode::AdaptiveCompareOffset(sweep) => {
                compare_by_offset(image, &sweep.offsets, &sweep.base, renderer)
            }
        }
    }
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SegmentationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentationEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::PTileParams,
        mode::{KMeansCompareParams, ScaleSweep, WindowSweep},
    };
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn gradient() -> RasterImage {
        RasterImage::Luma(GrayImage::from_fn(16, 8, |x, _| Luma([(x * 16) as u8])))
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SegmentationEngine>();
    }

    #[test]
    fn test_original_is_an_equal_copy() {
        let image = RasterImage::Rgba(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4])));
        let out = SegmentationEngine::new().process(&image, &ProcessingMode::Original).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_ptile_dispatch() {
        let engine = SegmentationEngine::new();
        let out = engine
            .process(&gradient(), &ProcessingMode::PTile(PTileParams { p: 0.5 }))
            .unwrap();
        let mask = out.as_luma().unwrap();
        assert_eq!(mask.pixels().filter(|p| p[0] == 255).count(), 64);
    }

    #[test]
    fn test_comparison_grid_size() {
        let engine = SegmentationEngine::with_label_renderer(NoLabelRenderer);
        let mode = ProcessingMode::KMeansCompare(KMeansCompareParams {
            clusters: vec![2, 3],
            seed: Some(7),
            ..Default::default()
        });
        let grid = engine.process(&gradient(), &mode).unwrap();
        assert_eq!(grid.dimensions(), (16 * 2 + 12, 8 + 24));

        let mode = ProcessingMode::AdaptiveCompareWindow(WindowSweep::default());
        let grid = engine.process(&gradient(), &mode).unwrap();
        assert_eq!(grid.dimensions(), (16 * 4 + 12 * 3, 8 + 24));
    }

    #[test]
    fn test_empty_comparisons_pass_through() {
        let engine = SegmentationEngine::new();
        let mode = ProcessingMode::AdaptiveCompareWindow(WindowSweep { windows: vec![], ..Default::default() });
        let grid = engine.process(&gradient(), &mode).unwrap();
        assert_eq!(grid, RasterImage::Luma(GrayImage::from_pixel(1, 1, Luma([255]))));

        let mode = ProcessingMode::KMeansCompare(KMeansCompareParams { clusters: vec![], ..Default::default() });
        assert_eq!(engine.process(&gradient(), &mode).unwrap(), gradient());
    }

    #[test]
    fn test_default_engine_captions_grids() {
        let engine = SegmentationEngine::new();
        let image = RasterImage::Luma(GrayImage::from_pixel(40, 8, Luma([255])));
        let mode = ProcessingMode::AdaptiveCompareScale(ScaleSweep { scales: vec![1.0], ..Default::default() });
        let grid = engine.process(&image, &mode).unwrap();
        let strip = grid.as_luma().unwrap();
        assert!((0..40).any(|x| (0..24).any(|y| strip.get_pixel(x, y)[0] < 255)));
    }
}
