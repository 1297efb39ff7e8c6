//! # Intensity Segmentation Library
//!
//! Classical, non-learned segmentation of raster images: global and local
//! thresholding, edge extraction and intensity clustering, plus side-by-side
//! comparison grids for parameter sweeps.
//!
//! ## Core Features
//!
//! - **Global thresholds**: Otsu, P-tile and iterative (isodata) selection
//! - **Edges**: Sobel gradient magnitude binarized with Otsu's level
//! - **Adaptive thresholds**: mean, median or midrange neighborhoods
//! - **K-means**: 1-D intensity clustering and posterization
//! - **Comparison grids**: labeled results laid out left to right
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segment::{ProcessingMode, RasterImage, SegmentationEngine};
//!
//! let image = RasterImage::from_dynamic(image::open("photo.png")?);
//! let engine = SegmentationEngine::new();
//!
//! let mask = engine.process(&image, &ProcessingMode::SobelEdges)?;
//! mask.to_dynamic().save("edges.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modes from JSON
//!
//! ```rust
//! use segment::ProcessingMode;
//!
//! let mode: ProcessingMode = serde_json::from_str(
//!     r#"{"type": "adaptive", "params": {"window": 9, "stat": "median"}}"#,
//! )?;
//! assert_eq!(mode.to_string(), "adaptive");
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod compose;
pub mod mode;
pub mod engine;

pub use error::{Result, SegmentError};
pub use types::{BinaryMask, ChannelMode, IntensityField, LabeledResult, RasterImage};
pub use traits::*;
pub use compose::{GridLayout, NoLabelRenderer, TextLabelRenderer, compose};
pub use mode::{KMeansCompareParams, OffsetSweep, ProcessingMode, ScaleSweep, WindowSweep};
pub use engine::SegmentationEngine;
