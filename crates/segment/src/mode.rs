use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr, VariantNames};

use crate::algorithms::{AdaptiveParams, IterativeParams, KMeansParams, PTileParams};

const DEFAULT_COMPARE_CLUSTERS: [u32; 3] = [2, 3, 4];
const DEFAULT_COMPARE_WINDOWS: [u32; 4] = [3, 5, 9, 15];
const DEFAULT_COMPARE_SCALES: [f32; 3] = [0.8, 1.0, 1.2];
const DEFAULT_COMPARE_OFFSETS: [f32; 3] = [-10.0, 0.0, 10.0];

/// k-means run once per cluster count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KMeansCompareParams {
    /// Cluster counts, one grid cell each. An empty list returns the luma view.
    pub clusters: Vec<u32>,
    #[schemars(range(min = 1, max = 10000))]
    pub max_iter: u32,
    pub seed: Option<u64>,
}

impl Default for KMeansCompareParams {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_COMPARE_CLUSTERS.to_vec(),
            max_iter: KMeansParams::default().max_iter,
            seed: None,
        }
    }
}

/// Adaptive threshold with the window size varied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WindowSweep {
    /// An empty list yields the 1×1 placeholder grid
    pub windows: Vec<u32>,
    /// Fixed parameters; `base.window` is ignored
    pub base: AdaptiveParams,
}

impl Default for WindowSweep {
    fn default() -> Self {
        Self {
            windows: DEFAULT_COMPARE_WINDOWS.to_vec(),
            base: AdaptiveParams::default(),
        }
    }
}

/// Adaptive threshold with the scale `C` varied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScaleSweep {
    pub scales: Vec<f32>,
    /// Fixed parameters; `base.scale` is ignored
    pub base: AdaptiveParams,
}

impl Default for ScaleSweep {
    fn default() -> Self {
        Self {
            scales: DEFAULT_COMPARE_SCALES.to_vec(),
            base: AdaptiveParams::default(),
        }
    }
}

/// Adaptive threshold with the offset `T` varied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OffsetSweep {
    pub offsets: Vec<f32>,
    /// Fixed parameters; `base.offset` is ignored
    pub base: AdaptiveParams,
}

impl Default for OffsetSweep {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_COMPARE_OFFSETS.to_vec(),
            base: AdaptiveParams::default(),
        }
    }
}

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingMode {
    /// Unprocessed copy of the input
    Original,

    /// Grayscale view keeping the source alpha
    Grayscale,

    /// Sobel gradient magnitude binarized with Otsu's threshold
    SobelEdges,

    /// Global P-tile threshold
    #[serde(rename = "ptile")]
    #[strum(serialize = "ptile")]
    PTile(PTileParams),

    /// Global iterative (isodata) threshold
    Iterative(IterativeParams),

    /// Intensity k-means posterization
    #[serde(rename = "kmeans")]
    #[strum(serialize = "kmeans")]
    KMeans(KMeansParams),

    /// k-means grid over several cluster counts
    #[serde(rename = "kmeans_compare")]
    #[strum(serialize = "kmeans_compare")]
    KMeansCompare(KMeansCompareParams),

    /// Local-statistic adaptive threshold
    Adaptive(AdaptiveParams),

    /// Adaptive threshold grid over window sizes
    AdaptiveCompareWindow(WindowSweep),

    /// Adaptive threshold grid over scales `C`
    AdaptiveCompareScale(ScaleSweep),

    /// Adaptive threshold grid over offsets `T`
    AdaptiveCompareOffset(OffsetSweep),
}

impl ProcessingMode {
    /// Get the JSON schema for all modes
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ProcessingMode)
    }

    /// Get a list of all available mode names
    pub fn mode_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Whether the mode yields a side-by-side comparison grid
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::KMeansCompare(_)
                | Self::AdaptiveCompareWindow(_)
                | Self::AdaptiveCompareScale(_)
                | Self::AdaptiveCompareOffset(_)
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Original => "Return the input unchanged",
            Self::Grayscale => "Convert to grayscale (BT.601 luma), keeping alpha",
            Self::SobelEdges => "Edge mask from Sobel gradient magnitude and Otsu's threshold",
            Self::PTile(_) => "Global threshold keeping at least a fraction p of pixels as foreground",
            Self::Iterative(_) => "Global threshold refined by averaging the two class means",
            Self::KMeans(_) => "Posterize intensities into k clusters",
            Self::KMeansCompare(_) => "Side-by-side k-means results for several k",
            Self::Adaptive(_) => "Per-pixel threshold C * local statistic + T",
            Self::AdaptiveCompareWindow(_) => "Side-by-side adaptive thresholds for several window sizes",
            Self::AdaptiveCompareScale(_) => "Side-by-side adaptive thresholds for several scales C",
            Self::AdaptiveCompareOffset(_) => "Side-by-side adaptive thresholds for several offsets T",
        }
    }

    /// Get parameter descriptions for the mode: (name, description, required)
    pub fn parameters_info(&self) -> Vec<(&'static str, &'static str, bool)> {
        const ADAPTIVE: [(&str, &str, bool); 5] = [
            ("window", "Window side k (odd, 3-51)", false),
            ("scale", "Multiplier C of the local statistic", false),
            ("offset", "Offset T added to the scaled statistic", false),
            ("stat", "Local statistic: mean, median or midrange", false),
            ("polarity", "bright (I >= cut) or dark (I <= cut)", false),
        ];
        match self {
            Self::Original | Self::Grayscale | Self::SobelEdges => vec![],
            Self::PTile(_) => vec![("p", "Target foreground fraction (0-1)", false)],
            Self::Iterative(_) => vec![
                ("tol", "Convergence tolerance on the threshold", false),
                ("max_iter", "Iteration cap (1-10000)", false),
            ],
            Self::KMeans(_) => vec![
                ("clusters", "Number of clusters k (2-64)", false),
                ("max_iter", "Iteration cap (1-10000)", false),
                ("seed", "Seed for empty-cluster reseeding", false),
            ],
            Self::KMeansCompare(_) => vec![
                ("clusters", "List of cluster counts to compare", false),
                ("max_iter", "Iteration cap (1-10000)", false),
                ("seed", "Seed for empty-cluster reseeding", false),
            ],
            Self::Adaptive(_) => ADAPTIVE.to_vec(),
            Self::AdaptiveCompareWindow(_) => vec![
                ("windows", "List of window sides to compare", false),
                ("base", "Adaptive parameters held fixed", false),
            ],
            Self::AdaptiveCompareScale(_) => vec![
                ("scales", "List of scales C to compare", false),
                ("base", "Adaptive parameters held fixed", false),
            ],
            Self::AdaptiveCompareOffset(_) => vec![
                ("offsets", "List of offsets T to compare", false),
                ("base", "Adaptive parameters held fixed", false),
            ],
        }
    }
}
