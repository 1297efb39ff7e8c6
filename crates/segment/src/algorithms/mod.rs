pub mod grayscale;
pub mod histogram;
pub mod edges;
pub mod global;
pub mod local_stat;
pub mod adaptive;
pub mod kmeans;

pub use grayscale::{grayscale, intensity_field, to_luma8};
pub use histogram::{Histogram, otsu, otsu_level};
pub use edges::{SobelEdgeSegmenter, sobel_edges, sobel_magnitude};
pub use global::{IterativeParams, PTileParams, iterative, iterative_level, ptile, ptile_level};
pub use local_stat::{LocalStatistic, local_statistic, normalize_window, reduce_separable, reduce_window};
pub use adaptive::{
    AdaptiveParams, Polarity, adaptive, compare_by_offset, compare_by_scale, compare_by_window,
    sweep_by_offset, sweep_by_scale, sweep_by_window,
};
pub use kmeans::{Clustering, KMeansParams, cluster, compare_by_clusters, kmeans, sweep_by_clusters};
