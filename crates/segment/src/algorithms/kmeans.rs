//! 1-D k-means over pixel intensities and posterization.
//!
//! Centroids start evenly spaced over [0, 255]. A cluster that ends an
//! iteration without samples is reseeded from a uniformly drawn sample, which
//! makes unseeded runs nondeterministic on such inputs; pass a seed to pin
//! the draws.

use rand::{Rng, SeedableRng, rngs::StdRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::grayscale::{intensity_field, to_luma8},
    compose::compose,
    error::Result,
    traits::{LabelRenderer, Segmenter},
    types::{IntensityField, LabeledResult, RasterImage},
};

/// Centroids that moved less than this count as settled
const CONVERGENCE_EPS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KMeansParams {
    /// Number of clusters `k`
    #[schemars(range(min = 2, max = 64))]
    pub clusters: u32,
    #[schemars(range(min = 1, max = 10000))]
    pub max_iter: u32,
    /// Seed for empty-cluster reseeding; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            clusters: 2,
            max_iter: 50,
            seed: None,
        }
    }
}

/// Outcome of clustering one field
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    width: u32,
    height: u32,
    /// Final centroid per cluster, in cluster-index order
    pub centroids: Vec<f32>,
    /// Cluster index per sample, row-major
    pub assignments: Vec<usize>,
}

impl Clustering {
    /// Replace every sample by its centroid rounded to the nearest level.
    pub fn posterized(&self) -> IntensityField {
        let levels: Vec<f32> = self.centroids.iter().map(|c| c.round()).collect();
        IntensityField::from_fn(self.width, self.height, |x, y| {
            levels[self.assignments[(y * self.width + x) as usize]]
        })
    }
}

/// `k` values from 0 to 255 inclusive, evenly spaced.
pub fn initial_centroids(k: usize) -> Vec<f32> {
    if k == 1 {
        return vec![0.0];
    }
    (0..k)
        .map(|i| (255.0 * i as f64 / (k - 1) as f64) as f32)
        .collect()
}

/// Index of the nearest centroid; the lowest index wins ties.
#[inline]
fn nearest(v: f32, centroids: &[f32]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let distance = (v - c).abs();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn assign(samples: &[f32], centroids: &[f32], assignments: &mut [usize]) {
    for (slot, &v) in assignments.iter_mut().zip(samples) {
        *slot = nearest(v, centroids);
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Cluster the field's samples into `k` (at least 2) groups.
pub fn cluster(field: &IntensityField, k: u32, max_iter: u32, seed: Option<u64>) -> Clustering {
    let mut rng = rng_from(seed);
    cluster_with_rng(field, k, max_iter, &mut rng)
}

pub fn cluster_with_rng<R: Rng>(field: &IntensityField, k: u32, max_iter: u32, rng: &mut R) -> Clustering {
    let k = k.max(2) as usize;
    let max_iter = max_iter.max(1);
    let samples = field.samples();

    let mut centroids = initial_centroids(k);
    let mut assignments = vec![0usize; samples.len()];
    let mut sums = vec![0f64; k];
    let mut counts = vec![0u64; k];
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;
        assign(samples, &centroids, &mut assignments);

        sums.fill(0.0);
        counts.fill(0);
        for (&v, &a) in samples.iter().zip(&assignments) {
            sums[a] += v as f64;
            counts[a] += 1;
        }

        let mut moved = false;
        for (ci, centroid) in centroids.iter_mut().enumerate() {
            let next = if counts[ci] > 0 {
                (sums[ci] / counts[ci] as f64) as f32
            } else if samples.is_empty() {
                0.0
            } else {
                samples[rng.gen_range(0..samples.len())]
            };
            if (next - *centroid).abs() > CONVERGENCE_EPS {
                moved = true;
            }
            *centroid = next;
        }
        if !moved {
            break;
        }
    }

    assign(samples, &centroids, &mut assignments);
    tracing::debug!(k, iterations, ?centroids, "k-means finished");

    Clustering {
        width: field.width(),
        height: field.height(),
        centroids,
        assignments,
    }
}

/// Posterized luma raster of the image's intensities.
pub fn kmeans(image: &RasterImage, params: &KMeansParams) -> RasterImage {
    let field = intensity_field(image);
    let clustering = cluster(&field, params.clusters, params.max_iter, params.seed);
    RasterImage::Luma(clustering.posterized().to_gray_image())
}

impl Segmenter for KMeansParams {
    fn segment(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(kmeans(image, self))
    }
}

/// One posterized image per cluster count, labeled `k=<k>`.
pub fn sweep_by_clusters(
    image: &RasterImage,
    ks: &[u32],
    max_iter: u32,
    seed: Option<u64>,
) -> Vec<LabeledResult> {
    let field = intensity_field(image);
    let mut rng = rng_from(seed);
    ks.iter()
        .map(|&k| {
            let k = k.max(2);
            let clustering = cluster_with_rng(&field, k, max_iter, &mut rng);
            LabeledResult::new(format!("k={k}"), clustering.posterized().to_gray_image())
        })
        .collect()
}

pub fn compare_by_clusters(
    image: &RasterImage,
    ks: &[u32],
    max_iter: u32,
    seed: Option<u64>,
    renderer: &dyn LabelRenderer,
) -> Result<RasterImage> {
    if ks.is_empty() {
        tracing::debug!("no cluster counts to compare, returning the luma view");
        return Ok(RasterImage::Luma(to_luma8(image)));
    }
    compose(&sweep_by_clusters(image, ks, max_iter, seed), renderer)
}
