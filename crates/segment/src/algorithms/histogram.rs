//! 256-bin intensity histogram and Otsu's threshold.
//!
//! Samples are rounded to the nearest level and clamped to [0, 255] before
//! counting, so float fields and 8-bit images share one histogram model.

use crate::types::{IntensityField, quantize};

pub const LEVELS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; LEVELS],
}

impl Histogram {
    pub fn from_counts(counts: [u64; LEVELS]) -> Self {
        Self { counts }
    }

    pub fn from_field(field: &IntensityField) -> Self {
        let mut counts = [0u64; LEVELS];
        for &v in field.samples() {
            counts[quantize(v) as usize] += 1;
        }
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; LEVELS] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `cumulative()[t]` is the number of samples at or below level `t`.
    pub fn cumulative(&self) -> [u64; LEVELS] {
        let mut out = [0u64; LEVELS];
        let mut running = 0;
        for (slot, &count) in out.iter_mut().zip(self.counts.iter()) {
            running += count;
            *slot = running;
        }
        out
    }

    /// `suffix_counts()[t]` is the number of samples at or above level `t`.
    pub fn suffix_counts(&self) -> [u64; LEVELS] {
        let mut out = [0u64; LEVELS];
        let mut running = 0;
        for t in (0..LEVELS).rev() {
            running += self.counts[t];
            out[t] = running;
        }
        out
    }
}

/// Otsu's level for a histogram: the smallest `t` maximizing the
/// between-class variance of {I ≤ t} versus {I > t}. Returns 0 for an empty
/// histogram.
pub fn otsu_level(histogram: &Histogram) -> u8 {
    let total = histogram.total();
    if total == 0 {
        return 0;
    }
    let total = total as f64;

    let mut omega = [0f64; LEVELS];
    let mut mu = [0f64; LEVELS];
    let mut running_omega = 0.0;
    let mut running_mu = 0.0;
    for (i, &count) in histogram.counts().iter().enumerate() {
        let p = count as f64 / total;
        running_omega += p;
        running_mu += i as f64 * p;
        omega[i] = running_omega;
        mu[i] = running_mu;
    }
    let mu_t = mu[LEVELS - 1];

    let mut best_level = 0usize;
    let mut best_variance = 0.0;
    for t in 0..LEVELS {
        let denominator = omega[t] * (1.0 - omega[t]);
        let variance = if denominator > 0.0 {
            (mu_t * omega[t] - mu[t]).powi(2) / denominator
        } else {
            0.0
        };
        // strict comparison keeps the first maximum
        if variance > best_variance {
            best_variance = variance;
            best_level = t;
        }
    }
    best_level as u8
}

/// Otsu's level of a field's rounded histogram
pub fn otsu(field: &IntensityField) -> u8 {
    otsu_level(&Histogram::from_field(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BinaryMask;

    fn checkerboard() -> IntensityField {
        IntensityField::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { 0.0 } else { 255.0 })
    }

    #[test]
    fn test_histogram_counts_and_sums() {
        let field = IntensityField::from_vec(5, 1, vec![0.4, 0.6, 254.7, 300.0, -3.0]).unwrap();
        let hist = Histogram::from_field(&field);
        assert_eq!(hist.total(), 5);
        assert_eq!(hist.counts()[0], 2);
        assert_eq!(hist.counts()[1], 1);
        assert_eq!(hist.counts()[255], 2);
        assert_eq!(hist.cumulative()[0], 2);
        assert_eq!(hist.cumulative()[255], 5);
        assert_eq!(hist.suffix_counts()[0], 5);
        assert_eq!(hist.suffix_counts()[2], 2);
    }

    #[test]
    fn test_half_levels_bin_to_even_neighbour() {
        let field = IntensityField::from_vec(3, 1, vec![0.5, 2.5, 127.5]).unwrap();
        let hist = Histogram::from_field(&field);
        assert_eq!(hist.counts()[0], 1);
        assert_eq!(hist.counts()[2], 1);
        assert_eq!(hist.counts()[128], 1);
        assert_eq!(hist.counts()[1] + hist.counts()[3] + hist.counts()[127], 0);
    }

    #[test]
    fn test_empty_histogram_yields_zero() {
        assert_eq!(otsu_level(&Histogram::from_counts([0; LEVELS])), 0);
        assert_eq!(otsu(&IntensityField::new(0, 0)), 0);
    }

    #[test]
    fn test_uniform_histogram_yields_zero() {
        let field = IntensityField::from_fn(8, 8, |_, _| 77.0);
        assert_eq!(otsu(&field), 0);
    }

    #[test]
    fn test_otsu_is_deterministic() {
        let field = IntensityField::from_fn(32, 32, |x, y| ((x * 7 + y * 13) % 256) as f32);
        let hist = Histogram::from_field(&field);
        let first = otsu_level(&hist);
        for _ in 0..5 {
            assert_eq!(otsu_level(&hist), first);
        }
    }

    #[test]
    fn test_bimodal_split_between_modes() {
        let field = IntensityField::from_fn(20, 10, |x, _| if x < 10 { 40.0 } else { 200.0 });
        let t = otsu(&field);
        assert!((40..200).contains(&t), "threshold {t}");
    }

    #[test]
    fn test_checkerboard_class_split_reproduces_pattern() {
        let field = checkerboard();
        let t = otsu(&field) as f32;
        let mask = BinaryMask::from_field(&field, |v| v > t);
        for y in 0..4 {
            for x in 0..4 {
                let expected = if (x + y) % 2 == 0 { 0 } else { 255 };
                assert_eq!(mask.as_image().get_pixel(x, y)[0], expected);
            }
        }
    }
}
