//! Windowed local statistics (mean, median, midrange).
//!
//! All kinds share one window-reduction scheme with edge extension at the
//! borders:
//! - [`reduce_window`] gathers the full k×k neighbourhood and hands it to a
//!   reduction. Used where the statistic does not decompose (median).
//! - [`reduce_separable`] applies a 1-D reduction along rows and then along
//!   columns. Exact for reductions that compose this way (mean, min, max)
//!   and O(k) per sample instead of O(k²).

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::types::IntensityField;

/// Neighbourhood statistic used as the adaptive reference level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LocalStatistic {
    /// Box-filter average
    #[default]
    Mean,
    Median,
    /// (min + max) / 2
    #[strum(to_string = "midrange", serialize = "minmax", serialize = "min+max/2")]
    Midrange,
}

impl LocalStatistic {
    /// Parse a statistic name; anything unrecognized means `Mean`.
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for LocalStatistic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Window side forced odd and at least 3.
pub fn normalize_window(k: u32) -> u32 {
    let k = k.max(3);
    if k % 2 == 0 { k + 1 } else { k }
}

/// Reduce every full k×k neighbourhood (edge-extended) to one value.
pub fn reduce_window<F>(field: &IntensityField, k: u32, mut reduce: F) -> IntensityField
where
    F: FnMut(&mut [f32]) -> f32,
{
    if field.is_empty() {
        return field.clone();
    }
    let radius = (k / 2) as i64;
    let mut window = Vec::with_capacity((k * k) as usize);
    IntensityField::from_fn(field.width(), field.height(), |x, y| {
        window.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                window.push(field.get_clamped(x as i64 + dx, y as i64 + dy));
            }
        }
        reduce(&mut window)
    })
}

/// Reduce k-long runs along rows, then k-long runs of those results along
/// columns.
pub fn reduce_separable<F>(field: &IntensityField, k: u32, reduce: F) -> IntensityField
where
    F: Fn(&[f32]) -> f32,
{
    if field.is_empty() {
        return field.clone();
    }
    let radius = (k / 2) as i64;
    let mut run = Vec::with_capacity(k as usize);

    let rows = IntensityField::from_fn(field.width(), field.height(), |x, y| {
        run.clear();
        run.extend((-radius..=radius).map(|d| field.get_clamped(x as i64 + d, y as i64)));
        reduce(&run)
    });
    IntensityField::from_fn(field.width(), field.height(), |x, y| {
        run.clear();
        run.extend((-radius..=radius).map(|d| rows.get_clamped(x as i64, y as i64 + d)));
        reduce(&run)
    })
}

/// Summed in f64 so a uniform run averages back to exactly its own value
fn mean_of(values: &[f32]) -> f32 {
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

fn min_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn median_of(values: &mut [f32]) -> f32 {
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    *median
}

/// Local statistic field with window `k` (normalized odd, at least 3).
pub fn local_statistic(field: &IntensityField, k: u32, kind: LocalStatistic) -> IntensityField {
    let k = normalize_window(k);
    match kind {
        LocalStatistic::Mean => reduce_separable(field, k, mean_of),
        LocalStatistic::Median => reduce_window(field, k, median_of),
        LocalStatistic::Midrange => {
            let low = reduce_separable(field, k, min_of);
            let high = reduce_separable(field, k, max_of);
            IntensityField::from_fn(field.width(), field.height(), |x, y| {
                0.5 * (low.get(x, y) + high.get(x, y))
            })
        }
    }
}
