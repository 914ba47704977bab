use serde::{Deserialize, Serialize};

use crate::types::Roi;

/// Surface statistics of an extracted region set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

impl SurfaceStatistics {
    pub fn from_rois(rois: &[Roi]) -> Self {
        let surfaces: Vec<f64> = rois.iter().map(|roi| roi.surface as f64).collect();
        Self {
            count: surfaces.len(),
            mean: mean(&surfaces),
            median: median(&surfaces),
        }
    }
}

/// Arithmetic mean, 0.0 for no values
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median, averaging the two middle values for even counts, 0.0 for no values
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
