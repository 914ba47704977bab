use tracing::debug;

use crate::{algorithms::SurfaceStatistics, traits::RegionFilter, types::Roi};

/// Keeps regions whose surface lies in a band around the median surface
///
/// Single-pixel regions are always dropped. A region is kept when
/// `factor * surface > median` and `surface < factor * median`, both bounds
/// exclusive.
#[derive(Debug, Clone)]
pub struct MedianSurfaceFilter {
    pub factor: f64,
}

impl Default for MedianSurfaceFilter {
    fn default() -> Self {
        Self { factor: 3.0 }
    }
}

impl MedianSurfaceFilter {
    pub fn is_plausible(&self, roi: &Roi, median: f64) -> bool {
        let surface = roi.surface as f64;
        !roi.is_single_pixel() && self.factor * surface > median && surface < self.factor * median
    }
}

impl RegionFilter for MedianSurfaceFilter {
    fn filter(&self, rois: Vec<Roi>, statistics: &SurfaceStatistics) -> Vec<Roi> {
        let before = rois.len();
        let kept: Vec<Roi> = rois
            .into_iter()
            .filter(|roi| self.is_plausible(roi, statistics.median))
            .collect();
        debug!(
            before,
            after = kept.len(),
            median = statistics.median,
            "filtered regions by surface"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn roi(width: u32, height: u32, surface: u32) -> Roi {
        Roi {
            position: [0, 0],
            width,
            height,
            surface,
            mask: GrayImage::new(width, height),
        }
    }

    fn surfaces(rois: &[Roi]) -> Vec<u32> {
        rois.iter().map(|r| r.surface).collect()
    }

    #[test]
    fn drops_outliers_around_the_median() {
        let rois: Vec<Roi> = [10, 12, 11, 100, 1, 9]
            .into_iter()
            .map(|s| roi(5, 5, s))
            .collect();
        let statistics = SurfaceStatistics::from_rois(&rois);
        assert_eq!(statistics.median, 10.5);

        let kept = MedianSurfaceFilter::default().filter(rois, &statistics);
        assert_eq!(surfaces(&kept), vec![10, 12, 11, 9]);
    }

    #[test]
    fn band_bounds_are_exclusive() {
        let filter = MedianSurfaceFilter::default();
        // surface == 3 * median
        assert!(!filter.is_plausible(&roi(6, 6, 30), 10.0));
        assert!(filter.is_plausible(&roi(6, 6, 29), 10.0));
        // 3 * surface == median
        assert!(!filter.is_plausible(&roi(3, 3, 4), 12.0));
        assert!(filter.is_plausible(&roi(3, 3, 5), 12.0));
    }

    #[test]
    fn single_pixel_regions_are_always_dropped() {
        let filter = MedianSurfaceFilter::default();
        assert!(!filter.is_plausible(&roi(1, 1, 1), 1.0));
        assert!(!filter.is_plausible(&roi(1, 1, 1), 0.5));
        assert!(filter.is_plausible(&roi(1, 2, 2), 2.0));
    }

    #[test]
    fn everything_filtered_is_not_an_error() {
        let rois = vec![roi(1, 1, 1), roi(1, 1, 1)];
        let statistics = SurfaceStatistics::from_rois(&rois);
        assert!(MedianSurfaceFilter::default().filter(rois, &statistics).is_empty());
    }

    #[test]
    fn factor_is_configurable() {
        let filter = MedianSurfaceFilter { factor: 2.0 };
        assert!(!filter.is_plausible(&roi(5, 5, 20), 10.0));
        assert!(filter.is_plausible(&roi(5, 5, 19), 10.0));
    }
}
