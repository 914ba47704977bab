use rayon::prelude::*;

use crate::{
    config::FingerprintOptions,
    traits::Fingerprinter,
    types::{Geometry, Region, Roi},
};

/// Attaches geometry and a fingerprint to each filtered region
pub struct RegionAnalyzer {
    fingerprinter: Box<dyn Fingerprinter>,
    options: FingerprintOptions,
}

impl RegionAnalyzer {
    pub fn new(fingerprinter: Box<dyn Fingerprinter>, options: FingerprintOptions) -> Self {
        Self { fingerprinter, options }
    }

    /// Analyzer using the resampling configured in `options`
    pub fn from_options(options: FingerprintOptions) -> Self {
        Self::new(Box::new(options.resampling), options)
    }

    pub fn options(&self) -> &FingerprintOptions {
        &self.options
    }

    pub fn analyze(&self, roi: Roi) -> Region {
        let geometry = Geometry::from_roi(&roi);
        let data = self.fingerprinter.fingerprint(&roi.mask, &self.options);
        Region { roi, geometry, data }
    }

    /// Analyze regions in parallel, keeping their input order
    pub fn analyze_all(&self, rois: Vec<Roi>) -> Vec<Region> {
        rois.into_par_iter().map(|roi| self.analyze(roi)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resampling;
    use image::{GrayImage, Luma};

    fn solid(x: u32, width: u32, height: u32) -> Roi {
        Roi {
            position: [x, 0],
            width,
            height,
            surface: width * height,
            mask: GrayImage::from_pixel(width, height, Luma([255])),
        }
    }

    #[test]
    fn fingerprints_share_one_size() {
        let analyzer = RegionAnalyzer::from_options(FingerprintOptions {
            width: 4,
            height: 6,
            resampling: Resampling::Area,
        });
        let regions = analyzer.analyze_all(vec![solid(0, 2, 3), solid(5, 30, 11), solid(50, 1, 9)]);
        assert!(regions.iter().all(|r| r.data.len() == 24));
        assert!(regions.iter().all(|r| r.data.iter().all(|&v| v == 1)));
    }

    #[test]
    fn parallel_analysis_keeps_order() {
        let analyzer = RegionAnalyzer::from_options(FingerprintOptions::new(3, 3));
        let rois: Vec<Roi> = (0..64).map(|i| solid(i * 10, 2 + i % 5, 3)).collect();
        let regions = analyzer.analyze_all(rois);
        let xs: Vec<u32> = regions.iter().map(|r| r.position()[0]).collect();
        assert_eq!(xs, (0..64).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[test]
    fn analysis_attaches_geometry() {
        let analyzer = RegionAnalyzer::from_options(FingerprintOptions::new(2, 2));
        let region = analyzer.analyze(solid(7, 4, 2));
        assert_eq!(region.filling_factor(), 1.0);
        assert_eq!(region.geometry.mbr[0], [7.0, 0.0]);
    }
}
