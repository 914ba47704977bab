use image::GrayImage;
use crate::{
    algorithms::SurfaceStatistics,
    config::FingerprintOptions,
    error::Result,
    types::{Line, Region, Roi},
};

/// Trait for turning a grey image into a binary mask
pub trait Binarizer: Send + Sync {
    /// Produce a mask where foreground pixels are 255 and background 0
    fn binarize(&self, grey: &GrayImage) -> Result<GrayImage>;
}

/// Trait for splitting a binary mask into candidate regions
pub trait RegionExtractor: Send + Sync {
    /// Extract one region per connected foreground component
    fn extract(&self, mask: &GrayImage) -> Result<Vec<Roi>>;
}

/// Trait for dropping implausible regions
pub trait RegionFilter: Send + Sync {
    /// Keep the plausible regions, given statistics of the unfiltered set
    fn filter(&self, rois: Vec<Roi>, statistics: &SurfaceStatistics) -> Vec<Roi>;
}

/// Trait for producing a fixed-size bitmap from a region mask
pub trait Fingerprinter: Send + Sync {
    /// Resample `mask` to `options.width x options.height` cells, row-major, 0/1 valued
    fn fingerprint(&self, mask: &GrayImage, options: &FingerprintOptions) -> Vec<u8>;
}

/// Trait for clustering regions into text lines
pub trait LineGrouper: Send + Sync {
    /// Group regions into lines ordered top to bottom, each ordered left to right
    fn group(&self, regions: Vec<Region>) -> Vec<Line>;
}
