//! # Region of Interest Line Extraction
//!
//! Extracts candidate glyph regions from a scanned image and prepares them for
//! recognition: the image is binarized, split into connected components,
//! filtered around the median component size, described by its minimal
//! bounding rectangle and a fixed-size bitmap fingerprint, and finally grouped
//! into text lines.
//!
//! ## Core Features
//!
//! - **Pluggable binarization**: named histogram algorithms or a grey threshold,
//!   optionally relative to the image's own grey range
//! - **Robust filtering**: single pixels and components far from the median size are dropped
//! - **Shape descriptors**: rotated minimal bounding rectangle and filling factor
//! - **Fingerprints**: every region resampled to the same bitmap size
//! - **Line grouping**: transitive vertical-overlap clustering in reading order
//! - **GeoJSON export** and an annotated visualization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roi::{get_lines_from_image, FingerprintOptions, LinesOptions, RoiOptions};
//!
//! let image = image::open("page.png")?;
//! let options = LinesOptions::new(
//!     RoiOptions::with_grey_threshold(0.5),
//!     FingerprintOptions::new(16, 16),
//! );
//!
//! let result = get_lines_from_image(&image, &options)?;
//! for line in &result.lines {
//!     println!("{} regions", line.len());
//! }
//! result.save_geojson("regions.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use roi::{Pipeline, ThresholdAlgorithm, FingerprintOptions, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .with_algorithm(ThresholdAlgorithm::Otsu)
//!     .set_filter(MedianSurfaceFilter { factor: 4.0 })
//!     .set_grouper(OverlapLineGrouper { min_overlap: 0.3, tolerance: 2 })
//!     .with_fingerprint(FingerprintOptions::new(12, 16))
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod config;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod render;
pub mod io;

// Re-exports for convenience
pub use error::{Result, RoiError};
pub use config::{
    Connectivity, FingerprintOptions, LinesOptions, RenderOptions, Resampling, RoiOptions,
    ThresholdAlgorithm,
};
pub use types::{Geometry, Line, LinesResult, Region, Roi};
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use render::Painter;

use image::DynamicImage;

/// Extract regions from `image` and group them into lines.
///
/// Fails with [`RoiError::Configuration`] before touching the image when the
/// options are incomplete or out of range. An image without foreground yields
/// an empty `lines` list.
pub fn get_lines_from_image(image: &DynamicImage, options: &LinesOptions) -> Result<LinesResult> {
    Pipeline::from_options(options)?.process(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// White page with two rows of dark 6x8 blocks
    fn create_test_page() -> DynamicImage {
        let mut img = GrayImage::from_pixel(80, 50, Luma([230]));
        for (row, y) in [5u32, 30].into_iter().enumerate() {
            for col in 0..4u32 {
                let x = 5 + col * 15;
                let dy = (col + row as u32) % 2;
                for yy in y + dy..y + dy + 8 {
                    for xx in x..x + 6 {
                        img.put_pixel(xx, yy, Luma([20]));
                    }
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    fn options() -> LinesOptions {
        LinesOptions::new(RoiOptions::with_grey_threshold(0.5), FingerprintOptions::new(6, 8))
    }

    #[test]
    fn test_pipeline_basic() {
        let result = get_lines_from_image(&create_test_page(), &options())
            .expect("Should process successfully");
        assert_eq!(result.lines.len(), 2);
        assert!(result.lines.iter().all(|line| line.len() == 4));
        assert_eq!(result.average_surface, 48.0);
        assert_eq!(result.median_surface, 48.0);
        assert_eq!((result.image_width, result.image_height), (80, 50));
        assert!(result.painted.is_some());
    }

    #[test]
    fn test_regions_are_rectangles() {
        let result = get_lines_from_image(&create_test_page(), &options()).unwrap();
        for region in result.regions() {
            assert_eq!(region.filling_factor(), 1.0);
            assert_eq!(region.data, vec![1; 48]);
        }
    }

    #[test]
    fn test_missing_binarization_fails() {
        let options = LinesOptions::new(RoiOptions::default(), FingerprintOptions::new(4, 4));
        let err = get_lines_from_image(&create_test_page(), &options).unwrap_err();
        assert!(matches!(err, RoiError::Configuration(_)));
    }

    #[test]
    fn test_custom_pipeline() {
        let pipeline = Pipeline::builder()
            .with_algorithm(ThresholdAlgorithm::Otsu)
            .with_fingerprint(FingerprintOptions::new(4, 4))
            .build()
            .expect("Should build");
        let result = pipeline.process(&create_test_page()).unwrap();
        assert_eq!(result.region_count(), 8);
        assert!(result.painted.is_none());
    }

    #[test]
    fn test_geojson_export() {
        let result = get_lines_from_image(&create_test_page(), &options()).unwrap();
        let geojson = result.to_geojson().expect("Should create GeoJSON");
        assert_eq!(geojson.features.len(), 8);
    }
}
