pub mod builder;

use image::DynamicImage;
use tracing::{debug, info};

use crate::{
    algorithms::{RegionAnalyzer, SurfaceStatistics},
    config::LinesOptions,
    error::Result,
    render::Painter,
    traits::{Binarizer, LineGrouper, RegionExtractor, RegionFilter},
    types::LinesResult,
};

/// Runs binarization, extraction, filtering, analysis and line grouping in sequence
pub struct Pipeline {
    binarizer: Box<dyn Binarizer>,
    extractor: Box<dyn RegionExtractor>,
    filter: Box<dyn RegionFilter>,
    analyzer: RegionAnalyzer,
    grouper: Box<dyn LineGrouper>,
    painter: Option<Painter>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Validate `options` and build the matching pipeline
    pub fn from_options(options: &LinesOptions) -> Result<Self> {
        builder::PipelineBuilder::from_options(options)?.build()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        binarizer: Box<dyn Binarizer>,
        extractor: Box<dyn RegionExtractor>,
        filter: Box<dyn RegionFilter>,
        analyzer: RegionAnalyzer,
        grouper: Box<dyn LineGrouper>,
        painter: Option<Painter>,
    ) -> Self {
        Self {
            binarizer,
            extractor,
            filter,
            analyzer,
            grouper,
            painter,
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &DynamicImage) -> Result<LinesResult> {
        // Step 1: Binarize the grey version of the image
        let grey = image.to_luma8();
        let mask = self.binarizer.binarize(&grey)?;

        // Step 2: Extract connected components
        let components = self.extractor.extract(&mask)?;

        // Step 3: Statistics on the unfiltered set, then filtering
        let statistics = SurfaceStatistics::from_rois(&components);
        debug!(
            components = statistics.count,
            mean = statistics.mean,
            median = statistics.median,
            "surface statistics"
        );
        let mut painted = self
            .painter
            .as_ref()
            .map(|painter| painter.paint_components(image, &components));
        let kept = self.filter.filter(components, &statistics);
        info!(regions = kept.len(), "number of regions");

        // Step 4: Geometry and fingerprints
        let regions = self.analyzer.analyze_all(kept);

        // Step 5: Optional visualization, independent of the results
        if let (Some(painter), Some(canvas)) = (&self.painter, painted.as_mut()) {
            painter.paint_rectangles(canvas, &regions);
        }

        // Step 6: Group into lines
        let lines = self.grouper.group(regions);

        Ok(LinesResult {
            lines,
            painted,
            mask,
            average_surface: statistics.mean,
            median_surface: statistics.median,
            image_width: image.width(),
            image_height: image.height(),
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let fingerprint = self.analyzer.options();
        format!(
            "Pipeline: {}x{} {:?} fingerprints, painting {}",
            fingerprint.width,
            fingerprint.height,
            fingerprint.resampling,
            if self.painter.is_some() { "enabled" } else { "disabled" }
        )
    }
}
