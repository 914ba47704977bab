use crate::{
    algorithms::{
        BinarizationStrategy, ComponentExtractor, MedianSurfaceFilter, OverlapLineGrouper,
        RegionAnalyzer,
    },
    config::{FingerprintOptions, LinesOptions, RenderOptions, ThresholdAlgorithm},
    error::{Result, RoiError},
    pipeline::Pipeline,
    render::Painter,
    traits::{Binarizer, Fingerprinter, LineGrouper, RegionExtractor, RegionFilter},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    binarizer: Option<Box<dyn Binarizer>>,
    extractor: Option<Box<dyn RegionExtractor>>,
    filter: Option<Box<dyn RegionFilter>>,
    fingerprinter: Option<Box<dyn Fingerprinter>>,
    fingerprint_options: Option<FingerprintOptions>,
    grouper: Option<Box<dyn LineGrouper>>,
    render_options: Option<RenderOptions>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            binarizer: None,
            extractor: None,
            filter: None,
            fingerprinter: None,
            fingerprint_options: None,
            grouper: None,
            render_options: None,
        }
    }

    /// Builder preconfigured from validated options
    pub fn from_options(options: &LinesOptions) -> Result<Self> {
        options.validate()?;
        let roi = &options.roi_options;

        let mut builder = Self::new()
            .set_binarizer(roi.binarization()?)
            .set_extractor(ComponentExtractor {
                connectivity: roi.connectivity,
                min_surface: roi.min_surface,
                max_surface: roi.max_surface,
            })
            .set_filter(MedianSurfaceFilter { factor: roi.plausibility_factor })
            .set_grouper(OverlapLineGrouper {
                min_overlap: roi.line_overlap,
                tolerance: roi.line_tolerance,
            })
            .with_fingerprint(options.fingerprint_options.clone());

        if options.render_options.enabled {
            builder = builder.with_painting(options.render_options.clone());
        }
        Ok(builder)
    }

    /// Set the binarizer (replaces any existing one)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Binarize with a fixed normalised grey threshold
    pub fn with_grey_threshold(self, threshold: f64) -> Self {
        self.set_binarizer(BinarizationStrategy::Threshold { threshold })
    }

    /// Binarize with a named histogram algorithm
    pub fn with_algorithm(self, algorithm: ThresholdAlgorithm) -> Self {
        self.set_binarizer(BinarizationStrategy::Algorithm(algorithm))
    }

    /// Set the region extractor (replaces any existing one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: RegionExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the region filter (replaces any existing one)
    pub fn set_filter<F>(mut self, filter: F) -> Self
    where
        F: RegionFilter + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Set the fingerprint resampler (replaces the one from the fingerprint options)
    pub fn set_fingerprinter<F>(mut self, fingerprinter: F) -> Self
    where
        F: Fingerprinter + 'static,
    {
        self.fingerprinter = Some(Box::new(fingerprinter));
        self
    }

    /// Set the fingerprint size and resampling
    pub fn with_fingerprint(mut self, options: FingerprintOptions) -> Self {
        self.fingerprint_options = Some(options);
        self
    }

    /// Set the line grouper (replaces any existing one)
    pub fn set_grouper<G>(mut self, grouper: G) -> Self
    where
        G: LineGrouper + 'static,
    {
        self.grouper = Some(Box::new(grouper));
        self
    }

    /// Produce the painted visualization
    pub fn with_painting(mut self, options: RenderOptions) -> Self {
        self.render_options = Some(options);
        self
    }

    /// Build the pipeline with default components where none were set.
    ///
    /// A binarizer and fingerprint options are required.
    pub fn build(self) -> Result<Pipeline> {
        let binarizer = self.binarizer.ok_or_else(|| {
            RoiError::configuration("no algorithm or grey_threshold provided to apply")
        })?;

        let fingerprint_options = self
            .fingerprint_options
            .ok_or_else(|| RoiError::configuration("fingerprint options are required"))?;
        fingerprint_options.validate()?;

        let fingerprinter = self
            .fingerprinter
            .unwrap_or_else(|| Box::new(fingerprint_options.resampling));

        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(ComponentExtractor::default()));

        let filter = self
            .filter
            .unwrap_or_else(|| Box::new(MedianSurfaceFilter::default()));

        let grouper = self
            .grouper
            .unwrap_or_else(|| Box::new(OverlapLineGrouper::default()));

        Ok(Pipeline::new(
            binarizer,
            extractor,
            filter,
            RegionAnalyzer::new(fingerprinter, fingerprint_options),
            grouper,
            self.render_options.map(Painter::new),
        ))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
