//! Configuration for [`get_lines_from_image`](crate::get_lines_from_image).
//!
//! Options can be built in code or loaded from TOML/JSON files. Everything is
//! validated once, up front, and converted into the strongly typed strategies
//! the pipeline stages consume.

use std::{fs, path::Path, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::warn;

use crate::{
    algorithms::BinarizationStrategy,
    error::{Result, RoiError},
};

/// Histogram-based thresholding algorithms that can be selected by name.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ThresholdAlgorithm {
    /// Maximise between-class variance
    Otsu,
    /// Mean grey value
    Mean,
    /// Iterative intermeans
    Isodata,
    /// Zack's triangle method on the longest histogram tail
    Triangle,
}

impl ThresholdAlgorithm {
    /// Get a list of all algorithm names accepted in `RoiOptions::algorithm`
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}

/// Pixel adjacency used when labelling connected components.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Only horizontal and vertical neighbours are connected
    #[default]
    Four,
    /// Diagonal neighbours are connected as well
    Eight,
}

impl From<Connectivity> for imageproc::region_labelling::Connectivity {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => Self::Four,
            Connectivity::Eight => Self::Eight,
        }
    }
}

/// Region extraction, filtering and line grouping options.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RoiOptions {
    /// Name of a thresholding algorithm (see [`ThresholdAlgorithm`]).
    /// Takes precedence over `grey_threshold`.
    pub algorithm: Option<String>,

    /// Normalised grey threshold in `[0, 1]`
    #[schemars(range(min = 0.0, max = 1.0))]
    pub grey_threshold: Option<f64>,

    /// Interpret `grey_threshold` relative to the image's own grey range
    pub level: bool,

    pub connectivity: Connectivity,

    /// Components with fewer pixels are dropped at extraction
    pub min_surface: Option<u32>,

    /// Components with more pixels are dropped at extraction
    pub max_surface: Option<u32>,

    /// Width of the plausibility band around the median surface.
    /// A region is kept when `median / factor < surface < median * factor`.
    pub plausibility_factor: f64,

    /// Fraction of the smaller region height that must overlap vertically
    /// for two regions to share a line
    #[schemars(range(min = 0.0, max = 1.0))]
    pub line_overlap: f64,

    /// Extra vertical slack, in pixels, when comparing region spans
    pub line_tolerance: u32,
}

impl Default for RoiOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            grey_threshold: None,
            level: false,
            connectivity: Connectivity::Four,
            min_surface: None,
            max_surface: None,
            plausibility_factor: 3.0,
            line_overlap: 0.0,
            line_tolerance: 0,
        }
    }
}

impl RoiOptions {
    /// Options binarizing with a named algorithm
    pub fn with_algorithm(algorithm: ThresholdAlgorithm) -> Self {
        Self {
            algorithm: Some(algorithm.to_string()),
            ..Self::default()
        }
    }

    /// Options binarizing with a fixed normalised threshold
    pub fn with_grey_threshold(threshold: f64) -> Self {
        Self {
            grey_threshold: Some(threshold),
            ..Self::default()
        }
    }

    /// Resolve the binarization settings into a single strategy.
    pub fn binarization(&self) -> Result<BinarizationStrategy> {
        if let Some(name) = &self.algorithm {
            let algorithm = ThresholdAlgorithm::from_str(name).map_err(|_| {
                RoiError::configuration(format!(
                    "unknown algorithm '{}', expected one of: {}",
                    name,
                    ThresholdAlgorithm::names().join(", ")
                ))
            })?;
            if self.grey_threshold.is_some() {
                warn!(%algorithm, "both algorithm and grey_threshold provided, using algorithm");
            }
            return Ok(BinarizationStrategy::Algorithm(algorithm));
        }

        match self.grey_threshold {
            Some(threshold) => {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(RoiError::configuration(format!(
                        "grey_threshold must be within [0, 1], got {threshold}"
                    )));
                }
                if self.level {
                    Ok(BinarizationStrategy::RelativeLevel { level: threshold })
                } else {
                    Ok(BinarizationStrategy::Threshold { threshold })
                }
            }
            None => Err(RoiError::configuration(
                "no algorithm or grey_threshold provided to apply",
            )),
        }
    }

    /// Check the numeric tuning parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.plausibility_factor.is_finite() || self.plausibility_factor <= 0.0 {
            return Err(RoiError::configuration(format!(
                "plausibility_factor must be a positive number, got {}",
                self.plausibility_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.line_overlap) {
            return Err(RoiError::configuration(format!(
                "line_overlap must be within [0, 1], got {}",
                self.line_overlap
            )));
        }
        if let (Some(min), Some(max)) = (self.min_surface, self.max_surface) {
            if min > max {
                return Err(RoiError::configuration(format!(
                    "min_surface ({min}) is greater than max_surface ({max})"
                )));
            }
        }
        Ok(())
    }
}

/// How a region mask is brought to the fingerprint resolution.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resampling {
    /// Each target cell takes the source pixel under its centre
    #[default]
    Nearest,
    /// Each target cell is set when at least half of its source area is foreground
    Area,
}

/// Target size of the per-region bitmap fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FingerprintOptions {
    #[schemars(range(min = 1))]
    pub width: u32,
    #[schemars(range(min = 1))]
    pub height: u32,
    #[serde(default)]
    pub resampling: Resampling,
}

impl FingerprintOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resampling: Resampling::default(),
        }
    }

    /// Number of cells in a fingerprint
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RoiError::configuration(format!(
                "fingerprint dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Annotated visualization settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RenderOptions {
    /// Produce the `painted` image
    pub enabled: bool,
    /// RGB colour of the minimal bounding rectangle outlines
    pub mbr_color: [u8; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            mbr_color: [255, 0, 0],
        }
    }
}

/// Complete configuration for one `get_lines_from_image` call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LinesOptions {
    pub roi_options: RoiOptions,
    pub fingerprint_options: FingerprintOptions,
    #[serde(default)]
    pub render_options: RenderOptions,
}

impl LinesOptions {
    pub fn new(roi_options: RoiOptions, fingerprint_options: FingerprintOptions) -> Self {
        Self {
            roi_options,
            fingerprint_options,
            render_options: RenderOptions::default(),
        }
    }

    /// Disable the painted visualization
    pub fn without_painting(mut self) -> Self {
        self.render_options.enabled = false;
        self
    }

    /// Get the JSON schema of the configuration format
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LinesOptions)
    }

    /// Validate every section, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        self.roi_options.binarization()?;
        self.roi_options.validate()?;
        self.fingerprint_options.validate()
    }

    /// Load options from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let options: LinesOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let options: LinesOptions = serde_json::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Auto-detect file format and load options
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path_ref)?),
            Some("json") => Self::from_json(&fs::read_to_string(path_ref)?),
            _ => Err(RoiError::UnsupportedFileFormat(
                path_ref.display().to_string(),
            )),
        }
    }

    /// Convert options to a pretty JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
