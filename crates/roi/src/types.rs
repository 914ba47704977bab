use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// A connected foreground component as produced by extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    /// Offset of the bounding box within the source image
    pub position: [u32; 2],
    pub width: u32,
    pub height: u32,
    /// Number of foreground pixels (not the bounding box area)
    pub surface: u32,
    /// Binary mask local to the bounding box, foreground is 255
    pub mask: GrayImage,
}

impl Roi {
    pub fn is_single_pixel(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Top edge in source coordinates
    pub fn top(&self) -> u32 {
        self.position[1]
    }

    /// Bottom edge (exclusive) in source coordinates
    pub fn bottom(&self) -> u32 {
        self.position[1] + self.height
    }

    pub fn left(&self) -> u32 {
        self.position[0]
    }

    pub fn vertical_center(&self) -> f64 {
        self.position[1] as f64 + self.height as f64 / 2.0
    }
}

/// Shape descriptors derived from a region's minimal bounding rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Rectangle corners in source image coordinates, clockwise from the topmost corner
    pub mbr: [[f64; 2]; 4],
    /// Length of the `mbr[0]`-`mbr[1]` edge
    pub mbr_width: f64,
    /// Length of the `mbr[1]`-`mbr[2]` edge
    pub mbr_height: f64,
    pub mbr_surface: f64,
    /// `surface / mbr_surface`, 1.0 when the rectangle has no area
    pub filling_factor: f64,
    /// The rectangle had zero area
    pub degenerate: bool,
}

/// A region that survived filtering, with geometry and fingerprint attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub roi: Roi,
    pub geometry: Geometry,
    /// Flattened fixed-size bitmap, one 0/1 entry per cell, row-major
    pub data: Vec<u8>,
}

impl Region {
    pub fn position(&self) -> [u32; 2] {
        self.roi.position
    }

    pub fn width(&self) -> u32 {
        self.roi.width
    }

    pub fn height(&self) -> u32 {
        self.roi.height
    }

    pub fn surface(&self) -> u32 {
        self.roi.surface
    }

    pub fn filling_factor(&self) -> f64 {
        self.geometry.filling_factor
    }
}

/// Regions sharing a vertical band, ordered left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub regions: Vec<Region>,
}

impl Line {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Smallest top edge among the line's regions
    pub fn top(&self) -> u32 {
        self.regions.iter().map(|r| r.roi.top()).min().unwrap_or(0)
    }

    /// Largest bottom edge among the line's regions
    pub fn bottom(&self) -> u32 {
        self.regions.iter().map(|r| r.roi.bottom()).max().unwrap_or(0)
    }
}

/// Everything produced by one `get_lines_from_image` call.
#[derive(Debug, Clone)]
pub struct LinesResult {
    /// Lines ordered top to bottom
    pub lines: Vec<Line>,
    /// Source image annotated with components and rectangles
    pub painted: Option<RgbImage>,
    /// The binary mask regions were extracted from
    pub mask: GrayImage,
    /// Mean surface of the extracted, unfiltered components
    pub average_surface: f64,
    /// Median surface of the extracted, unfiltered components
    pub median_surface: f64,
    pub image_width: u32,
    pub image_height: u32,
}

impl LinesResult {
    /// All regions in line order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.lines.iter().flat_map(|line| line.regions.iter())
    }

    pub fn region_count(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }
}
