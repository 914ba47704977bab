use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::connected_components;
use tracing::debug;

use crate::{config::Connectivity, error::Result, traits::RegionExtractor, types::Roi};

/// Connected-component extractor built on imageproc's region labelling
#[derive(Debug, Clone, Default)]
pub struct ComponentExtractor {
    pub connectivity: Connectivity,
    pub min_surface: Option<u32>,
    pub max_surface: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    /// First pixel in raster order, as (y, x)
    first: (u32, u32),
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    surface: u32,
}

impl Bounds {
    fn new(x: u32, y: u32) -> Self {
        Self { first: (y, x), min_x: x, min_y: y, max_x: x, max_y: y, surface: 1 }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.surface += 1;
    }
}

impl ComponentExtractor {
    fn accepts(&self, surface: u32) -> bool {
        self.min_surface.is_none_or(|min| surface >= min)
            && self.max_surface.is_none_or(|max| surface <= max)
    }
}

impl RegionExtractor for ComponentExtractor {
    fn extract(&self, mask: &GrayImage) -> Result<Vec<Roi>> {
        let labels = connected_components(mask, self.connectivity.into(), Luma([0u8]));

        let mut bounds: BTreeMap<u32, Bounds> = BTreeMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }
            bounds
                .entry(label)
                .and_modify(|b| b.include(x, y))
                .or_insert_with(|| Bounds::new(x, y));
        }

        let found = bounds.len();
        bounds.retain(|_, b| self.accepts(b.surface));

        let mut masks: BTreeMap<u32, GrayImage> = bounds
            .iter()
            .map(|(&label, b)| {
                let local = GrayImage::new(b.max_x - b.min_x + 1, b.max_y - b.min_y + 1);
                (label, local)
            })
            .collect();

        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if let (Some(b), Some(local)) = (bounds.get(&label), masks.get_mut(&label)) {
                local.put_pixel(x - b.min_x, y - b.min_y, Luma([255]));
            }
        }

        let mut ordered: Vec<(u32, Bounds)> = bounds.into_iter().collect();
        ordered.sort_by_key(|(_, b)| b.first);

        let rois: Vec<Roi> = ordered
            .into_iter()
            .filter_map(|(label, b)| {
                masks.remove(&label).map(|mask| Roi {
                    position: [b.min_x, b.min_y],
                    width: b.max_x - b.min_x + 1,
                    height: b.max_y - b.min_y + 1,
                    surface: b.surface,
                    mask,
                })
            })
            .collect();

        debug!(found, kept = rois.len(), "extracted connected components");
        Ok(rois)
    }
}
