//! Visualization of extraction results on top of the source image.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::{
    config::RenderOptions,
    types::{Region, Roi},
};

const PALETTE: [[u8; 3]; 6] = [
    [0, 114, 178],
    [0, 158, 115],
    [230, 159, 0],
    [204, 121, 167],
    [86, 180, 233],
    [213, 94, 0],
];

/// Paints extracted components and minimal bounding rectangles
#[derive(Debug, Clone, Default)]
pub struct Painter {
    pub options: RenderOptions,
}

impl Painter {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// RGB copy of `source` with every component tinted
    pub fn paint_components(&self, source: &DynamicImage, components: &[Roi]) -> RgbImage {
        let mut canvas = source.to_rgb8();
        for (i, roi) in components.iter().enumerate() {
            tint_component(&mut canvas, roi, PALETTE[i % PALETTE.len()]);
        }
        canvas
    }

    /// Outline each region's minimal bounding rectangle
    pub fn paint_rectangles<'a>(
        &self,
        canvas: &mut RgbImage,
        regions: impl IntoIterator<Item = &'a Region>,
    ) {
        let color = Rgb(self.options.mbr_color);
        for region in regions {
            draw_polyline(canvas, &region.geometry.mbr, color);
        }
    }
}

fn tint_component(canvas: &mut RgbImage, roi: &Roi, color: [u8; 3]) {
    for (x, y, pixel) in roi.mask.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        let (cx, cy) = (roi.position[0] + x, roi.position[1] + y);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let target = canvas.get_pixel_mut(cx, cy);
        for (channel, tint) in target.0.iter_mut().zip(color) {
            *channel = ((*channel as u16 + tint as u16) / 2) as u8;
        }
    }
}

/// Draw a closed polygon outline
pub fn draw_polyline(canvas: &mut RgbImage, points: &[[f64; 2]], color: Rgb<u8>) {
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            canvas,
            (start[0] as f32, start[1] as f32),
            (end[0] as f32, end[1] as f32),
            color,
        );
    }
}
