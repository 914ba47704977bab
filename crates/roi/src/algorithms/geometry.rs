//! Minimal bounding rectangles and the shape descriptors derived from them.
//!
//! The rectangle encloses the pixel *squares* of a region, not the pixel
//! centres: each boundary pixel contributes its four corners to the convex
//! hull. A solid `w x h` block therefore yields a `w x h` rectangle and a
//! filling factor of exactly 1.

use std::collections::BTreeSet;

use geo::ConvexHull;
use geo_types::{Coord, MultiPoint, Point};
use image::GrayImage;
use tracing::warn;

use crate::types::{Geometry, Roi};

/// Rectangles with an area at or below this are treated as degenerate
const DEGENERATE_AREA: f64 = 1e-9;

/// Euclidean distance between two points
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Corners of every foreground pixel that touches the background or the mask border
pub fn boundary_corners(mask: &GrayImage) -> Vec<Coord<f64>> {
    let (width, height) = mask.dimensions();
    let is_foreground = |x: i64, y: i64| {
        x >= 0
            && y >= 0
            && x < width as i64
            && y < height as i64
            && mask.get_pixel(x as u32, y as u32)[0] > 0
    };

    let mut corners = BTreeSet::new();
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        let (xi, yi) = (x as i64, y as i64);
        let interior = is_foreground(xi - 1, yi)
            && is_foreground(xi + 1, yi)
            && is_foreground(xi, yi - 1)
            && is_foreground(xi, yi + 1);
        if interior {
            continue;
        }
        corners.extend([(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]);
    }

    corners
        .into_iter()
        .map(|(x, y)| Coord { x: x as f64, y: y as f64 })
        .collect()
}

/// Smallest-area rectangle enclosing `points`, at any rotation.
///
/// Returns four corners ordered clockwise (image coordinates, y down), starting
/// from the topmost corner, leftmost on ties. Fewer than three non-collinear
/// points give a zero-area rectangle.
pub fn minimal_bounding_rectangle(points: &[Coord<f64>]) -> [[f64; 2]; 4] {
    if points.is_empty() {
        return [[0.0, 0.0]; 4];
    }

    let hull = MultiPoint::from(points.iter().map(|&c| Point::from(c)).collect::<Vec<_>>())
        .convex_hull();
    let mut vertices: Vec<Coord<f64>> = hull.exterior().coords().copied().collect();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.is_empty() {
        vertices.push(points[0]);
    }
    if vertices.len() == 1 {
        let [x, y] = [vertices[0].x, vertices[0].y];
        return [[x, y]; 4];
    }

    // Rotating calipers: the optimal rectangle has a side collinear with a hull edge
    let mut best: Option<(f64, [[f64; 2]; 4])> = None;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            continue;
        }
        let u = [dx / length, dy / length];
        let v = [-u[1], u[0]];

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &vertices {
            let pu = p.x * u[0] + p.y * u[1];
            let pv = p.x * v[0] + p.y * v[1];
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_none_or(|(best_area, _)| area < *best_area) {
            let corner = |s: f64, t: f64| [s * u[0] + t * v[0], s * u[1] + t * v[1]];
            let rect = [
                corner(min_u, min_v),
                corner(max_u, min_v),
                corner(max_u, max_v),
                corner(min_u, max_v),
            ];
            best = Some((area, rect));
        }
    }

    match best {
        Some((_, rect)) => start_at_top(rect),
        None => {
            let [x, y] = [vertices[0].x, vertices[0].y];
            [[x, y]; 4]
        }
    }
}

fn start_at_top(mut rect: [[f64; 2]; 4]) -> [[f64; 2]; 4] {
    let start = (0..4)
        .min_by(|&i, &j| {
            rect[i][1]
                .total_cmp(&rect[j][1])
                .then(rect[i][0].total_cmp(&rect[j][0]))
        })
        .unwrap_or(0);
    rect.rotate_left(start);
    rect
}

impl Geometry {
    /// Compute the rectangle and descriptors of a region, in source image coordinates
    pub fn from_roi(roi: &Roi) -> Self {
        let local = minimal_bounding_rectangle(&boundary_corners(&roi.mask));
        let mbr_width = distance(local[0], local[1]);
        let mbr_height = distance(local[1], local[2]);
        let mbr_surface = mbr_width * mbr_height;

        let degenerate = mbr_surface <= DEGENERATE_AREA;
        let filling_factor = if degenerate {
            warn!(
                x = roi.position[0],
                y = roi.position[1],
                surface = roi.surface,
                "minimal bounding rectangle has no area, filling factor set to 1"
            );
            1.0
        } else {
            roi.surface as f64 / mbr_surface
        };

        let [ox, oy] = [roi.position[0] as f64, roi.position[1] as f64];
        let mbr = local.map(|[x, y]| [x + ox, y + oy]);

        Self {
            mbr,
            mbr_width,
            mbr_height,
            mbr_surface,
            filling_factor,
            degenerate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn roi_from_pixels(position: [u32; 2], width: u32, height: u32, pixels: &[(u32, u32)]) -> Roi {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in pixels {
            mask.put_pixel(x, y, Luma([255]));
        }
        Roi {
            position,
            width,
            height,
            surface: pixels.len() as u32,
            mask,
        }
    }

    fn solid(position: [u32; 2], width: u32, height: u32) -> Roi {
        let pixels: Vec<(u32, u32)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .collect();
        roi_from_pixels(position, width, height, &pixels)
    }

    #[test]
    fn solid_rectangle_fills_its_rectangle_exactly() {
        let geometry = Geometry::from_roi(&solid([10, 20], 7, 3));
        assert_eq!(geometry.filling_factor, 1.0);
        assert_eq!(geometry.mbr_surface, 21.0);
        assert!(!geometry.degenerate);
        assert_eq!(
            geometry.mbr,
            [[10.0, 20.0], [17.0, 20.0], [17.0, 23.0], [10.0, 23.0]]
        );
        assert_eq!(geometry.mbr_width, 7.0);
        assert_eq!(geometry.mbr_height, 3.0);
    }

    #[test]
    fn single_pixel_is_a_unit_square() {
        let geometry = Geometry::from_roi(&solid([3, 4], 1, 1));
        assert_eq!(geometry.mbr_surface, 1.0);
        assert_eq!(geometry.filling_factor, 1.0);
    }

    #[test]
    fn diagonal_stroke_gets_a_rotated_rectangle() {
        let pixels: Vec<(u32, u32)> = (0..5).map(|i| (i, i)).collect();
        let geometry = Geometry::from_roi(&roi_from_pixels([0, 0], 5, 5, &pixels));

        let mut sides = [geometry.mbr_width, geometry.mbr_height];
        sides.sort_by(f64::total_cmp);
        assert!((sides[0] - 2f64.sqrt()).abs() < 1e-9);
        assert!((sides[1] - 5.0 * 2f64.sqrt()).abs() < 1e-9);
        assert!((geometry.filling_factor - 0.5).abs() < 1e-9);
    }

    #[test]
    fn filling_factor_stays_within_unit_interval() {
        let shapes = [
            roi_from_pixels([0, 0], 2, 2, &[(0, 0), (0, 1), (1, 1)]),
            roi_from_pixels([5, 5], 3, 3, &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]),
            roi_from_pixels([2, 9], 4, 2, &[(0, 0), (1, 0), (2, 1), (3, 1)]),
        ];
        for roi in &shapes {
            let geometry = Geometry::from_roi(roi);
            assert!(geometry.filling_factor > 0.0);
            assert!(geometry.filling_factor <= 1.0, "{}", geometry.filling_factor);
            assert!(geometry.mbr_surface <= (roi.width * roi.height) as f64 + 1e-9);
        }
    }

    #[test]
    fn corners_are_clockwise_from_the_top() {
        let rect = minimal_bounding_rectangle(&[
            Coord { x: 0.0, y: 2.0 },
            Coord { x: 2.0, y: 0.0 },
            Coord { x: 4.0, y: 2.0 },
            Coord { x: 2.0, y: 4.0 },
        ]);
        assert!((rect[0][1] - 0.0).abs() < 1e-9);
        // Shoelace sum is positive for clockwise order with y pointing down
        let signed: f64 = (0..4)
            .map(|i| {
                let (a, b) = (rect[i], rect[(i + 1) % 4]);
                a[0] * b[1] - b[0] * a[1]
            })
            .sum();
        assert!(signed > 0.0);
        assert!((distance(rect[0], rect[1]) - 8f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_give_a_zero_area_rectangle() {
        let rect = minimal_bounding_rectangle(&[
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 3.0, y: 0.0 },
        ]);
        let area = distance(rect[0], rect[1]) * distance(rect[1], rect[2]);
        assert!(area.abs() < 1e-12);
        assert_eq!(rect.len(), 4);
    }

    #[test]
    fn empty_mask_is_degenerate_not_nan() {
        let roi = Roi {
            position: [0, 0],
            width: 2,
            height: 2,
            surface: 0,
            mask: GrayImage::new(2, 2),
        };
        let geometry = Geometry::from_roi(&roi);
        assert!(geometry.degenerate);
        assert_eq!(geometry.filling_factor, 1.0);
    }
}
