use image::{GrayImage, Luma};
use imageproc::{contrast::otsu_level, map::map_colors, stats::histogram};
use tracing::debug;

use crate::{config::ThresholdAlgorithm, error::Result, traits::Binarizer};

/// Largest representable grey value of the 8-bit pipeline
pub const MAX_PIXEL_VALUE: f64 = u8::MAX as f64;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Resolved binarization settings. Dark pixels become foreground in every mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinarizationStrategy {
    /// Level computed from the image histogram; pixels at or below it are foreground
    Algorithm(ThresholdAlgorithm),
    /// Absolute normalised threshold; pixels below `threshold * 255` are foreground
    Threshold { threshold: f64 },
    /// Threshold placed at `level` between the image's darkest and brightest pixel
    RelativeLevel { level: f64 },
}

impl BinarizationStrategy {
    /// Normalised threshold this strategy applies to `grey`, if it is threshold based
    pub fn effective_threshold(&self, grey: &GrayImage) -> Option<f64> {
        match *self {
            Self::Algorithm(_) => None,
            Self::Threshold { threshold } => Some(threshold),
            Self::RelativeLevel { level } => {
                let (min, max) = grey_extrema(grey);
                Some(relative_threshold(min, max, level, MAX_PIXEL_VALUE))
            }
        }
    }
}

impl Binarizer for BinarizationStrategy {
    fn binarize(&self, grey: &GrayImage) -> Result<GrayImage> {
        let mask = match self {
            Self::Algorithm(algorithm) => {
                // a flat histogram has no ink to separate from the paper
                let (min, max) = grey_extrema(grey);
                if min == max {
                    debug!(%algorithm, grey = min, "flat image, no foreground");
                    return Ok(GrayImage::from_pixel(grey.width(), grey.height(), BACKGROUND));
                }
                let level = algorithm.level(grey);
                debug!(%algorithm, level, "binarizing with histogram level");
                map_colors(grey, |p| if p[0] <= level { FOREGROUND } else { BACKGROUND })
            }
            _ => {
                let threshold = self.effective_threshold(grey).unwrap_or_default();
                let cut = threshold * MAX_PIXEL_VALUE;
                debug!(threshold, "binarizing with grey threshold");
                map_colors(grey, |p| if (p[0] as f64) < cut { FOREGROUND } else { BACKGROUND })
            }
        };
        Ok(mask)
    }
}

/// Rescale a relative level into a normalised threshold within `[min, max]`
pub fn relative_threshold(min: u8, max: u8, level: f64, max_value: f64) -> f64 {
    let (min, max) = (min as f64, max as f64);
    (min + (max - min) * level) / max_value
}

/// Darkest and brightest grey values, `(0, 0)` for an empty image
pub fn grey_extrema(grey: &GrayImage) -> (u8, u8) {
    grey.pixels()
        .fold(None, |acc: Option<(u8, u8)>, p| match acc {
            None => Some((p[0], p[0])),
            Some((min, max)) => Some((min.min(p[0]), max.max(p[0]))),
        })
        .unwrap_or((0, 0))
}

impl ThresholdAlgorithm {
    /// Compute the grey level separating foreground from background
    pub fn level(&self, grey: &GrayImage) -> u8 {
        let hist = || histogram(grey).channels[0];
        match self {
            Self::Otsu => otsu_level(grey),
            Self::Mean => mean_level(&hist()),
            Self::Isodata => isodata_level(&hist()),
            Self::Triangle => triangle_level(&hist()),
        }
    }
}

fn mean_level(hist: &[u32; 256]) -> u8 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0;
    }
    let weighted: u64 = hist
        .iter()
        .enumerate()
        .map(|(value, &count)| value as u64 * count as u64)
        .sum();
    (weighted / total) as u8
}

fn class_mean(hist: &[u32; 256], range: std::ops::RangeInclusive<usize>) -> Option<f64> {
    let (sum, count) = hist[range.clone()]
        .iter()
        .zip(range)
        .fold((0.0, 0u64), |(sum, count), (&c, value)| {
            (sum + value as f64 * c as f64, count + c as u64)
        });
    (count > 0).then(|| sum / count as f64)
}

fn isodata_level(hist: &[u32; 256]) -> u8 {
    let mut level = mean_level(hist);
    // intermeans can oscillate between two levels on some histograms
    for _ in 0..256 {
        let low = class_mean(hist, 0..=level as usize);
        let high = class_mean(hist, level as usize + 1..=255);
        let (Some(low), Some(high)) = (low, high) else {
            break;
        };
        let next = ((low + high) / 2.0).floor() as u8;
        if next == level {
            break;
        }
        level = next;
    }
    level
}

fn triangle_level(hist: &[u32; 256]) -> u8 {
    let (Some(first), Some(last)) = (
        hist.iter().position(|&c| c > 0),
        hist.iter().rposition(|&c| c > 0),
    ) else {
        return 0;
    };

    let peak = hist
        .iter()
        .enumerate()
        .fold(first, |best, (i, &c)| if c > hist[best] { i } else { best });

    let end = if peak - first >= last - peak { first } else { last };
    if end == peak {
        return peak as u8;
    }

    let (x0, y0) = (peak as f64, hist[peak] as f64);
    let (x1, y1) = (end as f64, hist[end] as f64);
    let slope = (y1 - y0) / (x1 - x0);

    let range = if end < peak { end..peak } else { peak + 1..end + 1 };
    let mut best = (end, f64::NEG_INFINITY);
    for i in range {
        let below = y0 + slope * (i as f64 - x0) - hist[i] as f64;
        if below > best.1 {
            best = (i, below);
        }
    }
    best.0 as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    /// Light background (200) with a dark 10x10 square (40) and a little noise
    fn bimodal_image() -> GrayImage {
        GrayImage::from_fn(40, 40, |x, y| {
            if (10..20).contains(&x) && (10..20).contains(&y) {
                Luma([40 + (x % 3) as u8])
            } else {
                Luma([200 + (y % 5) as u8])
            }
        })
    }

    fn foreground_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] == 255).count()
    }

    #[test]
    fn relative_threshold_rescales_into_observed_range() {
        let t = relative_threshold(50, 200, 0.5, 255.0);
        assert!((t - 125.0 / 255.0).abs() < 1e-12);
        assert!((t - 0.4902).abs() < 1e-4);
    }

    #[test]
    fn relative_level_uses_image_extrema() {
        let grey = GrayImage::from_fn(4, 1, |x, _| Luma([[50, 80, 120, 200][x as usize]]));
        let strategy = BinarizationStrategy::RelativeLevel { level: 0.5 };
        let t = strategy.effective_threshold(&grey).unwrap();
        assert!((t - 125.0 / 255.0).abs() < 1e-12);

        let mask = strategy.binarize(&grey).unwrap();
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![255, 255, 255, 0]);
    }

    #[test]
    fn absolute_threshold_marks_dark_pixels() {
        let mask = BinarizationStrategy::Threshold { threshold: 0.5 }
            .binarize(&bimodal_image())
            .unwrap();
        assert_eq!(foreground_count(&mask), 100);
        assert_eq!(mask.get_pixel(15, 15)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn every_algorithm_separates_a_bimodal_image() {
        let grey = bimodal_image();
        for algorithm in ThresholdAlgorithm::iter() {
            let level = algorithm.level(&grey);
            assert!(
                (42..200).contains(&level),
                "{algorithm} produced level {level}"
            );
            let mask = BinarizationStrategy::Algorithm(algorithm).binarize(&grey).unwrap();
            assert_eq!(foreground_count(&mask), 100, "{algorithm}");
        }
    }

    #[test]
    fn flat_image_levels_do_not_panic() {
        let grey = GrayImage::from_pixel(8, 8, Luma([128]));
        assert_eq!(ThresholdAlgorithm::Mean.level(&grey), 128);
        assert_eq!(ThresholdAlgorithm::Isodata.level(&grey), 128);
        assert_eq!(ThresholdAlgorithm::Triangle.level(&grey), 128);
    }

    #[test]
    fn flat_image_has_no_foreground_under_any_algorithm() {
        let grey = GrayImage::from_pixel(16, 16, Luma([235]));
        for algorithm in ThresholdAlgorithm::iter() {
            let mask = BinarizationStrategy::Algorithm(algorithm).binarize(&grey).unwrap();
            assert_eq!(foreground_count(&mask), 0, "{algorithm}");
        }
    }

    #[test]
    fn extrema_of_empty_image() {
        assert_eq!(grey_extrema(&GrayImage::new(0, 0)), (0, 0));
    }
}
