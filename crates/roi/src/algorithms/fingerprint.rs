use image::{imageops::FilterType, GrayImage};

use crate::{
    config::{FingerprintOptions, Resampling},
    traits::Fingerprinter,
};

impl Fingerprinter for Resampling {
    fn fingerprint(&self, mask: &GrayImage, options: &FingerprintOptions) -> Vec<u8> {
        let (width, height) = (options.width, options.height);
        if mask.width() == 0 || mask.height() == 0 {
            return vec![0; options.len()];
        }
        match self {
            Resampling::Nearest => nearest(mask, width, height),
            Resampling::Area => area_average(mask, width, height),
        }
    }
}

fn nearest(mask: &GrayImage, width: u32, height: u32) -> Vec<u8> {
    image::imageops::resize(mask, width, height, FilterType::Nearest)
        .pixels()
        .map(|p| u8::from(p[0] >= 128))
        .collect()
}

fn area_average(mask: &GrayImage, width: u32, height: u32) -> Vec<u8> {
    let scale_x = mask.width() as f64 / width as f64;
    let scale_y = mask.height() as f64 / height as f64;
    let cell_area = scale_x * scale_y;

    let mut data = Vec::with_capacity(width as usize * height as usize);
    for ty in 0..height {
        let y0 = ty as f64 * scale_y;
        let y1 = (ty + 1) as f64 * scale_y;
        for tx in 0..width {
            let x0 = tx as f64 * scale_x;
            let x1 = (tx + 1) as f64 * scale_x;

            let mut covered = 0.0;
            for y in (y0.floor() as u32)..(y1.ceil() as u32).min(mask.height()) {
                let dy = y1.min(y as f64 + 1.0) - y0.max(y as f64);
                if dy <= 0.0 {
                    continue;
                }
                for x in (x0.floor() as u32)..(x1.ceil() as u32).min(mask.width()) {
                    if mask.get_pixel(x, y)[0] == 0 {
                        continue;
                    }
                    let dx = x1.min(x as f64 + 1.0) - x0.max(x as f64);
                    if dx > 0.0 {
                        covered += dx * dy;
                    }
                }
            }
            data.push(u8::from(covered * 2.0 >= cell_area));
        }
    }
    data
}
