//! Border colour-key fallback segmenter.
//!
//! Works without any model: the background colour is estimated from the
//! image border and every pixel is keyed by its RGB distance from it. Good
//! enough for product shots on plain backdrops, useless for busy scenes.

use crate::Result;
use crate::segmentation::Segmenter;
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

/// Distance at or below which a pixel is fully transparent.
pub const DEFAULT_LOW: f32 = 24.0;

/// Distance at or above which a pixel is fully opaque.
pub const DEFAULT_HIGH: f32 = 64.0;

/// Colour-keying segmenter.
///
/// # Examples
///
/// ```
/// use cutscale::segmentation::{BorderKeySegmenter, Segmenter};
/// use image::{Rgb, RgbImage};
///
/// let mut image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
/// image.put_pixel(25, 25, Rgb([200, 0, 0]));
///
/// let mask = BorderKeySegmenter::default().predict_mask(&image).unwrap();
/// assert_eq!(mask.get_pixel(0, 0).0, [0]);
/// assert_eq!(mask.get_pixel(25, 25).0, [255]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderKeySegmenter {
    low: f32,
    high: f32,
}

impl BorderKeySegmenter {
    /// Creates a segmenter with custom ramp thresholds.
    ///
    /// `high` is clamped to be strictly above `low`.
    #[must_use]
    pub fn new(low: f32, high: f32) -> Self {
        let low = low.max(0.0);
        Self {
            low,
            high: high.max(low + 1.0),
        }
    }

    /// Width of the border ring sampled for the background colour.
    fn ring_width(width: u32, height: u32) -> u32 {
        (width.min(height) / 50).max(1)
    }

    /// Mean colour of the border ring.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn background_color(image: &RgbImage) -> [f32; 3] {
        let (width, height) = image.dimensions();
        let ring = Self::ring_width(width, height);

        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for (x, y, pixel) in image.enumerate_pixels() {
            let on_border = x < ring
                || y < ring
                || x >= width.saturating_sub(ring)
                || y >= height.saturating_sub(ring);
            if on_border {
                for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                    *acc += u64::from(channel);
                }
                count += 1;
            }
        }

        if count == 0 {
            return [0.0; 3];
        }
        sum.map(|s| (s as f64 / count as f64) as f32)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn alpha_for(&self, distance: f32) -> u8 {
        if distance <= self.low {
            0
        } else if distance >= self.high {
            255
        } else {
            ((distance - self.low) / (self.high - self.low) * 255.0).round() as u8
        }
    }
}

impl Default for BorderKeySegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_LOW, DEFAULT_HIGH)
    }
}

impl Segmenter for BorderKeySegmenter {
    fn name(&self) -> &'static str {
        "border"
    }

    fn predict_mask(&self, image: &RgbImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        let mut mask = GrayImage::new(width, height);
        if width == 0 || height == 0 {
            return Ok(mask);
        }

        let background = Self::background_color(image);
        let row_len = width as usize;

        mask.par_chunks_mut(row_len)
            .zip(image.par_chunks(row_len * 3))
            .for_each(|(mask_row, rgb_row)| {
                for (alpha, pixel) in mask_row.iter_mut().zip(rgb_row.chunks_exact(3)) {
                    let distance = pixel
                        .iter()
                        .zip(background)
                        .map(|(&c, b)| {
                            let d = f32::from(c) - b;
                            d * d
                        })
                        .sum::<f32>()
                        .sqrt();
                    *alpha = self.alpha_for(distance);
                }
            });

        tracing::debug!(
            background = ?background,
            "border-key mask computed"
        );

        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn square_on_white(size: u32, square: u32) -> RgbImage {
        let start = (size - square) / 2;
        RgbImage::from_fn(size, size, |x, y| {
            let inside = (start..start + square).contains(&x) && (start..start + square).contains(&y);
            if inside {
                Rgb([220, 20, 60])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_mask_matches_dimensions() {
        let image = RgbImage::new(37, 11);
        let mask = BorderKeySegmenter::default().predict_mask(&image).unwrap();
        assert_eq!(mask.dimensions(), (37, 11));
    }

    #[test]
    fn test_square_is_foreground() {
        let image = square_on_white(100, 40);
        let mask = BorderKeySegmenter::default().predict_mask(&image).unwrap();

        assert_eq!(mask.get_pixel(0, 0).0, [0]);
        assert_eq!(mask.get_pixel(99, 99).0, [0]);
        assert_eq!(mask.get_pixel(10, 50).0, [0]);
        assert_eq!(mask.get_pixel(50, 50).0, [255]);
    }

    #[test]
    fn test_uniform_image_is_all_background() {
        let image = RgbImage::from_pixel(20, 20, Rgb([12, 34, 56]));
        let mask = BorderKeySegmenter::default().predict_mask(&image).unwrap();
        assert!(mask.pixels().all(|p| p.0 == [0]));
    }

    #[test]
    fn test_deterministic() {
        let image = square_on_white(64, 20);
        let segmenter = BorderKeySegmenter::default();
        let a = segmenter.predict_mask(&image).unwrap();
        let b = segmenter.predict_mask(&image).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_alpha_ramp() {
        let segmenter = BorderKeySegmenter::new(10.0, 20.0);
        assert_eq!(segmenter.alpha_for(0.0), 0);
        assert_eq!(segmenter.alpha_for(10.0), 0);
        assert_eq!(segmenter.alpha_for(15.0), 128);
        assert_eq!(segmenter.alpha_for(20.0), 255);
        assert_eq!(segmenter.alpha_for(300.0), 255);
    }

    #[test]
    fn test_new_clamps_thresholds() {
        let segmenter = BorderKeySegmenter::new(30.0, 5.0);
        assert!(segmenter.high > segmenter.low);
    }

    #[test]
    fn test_empty_image() {
        let image = RgbImage::new(0, 0);
        let mask = BorderKeySegmenter::default().predict_mask(&image).unwrap();
        assert_eq!(mask.dimensions(), (0, 0));
    }

    #[test]
    fn test_ring_width() {
        assert_eq!(BorderKeySegmenter::ring_width(10, 10), 1);
        assert_eq!(BorderKeySegmenter::ring_width(1000, 500), 10);
    }
}
