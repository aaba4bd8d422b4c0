//! Whole-image forensic signals: error level, texture and dynamic range.
//!
//! All three are pure functions of the pixel data. ELA depends on the JPEG
//! encoder too, so it is deterministic for a fixed quality and `image` version.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DetectionError, DetectionResult};

/// ITU-R BT.601 luma weights.
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Raw signals for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSignals {
    /// Mean absolute difference against a JPEG re-encode, 0-255 scale
    pub ela_score: f64,
    /// Variance of the gradient magnitude of luminance
    pub gradient_variance: f64,
    /// `max(luminance) - min(luminance)`
    pub dynamic_range: f64,
}

impl ImageSignals {
    /// Compute all three signals.
    pub fn compute(image: &DynamicImage, ela_quality: u8) -> DetectionResult<Self> {
        let rgb = to_rgb(image)?;
        let luma = Luminance::from_rgb(&rgb);
        let signals = Self {
            ela_score: ela_score_rgb(&rgb, ela_quality)?,
            gradient_variance: luma.gradient_variance(),
            dynamic_range: luma.dynamic_range(),
        };
        debug!(
            width = rgb.width(),
            height = rgb.height(),
            ela_score = signals.ela_score,
            gradient_variance = signals.gradient_variance,
            dynamic_range = signals.dynamic_range,
            "image signals"
        );
        Ok(signals)
    }
}

/// Decode raw file bytes into a raster image.
pub fn decode_image(bytes: &[u8]) -> DetectionResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(DetectionError::Decode("no image data".to_string()));
    }
    image::load_from_memory(bytes)
        .map_err(|e| DetectionError::Decode(format!("failed to decode image: {}", e)))
}

fn to_rgb(image: &DynamicImage) -> DetectionResult<RgbImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(DetectionError::EmptyInput(
            "image has no pixels".to_string(),
        ));
    }
    Ok(image.to_rgb8())
}

/// Error level analysis score.
///
/// Re-encodes the image as JPEG at `quality`, decodes it again and returns the
/// mean absolute per-channel difference.
pub fn ela_score(image: &DynamicImage, quality: u8) -> DetectionResult<f64> {
    ela_score_rgb(&to_rgb(image)?, quality)
}

fn ela_score_rgb(rgb: &RgbImage, quality: u8) -> DetectionResult<f64> {
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100))
        .encode_image(rgb)
        .map_err(|e| DetectionError::Decode(format!("JPEG re-encode failed: {}", e)))?;

    let recompressed = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
        .map_err(|e| DetectionError::Decode(format!("JPEG re-decode failed: {}", e)))?
        .to_rgb8();

    if recompressed.dimensions() != rgb.dimensions() {
        return Err(DetectionError::Decode(
            "re-encoded image has different dimensions".to_string(),
        ));
    }

    let total: u64 = rgb
        .as_raw()
        .iter()
        .zip(recompressed.as_raw())
        .map(|(a, b)| u64::from(a.abs_diff(*b)))
        .sum();
    Ok(total as f64 / rgb.as_raw().len() as f64)
}

/// Single-channel luminance plane.
#[derive(Debug, Clone)]
pub struct Luminance {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Luminance {
    pub fn from_rgb(rgb: &RgbImage) -> Self {
        let values = rgb
            .pixels()
            .map(|p| {
                LUMA_R * f64::from(p[0]) + LUMA_G * f64::from(p[1]) + LUMA_B * f64::from(p[2])
            })
            .collect();
        Self {
            width: rgb.width() as usize,
            height: rgb.height() as usize,
            values,
        }
    }

    pub fn from_image(image: &DynamicImage) -> DetectionResult<Self> {
        Ok(Self::from_rgb(&to_rgb(image)?))
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Forward-difference gradient magnitude per pixel. The last column and
    /// row have no forward neighbour and use a zero difference on that axis.
    pub fn gradient_magnitudes(&self) -> Vec<f64> {
        let mut magnitudes = Vec::with_capacity(self.values.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let here = self.at(x, y);
                let gx = if x + 1 < self.width {
                    self.at(x + 1, y) - here
                } else {
                    0.0
                };
                let gy = if y + 1 < self.height {
                    self.at(x, y + 1) - here
                } else {
                    0.0
                };
                magnitudes.push(gx.hypot(gy));
            }
        }
        magnitudes
    }

    /// Population variance of the gradient magnitude field.
    pub fn gradient_variance(&self) -> f64 {
        variance(&self.gradient_magnitudes())
    }

    pub fn dynamic_range(&self) -> f64 {
        let (min, max) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            0.0
        } else {
            max - min
        }
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Gradient variance of an image.
pub fn gradient_variance(image: &DynamicImage) -> DetectionResult<f64> {
    Ok(Luminance::from_image(image)?.gradient_variance())
}

/// Luminance range of an image.
pub fn dynamic_range(image: &DynamicImage) -> DetectionResult<f64> {
    Ok(Luminance::from_image(image)?.dynamic_range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    fn checkerboard(size: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_flat_image_has_no_texture_or_range() {
        let image = flat(32, 32, 128);
        assert_eq!(gradient_variance(&image).unwrap(), 0.0);
        assert_eq!(dynamic_range(&image).unwrap(), 0.0);
    }

    #[test]
    fn test_checkerboard_has_texture_and_range() {
        let image = checkerboard(32, 4);
        assert!(gradient_variance(&image).unwrap() > 1_000.0);
        assert!((dynamic_range(&image).unwrap() - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_image_survives_recompression() {
        let score = ela_score(&flat(32, 32, 128), 90).unwrap();
        assert!(score < 2.0, "ela score {}", score);
    }

    #[test]
    fn test_signals_are_deterministic() {
        let image = checkerboard(48, 3);
        let first = ImageSignals::compute(&image, 90).unwrap();
        let second = ImageSignals::compute(&image, 90).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            ImageSignals::compute(&image, 90),
            Err(DetectionError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(DetectionError::Decode(_))
        ));
        assert!(matches!(decode_image(&[]), Err(DetectionError::Decode(_))));
    }

    #[test]
    fn test_single_pixel_gradient() {
        let luma = Luminance::from_image(&flat(1, 1, 10)).unwrap();
        assert_eq!(luma.gradient_magnitudes(), vec![0.0]);
        assert_eq!(luma.gradient_variance(), 0.0);
    }

    #[test]
    fn test_gradient_of_ramp() {
        // horizontal ramp: every interior gx is 10, last column 0
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(4, 2, |x, _| {
            let v = (x * 10) as u8;
            Rgb([v, v, v])
        }));
        let luma = Luminance::from_image(&image).unwrap();
        let mags = luma.gradient_magnitudes();
        assert!((mags[0] - 10.0).abs() < 1e-9);
        assert!(mags[3].abs() < 1e-9);
    }
}
