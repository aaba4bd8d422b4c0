//! Maps image signals to manipulation and quality findings.

use image::DynamicImage;
use tracing::debug;

use crate::aggregator::{aggregate, ScanResult};
use crate::config::ImageConfig;
use crate::error::DetectionResult;
use crate::findings::{Finding, FindingDetails, Locator, Severity};
use crate::forensics::{decode_image, ImageSignals};
use crate::scoring::{
    exceedance_confidence, manipulation_severity, shortfall_confidence, shortfall_fraction,
};

/// Detector for raster images.
#[derive(Debug, Clone)]
pub struct ImageDetector {
    config: ImageConfig,
}

impl ImageDetector {
    /// Create a detector, validating the thresholds once.
    pub fn new(config: ImageConfig) -> DetectionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub fn signals(&self, image: &DynamicImage) -> DetectionResult<ImageSignals> {
        ImageSignals::compute(image, self.config.ela_quality)
    }

    fn manipulation_finding(&self, signals: &ImageSignals) -> Option<Finding> {
        let threshold = self.config.ela_mean_threshold;
        if signals.ela_score <= threshold {
            return None;
        }
        let confidence =
            exceedance_confidence(signals.ela_score, threshold, self.config.ela_high_threshold);
        Some(Finding::new(
            Locator::Image,
            manipulation_severity(signals.ela_score, &self.config),
            confidence,
            confidence,
            format!(
                "Error level {:.2} exceeds {:.2}: regions may have a different compression history",
                signals.ela_score, threshold
            ),
            FindingDetails::ImageManipulation {
                ela_score: signals.ela_score,
                threshold,
            },
        ))
    }

    fn quality_finding(&self, signals: &ImageSignals) -> Option<Finding> {
        let low_texture = signals.gradient_variance < self.config.blur_variance_threshold;
        let low_dynamic_range = signals.dynamic_range < self.config.dynamic_range_threshold;
        if !low_texture && !low_dynamic_range {
            return None;
        }

        let worst = shortfall_fraction(
            signals.gradient_variance,
            self.config.blur_variance_threshold,
        )
        .max(shortfall_fraction(
            signals.dynamic_range,
            self.config.dynamic_range_threshold,
        ));
        let confidence = shortfall_confidence(worst);

        let mut reasons = Vec::new();
        if low_texture {
            reasons.push(format!(
                "gradient variance {:.2} below {:.2}",
                signals.gradient_variance, self.config.blur_variance_threshold
            ));
        }
        if low_dynamic_range {
            reasons.push(format!(
                "dynamic range {:.2} below {:.2}",
                signals.dynamic_range, self.config.dynamic_range_threshold
            ));
        }

        Some(Finding::new(
            Locator::Image,
            Severity::Medium,
            confidence,
            confidence,
            format!("Low image quality: {}", reasons.join("; ")),
            FindingDetails::ImageQuality {
                gradient_variance: signals.gradient_variance,
                dynamic_range: signals.dynamic_range,
                low_texture,
                low_dynamic_range,
            },
        ))
    }

    /// Zero, one or two findings, ordered by score. A manipulation finding
    /// comes first on equal scores.
    pub fn findings(&self, signals: &ImageSignals) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .manipulation_finding(signals)
            .into_iter()
            .chain(self.quality_finding(signals))
            .collect();
        findings.sort_by(|a, b| b.score.total_cmp(&a.score));
        findings
    }

    /// Scan a decoded image.
    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage, file_hash: &str) -> DetectionResult<ScanResult> {
        let signals = self.signals(image)?;
        let findings = self.findings(&signals);
        debug!(findings = findings.len(), "image findings");
        aggregate(file_hash, findings, Vec::new())
    }

    /// Decode raw bytes and scan them. Undecodable data is an error, never
    /// an empty result.
    pub fn detect_bytes(&self, bytes: &[u8], file_hash: &str) -> DetectionResult<ScanResult> {
        let image = decode_image(bytes)?;
        self.detect(&image, file_hash)
    }
}

/// Scan a decoded image with the given thresholds.
pub fn detect_image_anomalies(
    image: &DynamicImage,
    config: &ImageConfig,
    file_hash: &str,
) -> DetectionResult<ScanResult> {
    ImageDetector::new(config.clone())?.detect(image, file_hash)
}
