//! Common capability of the tabular and image detectors.

use image::DynamicImage;

use crate::aggregator::ScanResult;
use crate::config::DetectionConfig;
use crate::error::DetectionResult;
use crate::image_detector::ImageDetector;
use crate::table::Table;
use crate::tabular::TabularDetector;

/// A detector turns one input into a [`ScanResult`].
///
/// Implementations hold only read-only thresholds, so one instance can be
/// shared across threads scanning different files.
pub trait Detector: Send + Sync {
    type Input: ?Sized;

    /// Short name used in logs and reports.
    fn modality(&self) -> &'static str;

    fn detect(&self, input: &Self::Input, file_hash: &str) -> DetectionResult<ScanResult>;
}

impl Detector for TabularDetector {
    type Input = Table;

    fn modality(&self) -> &'static str {
        "tabular"
    }

    fn detect(&self, input: &Table, file_hash: &str) -> DetectionResult<ScanResult> {
        TabularDetector::detect(self, input, file_hash)
    }
}

impl Detector for ImageDetector {
    type Input = DynamicImage;

    fn modality(&self) -> &'static str {
        "image"
    }

    fn detect(&self, input: &DynamicImage, file_hash: &str) -> DetectionResult<ScanResult> {
        ImageDetector::detect(self, input, file_hash)
    }
}

/// Both detectors built from one configuration.
#[derive(Debug, Clone)]
pub struct DetectorSet {
    pub tabular: TabularDetector,
    pub image: ImageDetector,
}

impl DetectorSet {
    pub fn new(config: &DetectionConfig) -> DetectionResult<Self> {
        Ok(Self {
            tabular: TabularDetector::new(config.tabular.clone())?,
            image: ImageDetector::new(config.image.clone())?,
        })
    }
}
