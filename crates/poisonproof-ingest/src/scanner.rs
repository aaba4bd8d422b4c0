//! File-level scanning: validate, hash, decode, detect.

use std::path::Path;

use poisonproof_core::{decode_image, DetectionConfig, DetectorSet, ScanResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::csv_loader::load_csv;
use crate::error::IngestResult;
use crate::formats::{validate_upload, FileKind, ImageFormat};
use crate::hashing::hash_bytes;

/// Outcome of scanning one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub file_name: String,
    /// "csv", "png", "jpg", ...
    pub kind: String,
    #[serde(flatten)]
    pub result: ScanResult,
}

/// Routes uploaded files to the matching detector.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: IngestConfig,
    detectors: DetectorSet,
}

impl Scanner {
    /// Create a scanner, validating the detection thresholds.
    pub fn new(ingest: IngestConfig, detection: &DetectionConfig) -> IngestResult<Self> {
        ingest.validate()?;
        Ok(Self {
            config: ingest,
            detectors: DetectorSet::new(detection)?,
        })
    }

    /// Scanner with default limits and thresholds.
    pub fn with_defaults() -> IngestResult<Self> {
        Self::new(IngestConfig::default(), &DetectionConfig::default())
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Scan a file on disk.
    ///
    /// The hash covers the original bytes, so the same file always reports
    /// the same `file_hash`.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn scan_path(&self, path: &Path) -> IngestResult<ScanReport> {
        let kind = validate_upload(path, &self.config)?;
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.scan_bytes(&file_name, kind, &bytes)
    }

    /// Scan in-memory content already classified as `kind`.
    pub fn scan_bytes(&self, file_name: &str, kind: FileKind, bytes: &[u8]) -> IngestResult<ScanReport> {
        let file_hash = hash_bytes(bytes);
        debug!(file = file_name, kind = kind.as_str(), hash = %file_hash, "scanning");

        let result = match kind {
            FileKind::Csv => {
                let table = load_csv(bytes)?;
                self.detectors.tabular.detect(&table, &file_hash)?
            }
            FileKind::Image(expected) => {
                if let Ok(actual) = ImageFormat::detect_from_bytes(bytes) {
                    if actual != expected {
                        warn!(
                            file = file_name,
                            extension = expected.as_str(),
                            content = actual.as_str(),
                            "extension does not match image content"
                        );
                    }
                }
                let image = decode_image(bytes)?;
                self.detectors.image.detect(&image, &file_hash)?
            }
        };

        info!(
            file = file_name,
            findings = result.findings.len(),
            "scan complete"
        );

        Ok(ScanReport {
            file_name: file_name.to_string(),
            kind: kind.as_str().to_string(),
            result,
        })
    }
}
