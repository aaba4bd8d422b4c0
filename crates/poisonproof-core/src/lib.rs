//! Statistical anomaly detection for datasets and images.
//!
//! This crate provides the detection core:
//! - Robust statistics (median, MAD, robust z-score, IQR fences)
//! - Tabular detection of outlying rows in numeric columns
//! - Image forensics (error level analysis, texture, dynamic range)
//! - Image detection of manipulation and quality problems
//! - Shared severity/confidence scoring and result aggregation
//! - Training-readiness profiling of datasets
//!
//! Every scan is a pure function of its input and a [`DetectionConfig`]. The
//! caller owns file I/O and supplies the SHA-256 of the original bytes.

pub mod aggregator;
pub mod config;
pub mod detector;
pub mod error;
pub mod findings;
pub mod forensics;
pub mod image_detector;
pub mod profile;
pub mod scoring;
pub mod stats;
pub mod table;
pub mod tabular;

pub use aggregator::{aggregate, ScanResult, SeverityDistribution};
pub use config::{
    config_hierarchy, load_layered, merge_yaml, DetectionConfig, ImageConfig, TabularConfig,
};
pub use detector::{Detector, DetectorSet};
pub use error::{DetectionError, DetectionResult};
pub use findings::{Finding, FindingDetails, FindingKind, FlaggedColumn, Locator, Severity};
pub use forensics::{decode_image, ImageSignals};
pub use image_detector::{detect_image_anomalies, ImageDetector};
pub use profile::{profile_table, DatasetProfile};
pub use stats::RobustStats;
pub use table::{Column, ColumnValues, NumericSeries, Table};
pub use tabular::{detect_tabular_anomalies, CellFlag, RowScore, TabularDetector};
