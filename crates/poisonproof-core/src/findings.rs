//! The uniform output unit shared by both detectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity band of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// All levels, highest first.
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    TabularRow,
    ImageManipulation,
    ImageQuality,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FindingKind::TabularRow => "tabular-row",
            FindingKind::ImageManipulation => "image-manipulation",
            FindingKind::ImageQuality => "image-quality",
        };
        f.write_str(s)
    }
}

/// Where a finding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Locator {
    /// Zero-based row index.
    Row { index: usize },
    /// The whole image.
    Image,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 1-based for people reading reports
            Locator::Row { index } => write!(f, "Row {}", index + 1),
            Locator::Image => f.write_str("Image-wide"),
        }
    }
}

/// One flagged cell inside a tabular finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedColumn {
    pub column: String,
    pub value: f64,
    pub robust_z: f64,
    pub iqr_outlier: bool,
}

/// Explanation fields, one shape per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingDetails {
    TabularRow {
        columns: Vec<FlaggedColumn>,
        worst_abs_z: f64,
    },
    ImageManipulation {
        ela_score: f64,
        threshold: f64,
    },
    ImageQuality {
        gradient_variance: f64,
        dynamic_range: f64,
        low_texture: bool,
        low_dynamic_range: bool,
    },
}

impl FindingDetails {
    pub fn kind(&self) -> FindingKind {
        match self {
            FindingDetails::TabularRow { .. } => FindingKind::TabularRow,
            FindingDetails::ImageManipulation { .. } => FindingKind::ImageManipulation,
            FindingDetails::ImageQuality { .. } => FindingKind::ImageQuality,
        }
    }
}

/// A reported anomaly. Immutable once a detector returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub locator: Locator,
    pub severity: Severity,
    /// In `[0, 1]`
    pub confidence: f64,
    /// Ranking key; larger is more anomalous
    pub score: f64,
    pub description: String,
    pub details: FindingDetails,
}

impl Finding {
    /// Build a finding whose kind is taken from its details.
    pub fn new(
        locator: Locator,
        severity: Severity,
        confidence: f64,
        score: f64,
        description: impl Into<String>,
        details: FindingDetails,
    ) -> Self {
        Self {
            kind: details.kind(),
            locator,
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            score,
            description: description.into(),
            details,
        }
    }

    /// Row index for tabular findings.
    pub fn row(&self) -> Option<usize> {
        match self.locator {
            Locator::Row { index } => Some(index),
            Locator::Image => None,
        }
    }
}
