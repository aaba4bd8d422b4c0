//! Final assembly of a scan: tally severities and attach the file hash.
//!
//! The producing detector has already ranked and truncated its findings; this
//! module only counts them.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DetectionError, DetectionResult};
use crate::findings::{Finding, Severity};

/// Count of findings per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDistribution {
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "Low")]
    pub low: usize,
}

impl SeverityDistribution {
    /// Tally a slice of findings.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut distribution = Self::default();
        for finding in findings {
            distribution.record(finding.severity);
        }
        distribution
    }

    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    /// `(severity, count)` pairs, highest severity first.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, usize)> + '_ {
        Severity::ALL.into_iter().map(move |s| (s, self.count(s)))
    }
}

/// Result of scanning one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// SHA-256 of the original file bytes, lowercase hex
    pub file_hash: String,
    /// Ordered by descending score
    pub findings: Vec<Finding>,
    pub severity_distribution: SeverityDistribution,
    /// Columns skipped and similar non-fatal notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Whether nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}

/// Check that `hash` is a 64-character hex digest.
pub fn validate_file_hash(hash: &str) -> DetectionResult<()> {
    if hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(DetectionError::InvalidInput(format!(
            "file hash must be 64 hex characters, got {:?}",
            hash
        )))
    }
}

/// Build the [`ScanResult`] for already ranked findings.
pub fn aggregate(
    file_hash: &str,
    findings: Vec<Finding>,
    warnings: Vec<String>,
) -> DetectionResult<ScanResult> {
    validate_file_hash(file_hash)?;
    let severity_distribution = SeverityDistribution::from_findings(&findings);

    info!(
        findings = findings.len(),
        high = severity_distribution.high,
        medium = severity_distribution.medium,
        low = severity_distribution.low,
        "scan aggregated"
    );

    Ok(ScanResult {
        file_hash: file_hash.to_string(),
        findings,
        severity_distribution,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{FindingDetails, Locator};

    const HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn finding(row: usize, severity: Severity, score: f64) -> Finding {
        Finding::new(
            Locator::Row { index: row },
            severity,
            0.5,
            score,
            "test",
            FindingDetails::TabularRow {
                columns: vec![],
                worst_abs_z: score,
            },
        )
    }

    #[test]
    fn test_distribution_counts() {
        let findings = vec![
            finding(0, Severity::High, 9.0),
            finding(1, Severity::Medium, 4.0),
            finding(2, Severity::Medium, 3.9),
            finding(3, Severity::Low, 1.0),
        ];
        let result = aggregate(HASH, findings, vec![]).unwrap();
        assert_eq!(result.severity_distribution.high, 1);
        assert_eq!(result.severity_distribution.medium, 2);
        assert_eq!(result.severity_distribution.low, 1);
        assert_eq!(result.severity_distribution.total(), 4);
        assert_eq!(result.max_severity(), Some(Severity::High));
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let findings = vec![finding(7, Severity::Low, 1.0), finding(2, Severity::High, 9.0)];
        let result = aggregate(HASH, findings, vec![]).unwrap();
        let rows: Vec<_> = result.findings.iter().filter_map(|f| f.row()).collect();
        assert_eq!(rows, vec![7, 2]);
    }

    #[test]
    fn test_hash_embedded_verbatim() {
        let result = aggregate(HASH, vec![], vec![]).unwrap();
        assert_eq!(result.file_hash, HASH);
        assert!(result.is_clean());
        assert_eq!(result.severity_distribution, SeverityDistribution::default());
    }

    #[test]
    fn test_invalid_hash_rejected() {
        assert!(aggregate("abc", vec![], vec![]).is_err());
        assert!(aggregate(&"z".repeat(64), vec![], vec![]).is_err());
    }

    #[test]
    fn test_distribution_serializes_with_level_names() {
        let json = serde_json::to_value(SeverityDistribution {
            high: 2,
            medium: 1,
            low: 0,
        })
        .unwrap();
        assert_eq!(json["High"], 2);
        assert_eq!(json["Medium"], 1);
        assert_eq!(json["Low"], 0);
    }
}
