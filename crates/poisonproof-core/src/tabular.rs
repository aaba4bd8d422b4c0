//! Robust outlier detection over the numeric columns of a table.
//!
//! Each numeric column gets one [`RobustStats`]. A cell is flagged when its
//! |robust z| exceeds the threshold or it falls outside the IQR fences. Flags
//! are grouped per row, scored by summed |z|, ranked and truncated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregator::{aggregate, ScanResult};
use crate::config::TabularConfig;
use crate::error::{DetectionError, DetectionResult};
use crate::findings::{Finding, FindingDetails, FlaggedColumn, Locator};
use crate::scoring::{tabular_confidence, tabular_severity};
use crate::stats::RobustStats;
use crate::table::{NumericSeries, Table};

/// A single flagged cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFlag {
    pub row: usize,
    pub column: String,
    pub value: f64,
    pub robust_z: f64,
    pub is_iqr_outlier: bool,
}

impl CellFlag {
    /// Contribution to the row score.
    pub fn magnitude(&self) -> f64 {
        self.robust_z.abs()
    }
}

/// Flags of one row, combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowScore {
    pub row: usize,
    /// Sum of flag magnitudes
    pub score: f64,
    pub flagged_column_count: usize,
    pub worst_abs_z: f64,
    pub flags: Vec<CellFlag>,
}

/// Detector for numeric tables.
#[derive(Debug, Clone)]
pub struct TabularDetector {
    config: TabularConfig,
}

impl TabularDetector {
    /// Create a detector, validating the thresholds once.
    pub fn new(config: TabularConfig) -> DetectionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    /// Flag the cells of one numeric column.
    ///
    /// Infinite and NaN cells are always flagged with an infinite |z|, so
    /// they rank first and rate High.
    pub fn flag_column(&self, series: &NumericSeries<'_>) -> DetectionResult<Vec<CellFlag>> {
        let mut flags: Vec<CellFlag> = series
            .non_finite()
            .map(|(row, value)| CellFlag {
                row,
                column: series.name().to_string(),
                value,
                robust_z: if value.is_nan() {
                    f64::INFINITY
                } else {
                    value.signum() * f64::INFINITY
                },
                is_iqr_outlier: true,
            })
            .collect();

        let present = series.present();
        if present.is_empty() && !flags.is_empty() {
            return Ok(flags);
        }
        let stats = RobustStats::compute(&present, self.config.iqr_factor)?;
        debug!(
            column = series.name(),
            median = stats.median,
            mad = stats.mad,
            lower_fence = stats.lower_fence,
            upper_fence = stats.upper_fence,
            non_finite = flags.len(),
            "column statistics"
        );

        flags.extend(series.cells().filter_map(|(row, value)| {
            let robust_z = stats.robust_z(value);
            let is_iqr_outlier = stats.is_iqr_outlier(value);
            if robust_z.abs() > self.config.z_threshold || is_iqr_outlier {
                Some(CellFlag {
                    row,
                    column: series.name().to_string(),
                    value,
                    robust_z,
                    is_iqr_outlier,
                })
            } else {
                None
            }
        }));
        Ok(flags)
    }

    /// Flag every numeric column.
    ///
    /// Columns without usable values are skipped and reported as warnings, as
    /// are infinite or NaN cells. Other errors abort the scan.
    pub fn flag_cells(&self, table: &Table) -> DetectionResult<(Vec<CellFlag>, Vec<String>)> {
        let mut flags = Vec::new();
        let mut warnings = Vec::new();

        for series in table.numeric_columns() {
            match self.flag_column(&series) {
                Ok(column_flags) => {
                    let rows: Vec<String> = column_flags
                        .iter()
                        .filter(|f| !f.value.is_finite())
                        .map(|f| (f.row + 1).to_string())
                        .collect();
                    if !rows.is_empty() {
                        warn!(column = series.name(), count = rows.len(), "non-finite values");
                        warnings.push(format!(
                            "column '{}' has non-finite values in rows {}",
                            series.name(),
                            rows.join(", ")
                        ));
                    }
                    flags.extend(column_flags);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(column = series.name(), error = %e, "column skipped");
                    warnings.push(format!("column '{}' skipped: {}", series.name(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok((flags, warnings))
    }

    /// Group flags by row and rank: score descending, then row ascending.
    pub fn score_rows(flags: Vec<CellFlag>) -> Vec<RowScore> {
        let mut by_row: BTreeMap<usize, Vec<CellFlag>> = BTreeMap::new();
        for flag in flags {
            by_row.entry(flag.row).or_default().push(flag);
        }

        let mut rows: Vec<RowScore> = by_row
            .into_iter()
            .map(|(row, flags)| RowScore {
                row,
                score: flags.iter().map(CellFlag::magnitude).sum(),
                flagged_column_count: flags.len(),
                worst_abs_z: flags.iter().map(CellFlag::magnitude).fold(0.0, f64::max),
                flags,
            })
            .collect();

        rows.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.row.cmp(&b.row)));
        rows
    }

    fn to_finding(&self, row: RowScore) -> Finding {
        let severity = tabular_severity(row.worst_abs_z, &self.config);
        let confidence =
            tabular_confidence(row.worst_abs_z, row.flagged_column_count, &self.config);
        let names: Vec<&str> = row.flags.iter().map(|f| f.column.as_str()).collect();
        let description = format!(
            "Suspicious value{} in {}",
            if names.len() == 1 { "" } else { "s" },
            names.join(", ")
        );
        let columns = row
            .flags
            .into_iter()
            .map(|f| FlaggedColumn {
                column: f.column,
                value: f.value,
                robust_z: f.robust_z,
                iqr_outlier: f.is_iqr_outlier,
            })
            .collect();

        Finding::new(
            Locator::Row { index: row.row },
            severity,
            confidence,
            row.score,
            description,
            FindingDetails::TabularRow {
                columns,
                worst_abs_z: row.worst_abs_z,
            },
        )
    }

    /// Ranked, truncated findings for a table plus skip warnings.
    pub fn findings(&self, table: &Table) -> DetectionResult<(Vec<Finding>, Vec<String>)> {
        let (flags, warnings) = self.flag_cells(table)?;
        let findings = Self::score_rows(flags)
            .into_iter()
            .take(self.config.max_findings)
            .map(|row| self.to_finding(row))
            .collect();
        Ok((findings, warnings))
    }

    /// Scan a table.
    ///
    /// A table with no numeric columns yields no findings. A table with no
    /// rows is an `EmptyInput` error.
    #[tracing::instrument(skip_all, fields(rows = table.row_count(), columns = table.column_count()))]
    pub fn detect(&self, table: &Table, file_hash: &str) -> DetectionResult<ScanResult> {
        if table.row_count() == 0 {
            return Err(DetectionError::EmptyInput(
                "table has no rows".to_string(),
            ));
        }
        let (findings, warnings) = self.findings(table)?;
        aggregate(file_hash, findings, warnings)
    }
}

/// Scan a table with the given thresholds.
pub fn detect_tabular_anomalies(
    table: &Table,
    config: &TabularConfig,
    file_hash: &str,
) -> DetectionResult<ScanResult> {
    TabularDetector::new(config.clone())?.detect(table, file_hash)
}
