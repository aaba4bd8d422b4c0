//! Training-readiness profile of a dataset.
//!
//! Independent of anomaly detection: it summarizes shape, missing data,
//! duplicates and label balance, and scores readiness out of five.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::table::{ColumnValues, Table};

/// Column names recognized as a label, in priority order.
pub const TARGET_CANDIDATES: [&str; 5] = ["is_anomaly", "label", "target", "class", "anomaly"];

/// Distinct text values above which a column counts as high cardinality.
pub const HIGH_CARDINALITY_LIMIT: usize = 100;

/// Rows needed for the sample-size check.
pub const MIN_TRAINING_ROWS: usize = 100;

/// Missing-cell rate below which the missing-data check passes.
pub const MAX_MISSING_RATE: f64 = 0.10;

/// Majority/minority class ratio below which classes count as balanced.
pub const MAX_CLASS_RATIO: f64 = 5.0;

/// Binary class ratio above which rebalancing is recommended.
pub const REBALANCE_RATIO: f64 = 3.0;

pub const MAX_READINESS_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Sample standard deviation; 0 for fewer than two values
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub null_pct: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NumericSummary>,
}

/// The detected label column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub column: String,
    /// Class value to row count
    pub distribution: BTreeMap<String, usize>,
    /// Majority over minority count, when there are at least two classes
    pub imbalance_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub target: Option<TargetProfile>,
    /// Numeric columns other than the target
    pub numeric_features: Vec<String>,
    pub text_features: Vec<String>,
    pub missing_cells: usize,
    pub missing_rate: f64,
    pub duplicate_rows: usize,
    pub constant_columns: Vec<String>,
    pub high_cardinality_columns: Vec<String>,
    pub readiness_score: u8,
    pub recommendations: Vec<String>,
}

impl DatasetProfile {
    pub fn is_ready(&self) -> bool {
        self.readiness_score >= 4
    }

    /// Human-readable quality issues.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.missing_cells > 0 {
            issues.push(format!(
                "Missing values: {} cells ({:.1}%)",
                self.missing_cells,
                self.missing_rate * 100.0
            ));
        }
        if self.duplicate_rows > 0 {
            issues.push(format!("Duplicate rows: {}", self.duplicate_rows));
        }
        if !self.constant_columns.is_empty() {
            issues.push(format!(
                "Constant columns: {} ({})",
                self.constant_columns.len(),
                self.constant_columns.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if !self.high_cardinality_columns.is_empty() {
            issues.push(format!(
                "High cardinality: {} columns with >{} unique values",
                self.high_cardinality_columns.len(),
                HIGH_CARDINALITY_LIMIT
            ));
        }
        issues
    }
}

fn numeric_summary(values: &[Option<f64>]) -> Option<NumericSummary> {
    let present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return None;
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let std = if present.len() > 1 {
        (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    Some(NumericSummary {
        min: present.iter().copied().fold(f64::INFINITY, f64::min),
        mean,
        max: present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std,
    })
}

fn column_profile(name: &str, values: &ColumnValues, rows: usize) -> ColumnProfile {
    let null_count = (0..rows).filter(|&r| values.is_missing(r)).count();
    let unique_count = (0..rows)
        .filter_map(|r| values.cell_key(r))
        .collect::<HashSet<_>>()
        .len();
    let (kind, summary) = match values {
        ColumnValues::Numeric(v) => (ColumnKind::Numeric, numeric_summary(v)),
        ColumnValues::Text(_) => (ColumnKind::Text, None),
    };
    ColumnProfile {
        name: name.to_string(),
        kind,
        null_count,
        null_pct: if rows == 0 {
            0.0
        } else {
            null_count as f64 / rows as f64 * 100.0
        },
        unique_count,
        summary,
    }
}

fn target_profile(table: &Table) -> Option<TargetProfile> {
    let column = TARGET_CANDIDATES
        .iter()
        .find_map(|name| table.column(name))?;
    let mut distribution = BTreeMap::new();
    for row in 0..table.row_count() {
        if let Some(key) = column.values.cell_key(row) {
            *distribution.entry(key).or_insert(0usize) += 1;
        }
    }
    let imbalance_ratio = if distribution.len() >= 2 {
        let max = distribution.values().copied().max().unwrap_or(0);
        let min = distribution.values().copied().min().unwrap_or(0);
        (min > 0).then(|| max as f64 / min as f64)
    } else {
        None
    };
    Some(TargetProfile {
        column: column.name.clone(),
        distribution,
        imbalance_ratio,
    })
}

fn duplicate_rows(table: &Table) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for row in 0..table.row_count() {
        let key: Vec<Option<String>> = table
            .columns()
            .iter()
            .map(|c| c.values.cell_key(row))
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}

/// Profile a table for training readiness.
pub fn profile_table(table: &Table) -> DatasetProfile {
    let rows = table.row_count();
    let columns: Vec<ColumnProfile> = table
        .columns()
        .iter()
        .map(|c| column_profile(&c.name, &c.values, rows))
        .collect();
    let target = target_profile(table);
    let target_name = target.as_ref().map(|t| t.column.as_str());

    let numeric_features: Vec<String> = columns
        .iter()
        .filter(|c| c.kind == ColumnKind::Numeric && Some(c.name.as_str()) != target_name)
        .map(|c| c.name.clone())
        .collect();
    let text_features: Vec<String> = columns
        .iter()
        .filter(|c| c.kind == ColumnKind::Text && Some(c.name.as_str()) != target_name)
        .map(|c| c.name.clone())
        .collect();

    let missing_cells: usize = columns.iter().map(|c| c.null_count).sum();
    let total_cells = rows * table.column_count();
    let missing_rate = if total_cells == 0 {
        0.0
    } else {
        missing_cells as f64 / total_cells as f64
    };

    let constant_columns = columns
        .iter()
        .filter(|c| c.unique_count == 1)
        .map(|c| c.name.clone())
        .collect();
    let high_cardinality_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.kind == ColumnKind::Text && c.unique_count > HIGH_CARDINALITY_LIMIT)
        .map(|c| c.name.clone())
        .collect();

    let mut profile = DatasetProfile {
        row_count: rows,
        column_count: table.column_count(),
        columns,
        target,
        numeric_features,
        text_features,
        missing_cells,
        missing_rate,
        duplicate_rows: duplicate_rows(table),
        constant_columns,
        high_cardinality_columns,
        readiness_score: 0,
        recommendations: Vec::new(),
    };
    profile.readiness_score = readiness_score(&profile);
    profile.recommendations = recommendations(&profile);
    profile
}

fn readiness_score(profile: &DatasetProfile) -> u8 {
    let mut score = 0;
    if profile.target.is_some() {
        score += 1;
    }
    if !profile.numeric_features.is_empty() {
        score += 1;
    }
    if profile.row_count >= MIN_TRAINING_ROWS {
        score += 1;
    }
    if profile.missing_rate < MAX_MISSING_RATE {
        score += 1;
    }
    // No label or a single class cannot be imbalanced.
    let balanced = profile
        .target
        .as_ref()
        .and_then(|t| t.imbalance_ratio)
        .map_or(true, |ratio| ratio < MAX_CLASS_RATIO);
    if balanced {
        score += 1;
    }
    score
}

fn recommendations(profile: &DatasetProfile) -> Vec<String> {
    let mut out = Vec::new();
    if profile.target.is_none() {
        out.push("Add a target variable column (e.g., 'is_anomaly', 'label')".to_string());
    }
    if profile.missing_cells > 0 {
        out.push(format!(
            "Handle {} missing values (imputation or removal)",
            profile.missing_cells
        ));
    }
    if profile.duplicate_rows > 0 {
        out.push(format!("Remove {} duplicate rows", profile.duplicate_rows));
    }
    if !profile.high_cardinality_columns.is_empty() {
        out.push("Consider encoding or hashing high-cardinality features".to_string());
    }
    if let Some(target) = &profile.target {
        if let (2, Some(ratio)) = (target.distribution.len(), target.imbalance_ratio) {
            if ratio > REBALANCE_RATIO {
                out.push(
                    "Consider oversampling or class weighting for imbalanced classes".to_string(),
                );
            }
        }
    }
    if profile.numeric_features.len() < 3 {
        out.push("Consider feature engineering to create more numerical features".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn labeled_table(rows: usize, positives: usize) -> Table {
        let labels = (0..rows)
            .map(|i| Some(if i < positives { 1.0 } else { 0.0 }))
            .collect();
        Table::new(vec![
            Column::dense("age", (0..rows).map(|i| 20.0 + (i % 40) as f64).collect()),
            Column::dense("salary", (0..rows).map(|i| 50_000.0 + i as f64).collect()),
            Column::dense("tenure", (0..rows).map(|i| (i % 7) as f64).collect()),
            Column::numeric("is_anomaly", labels),
        ])
        .unwrap()
    }

    #[test]
    fn test_ready_dataset() {
        let profile = profile_table(&labeled_table(200, 60));
        assert_eq!(profile.row_count, 200);
        assert_eq!(profile.numeric_features.len(), 3);
        let target = profile.target.as_ref().unwrap();
        assert_eq!(target.column, "is_anomaly");
        assert_eq!(target.distribution.len(), 2);
        assert_eq!(profile.readiness_score, 5);
        assert!(profile.is_ready());
        assert!(profile.recommendations.is_empty());
    }

    #[test]
    fn test_imbalanced_target() {
        let profile = profile_table(&labeled_table(200, 10));
        let ratio = profile.target.as_ref().unwrap().imbalance_ratio.unwrap();
        assert_eq!(ratio, 19.0);
        assert_eq!(profile.readiness_score, 4);
        assert!(profile
            .recommendations
            .iter()
            .any(|r| r.contains("imbalanced")));
    }

    #[test]
    fn test_missing_duplicates_and_constants() {
        let table = Table::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(1.0), None, Some(1.0)]),
            Column::text(
                "name",
                vec![
                    Some("a".to_string()),
                    Some("a".to_string()),
                    Some("b".to_string()),
                    Some("c".to_string()),
                ],
            ),
        ])
        .unwrap();
        let profile = profile_table(&table);
        assert_eq!(profile.missing_cells, 1);
        assert_eq!(profile.duplicate_rows, 1);
        assert_eq!(profile.constant_columns, vec!["x".to_string()]);
        assert!(profile.target.is_none());
        // no target, few rows, 12.5% missing; only balance and features pass
        assert_eq!(profile.readiness_score, 2);
        assert_eq!(profile.issues().len(), 3);
    }

    #[test]
    fn test_numeric_summary() {
        let summary = numeric_summary(&[Some(2.0), None, Some(4.0), Some(6.0)]).unwrap();
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 6.0);
        assert_eq!(summary.mean, 4.0);
        assert_eq!(summary.std, 2.0);
        assert!(numeric_summary(&[None]).is_none());
    }
}
