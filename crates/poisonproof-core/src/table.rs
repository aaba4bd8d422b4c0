//! Decoded tabular datasets.
//!
//! Column typing is resolved before the table reaches the detector: a column is
//! either numeric or text, and missing cells are `None` so they keep their row
//! position.

use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, DetectionResult};

/// Cell storage for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValues::Numeric(_) => "numeric",
            ColumnValues::Text(_) => "text",
        }
    }

    /// Whether the cell at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnValues::Numeric(v) => v.get(row).map_or(true, |c| c.is_none()),
            ColumnValues::Text(v) => v.get(row).map_or(true, |c| c.is_none()),
        }
    }

    /// Canonical string form of a cell, used for equality across rows.
    pub fn cell_key(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Numeric(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnValues::Text(v) => v.get(row).cloned().flatten(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    /// Numeric column without missing cells.
    pub fn dense(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::numeric(name, values.into_iter().map(Some).collect())
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    /// View this column as a numeric series.
    pub fn as_series(&self) -> DetectionResult<NumericSeries<'_>> {
        match &self.values {
            ColumnValues::Numeric(values) => Ok(NumericSeries {
                name: &self.name,
                values,
            }),
            other => Err(DetectionError::UnsupportedColumnType {
                column: self.name.clone(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

/// Ordered rows by named columns. All columns have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, rejecting ragged columns and duplicate names.
    pub fn new(columns: Vec<Column>) -> DetectionResult<Self> {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        for (i, column) in columns.iter().enumerate() {
            if column.values.len() != row_count {
                return Err(DetectionError::InvalidInput(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.values.len(),
                    row_count
                )));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DetectionError::InvalidInput(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric series for a named column.
    pub fn numeric_series(&self, name: &str) -> DetectionResult<NumericSeries<'_>> {
        self.column(name)
            .ok_or_else(|| DetectionError::InvalidInput(format!("no column named '{}'", name)))?
            .as_series()
    }

    /// Iterate over the numeric columns only.
    pub fn numeric_columns(&self) -> impl Iterator<Item = NumericSeries<'_>> {
        self.columns.iter().filter_map(|c| c.as_series().ok())
    }
}

/// Borrowed view of one numeric column.
#[derive(Debug, Clone, Copy)]
pub struct NumericSeries<'a> {
    name: &'a str,
    values: &'a [Option<f64>],
}

impl<'a> NumericSeries<'a> {
    pub fn new(name: &'a str, values: &'a [Option<f64>]) -> Self {
        Self { name, values }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present, finite values with their row positions.
    pub fn cells(&self) -> impl Iterator<Item = (usize, f64)> + 'a {
        let values: &'a [Option<f64>] = self.values;
        values
            .iter()
            .enumerate()
            .filter_map(|(row, v)| v.filter(|x| x.is_finite()).map(|x| (row, x)))
    }

    /// Present, finite values, for statistics.
    pub fn present(&self) -> Vec<f64> {
        self.cells().map(|(_, x)| x).collect()
    }

    /// Present but infinite or NaN values with their row positions.
    pub fn non_finite(&self) -> impl Iterator<Item = (usize, f64)> + 'a {
        let values: &'a [Option<f64>] = self.values;
        values
            .iter()
            .enumerate()
            .filter_map(|(row, v)| v.filter(|x| !x.is_finite()).map(|x| (row, x)))
    }
}
