//! CSV decoding into a typed [`Table`].

use std::io::Read;
use std::path::Path;

use poisonproof_core::{Column, Table};
use tracing::debug;

use crate::error::IngestResult;

/// Cell spellings treated as missing, compared case-insensitively.
const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

/// Build a column, numeric iff every present cell parses as a float.
fn infer_column(name: String, cells: Vec<String>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                Some(None)
            } else {
                cell.parse::<f64>().ok().map(Some)
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::numeric(name, values),
        None => Column::text(
            name,
            cells
                .into_iter()
                .map(|c| if is_missing(&c) { None } else { Some(c) })
                .collect(),
        ),
    }
}

/// Decode CSV with a header row.
pub fn load_csv<R: Read>(reader: R) -> IngestResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    let table = Table::new(columns)?;
    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        numeric = table.numeric_columns().count(),
        "csv loaded"
    );
    Ok(table)
}

/// Decode a CSV file.
pub fn load_csv_path(path: &Path) -> IngestResult<Table> {
    load_csv(std::fs::File::open(path)?)
}
