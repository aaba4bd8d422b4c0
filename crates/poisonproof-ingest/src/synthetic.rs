//! Seeded generator of employee-style datasets with injected anomalies.
//!
//! Useful for demos and for checking that the tabular detector recovers
//! planted rows. Injected values lie well beyond the IQR fences of the
//! baseline distributions.

use std::io::Write;

use poisonproof_core::{Column, ColumnValues, DetectionResult, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::IngestResult;

const DEPARTMENTS: [&str; 10] = [
    "Engineering",
    "Marketing",
    "HR",
    "Sales",
    "Management",
    "Finance",
    "Operations",
    "IT",
    "Legal",
    "Research",
];

const FIRST_NAMES: [&str; 12] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "David",
    "Susan", "Daniel", "Karen",
];

const LAST_NAMES: [&str; 12] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Lopez",
    "Wilson", "Taylor", "Moore",
];

/// Kind of planted anomaly, rotated in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    ExtremeSalary,
    NegativeSalary,
    ImpossiblePerformance,
    ExcessiveOvertime,
    LowHealthScore,
}

impl AnomalyKind {
    const ROTATION: [AnomalyKind; 5] = [
        AnomalyKind::ExtremeSalary,
        AnomalyKind::NegativeSalary,
        AnomalyKind::ImpossiblePerformance,
        AnomalyKind::ExcessiveOvertime,
        AnomalyKind::LowHealthScore,
    ];

    /// Column the anomaly is planted in.
    pub fn column(&self) -> &'static str {
        match self {
            AnomalyKind::ExtremeSalary | AnomalyKind::NegativeSalary => "salary",
            AnomalyKind::ImpossiblePerformance => "performance_score",
            AnomalyKind::ExcessiveOvertime => "overtime_hours",
            AnomalyKind::LowHealthScore => "health_score",
        }
    }
}

#[derive(Default)]
struct Rows {
    employee_id: Vec<Option<String>>,
    name: Vec<Option<String>>,
    department: Vec<Option<String>>,
    age: Vec<f64>,
    salary: Vec<f64>,
    years_experience: Vec<f64>,
    performance_score: Vec<f64>,
    overtime_hours: Vec<f64>,
    satisfaction_rating: Vec<f64>,
    health_score: Vec<f64>,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// A generated table and the rows that were tampered with.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub table: Table,
    /// Sorted, distinct
    pub injected_rows: Vec<usize>,
    /// `(row, kind)` in injection order
    pub injections: Vec<(usize, AnomalyKind)>,
}

impl SyntheticDataset {
    /// Generate `rows` employees and tamper with `injected` of them.
    ///
    /// `injected` is capped at `rows`. The same seed always yields the same data.
    pub fn generate(rows: usize, injected: usize, seed: u64) -> DetectionResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = Rows::default();

        for i in 0..rows {
            let age = rng.gen_range(22..=65) as f64;
            let years_experience = (age - 22.0 + rng.gen_range(-3..=3) as f64).max(0.0);
            let performance =
                round1((6.0 + years_experience * 0.08 + rng.gen_range(-1.0..1.0)).clamp(5.0, 10.0));
            let salary = ((45_000.0 + years_experience * 1_500.0 + performance * 2_000.0)
                * rng.gen_range(0.9..1.1))
            .round();

            data.employee_id.push(Some(format!("E{:04}", i + 1)));
            data.name.push(Some(format!(
                "{} {}",
                FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex"),
                LAST_NAMES.choose(&mut rng).copied().unwrap_or("Doe")
            )));
            data.department.push(DEPARTMENTS.choose(&mut rng).map(|d| d.to_string()));
            data.age.push(age);
            data.salary.push(salary);
            data.years_experience.push(years_experience);
            data.performance_score.push(performance);
            data.overtime_hours.push(rng.gen_range(0..=80) as f64);
            data.satisfaction_rating
                .push(round1((performance + rng.gen_range(-0.5..0.5)).clamp(3.0, 10.0)));
            data.health_score.push(rng.gen_range(65..=100) as f64);
        }

        let count = injected.min(rows);
        let mut picked = rand::seq::index::sample(&mut rng, rows, count).into_vec();
        let mut injections = Vec::with_capacity(count);
        for (i, &row) in picked.iter().enumerate() {
            let kind = AnomalyKind::ROTATION[i % AnomalyKind::ROTATION.len()];
            match kind {
                AnomalyKind::ExtremeSalary => {
                    data.salary[row] = rng.gen_range(500_000..=2_000_000) as f64
                }
                AnomalyKind::NegativeSalary => {
                    data.salary[row] = rng.gen_range(-50_000..=-10_000) as f64
                }
                AnomalyKind::ImpossiblePerformance => {
                    data.performance_score[row] = round1(rng.gen_range(15.0..40.0))
                }
                AnomalyKind::ExcessiveOvertime => {
                    data.overtime_hours[row] = rng.gen_range(150..=300) as f64
                }
                AnomalyKind::LowHealthScore => {
                    data.health_score[row] = rng.gen_range(0..=20) as f64
                }
            }
            injections.push((row, kind));
        }
        picked.sort_unstable();

        let table = Table::new(vec![
            Column::text("employee_id", data.employee_id),
            Column::text("name", data.name),
            Column::dense("age", data.age),
            Column::dense("salary", data.salary),
            Column::text("department", data.department),
            Column::dense("years_experience", data.years_experience),
            Column::dense("performance_score", data.performance_score),
            Column::dense("overtime_hours", data.overtime_hours),
            Column::dense("satisfaction_rating", data.satisfaction_rating),
            Column::dense("health_score", data.health_score),
        ])?;

        Ok(Self {
            table,
            injected_rows: picked,
            injections,
        })
    }

    /// Serialize the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> IngestResult<()> {
        write_table_csv(&self.table, writer)
    }
}

fn render_cell(values: &ColumnValues, row: usize) -> String {
    match values {
        ColumnValues::Numeric(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
        ColumnValues::Text(v) => v[row].clone().unwrap_or_default(),
    }
}

/// Write any table as CSV; missing cells become empty fields.
pub fn write_table_csv<W: Write>(table: &Table, writer: W) -> IngestResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..table.row_count() {
        out.write_record(table.columns().iter().map(|c| render_cell(&c.values, row)))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_loader::load_csv;

    #[test]
    fn test_same_seed_same_data() {
        let a = SyntheticDataset::generate(200, 10, 7).unwrap();
        let b = SyntheticDataset::generate(200, 10, 7).unwrap();
        assert_eq!(a.table, b.table);
        assert_eq!(a.injected_rows, b.injected_rows);

        let c = SyntheticDataset::generate(200, 10, 8).unwrap();
        assert_ne!(a.table, c.table);
    }

    #[test]
    fn test_injection_count_and_rotation() {
        let dataset = SyntheticDataset::generate(100, 12, 1).unwrap();
        assert_eq!(dataset.injected_rows.len(), 12);
        assert!(dataset.injected_rows.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dataset.injections[0].1, AnomalyKind::ExtremeSalary);
        assert_eq!(dataset.injections[5].1, AnomalyKind::ExtremeSalary);
        assert_eq!(dataset.injections[4].1.column(), "health_score");
    }

    #[test]
    fn test_injected_capped_at_rows() {
        let dataset = SyntheticDataset::generate(5, 50, 3).unwrap();
        assert_eq!(dataset.injected_rows.len(), 5);
    }

    #[test]
    fn test_csv_roundtrip_keeps_types() {
        let dataset = SyntheticDataset::generate(50, 5, 11).unwrap();
        let mut buffer = Vec::new();
        dataset.write_csv(&mut buffer).unwrap();
        let table = load_csv(buffer.as_slice()).unwrap();
        assert_eq!(table.row_count(), 50);
        assert_eq!(table.numeric_columns().count(), 7);
        assert_eq!(table.numeric_series("salary").unwrap().present(),
            dataset.table.numeric_series("salary").unwrap().present());
    }
}
