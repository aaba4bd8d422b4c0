// Subcommand handlers

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use poisonproof_core::{profile_table, DetectionConfig};
use poisonproof_ingest::{
    load_csv_path, IngestConfig, IngestResult, ScanReport, Scanner, SyntheticDataset,
};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::output::{self, render_profile, render_scan, OutputStyle};

/// Explicit file if given, else the config hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    match path {
        Some(path) => {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            DetectionConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => DetectionConfig::load_with_hierarchy().context("failed to load config"),
    }
}

/// Explicit upload limits file if given, else the config hierarchy.
pub fn load_ingest_config(path: Option<&Path>) -> Result<IngestConfig> {
    match path {
        Some(path) => {
            if !path.is_file() {
                bail!("ingest config file not found: {}", path.display());
            }
            IngestConfig::from_file(path)
                .with_context(|| format!("failed to load ingest config {}", path.display()))
        }
        None => IngestConfig::load_with_hierarchy().context("failed to load ingest config"),
    }
}

/// Per-invocation scan outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub scanned: usize,
    pub failed: usize,
}

/// Scan every path independently, in parallel, reporting in input order.
///
/// A failing file is reported on stderr and counted; the others still print.
pub fn run_scan<W: Write>(
    paths: &[PathBuf],
    ingest: &IngestConfig,
    config: &DetectionConfig,
    format: OutputFormat,
    style: &OutputStyle,
    out: &mut W,
) -> Result<ScanSummary> {
    let scanner = Scanner::new(ingest.clone(), config)?;

    let outcomes: Vec<(&PathBuf, IngestResult<ScanReport>)> = paths
        .par_iter()
        .map(|path| (path, scanner.scan_path(path)))
        .collect();

    let mut summary = ScanSummary::default();
    let mut reports = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                summary.scanned += 1;
                reports.push(report);
            }
            Err(e) => {
                summary.failed += 1;
                warn!(path = %path.display(), error = %e, "scan failed");
                output::print_error(&format!("{}: {}", path.display(), e));
            }
        }
    }

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for report in &reports {
                write!(out, "{}", render_scan(report, style))?;
            }
        }
    }

    info!(scanned = summary.scanned, failed = summary.failed, "scan finished");
    Ok(summary)
}

pub fn run_profile<W: Write>(
    path: &Path,
    format: OutputFormat,
    style: &OutputStyle,
    out: &mut W,
) -> Result<()> {
    let table = load_csv_path(path).with_context(|| format!("failed to read {}", path.display()))?;
    let profile = profile_table(&table);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &profile)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            write!(out, "{}", render_profile(&name, &profile, style))?;
        }
    }
    Ok(())
}

pub fn run_generate<W: Write>(
    rows: usize,
    anomalies: usize,
    seed: u64,
    output: &Path,
    style: &OutputStyle,
    out: &mut W,
) -> Result<SyntheticDataset> {
    let dataset = SyntheticDataset::generate(rows, anomalies, seed)?;
    let file = std::fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    dataset.write_csv(file)?;

    writeln!(
        out,
        "{}",
        style.success(&format!(
            "wrote {} rows with {} planted anomalies to {}",
            rows,
            dataset.injected_rows.len(),
            output.display()
        ))
    )?;
    let preview: Vec<String> = dataset
        .injected_rows
        .iter()
        .take(10)
        .map(|r| (r + 1).to_string())
        .collect();
    writeln!(out, "  anomalous rows (1-based): {}", preview.join(", "))?;
    if dataset.injected_rows.len() > preview.len() {
        writeln!(out, "  ... and {} more", dataset.injected_rows.len() - preview.len())?;
    }
    Ok(dataset)
}

pub fn run_config<W: Write>(config: &DetectionConfig, out: &mut W) -> Result<()> {
    write!(out, "{}", config.to_yaml()?)?;
    Ok(())
}
