// Human-readable rendering of scan reports and profiles

use std::fmt::Write as _;
use std::io::IsTerminal;

use colored::Colorize;
use poisonproof_core::profile::MAX_READINESS_SCORE;
use poisonproof_core::{DatasetProfile, Severity};
use poisonproof_ingest::ScanReport;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    fn severity(&self, severity: Severity) -> String {
        let label = format!("{:<6}", severity.as_str());
        if !self.use_colors {
            return label;
        }
        match severity {
            Severity::High => label.red().bold().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.blue().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    let style = OutputStyle {
        use_colors: std::io::stderr().is_terminal(),
    };
    eprintln!("{}", style.error(msg));
}

/// Summary line plus one line per finding.
pub fn render_scan(report: &ScanReport, style: &OutputStyle) -> String {
    let result = &report.result;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({}, sha256 {})",
        style.heading(&report.file_name),
        report.kind,
        &result.file_hash[..result.file_hash.len().min(12)]
    );

    if result.is_clean() {
        let _ = writeln!(out, "  {}", style.success("no anomalies found"));
    } else {
        let distribution = result
            .severity_distribution
            .iter()
            .map(|(severity, count)| format!("{} {}", count, severity))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "  {} findings: {}",
            result.findings.len(),
            distribution
        );
        for finding in &result.findings {
            let _ = writeln!(
                out,
                "  {} {:>5.1}%  {:<11} {}",
                style.severity(finding.severity),
                finding.confidence * 100.0,
                finding.locator.to_string(),
                finding.description
            );
        }
    }

    for warning in &result.warnings {
        let _ = writeln!(out, "  {}", style.warning(warning));
    }
    out
}

/// Training-readiness report.
pub fn render_profile(name: &str, profile: &DatasetProfile, style: &OutputStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style.heading(&format!("Dataset: {}", name)));
    let _ = writeln!(
        out,
        "  Shape: {} rows x {} columns",
        profile.row_count, profile.column_count
    );
    let _ = writeln!(
        out,
        "  Features: {} numeric, {} text",
        profile.numeric_features.len(),
        profile.text_features.len()
    );

    match &profile.target {
        Some(target) => {
            let classes = target
                .distribution
                .iter()
                .map(|(class, count)| format!("{}={}", class, count))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  Target: {} ({})", target.column, classes);
            if let Some(ratio) = target.imbalance_ratio {
                let _ = writeln!(out, "  Class ratio: {:.1}:1", ratio);
            }
        }
        None => {
            let _ = writeln!(out, "  {}", style.warning("no target column found"));
        }
    }

    for issue in profile.issues() {
        let _ = writeln!(out, "  {}", style.warning(&issue));
    }

    let verdict = format!(
        "Readiness: {}/{}",
        profile.readiness_score, MAX_READINESS_SCORE
    );
    if profile.is_ready() {
        let _ = writeln!(out, "  {}", style.success(&verdict));
    } else {
        let _ = writeln!(out, "  {}", style.error(&verdict));
    }

    if !profile.recommendations.is_empty() {
        let _ = writeln!(out, "  Recommendations:");
        for recommendation in &profile.recommendations {
            let _ = writeln!(out, "    - {}", recommendation);
        }
    }
    out
}
