//! Scanner tests against real files on disk.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat as RasterFormat, Rgb, RgbImage};
use poisonproof_core::{DetectionConfig, FindingKind, TabularConfig};
use poisonproof_ingest::{
    hash_file, IngestConfig, IngestError, Scanner, SyntheticDataset,
};
use tempfile::TempDir;

fn write_png(dir: &TempDir, name: &str, image: RgbImage) -> std::path::PathBuf {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), RasterFormat::Png)
        .unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_scan_flat_png() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "flat.png", RgbImage::from_pixel(64, 48, Rgb([90, 90, 90])));

    let report = Scanner::with_defaults().unwrap().scan_path(&path).unwrap();
    assert_eq!(report.file_name, "flat.png");
    assert_eq!(report.kind, "png");
    assert_eq!(report.result.file_hash, hash_file(&path).unwrap());
    assert_eq!(report.result.findings.len(), 1);
    assert_eq!(report.result.findings[0].kind, FindingKind::ImageQuality);
}

#[test]
fn test_scan_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.csv");
    let dataset = SyntheticDataset::generate(300, 10, 5).unwrap();
    dataset.write_csv(std::fs::File::create(&path).unwrap()).unwrap();

    let scanner = Scanner::with_defaults().unwrap();
    let first = scanner.scan_path(&path).unwrap();
    let second = scanner.scan_path(&path).unwrap();
    assert_eq!(first, second);
    assert!(!first.result.is_clean());
}

#[test]
fn test_synthetic_injections_are_recovered() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("employees.csv");
    let dataset = SyntheticDataset::generate(1000, 50, 42).unwrap();
    dataset.write_csv(std::fs::File::create(&path).unwrap()).unwrap();

    let detection = DetectionConfig {
        tabular: TabularConfig {
            max_findings: 1000,
            ..TabularConfig::default()
        },
        ..DetectionConfig::default()
    };
    let scanner = Scanner::new(IngestConfig::default(), &detection).unwrap();
    let report = scanner.scan_path(&path).unwrap();

    let flagged: Vec<usize> = report
        .result
        .findings
        .iter()
        .filter_map(|f| f.row())
        .collect();
    for row in &dataset.injected_rows {
        assert!(flagged.contains(row), "injected row {} was not flagged", row);
    }
}

#[test]
fn test_rejects_disallowed_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weights.pkl");
    std::fs::write(&path, b"\x80\x04").unwrap();

    let err = Scanner::with_defaults().unwrap().scan_path(&path).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFileType(_, _)));
}

#[test]
fn test_restricted_allow_list() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "a.png", RgbImage::from_pixel(8, 8, Rgb([1, 2, 3])));
    let ingest = IngestConfig {
        allowed_extensions: vec!["csv".to_string()],
        ..IngestConfig::default()
    };
    let scanner = Scanner::new(ingest, &DetectionConfig::default()).unwrap();
    assert!(scanner.scan_path(&path).is_err());
}
