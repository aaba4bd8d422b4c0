//! File ingestion in front of the poisonproof detectors.
//!
//! This crate provides:
//! - Upload validation (extension allow-list, size ceiling, empty files)
//! - SHA-256 hashing of original bytes
//! - CSV decoding with column type inference
//! - A [`Scanner`] that routes files to the tabular or image detector
//! - A seeded synthetic dataset generator with planted anomalies

pub mod config;
pub mod csv_loader;
pub mod error;
pub mod formats;
pub mod hashing;
pub mod scanner;
pub mod synthetic;

pub use config::IngestConfig;
pub use csv_loader::{load_csv, load_csv_path};
pub use error::{IngestError, IngestResult};
pub use formats::{validate_upload, FileKind, ImageFormat};
pub use hashing::{hash_bytes, hash_file};
pub use scanner::{ScanReport, Scanner};
pub use synthetic::{write_table_csv, AnomalyKind, SyntheticDataset};
