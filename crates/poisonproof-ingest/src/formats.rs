//! File type detection and upload validation.

use std::path::Path;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};

/// Raster formats accepted for image scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Detect image format from magic bytes.
    pub fn detect_from_bytes(bytes: &[u8]) -> IngestResult<Self> {
        if bytes.len() < 4 {
            return Err(IngestError::InvalidFile(
                "File too small to be a valid image".to_string(),
            ));
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]) {
            return Ok(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            return Ok(ImageFormat::Jpeg);
        }

        // GIF87a or GIF89a
        if bytes.starts_with(b"GIF") {
            return Ok(ImageFormat::Gif);
        }

        if bytes.starts_with(b"BM") {
            return Ok(ImageFormat::Bmp);
        }

        Err(IngestError::InvalidFile(
            "Unable to detect image format from file header".to_string(),
        ))
    }

    fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// Which detector a file goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Image(ImageFormat),
}

impl FileKind {
    /// Classify a file by its extension.
    pub fn from_path(path: &Path, config: &IngestConfig) -> IngestResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if !config.is_extension_allowed(extension) {
            return Err(IngestError::UnsupportedFileType(
                if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    extension.to_string()
                },
                config.allowed_extensions_string(),
            ));
        }

        if extension.eq_ignore_ascii_case("csv") {
            return Ok(FileKind::Csv);
        }

        ImageFormat::from_extension(extension)
            .map(FileKind::Image)
            .ok_or_else(|| {
                IngestError::UnsupportedFileType(
                    extension.to_string(),
                    config.allowed_extensions_string(),
                )
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Image(format) => format.as_str(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, FileKind::Image(_))
    }
}

/// Validate an upload's existence, size and type.
///
/// # Returns
///
/// The file kind if the upload is acceptable, error otherwise
pub fn validate_upload(path: &Path, config: &IngestConfig) -> IngestResult<FileKind> {
    if !path.exists() {
        return Err(IngestError::InvalidFile(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(IngestError::InvalidFile("Path is not a file".to_string()));
    }

    let kind = FileKind::from_path(path, config)?;

    let size = std::fs::metadata(path)?.len();
    if size == 0 {
        return Err(IngestError::EmptyFile(path.display().to_string()));
    }
    if size > config.max_file_size_bytes() {
        return Err(IngestError::FileTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: config.max_file_size_mb,
        });
    }

    Ok(kind)
}
