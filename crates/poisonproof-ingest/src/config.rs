//! Upload limits.

use std::path::Path;

use poisonproof_core::{config_hierarchy, load_layered};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};

/// Upload validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum accepted file size in MB
    pub max_file_size_mb: u64,
    /// Accepted extensions, lowercase, without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 16,
            allowed_extensions: ["csv", "png", "jpg", "jpeg", "gif", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl IngestConfig {
    /// Load from a YAML file, or defaults if it doesn't exist.
    pub fn from_file(path: &Path) -> IngestResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `~/.poisonproof/config/ingest.yaml` and `config/ingest.yaml`
    /// over the defaults, field by field, project file last.
    pub fn load_with_hierarchy() -> IngestResult<Self> {
        let config: Self = load_layered(&config_hierarchy("ingest.yaml"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IngestResult<()> {
        if self.max_file_size_mb == 0 {
            return Err(IngestError::Config(
                "max_file_size_mb must be at least 1".to_string(),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(IngestError::Config(
                "allowed_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if an extension is accepted.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Accepted extensions as a comma-separated string.
    pub fn allowed_extensions_string(&self) -> String {
        self.allowed_extensions.join(", ")
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.max_file_size_mb, 16);
        assert!(config.is_extension_allowed("csv"));
        assert!(config.is_extension_allowed("PNG"));
        assert!(config.is_extension_allowed("bmp"));
        assert!(!config.is_extension_allowed("webp"));
        assert!(!config.is_extension_allowed("exe"));
    }

    #[test]
    fn test_partial_yaml() {
        let config: IngestConfig = serde_yaml::from_str("max_file_size_mb: 2").unwrap();
        assert_eq!(config.max_file_size_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.allowed_extensions.len(), 6);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.yaml");
        std::fs::write(&path, "max_file_size_mb: 1\nallowed_extensions: [csv]\n").unwrap();

        let config = IngestConfig::from_file(&path).unwrap();
        assert_eq!(config.max_file_size_bytes(), 1024 * 1024);
        assert!(config.is_extension_allowed("csv"));
        assert!(!config.is_extension_allowed("png"));
    }

    #[test]
    fn test_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig::from_file(&dir.path().join("ingest.yaml")).unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    fn test_from_file_rejects_zero_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.yaml");
        std::fs::write(&path, "max_file_size_mb: 0\n").unwrap();
        assert!(matches!(
            IngestConfig::from_file(&path),
            Err(IngestError::Config(_))
        ));
    }

    #[test]
    fn test_huge_limit_saturates() {
        let config = IngestConfig {
            max_file_size_mb: u64::MAX,
            ..IngestConfig::default()
        };
        assert_eq!(config.max_file_size_bytes(), u64::MAX);
    }
}
