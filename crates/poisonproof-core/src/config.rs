//! Detection thresholds.
//!
//! A single immutable [`DetectionConfig`] is passed into each detector call.
//! Every field has a default, so YAML files only need to name the values they
//! override.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{DetectionError, DetectionResult};

/// Robust z-score above which a cell is flagged.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.5;
/// Robust z-score above which a row is rated High.
pub const DEFAULT_HIGH_Z_THRESHOLD: f64 = 5.0;
/// Tukey fence multiplier.
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;
/// Maximum number of tabular findings returned.
pub const DEFAULT_MAX_FINDINGS: usize = 50;
/// Mean ELA difference above which an image is flagged as manipulated.
pub const DEFAULT_ELA_MEAN_THRESHOLD: f64 = 12.0;
/// Mean ELA difference above which a manipulation finding is rated High.
pub const DEFAULT_ELA_HIGH_THRESHOLD: f64 = 20.0;
/// Gradient-magnitude variance below which an image is considered blurred.
pub const DEFAULT_BLUR_VARIANCE_THRESHOLD: f64 = 25.0;
/// Luminance range below which an image is considered washed out.
pub const DEFAULT_DYNAMIC_RANGE_THRESHOLD: f64 = 30.0;
/// JPEG quality used when re-encoding for error level analysis.
pub const DEFAULT_ELA_QUALITY: u8 = 90;

/// Complete detection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Tabular detector thresholds
    pub tabular: TabularConfig,
    /// Image detector thresholds
    pub image: ImageConfig,
}

/// Tabular detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// |robust z| above this flags a cell
    pub z_threshold: f64,
    /// |robust z| above this makes a row High severity
    pub high_z_threshold: f64,
    /// Multiplier applied to the IQR when building fences
    pub iqr_factor: f64,
    /// Findings beyond this count are dropped after ranking
    pub max_findings: usize,
}

/// Image detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub ela_mean_threshold: f64,
    pub ela_high_threshold: f64,
    /// Gradient variance below this is flagged
    pub blur_variance_threshold: f64,
    /// Luminance range below this is flagged
    pub dynamic_range_threshold: f64,
    /// JPEG quality (1-100) for the ELA re-encode
    pub ela_quality: u8,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            high_z_threshold: DEFAULT_HIGH_Z_THRESHOLD,
            iqr_factor: DEFAULT_IQR_FACTOR,
            max_findings: DEFAULT_MAX_FINDINGS,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            ela_mean_threshold: DEFAULT_ELA_MEAN_THRESHOLD,
            ela_high_threshold: DEFAULT_ELA_HIGH_THRESHOLD,
            blur_variance_threshold: DEFAULT_BLUR_VARIANCE_THRESHOLD,
            dynamic_range_threshold: DEFAULT_DYNAMIC_RANGE_THRESHOLD,
            ela_quality: DEFAULT_ELA_QUALITY,
        }
    }
}

fn require_positive(name: &str, value: f64) -> DetectionResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DetectionError::InvalidConfig(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

impl TabularConfig {
    /// Check that thresholds are usable.
    pub fn validate(&self) -> DetectionResult<()> {
        require_positive("z_threshold", self.z_threshold)?;
        require_positive("high_z_threshold", self.high_z_threshold)?;
        require_positive("iqr_factor", self.iqr_factor)?;
        if self.high_z_threshold < self.z_threshold {
            return Err(DetectionError::InvalidConfig(format!(
                "high_z_threshold ({}) must not be below z_threshold ({})",
                self.high_z_threshold, self.z_threshold
            )));
        }
        if self.max_findings == 0 {
            return Err(DetectionError::InvalidConfig(
                "max_findings must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl ImageConfig {
    /// Check that thresholds are usable.
    pub fn validate(&self) -> DetectionResult<()> {
        require_positive("ela_mean_threshold", self.ela_mean_threshold)?;
        require_positive("ela_high_threshold", self.ela_high_threshold)?;
        require_positive("blur_variance_threshold", self.blur_variance_threshold)?;
        require_positive("dynamic_range_threshold", self.dynamic_range_threshold)?;
        if self.ela_high_threshold < self.ela_mean_threshold {
            return Err(DetectionError::InvalidConfig(format!(
                "ela_high_threshold ({}) must not be below ela_mean_threshold ({})",
                self.ela_high_threshold, self.ela_mean_threshold
            )));
        }
        if !(1..=100).contains(&self.ela_quality) {
            return Err(DetectionError::InvalidConfig(format!(
                "ela_quality must be within 1..=100, got {}",
                self.ela_quality
            )));
        }
        Ok(())
    }
}

impl DetectionConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Returns
    ///
    /// Configuration loaded from file, or default if file doesn't exist
    pub fn from_file(path: &Path) -> DetectionResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with hierarchy support.
    ///
    /// Configuration hierarchy (highest to lowest priority):
    /// 1. Project-level config (config/detection.yaml)
    /// 2. User-level config (~/.poisonproof/config/detection.yaml)
    /// 3. Built-in defaults
    ///
    /// Layers merge field by field; a field no file names keeps the value of
    /// the layer below.
    pub fn load_with_hierarchy() -> DetectionResult<Self> {
        let config: Self = load_layered(&config_hierarchy("detection.yaml"))?;
        config.validate()?;
        Ok(config)
    }

    /// Check both sections.
    pub fn validate(&self) -> DetectionResult<()> {
        self.tabular.validate()?;
        self.image.validate()
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> DetectionResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// User-level then project-level locations of a config file, lowest
/// priority first.
pub fn config_hierarchy(file_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(user_home) = std::env::var("HOME") {
        paths.push(
            PathBuf::from(user_home)
                .join(".poisonproof")
                .join("config")
                .join(file_name),
        );
    }
    paths.push(PathBuf::from("config").join(file_name));
    paths
}

/// Recursively merge `overlay` into `base`. Mappings merge key by key, any
/// other value replaces; a null overlay (empty file) changes nothing.
pub fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Deserialize the merge of every existing YAML file in `paths`, later files
/// taking precedence. Missing files are skipped; fields no file names take
/// their serde defaults.
pub fn load_layered<T: DeserializeOwned>(paths: &[PathBuf]) -> DetectionResult<T> {
    let mut merged = Value::Mapping(Default::default());
    for path in paths {
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(path)?;
        let layer: Value = serde_yaml::from_str(&content)?;
        merge_yaml(&mut merged, layer);
    }
    Ok(serde_yaml::from_value(merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.tabular.z_threshold, 3.5);
        assert_eq!(config.tabular.high_z_threshold, 5.0);
        assert_eq!(config.tabular.iqr_factor, 1.5);
        assert_eq!(config.tabular.max_findings, 50);
        assert_eq!(config.image.ela_mean_threshold, 12.0);
        assert_eq!(config.image.ela_high_threshold, 20.0);
        assert_eq!(config.image.blur_variance_threshold, 25.0);
        assert_eq!(config.image.dynamic_range_threshold, 30.0);
        assert_eq!(config.image.ela_quality, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "tabular:\n  z_threshold: 3.0\n";
        let config: DetectionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tabular.z_threshold, 3.0);
        assert_eq!(config.tabular.max_findings, 50);
        assert_eq!(config.image, ImageConfig::default());
    }

    #[test]
    fn test_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DetectionConfig::from_file(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_from_file_rejects_invalid_thresholds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tabular:\n  z_threshold: 6.0\n  high_z_threshold: 4.0").unwrap();
        let err = DetectionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DetectionError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let tabular = TabularConfig {
            max_findings: 0,
            ..TabularConfig::default()
        };
        assert!(tabular.validate().is_err());

        let tabular = TabularConfig {
            z_threshold: f64::NAN,
            ..TabularConfig::default()
        };
        assert!(tabular.validate().is_err());

        let image = ImageConfig {
            ela_quality: 0,
            ..ImageConfig::default()
        };
        assert!(image.validate().is_err());

        let image = ImageConfig {
            ela_high_threshold: 5.0,
            ..ImageConfig::default()
        };
        assert!(image.validate().is_err());
    }

    #[test]
    fn test_layers_merge_by_section() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        std::fs::write(&user, "image:\n  ela_quality: 50\n").unwrap();
        std::fs::write(&project, "tabular:\n  z_threshold: 4.0\n").unwrap();

        let config: DetectionConfig =
            load_layered(&[user, dir.path().join("absent.yaml"), project]).unwrap();
        assert_eq!(config.tabular.z_threshold, 4.0);
        assert_eq!(config.image.ela_quality, 50);
        assert_eq!(config.image.ela_mean_threshold, 12.0);
    }

    #[test]
    fn test_layers_merge_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        std::fs::write(&user, "tabular:\n  z_threshold: 4.0\n  max_findings: 10\n").unwrap();
        std::fs::write(&project, "tabular:\n  max_findings: 20\n").unwrap();

        let config: DetectionConfig = load_layered(&[user, project]).unwrap();
        assert_eq!(config.tabular.z_threshold, 4.0);
        assert_eq!(config.tabular.max_findings, 20);
        assert_eq!(config.tabular.high_z_threshold, 5.0);
    }

    #[test]
    fn test_empty_layer_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        std::fs::write(&user, "image:\n  ela_quality: 75\n").unwrap();
        std::fs::write(&project, "").unwrap();

        let config: DetectionConfig = load_layered(&[user, project]).unwrap();
        assert_eq!(config.image.ela_quality, 75);
    }

    #[test]
    fn test_no_layers_is_default() {
        let config: DetectionConfig = load_layered(&[]).unwrap();
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_hierarchy_ends_with_project_file() {
        let paths = config_hierarchy("detection.yaml");
        assert_eq!(paths.last(), Some(&PathBuf::from("config/detection.yaml")));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = DetectionConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: DetectionConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
