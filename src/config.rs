//! Evaluation settings shared by the coordinate, commentary and line-level evaluators.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Unicode composition applied to line-level texts before harmonisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnicodeForm {
    Nfc,
    Nfd,
}

/// Configuration for an evaluation run.
///
/// Missing keys in a TOML file fall back to the defaults:
///
/// ```toml
/// word_overlap_threshold = 0.8
/// region_inclusion_threshold = 1.0
/// gt_suffix = ".gt.txt"
/// ocr_suffix = ".txt"
/// normalize = true
/// collect_diffs = true
/// parallel = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Minimal share of each word box that must overlap the other box (0.0 - 1.0, default: 0.8)
    pub word_overlap_threshold: f64,

    /// Minimal share of a word box lying inside a region to belong to it (default: 1.0, strict)
    pub region_inclusion_threshold: f64,

    /// Groundtruth file suffix for line-level evaluation (default: ".gt.txt")
    pub gt_suffix: String,

    /// Predicted file suffix for line-level evaluation (default: ".txt")
    pub ocr_suffix: String,

    /// Strip and harmonise line-level texts (default: true)
    pub normalize: bool,

    /// Optional composition applied when `normalize` is on (default: none)
    pub unicode_form: Option<UnicodeForm>,

    /// Build per-page diff layers during commentary evaluation (default: true)
    pub collect_diffs: bool,

    /// Sweep pages and files on the rayon pool (default: true)
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            word_overlap_threshold: 0.8,
            region_inclusion_threshold: 1.0,
            gt_suffix: ".gt.txt".to_string(),
            ocr_suffix: ".txt".to_string(),
            normalize: true,
            unicode_form: None,
            collect_diffs: true,
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EvalError::invalid_config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content).map_err(|e| match e {
            EvalError::InvalidConfig(message) => {
                EvalError::invalid_config(format!("{} ({})", message, path.as_ref().display()))
            }
            other => other,
        })
    }

    pub fn with_word_overlap_threshold(mut self, threshold: f64) -> Self {
        self.word_overlap_threshold = threshold;
        self
    }

    pub fn with_region_inclusion_threshold(mut self, threshold: f64) -> Self {
        self.region_inclusion_threshold = threshold;
        self
    }

    pub fn with_suffixes(mut self, gt_suffix: impl Into<String>, ocr_suffix: impl Into<String>) -> Self {
        self.gt_suffix = gt_suffix.into();
        self.ocr_suffix = ocr_suffix.into();
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_unicode_form(mut self, form: Option<UnicodeForm>) -> Self {
        self.unicode_form = form;
        self
    }

    pub fn with_collect_diffs(mut self, collect_diffs: bool) -> Self {
        self.collect_diffs = collect_diffs;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks threshold ranges and suffixes.
    pub fn validate(&self) -> Result<()> {
        check_threshold("word_overlap_threshold", self.word_overlap_threshold)?;
        check_threshold("region_inclusion_threshold", self.region_inclusion_threshold)?;
        if self.gt_suffix.is_empty() || self.ocr_suffix.is_empty() {
            return Err(EvalError::invalid_config("gt_suffix and ocr_suffix must not be empty"));
        }
        if self.gt_suffix == self.ocr_suffix {
            return Err(EvalError::invalid_config(format!(
                "gt_suffix and ocr_suffix must differ (both '{}')",
                self.gt_suffix
            )));
        }
        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    // NaN fails both comparisons
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(EvalError::invalid_config(format!("{} must lie in (0, 1], got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvaluationConfig::default();
        assert_eq!(config.word_overlap_threshold, 0.8);
        assert_eq!(config.region_inclusion_threshold, 1.0);
        assert_eq!(config.gt_suffix, ".gt.txt");
        assert_eq!(config.ocr_suffix, ".txt");
        assert!(config.normalize);
        assert!(config.unicode_form.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let config = EvaluationConfig::default().with_word_overlap_threshold(bad);
            assert!(matches!(config.validate(), Err(EvalError::InvalidConfig(_))), "{}", bad);
        }
        let config = EvaluationConfig::default().with_word_overlap_threshold(1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_identical_suffixes_rejected() {
        let config = EvaluationConfig::default().with_suffixes(".txt", ".txt");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EvaluationConfig::from_toml_str(
            r#"
            word_overlap_threshold = 0.6
            unicode_form = "nfc"
            "#,
        )
        .unwrap();
        assert_eq!(config.word_overlap_threshold, 0.6);
        assert_eq!(config.unicode_form, Some(UnicodeForm::Nfc));
        assert_eq!(config.gt_suffix, ".gt.txt");
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(EvaluationConfig::from_toml_str("word_overlap_threshold = 2.0").is_err());
        assert!(EvaluationConfig::from_toml_str("word_overlap_threshold = [").is_err());
    }

    #[test]
    fn test_file_error_names_path_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("eval.toml");
        std::fs::write(&path, "word_overlap_threshold = [").unwrap();

        let message = EvaluationConfig::from_toml_file(&path).unwrap_err().to_string();
        assert_eq!(message.matches("Invalid configuration").count(), 1);
        assert!(message.contains("Invalid TOML"));
        assert!(message.contains("eval.toml"));
    }
}
