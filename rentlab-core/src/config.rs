//! Analytics configuration.
//!
//! Stored as TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! windows = [7, 30, 90]
//! periods = [182, 365]
//! total_mean = "group_means"
//! locale = "pt"
//!
//! [decomposition]
//! iterations = 2
//! inner_iterations = 2
//! ```

use crate::analytics::labels::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How the Total row forms its mean-valued fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalMeanPolicy {
    /// Unweighted mean of the (rounded) per-group means.
    #[default]
    GroupMeans,
    /// Mean over every record in every group.
    RecordWeighted,
}

/// Tuning of the multi-seasonal decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Outer passes over all periods.
    pub iterations: usize,
    /// Inner loop passes of each single-period fit.
    pub inner_iterations: usize,
    /// Explicit cycle-subseries spans, one per period. `None` uses `7 + 4k`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_windows: Option<Vec<usize>>,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            iterations: 2,
            inner_iterations: 2,
            seasonal_windows: None,
        }
    }
}

/// Settings shared by every computation in one dashboard pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Calendar-day smoothing windows.
    pub windows: Vec<u32>,
    /// Seasonal periods in days.
    pub periods: Vec<usize>,
    pub total_mean: TotalMeanPolicy,
    pub locale: Locale,
    pub decomposition: DecompositionConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            windows: vec![7, 30, 90],
            periods: vec![182, 365],
            total_mean: TotalMeanPolicy::GroupMeans,
            locale: Locale::Pt,
            decomposition: DecompositionConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl AnalyticsConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.is_empty() {
            return Err(ConfigError::Invalid("at least one smoothing window is required".into()));
        }
        if let Some(w) = self.windows.iter().find(|w| **w == 0) {
            return Err(ConfigError::Invalid(format!("smoothing window {w} must be >= 1")));
        }
        if self.periods.is_empty() {
            return Err(ConfigError::Invalid("at least one seasonal period is required".into()));
        }
        if let Some(p) = self.periods.iter().find(|p| **p < 2) {
            return Err(ConfigError::Invalid(format!("seasonal period {p} must be >= 2")));
        }
        if self.decomposition.iterations == 0 || self.decomposition.inner_iterations == 0 {
            return Err(ConfigError::Invalid("decomposition iterations must be >= 1".into()));
        }
        if let Some(spans) = &self.decomposition.seasonal_windows {
            if spans.len() != self.periods.len() {
                return Err(ConfigError::Invalid(format!(
                    "{} seasonal windows given for {} periods",
                    spans.len(),
                    self.periods.len()
                )));
            }
            if let Some(s) = spans.iter().find(|s| **s < 3 || **s % 2 == 0) {
                return Err(ConfigError::Invalid(format!(
                    "seasonal window {s} must be odd and >= 3"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AnalyticsConfig::from_toml("").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.windows, vec![7, 30, 90]);
        assert_eq!(config.periods, vec![182, 365]);
        assert_eq!(config.total_mean, TotalMeanPolicy::GroupMeans);
    }

    #[test]
    fn parses_overrides() {
        let config = AnalyticsConfig::from_toml(
            r#"
            windows = [14]
            total_mean = "record_weighted"
            locale = "en"

            [decomposition]
            iterations = 3
            seasonal_windows = [13, 17]
            "#,
        )
        .unwrap();
        assert_eq!(config.windows, vec![14]);
        assert_eq!(config.total_mean, TotalMeanPolicy::RecordWeighted);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.decomposition.iterations, 3);
        assert_eq!(config.decomposition.inner_iterations, 2);
    }

    #[test]
    fn rejects_zero_window() {
        let err = AnalyticsConfig::from_toml("windows = [7, 0]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_even_seasonal_window() {
        let err = AnalyticsConfig::from_toml(
            "[decomposition]\nseasonal_windows = [12, 15]",
        )
        .unwrap_err();
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn rejects_mismatched_seasonal_windows() {
        let err = AnalyticsConfig::from_toml(
            "[decomposition]\nseasonal_windows = [11]",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let config = AnalyticsConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(AnalyticsConfig::from_toml(&text).unwrap(), config);
    }
}
