//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file passed with `--config`. Command-line flags take precedence.
//!
//! ```toml
//! # capture-npz.toml
//! [gagescope]
//! sampling_frequency = 1.0e8
//!
//! [evaluation]
//! deviation_threshold_ratio = 0.2
//! acceptance_ratio_threshold = 80.0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use capture_npz::converter::ConverterConfig;
use capture_npz::evaluate::EvaluationConfig;

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Gagescope conversion settings.
    #[serde(default)]
    pub gagescope: GagescopeConfig,

    /// Timestamp evaluation thresholds.
    #[serde(default)]
    pub evaluation: EvaluationSection,
}

/// Configuration for gagescope captures.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GagescopeConfig {
    /// Digitizer sampling frequency in Hz.
    pub sampling_frequency: Option<f64>,
}

/// Configuration for the evaluate command.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationSection {
    /// Allowed gap deviation as a fraction of the average gap.
    pub deviation_threshold_ratio: Option<f64>,

    /// Minimum percentage of space-correct shots.
    pub acceptance_ratio_threshold: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Converter settings, with `sampling_frequency` overriding the file.
    #[cfg_attr(not(feature = "hdf5"), allow(dead_code))]
    pub fn converter_config(&self, sampling_frequency: Option<f64>) -> ConverterConfig {
        let mut config = ConverterConfig::default();
        if let Some(f) = sampling_frequency.or(self.gagescope.sampling_frequency) {
            config.sampling_frequency = f;
        }
        config
    }

    /// Evaluation thresholds, with the given flags overriding the file.
    pub fn evaluation_config(
        &self,
        deviation_threshold_ratio: Option<f64>,
        acceptance_ratio_threshold: Option<f64>,
    ) -> EvaluationConfig {
        let mut config = EvaluationConfig::default();
        if let Some(ratio) = deviation_threshold_ratio.or(self.evaluation.deviation_threshold_ratio) {
            config.deviation_threshold_ratio = ratio;
        }
        if let Some(percent) =
            acceptance_ratio_threshold.or(self.evaluation.acceptance_ratio_threshold)
        {
            config.acceptance_ratio_threshold = percent;
        }
        config
    }
}
