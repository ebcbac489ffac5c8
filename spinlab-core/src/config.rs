//! Analysis configuration: gates, thresholds, arc size, prediction limits.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [thresholds]
//! cluster = 0.40
//!
//! [cluster]
//! arc_size = 7
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::ConfigHash;
use crate::status::Gate;
use crate::wheel::ArcSize;

/// Errors from loading or validating an `AnalysisConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sample-size gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Below this every stage reports insufficient data.
    pub min_spins: usize,
    /// Trend and cluster results below this carry a low-confidence advisory.
    pub low_confidence_spins: usize,
    /// Bias results below this carry a low-confidence advisory.
    pub bias_low_confidence_spins: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_spins: 5,
            low_confidence_spins: 20,
            bias_low_confidence_spins: 30,
        }
    }
}

impl GateConfig {
    pub fn trend(&self) -> Gate {
        Gate::new(self.min_spins, self.low_confidence_spins)
    }

    pub fn pattern(&self) -> Gate {
        Gate::minimum_only(self.min_spins)
    }

    pub fn bias(&self) -> Gate {
        Gate::new(self.min_spins, self.bias_low_confidence_spins)
    }

    pub fn cluster(&self) -> Gate {
        Gate::new(self.min_spins, self.low_confidence_spins)
    }
}

/// Percent-deviation thresholds (fractions, 0.5 = 50%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub hot_number: f64,
    pub category: f64,
    pub section: f64,
    pub cluster: f64,
    /// Chi-squared critical value for df = 36 at p = 0.05.
    pub chi_squared_critical: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hot_number: 0.50,
            category: 0.25,
            section: 0.25,
            cluster: 0.30,
            chi_squared_critical: 51.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub arc_size: ArcSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub max_numbers: usize,
    /// Limit for dozen, column, section, half and parity axes.
    pub max_per_category: usize,
    /// Shortest streak that nominates its value.
    pub min_streak: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_numbers: 5,
            max_per_category: 1,
            min_streak: 3,
        }
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub gates: GateConfig,
    pub thresholds: ThresholdConfig,
    pub cluster: ClusterConfig,
    pub prediction: PredictionConfig,
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gates;
        if g.min_spins == 0 {
            return Err(ConfigError::Invalid("gates.min_spins must be at least 1".into()));
        }
        if g.low_confidence_spins < g.min_spins {
            return Err(ConfigError::Invalid(format!(
                "gates.low_confidence_spins ({}) is below gates.min_spins ({})",
                g.low_confidence_spins, g.min_spins
            )));
        }
        if g.bias_low_confidence_spins < g.min_spins {
            return Err(ConfigError::Invalid(format!(
                "gates.bias_low_confidence_spins ({}) is below gates.min_spins ({})",
                g.bias_low_confidence_spins, g.min_spins
            )));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("hot_number", t.hot_number),
            ("category", t.category),
            ("section", t.section),
            ("cluster", t.cluster),
            ("chi_squared_critical", t.chi_squared_critical),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "thresholds.{name} must be a positive number, got {value}"
                )));
            }
        }

        let p = &self.prediction;
        if p.max_numbers == 0 || p.max_per_category == 0 {
            return Err(ConfigError::Invalid(
                "prediction limits must be at least 1".into(),
            ));
        }
        if p.min_streak < 2 {
            return Err(ConfigError::Invalid(format!(
                "prediction.min_streak must be at least 2, got {}",
                p.min_streak
            )));
        }
        Ok(())
    }

    /// Deterministic hash of every setting.
    ///
    /// Counts are encoded as little-endian `u64`, then `min_streak`, then the
    /// thresholds by their bit pattern.
    pub fn config_hash(&self) -> ConfigHash {
        // Exhaustive patterns: a new field does not compile until it is hashed.
        let AnalysisConfig {
            gates:
                GateConfig {
                    min_spins,
                    low_confidence_spins,
                    bias_low_confidence_spins,
                },
            thresholds:
                ThresholdConfig {
                    hot_number,
                    category,
                    section,
                    cluster,
                    chi_squared_critical,
                },
            cluster: ClusterConfig { arc_size },
            prediction:
                PredictionConfig {
                    max_numbers,
                    max_per_category,
                    min_streak,
                },
        } = self;

        let mut bytes = Vec::with_capacity(96);
        for count in [
            *min_spins,
            *low_confidence_spins,
            *bias_low_confidence_spins,
            arc_size.get(),
            *max_numbers,
            *max_per_category,
        ] {
            bytes.extend_from_slice(&(count as u64).to_le_bytes());
        }
        bytes.extend_from_slice(&min_streak.to_le_bytes());
        for threshold in [hot_number, category, section, cluster, chi_squared_critical] {
            bytes.extend_from_slice(&threshold.to_bits().to_le_bytes());
        }
        ConfigHash::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gates.min_spins, 5);
        assert_eq!(config.thresholds.chi_squared_critical, 51.0);
        assert_eq!(config.cluster.arc_size.get(), 5);
        assert_eq!(config.prediction.max_numbers, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            [thresholds]
            cluster = 0.4

            [cluster]
            arc_size = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.cluster, 0.4);
        assert_eq!(config.thresholds.hot_number, 0.5);
        assert_eq!(config.cluster.arc_size.get(), 7);
        assert_eq!(config.gates, GateConfig::default());
    }

    #[test]
    fn even_arc_size_rejected_at_parse() {
        let err = AnalysisConfig::from_toml("[cluster]\narc_size = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_gates_rejected() {
        let err = AnalysisConfig::from_toml(
            "[gates]\nmin_spins = 10\nlow_confidence_spins = 5\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_positive_threshold_rejected() {
        let mut config = AnalysisConfig::default();
        config.thresholds.category = 0.0;
        assert!(config.validate().is_err());
        config.thresholds.category = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = AnalysisConfig::default();
        config.prediction.max_per_category = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_hash_covers_every_field() {
        let base = AnalysisConfig::default().config_hash();
        let edits: [fn(&mut AnalysisConfig); 14] = [
            |c| c.gates.min_spins = 6,
            |c| c.gates.low_confidence_spins = 21,
            |c| c.gates.bias_low_confidence_spins = 31,
            |c| c.thresholds.hot_number = 0.6,
            |c| c.thresholds.category = 0.3,
            |c| c.thresholds.section = 0.3,
            |c| c.thresholds.cluster = 0.4,
            |c| c.thresholds.chi_squared_critical = 52.0,
            |c| c.cluster.arc_size = ArcSize::new(7).unwrap(),
            |c| c.prediction.max_numbers = 6,
            |c| c.prediction.max_per_category = 2,
            |c| c.prediction.min_streak = 4,
            |c| c.thresholds.hot_number = 0.25,
            |c| c.gates.min_spins = 1,
        ];
        let mut seen = std::collections::HashSet::new();
        for edit in edits {
            let mut config = AnalysisConfig::default();
            edit(&mut config);
            let hash = config.config_hash();
            assert_ne!(hash, base);
            assert!(seen.insert(hash), "two edits hashed alike");
        }
    }

    #[test]
    fn config_hash_tracks_settings() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());
        b.prediction.max_numbers = 3;
        assert_ne!(a.config_hash(), b.config_hash());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        std::fs::write(&path, "[prediction]\nmax_numbers = 3\n").unwrap();
        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config.prediction.max_numbers, 3);

        let missing = AnalysisConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
