//! Configuration management with file persistence
//!
//! ```toml
//! [scoring]
//! latency_penalty = 60.0
//! default_success_rate = 0.8
//!
//! [[capabilities]]
//! provider = "acme"
//! model = "acme-large"
//! strengths = ["summarization", "long_context"]
//! cost_per_unit = 3.0
//! avg_latency_ms = 1200
//! ```
//!
//! An empty `[[capabilities]]` table means the built-in catalog is used.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::routing::{Capability, CapabilityRegistry, ScoringConfig};

/// Switchyard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub capabilities: Vec<Capability>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SWITCHYARD_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("switchyard")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.scoring;

        let weights = [
            ("latency_penalty", s.latency_penalty),
            ("cost_penalty", s.cost_penalty),
            ("input_size_penalty", s.input_size_penalty),
            ("success_weight", s.success_weight),
            ("direct_match_bonus", s.direct_match_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("scoring.{} must be a non-negative number", name));
            }
        }
        if !s.base_score.is_finite() {
            return Err(anyhow!("scoring.base_score must be a finite number"));
        }
        if s.latency_headroom_divisor.is_nan() || s.latency_headroom_divisor <= 0.0 {
            return Err(anyhow!("scoring.latency_headroom_divisor must be positive"));
        }
        if !(0.0..=1.0).contains(&s.default_success_rate) {
            return Err(anyhow!("scoring.default_success_rate must be between 0.0 and 1.0"));
        }

        for (i, c) in self.capabilities.iter().enumerate() {
            if c.provider.trim().is_empty() || c.model.trim().is_empty() {
                return Err(anyhow!("capabilities[{}] needs both a provider and a model", i));
            }
            if !c.cost_per_unit.is_finite() || c.cost_per_unit < 0.0 {
                return Err(anyhow!(
                    "capabilities[{}] ({}): cost_per_unit must be non-negative",
                    i,
                    c.id()
                ));
            }
            if c.max_input_units == 0 || c.max_context_units == 0 {
                return Err(anyhow!(
                    "capabilities[{}] ({}): size limits must be positive",
                    i,
                    c.id()
                ));
            }
        }

        Ok(())
    }

    /// Build the capability registry this configuration describes
    pub fn registry(&self) -> crate::Result<CapabilityRegistry> {
        CapabilityRegistry::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::TaskCategory;

    #[test]
    fn test_empty_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scoring.base_score, 100.0);
    }

    #[test]
    fn test_partial_scoring_section() {
        let config = Config::from_toml_str(
            r#"
            [scoring]
            latency_penalty = 60.0
            default_success_rate = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.latency_penalty, 60.0);
        assert_eq!(config.scoring.default_success_rate, 0.5);
        assert_eq!(config.scoring.cost_penalty, 30.0);
    }

    #[test]
    fn test_capability_table() {
        let config = Config::from_toml_str(
            r#"
            [[capabilities]]
            provider = "acme"
            model = "acme-large"
            strengths = ["summarization", "long_context"]
            cost_per_unit = 3.0
            avg_latency_ms = 1200

            [[capabilities]]
            provider = "acme"
            model = "acme-small"
            strengths = ["fast_iteration"]
            "#,
        )
        .unwrap();

        assert_eq!(config.capabilities.len(), 2);
        let small = &config.capabilities[1];
        assert_eq!(small.avg_latency_ms, 1000);
        assert_eq!(small.max_input_units, 32_000);

        let registry = config.registry().unwrap();
        let models: Vec<_> = registry
            .candidates_for(TaskCategory::Summarization)
            .iter()
            .map(|c| c.model.clone())
            .collect();
        assert_eq!(models, vec!["acme-large", "acme-small"]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(Config::from_toml_str("[scoring]\nlatency_penalty = -1.0").is_err());
        assert!(Config::from_toml_str("[scoring]\ndefault_success_rate = 1.5").is_err());
        assert!(Config::from_toml_str("[scoring]\nlatency_headroom_divisor = 0.0").is_err());
        assert!(Config::from_toml_str("[[capabilities]]\nmodel = \"orphan\"").is_err());
        assert!(
            Config::from_toml_str(
                "[[capabilities]]\nprovider = \"acme\"\nmodel = \"m\"\ncost_per_unit = -2.0"
            )
            .is_err()
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.scoring.success_weight = 35.0;
        config.capabilities.push(
            Capability::new("acme", "acme-large")
                .with_strengths(["reasoning"])
                .with_cost(2.5),
        );

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }
}
