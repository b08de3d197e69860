//! Pipeline configuration: thresholds and debate limits.
//!
//! Loaded from a TOML file (or defaults), then overridden from the
//! environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `TRUST_GATE_MIN_CONFIDENCE` | `0.95` | Minimum extraction confidence (inclusive) |
//! | `TRUST_GATE_MIN_DHABT` | `0.90` | Minimum dhabt score (inclusive) |
//! | `TRUST_DEBATE_MAX_ROUNDS` | `5` | Round ceiling before `MAX_ROUNDS` stops a debate |
//!
//! # Example file
//!
//! ```toml
//! [gate]
//! min_confidence = "0.95"
//! min_dhabt = "0.90"
//!
//! [debate]
//! max_rounds = 5
//!
//! [debate.muhasabah]
//! confidence_ceiling = "0.80"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debate::DebateConfig;
use crate::gate::{MIN_DHABT_SCORE, MIN_EXTRACTION_CONFIDENCE};

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Extraction gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub min_confidence: Decimal,
    pub min_dhabt: Decimal,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_EXTRACTION_CONFIDENCE,
            min_dhabt: MIN_DHABT_SCORE,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub gate: GateConfig,
    pub debate: DebateConfig,
}

impl TrustConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read a TOML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text, path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env(&lookup, "TRUST_GATE_MIN_CONFIDENCE")? {
            self.gate.min_confidence = v;
        }
        if let Some(v) = parse_env(&lookup, "TRUST_GATE_MIN_DHABT")? {
            self.gate.min_dhabt = v;
        }
        if let Some(v) = parse_env(&lookup, "TRUST_DEBATE_MAX_ROUNDS")? {
            self.debate.max_rounds = v;
        }
        Ok(())
    }

    /// Reject thresholds outside [0, 1] and a zero round ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("gate.min_confidence", self.gate.min_confidence)?;
        check_unit("gate.min_dhabt", self.gate.min_dhabt)?;
        check_unit(
            "debate.muhasabah.confidence_ceiling",
            self.debate.muhasabah.confidence_ceiling,
        )?;
        if self.debate.max_rounds == 0 {
            return Err(ConfigError::Invalid(
                "debate.max_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}

fn check_unit(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::Invalid(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
