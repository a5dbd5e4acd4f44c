//! Configuration loading for simulation runs.
//!
//! Run settings live in a small YAML file mirrored by strongly-typed
//! structs: the horizon, the RNG seed, and the optional milestone
//! target that switches the engine from uniform random conflict
//! resolution to the priority-class policy. Every field has a
//! default, so an empty document is a valid configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the settings file from disk.
    #[error("failed to read settings file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse settings YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    /// Run bounds and reproducibility.
    #[serde(default)]
    pub run: RunSettings,

    /// Conflict-policy selection.
    #[serde(default)]
    pub priority: PrioritySettings,
}

/// Run bounds and reproducibility knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSettings {
    /// Clock value past which `run` halts.
    #[serde(default = "default_horizon")]
    pub horizon: f64,

    /// Seed for the tie-breaking RNG.
    #[serde(default)]
    pub seed: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            seed: 0,
        }
    }
}

const fn default_horizon() -> f64 {
    1000.0
}

/// Conflict-policy selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrioritySettings {
    /// When set, bindings are ranked by this milestone name instead of
    /// being chosen uniformly at random.
    #[serde(default)]
    pub milestone: Option<String>,
}

impl Settings {
    /// Load settings from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::parse("{}").unwrap();
        assert_eq!(settings.run.horizon, 1000.0);
        assert_eq!(settings.run.seed, 0);
        assert!(settings.priority.milestone.is_none());
    }

    #[test]
    fn fields_override_defaults() {
        let settings = Settings::parse(
            "run:\n  horizon: 240.0\n  seed: 7\npriority:\n  milestone: \"intake\"\n",
        )
        .unwrap();
        assert_eq!(settings.run.horizon, 240.0);
        assert_eq!(settings.run.seed, 7);
        assert_eq!(settings.priority.milestone.as_deref(), Some("intake"));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let result = Settings::parse("run: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
