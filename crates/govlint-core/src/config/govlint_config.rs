//! Top-level govlint configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, ScanConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up at the workspace root.
pub const PROJECT_CONFIG_FILE: &str = "govlint.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `ConfigOverrides`)
/// 2. Environment variables (`GOVLINT_*`)
/// 3. Project config (`govlint.toml` in project root)
/// 4. User config (`~/.govlint/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GovlintConfig {
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
}

/// Explicit overrides from the caller (command line, host settings).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub analysis: AnalysisConfig,
    pub scan_threads: Option<usize>,
    pub scan_max_file_size: Option<u64>,
}

impl GovlintConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config. Only a parse error is fatal here.
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config)?;

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: GovlintConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &GovlintConfig) -> Result<(), ConfigError> {
        if config.analysis.max_nesting_depth == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.max_nesting_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.scan.max_file_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.max_file_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut GovlintConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: GovlintConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut GovlintConfig, other: &GovlintConfig) {
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if !other.scan.include.is_empty() {
            base.scan.include = other.scan.include.clone();
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.follow_symlinks.is_some() {
            base.scan.follow_symlinks = other.scan.follow_symlinks;
        }
        if !other.scan.extensions.is_empty() {
            base.scan.extensions = other.scan.extensions.clone();
        }

        base.analysis.merge_from(&other.analysis);
    }

    /// Apply environment variable overrides.
    /// Pattern: `GOVLINT_MAX_NESTING_DEPTH`, `GOVLINT_SCAN_THREADS`, etc.
    /// A set but unparseable value is an error, not a silent fallback.
    fn apply_env_overrides(config: &mut GovlintConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<u32>("GOVLINT_MAX_NESTING_DEPTH", "analysis.max_nesting_depth")? {
            config.analysis.max_nesting_depth = Some(v);
        }
        if let Some(v) = env_parse::<bool>("GOVLINT_DETECT_MISSING_LIMIT", "analysis.detect_missing_limit")? {
            config.analysis.detect_missing_limit = Some(v);
        }
        if let Some(v) = env_parse::<bool>("GOVLINT_FOLLOW_METHOD_CALLS", "analysis.follow_method_calls")? {
            config.analysis.follow_method_calls = Some(v);
        }
        if let Some(v) = env_parse::<usize>("GOVLINT_SCAN_THREADS", "scan.threads")? {
            config.scan.threads = Some(v);
        }
        Ok(())
    }

    fn apply_overrides(config: &mut GovlintConfig, overrides: &ConfigOverrides) {
        config.analysis.merge_from(&overrides.analysis);
        if let Some(v) = overrides.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(v) = overrides.scan_max_file_size {
            config.scan.max_file_size = Some(v);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, field: &str) -> Result<Option<T>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("{key}={raw:?} cannot be parsed"),
        })
}

/// Returns the user config path: `~/.govlint/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".govlint").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
