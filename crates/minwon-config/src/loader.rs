//! Loading, overriding, and validating `Settings`.
//!
//! Load order: built-in defaults, then the TOML document (if any), then
//! environment overrides. The result is validated before it is returned.

use std::path::Path;

use tracing::debug;

use minwon_contracts::error::{MinwonError, MinwonResult};
use minwon_core::RetryPolicy;

use crate::settings::Settings;

pub const ENV_MAX_RETRIES: &str = "MINWON_MAX_RETRIES";
pub const ENV_RETRIEVAL_K: &str = "MINWON_RETRIEVAL_K";
pub const ENV_LOG_LEVEL: &str = "MINWON_LOG_LEVEL";

impl Settings {
    /// Parse `s` as TOML.
    ///
    /// Returns `MinwonError::ConfigError` if the document is malformed or a
    /// value fails validation.
    pub fn from_toml_str(s: &str) -> MinwonResult<Self> {
        let settings: Settings = toml::from_str(s).map_err(|e| MinwonError::ConfigError {
            reason: format!("failed to parse settings TOML: {}", e),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> MinwonResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MinwonError::ConfigError {
            reason: format!("failed to read settings file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults or the file at `path`, with process environment overrides applied.
    pub fn load(path: Option<&Path>) -> MinwonResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply `MINWON_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> MinwonResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            self.workflow.max_retries = parse_env(ENV_MAX_RETRIES, &raw)?;
            debug!(max_retries = self.workflow.max_retries, "override from environment");
        }
        if let Some(raw) = lookup(ENV_RETRIEVAL_K) {
            self.workflow.retrieval_k = parse_env(ENV_RETRIEVAL_K, &raw)?;
            debug!(retrieval_k = self.workflow.retrieval_k, "override from environment");
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        self.validate()
    }

    pub fn validate(&self) -> MinwonResult<()> {
        if self.workflow.retrieval_k == 0 {
            return Err(MinwonError::ConfigError {
                reason: "workflow.retrieval_k must be at least 1".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(MinwonError::ConfigError {
                reason: format!(
                    "model.temperature must be between 0.0 and 2.0, got {}",
                    self.model.temperature
                ),
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.workflow.max_retries)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> MinwonResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| MinwonError::ConfigError {
        reason: format!("{} has invalid value '{}': {}", key, raw, e),
    })
}
