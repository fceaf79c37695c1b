//! Settings schema.
//!
//! Deserialized from TOML; every section and key has a default so an empty
//! document is a valid configuration.
//!
//! ```toml
//! [workflow]
//! max_retries = 1
//! retrieval_k = 5
//!
//! [model]
//! name = "gpt-4.1-mini"
//! temperature = 0.1
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};

use minwon_core::{DEFAULT_RETRIEVAL_K, MAX_RETRIES};

/// Top-level settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workflow: WorkflowSettings,
    pub model: ModelSettings,
    pub logging: LoggingSettings,
}

/// Loop bounds and retrieval size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Loop-backs allowed per gate before forced forward progress.
    pub max_retries: u32,
    /// Passages requested per retrieval. Must be at least 1.
    pub retrieval_k: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retrieval_k: DEFAULT_RETRIEVAL_K,
        }
    }
}

/// Parameters handed to a hosted language-model adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4.1-mini".to_string(),
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `minwon_core=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
