//! # minwon-config
//!
//! TOML settings for the minwon complaint workflow.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use minwon_config::Settings;
//!
//! let settings = Settings::load(Some(Path::new("config/minwon.toml")))?;
//! let policy = settings.retry_policy();
//! ```
//!
//! Environment variables `MINWON_MAX_RETRIES`, `MINWON_RETRIEVAL_K`, and
//! `MINWON_LOG_LEVEL` override the file.

pub mod loader;
pub mod settings;

pub use loader::{ENV_LOG_LEVEL, ENV_MAX_RETRIES, ENV_RETRIEVAL_K};
pub use settings::{LoggingSettings, ModelSettings, Settings, WorkflowSettings};

/// The settings file shipped with the workspace.
pub const DEFAULT_SETTINGS: &str = include_str!("../../../config/minwon.toml");

// ── Tests ─────────────────────────────────────────────────────────────────────
