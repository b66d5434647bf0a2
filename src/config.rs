//! Companion configuration loading.
//!
//! Reads `config.yaml` and resolves environment variables. The file is
//! optional: every field has a default, and a missing file means "all
//! defaults".

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::overlay::page::PageSelectors;

/// Env var that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CHAT_COMPANION_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

/// Top-level configuration (mirrors `config.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default)]
    pub logging: LogSettings,
}

/// Where the generative-text capability lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// OpenAI-compatible base URL, e.g. `http://localhost:11434/v1`.
    /// Empty means no capability.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier sent with each request. Empty means no capability.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Top-K the host reports as its default. Passed through to sessions.
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_name: default_model_name(),
            api_key: None,
            top_k: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Tunables for the observation loop and auto-mode policy.
#[derive(Debug, Clone, Deserialize)]
pub struct OverlaySettings {
    /// Quiet window after the last page mutation before extracting.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// User turns required before an analysis is requested.
    #[serde(default = "default_min_user_messages")]
    pub min_user_messages: usize,
    /// Most recent messages included in a prompt.
    #[serde(default = "default_max_prompt_messages")]
    pub max_prompt_messages: usize,
    /// Confidence a suggestion must exceed to count as "high".
    #[serde(default = "default_auto_threshold")]
    pub auto_threshold: f64,
    /// Consecutive high batches before auto mode is offered.
    #[serde(default = "default_auto_arm_streak")]
    pub auto_arm_streak: u32,
    #[serde(default)]
    pub selectors: PageSelectors,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_user_messages: default_min_user_messages(),
            max_prompt_messages: default_max_prompt_messages(),
            auto_threshold: default_auto_threshold(),
            auto_arm_streak: default_auto_arm_streak(),
            selectors: PageSelectors::default(),
        }
    }
}

/// Log file placement and filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// File name inside the data directory.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Rotated files kept next to the live one.
    #[serde(default = "default_log_keep")]
    pub keep: u32,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            keep: default_log_keep(),
            filter: default_log_filter(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model_name() -> String {
    "llama3.2".into()
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_debounce_ms() -> u64 {
    2_000
}
fn default_min_user_messages() -> usize {
    3
}
fn default_max_prompt_messages() -> usize {
    10
}
fn default_auto_threshold() -> f64 {
    0.85
}
fn default_auto_arm_streak() -> u32 {
    2
}
fn default_log_file() -> String {
    "companion.log".into()
}
fn default_log_keep() -> u32 {
    3
}
fn default_log_filter() -> String {
    "chat_companion=info,warn".into()
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// `CHAT_COMPANION_CONFIG` wins when it points at an existing file; otherwise
/// `<data_dir>/config.yaml` is used if present.
pub fn find_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(expand_tilde(&explicit));
        if candidate.is_file() {
            return Some(candidate);
        }
        tracing::warn!(path = %candidate.display(), "{CONFIG_ENV_VAR} does not point at a file");
    }

    let candidate = crate::data_dir().join("config.yaml");
    candidate.is_file().then_some(candidate)
}

/// Load and parse a config file, interpolating `${VAR}` and `${VAR:-default}`.
pub fn load_config(path: &Path) -> Result<CompanionConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_config(&raw)
}

/// Parse config text. Empty input yields defaults.
pub fn parse_config(raw: &str) -> Result<CompanionConfig, ConfigError> {
    let interpolated = interpolate_env_vars(raw);
    if interpolated.trim().is_empty() {
        return Ok(CompanionConfig::default());
    }
    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })
}

/// Where the effective configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    /// The file exists but could not be used; defaults apply.
    Fallback { path: PathBuf, error: ConfigError },
}

impl ConfigSource {
    /// Report the outcome. Called once logging is up, since the log
    /// settings themselves come from the config.
    pub fn log(&self) {
        match self {
            ConfigSource::Defaults => tracing::info!("no config file found, using defaults"),
            ConfigSource::File(path) => tracing::info!(path = %path.display(), "loaded config"),
            ConfigSource::Fallback { path, error } => tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to load config, using defaults"
            ),
        }
    }
}

/// Load the config from its usual location, falling back to defaults.
pub fn load_or_default() -> (CompanionConfig, ConfigSource) {
    match find_config_path() {
        Some(path) => load_or_fallback(path),
        None => (CompanionConfig::default(), ConfigSource::Defaults),
    }
}

fn load_or_fallback(path: PathBuf) -> (CompanionConfig, ConfigSource) {
    match load_config(&path) {
        Ok(cfg) => (cfg, ConfigSource::File(path)),
        Err(error) => (
            CompanionConfig::default(),
            ConfigSource::Fallback { path, error },
        ),
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            out.push(ch);
            continue;
        }
        chars.next();
        let expr: String = chars.by_ref().take_while(|c| *c != '}').collect();
        out.push_str(&resolve_var_expr(&expr));
    }

    out
}

fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((name, fallback)) => std::env::var(name).unwrap_or_else(|_| expand_tilde(fallback)),
        None => std::env::var(expr).unwrap_or_default(),
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_with_default() {
        std::env::remove_var("__COMPANION_UNSET_VAR__");
        let out = interpolate_env_vars("url: ${__COMPANION_UNSET_VAR__:-http://fallback}");
        assert_eq!(out, "url: http://fallback");
    }

    #[test]
    fn test_interpolate_with_value() {
        std::env::set_var("__COMPANION_SET_VAR__", "http://custom");
        let out = interpolate_env_vars("${__COMPANION_SET_VAR__:-http://fallback}");
        assert_eq!(out, "http://custom");
        std::env::remove_var("__COMPANION_SET_VAR__");
    }

    #[test]
    fn test_interpolate_leaves_plain_dollars() {
        assert_eq!(interpolate_env_vars("cost: $5"), "cost: $5");
    }

    #[test]
    fn test_empty_config_is_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.overlay.debounce_ms, 2_000);
        assert_eq!(cfg.overlay.min_user_messages, 3);
        assert_eq!(cfg.overlay.max_prompt_messages, 10);
        assert_eq!(cfg.overlay.auto_arm_streak, 2);
        assert!((cfg.overlay.auto_threshold - 0.85).abs() < f64::EPSILON);
        assert!(!cfg.model.base_url.is_empty());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let yaml = r##"
            model:
              model_name: "gemma3"
              top_k: 40
            overlay:
              debounce_ms: 500
              selectors:
                input: "#prompt-textarea"
        "##;
        let cfg = parse_config(yaml).unwrap();
        assert_eq!(cfg.model.model_name, "gemma3");
        assert_eq!(cfg.model.top_k, Some(40));
        assert_eq!(cfg.overlay.debounce_ms, 500);
        assert_eq!(cfg.overlay.min_user_messages, 3);
        assert_eq!(cfg.overlay.selectors.input, "#prompt-textarea");
        assert_eq!(cfg.overlay.selectors.container, PageSelectors::default().container);
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = parse_config("overlay: [not, a, map").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model:\n  base_url: \"\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(cfg.model.base_url.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_logging_section() {
        let cfg = parse_config("logging:\n  keep: 5\n").unwrap();
        assert_eq!(cfg.logging.keep, 5);
        assert_eq!(cfg.logging.file, "companion.log");
        assert_eq!(cfg.logging.filter, "chat_companion=info,warn");
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "overlay: [broken").unwrap();

        let (cfg, source) = load_or_fallback(path.clone());
        assert_eq!(cfg.overlay.debounce_ms, 2_000);
        assert!(matches!(source, ConfigSource::Fallback { path: p, .. } if p == path));
    }

    #[test]
    fn test_readable_config_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "overlay:\n  debounce_ms: 750\n").unwrap();

        let (cfg, source) = load_or_fallback(path.clone());
        assert_eq!(cfg.overlay.debounce_ms, 750);
        assert!(matches!(source, ConfigSource::File(p) if p == path));
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_tilde("~/companion.yaml");
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("/companion.yaml"));
    }
}
