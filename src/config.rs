//! Configuration management for takedown-letters
//!
//! Stores settings in ~/.config/takedown-letters/config.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable that takes precedence over the config file.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Tunable limits for gap detection and retry behavior.
///
/// These mirror the behavior the letter wizard shipped with; they are named
/// and overridable rather than re-derived because no derivation exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Limits {
    /// An initial answer shorter than this counts as "minimal" information.
    #[serde(default = "default_min_answer_len")]
    pub min_answer_len: usize,
    /// Free-text evidence fields longer than this count as detailed enough.
    #[serde(default = "default_detail_threshold")]
    pub detail_threshold: usize,
    /// Caller-driven retries allowed for the follow-up stage before the
    /// wizard proceeds without follow-up data.
    #[serde(default = "default_max_follow_up_retries")]
    pub max_follow_up_retries: u32,
}

fn default_min_answer_len() -> usize {
    20
}

fn default_detail_threshold() -> usize {
    30
}

fn default_max_follow_up_retries() -> u32 {
    3
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            min_answer_len: default_min_answer_len(),
            detail_threshold: default_detail_threshold(),
            max_follow_up_retries: default_max_follow_up_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Anthropic API key. The ANTHROPIC_API_KEY environment variable takes
    /// precedence over this field.
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub limits: Limits,
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("takedown-letters"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(err) => {
                        preserve_corrupt_config(&path, &content);
                        tracing::warn!(
                            "config file was corrupted ({}); a backup was saved and defaults were loaded",
                            err
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Save config to disk
    pub fn save(&self) -> Result<(), String> {
        let dir =
            Self::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config directory: {}", e))?;

        let path = dir.join("config.json");
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
        Ok(())
    }

    /// Get the API key (environment variable wins over the config file).
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.anthropic_api_key.clone()
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/takedown-letters/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &std::path::Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.limits.min_answer_len, 20);
        assert_eq!(config.limits.detail_threshold, 30);
        assert_eq!(config.limits.max_follow_up_retries, 3);
    }

    #[test]
    fn test_limits_fill_in_when_missing_from_file() {
        let config: Config = serde_json::from_str(r#"{"anthropic_api_key":"sk-test"}"#).unwrap();
        assert_eq!(config.limits.detail_threshold, 30);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_partial_limits_override() {
        let config: Config = serde_json::from_str(r#"{"limits":{"detail_threshold":50}}"#).unwrap();
        assert_eq!(config.limits.detail_threshold, 50);
        assert_eq!(config.limits.min_answer_len, 20);
    }

    #[test]
    fn test_corrupt_config_is_backed_up_not_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not valid json").unwrap();

        preserve_corrupt_config(&path, "{not valid json");

        let backup = dir.path().join("config.json.corrupt");
        assert!(backup.exists());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{not valid json");
    }
}
