//! Host configuration: `config.json` in the app data directory, with a few
//! environment overrides on top.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::progress::DEFAULT_STORAGE_KEY;
use crate::speech::RecognitionOptions;
use crate::storage::{DEFAULT_CHUNK_SIZE, DEFAULT_PREFIX};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_true() -> bool {
    true
}

fn default_storage_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_tick_interval_ms() -> u64 {
    100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcadeConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_true")]
    pub continuous: bool,
    #[serde(default)]
    pub interim_results: bool,
    #[serde(default)]
    pub muted: bool,
    /// Fixed PRNG seed; `None` seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            continuous: true,
            interim_results: false,
            muted: false,
            seed: None,
            storage_prefix: default_storage_prefix(),
            storage_key: default_storage_key(),
            chunk_size: default_chunk_size(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl ArcadeConfig {
    /// Read `path`. A missing file is the default config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut config: Self = serde_json::from_str(&text)?;
        config.sanitize();
        Ok(config)
    }

    /// [`ArcadeConfig::load`], falling back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "config loaded");
                config
            }
            Err(e) => {
                warn!("{}; using default config", e);
                Self::default()
            }
        }
    }

    /// Apply `VOXARCADE_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Unusable values are logged and skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in ["VOXARCADE_SEED", "VOXARCADE_MUTED", "VOXARCADE_LOCALE"] {
            let Some(value) = lookup(name) else {
                continue;
            };
            if let Err(e) = self.apply_override(name, value.trim()) {
                warn!("ignoring override: {}", e);
            }
        }
    }

    fn apply_override(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue(name.to_string(), value.to_string());
        match name {
            "VOXARCADE_SEED" => self.seed = Some(value.parse().map_err(|_| invalid())?),
            "VOXARCADE_MUTED" => {
                self.muted = match value.to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => true,
                    "0" | "false" | "no" | "off" => false,
                    _ => return Err(invalid()),
                }
            }
            "VOXARCADE_LOCALE" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.locale = value.to_string();
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        if self.chunk_size == 0 {
            warn!("chunk_size must be positive; using {}", DEFAULT_CHUNK_SIZE);
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.tick_interval_ms == 0 {
            warn!("tick_interval_ms must be positive; using 100");
            self.tick_interval_ms = default_tick_interval_ms();
        }
    }

    pub fn recognition_options(&self) -> RecognitionOptions {
        RecognitionOptions {
            locale: self.locale.clone(),
            continuous: self.continuous,
            interim_results: self.interim_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ArcadeConfig = serde_json::from_str(r#"{"muted": true, "seed": 7}"#).unwrap();
        assert!(config.muted);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.locale, "en-US");
        assert!(config.continuous);
        assert_eq!(config.chunk_size, 500_000);
        assert_eq!(config.storage_prefix, "voice-games");
        assert_eq!(config.storage_key, "game-storage");
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("voxarcade-no-such-config.json");
        assert_eq!(ArcadeConfig::load(&path).unwrap(), ArcadeConfig::default());
    }

    #[test]
    fn broken_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("voxarcade-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(ArcadeConfig::load(&path), Err(ConfigError::Parse(_))));
        assert_eq!(ArcadeConfig::load_or_default(&path), ArcadeConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_skipped() {
        let mut config = ArcadeConfig::default();
        config.apply_overrides(env(&[
            ("VOXARCADE_SEED", "42"),
            ("VOXARCADE_MUTED", "yes"),
            ("VOXARCADE_LOCALE", "en-GB"),
        ]));
        assert_eq!(config.seed, Some(42));
        assert!(config.muted);
        assert_eq!(config.locale, "en-GB");

        config.apply_overrides(env(&[("VOXARCADE_SEED", "soon"), ("VOXARCADE_MUTED", "maybe")]));
        assert_eq!(config.seed, Some(42));
        assert!(config.muted);
    }

    #[test]
    fn zero_sizes_are_sanitized() {
        let mut config: ArcadeConfig =
            serde_json::from_str(r#"{"chunk_size": 0, "tick_interval_ms": 0}"#).unwrap();
        config.sanitize();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.tick_interval_ms, 100);
    }
}
