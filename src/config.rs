//! TOML configuration and credential loading.
//!
//! The configuration file is optional: when the default path does not exist
//! the built-in defaults apply. The API credential never lives in the config
//! file itself; it is read from the environment (after `.env` is loaded) or
//! from a separate secrets file.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::chunk::DEFAULT_CHUNK_WORDS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            secrets_file: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_chunk_words(),
        }
    }
}

fn default_chunk_words() -> usize {
    DEFAULT_CHUNK_WORDS
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_words == 0 {
            bail!("chunking.chunk_words must be > 0");
        }
        if self.oracle.model.trim().is_empty() {
            bail!("oracle.model must not be empty");
        }
        if self.oracle.base_url.trim().is_empty() {
            bail!("oracle.base_url must not be empty");
        }
        if self.oracle.api_key_env.trim().is_empty() {
            bail!("oracle.api_key_env must not be empty");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
///
/// Only a missing file falls back; a file that exists but is unreadable or
/// invalid is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

/// The oracle credential. `Debug` is redacted.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolve the credential: environment first, then the secrets file.
///
/// Call once at startup, before any extraction or oracle call, so a missing
/// key fails the process immediately.
pub fn resolve_api_key(config: &OracleConfig) -> Result<ApiKey> {
    let var = config.api_key_env.as_str();

    if let Ok(key) = std::env::var(var) {
        if !key.trim().is_empty() {
            return Ok(ApiKey::new(key.trim()));
        }
    }

    if let Some(path) = &config.secrets_file {
        if let Some(key) = read_secret(path, var)? {
            return Ok(ApiKey::new(key));
        }
    }

    match &config.secrets_file {
        Some(path) => bail!(
            "{} is not set: export it, add it to .env, or add it to {}",
            var,
            path.display()
        ),
        None => bail!("{} is not set: export it or add it to .env", var),
    }
}

/// Look up `key` in a TOML secrets file. A missing file is not an error.
fn read_secret(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse secrets file: {}", path.display()))?;

    Ok(table
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.oracle.model, "gpt-4o");
        assert_eq!(cfg.oracle.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.chunking.chunk_words, 3000);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gridai.toml");
        fs::write(&path, "[chunking]\nchunk_words = 250\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.chunking.chunk_words, 250);
        assert_eq!(cfg.oracle.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn zero_chunk_words_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gridai.toml");
        fs::write(&path, "[chunking]\nchunk_words = 0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("chunk_words"));
    }

    #[test]
    fn negative_chunk_words_rejected_at_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gridai.toml");
        fs::write(&path, "[chunking]\nchunk_words = -5\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_default_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.chunking.chunk_words, 3000);
    }

    #[test]
    fn key_from_secrets_file() {
        let tmp = TempDir::new().unwrap();
        let secrets = tmp.path().join("secrets.toml");
        fs::write(&secrets, "GRIDAI_TEST_KEY_FILE = \"sk-from-file\"\n").unwrap();
        let cfg = OracleConfig {
            api_key_env: "GRIDAI_TEST_KEY_FILE".to_string(),
            secrets_file: Some(secrets),
            ..OracleConfig::default()
        };
        assert_eq!(resolve_api_key(&cfg).unwrap().expose(), "sk-from-file");
    }

    #[test]
    fn missing_key_names_variable() {
        let cfg = OracleConfig {
            api_key_env: "GRIDAI_TEST_KEY_NEVER_SET".to_string(),
            ..OracleConfig::default()
        };
        let err = resolve_api_key(&cfg).unwrap_err();
        assert!(err.to_string().contains("GRIDAI_TEST_KEY_NEVER_SET"));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
