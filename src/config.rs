use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Resource;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_resources")]
    pub resources: Vec<Resource>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resources: default_resources(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com/".to_string()
}
fn default_resources() -> Vec<Resource> {
    Resource::ALL.to_vec()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
    /// Spaces per indentation level in written files.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Prepended to usernames when persisting per-user post collections.
    #[serde(default)]
    pub derived_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            indent: default_indent(),
            derived_prefix: String::new(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_indent() -> usize {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_affirmative")]
    pub affirmative: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            affirmative: default_affirmative(),
        }
    }
}

fn default_affirmative() -> String {
    "y".to_string()
}

/// Load and validate the config at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(config)
}

/// Like [`load_config`], but a missing file yields the built-in defaults.
/// A file that exists and fails to parse or validate is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file absent, using defaults");
        validate(Config::default())
    }
}

fn validate(mut config: Config) -> Result<Config> {
    let base = config.source.base_url.trim().to_string();
    if base.is_empty() {
        bail!("source.base_url must not be empty");
    }
    if !base.starts_with("http://") && !base.starts_with("https://") {
        bail!("source.base_url must be an http(s) URL, got '{}'", base);
    }
    config.source.base_url = if base.ends_with('/') {
        base
    } else {
        format!("{}/", base)
    };

    if config.source.resources.is_empty() {
        bail!("source.resources must list at least one resource");
    }

    if config.source.timeout_secs == 0 {
        bail!("source.timeout_secs must be > 0");
    }

    if config.store.indent > 8 {
        bail!("store.indent must be <= 8");
    }

    if config.store.derived_prefix.contains(['/', '\\']) {
        bail!("store.derived_prefix must not contain path separators");
    }

    if config.session.affirmative.trim().is_empty() {
        bail!("session.affirmative must not be empty");
    }

    Ok(config)
}
