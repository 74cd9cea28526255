//! Configuration loading and validation for the CLI.
//!
//! Values are read from `CRYPTEX_*` environment variables. Command-line
//! flags override them.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Comma-separated key ring, primary first (`CRYPTEX_KEYS`).
    #[serde(default)]
    pub keys: String,

    /// TTL applied by `encrypt` when `--ttl` is absent; `0` disables expiry
    /// (`CRYPTEX_DEFAULT_TTL_SECS`).
    #[serde(default)]
    pub default_ttl_secs: u64,

    /// Tracing log level (`CRYPTEX_LOG_LEVEL`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

const ENV_PREFIX: &str = "CRYPTEX";

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build cryptex configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise cryptex configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("CRYPTEX_LOG_LEVEL must not be empty");
        }
        // An unset ring is fine (keygen needs none); a set one must be well formed.
        if !self.keys.trim().is_empty() {
            split_keys(&self.keys).context("CRYPTEX_KEYS is invalid")?;
        }
        Ok(())
    }
}

/// Split a comma-separated key list, primary first.
///
/// # Errors
///
/// Returns an error if the list is empty or contains a blank entry.
pub fn split_keys(list: &str) -> Result<Vec<String>> {
    let keys: Vec<String> = list.split(',').map(|k| k.trim().to_owned()).collect();
    if keys.iter().any(String::is_empty) {
        anyhow::bail!("key list must be non-empty and contain no blank entries");
    }
    Ok(keys)
}
