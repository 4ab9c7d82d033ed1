use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mail::imap_client::{DEFAULT_IMAP_PORT, DEFAULT_TIMEOUT};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub imap_port: Option<u16>,
    /// Applied to TCP connect and to every read and write.
    pub timeout_secs: Option<u64>,
    /// Extra `domain = "imap host"` entries; these win over the built-in table.
    #[serde(default)]
    pub providers: BTreeMap<String, String>,
}

impl Config {
    pub fn imap_port(&self) -> u16 {
        self.imap_port.unwrap_or(DEFAULT_IMAP_PORT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("rs_webmail")
        .join("config.toml"))
}

/// Loads the default config file; built-in defaults when it does not exist.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    if cfg.timeout_secs == Some(0) {
        return Err(anyhow::anyhow!("timeout_secs must be at least 1"))
            .with_context(|| format!("invalid config {}", path.display()));
    }
    Ok(cfg)
}
