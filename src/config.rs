use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::backoff::BackoffPolicy;

/// Backoff schedule shape selected in the `[backoff]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Never retry.
    None,
    /// Equal waits of `delay_ms`.
    Constant,
    /// Waits double from `delay_ms` up to `max_delay_ms`.
    #[default]
    Exponential,
}

/// Backoff parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default)]
    pub kind: BackoffKind,
    /// Wait between attempts (constant) or first wait (exponential), in ms.
    pub delay_ms: u64,
    /// Upper bound on an exponential wait, in ms.
    pub max_delay_ms: u64,
    /// Number of retries permitted after the first attempt.
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            kind: BackoffKind::Exponential,
            delay_ms: 50,
            max_delay_ms: 30_000,
            max_retries: 8,
        }
    }
}

impl BackoffConfig {
    pub fn to_policy(&self) -> BackoffPolicy {
        match self.kind {
            BackoffKind::None => BackoffPolicy::no_backoff(),
            BackoffKind::Constant => {
                BackoffPolicy::constant(Duration::from_millis(self.delay_ms), self.max_retries)
            }
            BackoffKind::Exponential => BackoffPolicy::exponential(
                Duration::from_millis(self.delay_ms),
                Duration::from_millis(self.max_delay_ms),
                self.max_retries,
            ),
        }
    }
}

/// Global configuration loaded from `~/.config/rebulk/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebulkConfig {
    /// Processor flush threshold: buffered op count.
    pub max_actions: usize,
    /// Processor flush threshold: buffered payload estimate in bytes.
    pub max_payload_bytes: usize,
    /// Optional backoff schedule; if missing, built-in defaults are used.
    #[serde(default)]
    pub backoff: Option<BackoffConfig>,
}

impl Default for RebulkConfig {
    fn default() -> Self {
        Self {
            max_actions: 1000,
            max_payload_bytes: 5 * 1024 * 1024,
            backoff: None,
        }
    }
}

impl RebulkConfig {
    /// The configured backoff schedule, or the built-in default when the
    /// `[backoff]` section is absent.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        self.backoff
            .as_ref()
            .cloned()
            .unwrap_or_default()
            .to_policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rebulk")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RebulkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RebulkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RebulkConfig = toml::from_str(&data)?;
    Ok(cfg)
}
