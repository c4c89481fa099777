//! Runtime configuration.
//!
//! Loaded from `config.toml` (or `--config`) and then from
//! `BILLWATCH_`-prefixed environment variables; nested keys use `__`, e.g.
//! `BILLWATCH_FEED__API_KEY`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use billwatch_feed::FeedConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  #[serde(default)]
  pub feed:                    FeedConfig,
  #[serde(default = "default_notification_delay_secs")]
  pub notification_delay_secs: u64,
  /// Open sync runs older than this are treated as abandoned.
  #[serde(default = "default_stale_run_after_secs")]
  pub stale_run_after_secs:    i64,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/billwatch/billwatch.db") }
fn default_notification_delay_secs() -> u64 { 30 }
fn default_stale_run_after_secs() -> i64 { 6 * 60 * 60 }

impl AppConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("BILLWATCH").separator("__"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn notification_delay(&self) -> Duration {
    Duration::from_secs(self.notification_delay_secs)
  }

  pub fn stale_run_after(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.stale_run_after_secs)
  }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
