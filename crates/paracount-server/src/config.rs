//! Runtime configuration, deserialised from `config.toml` layered with
//! `PARACOUNT_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::ConfigError;
use paracount_core::{ingest::RetryPolicy, maintenance::DEFAULT_RETENTION_DAYS};
use serde::Deserialize;

use crate::scheduler::MaintenanceSchedule;

/// Upper bound for `retention_days`, about a century.
pub const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Paragraphs older than this are removed by retention pruning.
  #[serde(default = "default_retention_days")]
  pub retention_days:      i64,
  #[serde(default = "default_prune_interval_secs")]
  pub prune_interval_secs: u64,
  #[serde(default = "default_stats_interval_secs")]
  pub stats_interval_secs: u64,
  /// Run the maintenance jobs inside `serve`. Disable when an external
  /// scheduler invokes `prune` and `stats` instead.
  #[serde(default = "default_true")]
  pub scheduler_enabled:   bool,
  #[serde(default = "default_tokenize_attempts")]
  pub tokenize_attempts:   u32,
  #[serde(default = "default_tokenize_backoff_ms")]
  pub tokenize_backoff_ms: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("paracount.db") }
fn default_retention_days() -> i64 { DEFAULT_RETENTION_DAYS }
fn default_prune_interval_secs() -> u64 { 60 * 60 }
fn default_stats_interval_secs() -> u64 { 24 * 60 * 60 }
fn default_true() -> bool { true }
fn default_tokenize_attempts() -> u32 { 3 }
fn default_tokenize_backoff_ms() -> u64 { 50 }

impl ServerConfig {
  /// Load from an optional TOML file, then the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PARACOUNT"))
      .build()?
      .try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// Reject values that would prune the whole index, overflow the cutoff
  /// computation or spin the scheduler.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(1..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
      return Err(ConfigError::Message(format!(
        "retention_days must be between 1 and {MAX_RETENTION_DAYS}, got {}",
        self.retention_days
      )));
    }
    if self.prune_interval_secs == 0 {
      return Err(ConfigError::Message("prune_interval_secs must be at least 1".into()));
    }
    if self.stats_interval_secs == 0 {
      return Err(ConfigError::Message("stats_interval_secs must be at least 1".into()));
    }
    if self.tokenize_attempts == 0 {
      return Err(ConfigError::Message("tokenize_attempts must be at least 1".into()));
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn retention(&self) -> chrono::Duration { chrono::Duration::days(self.retention_days) }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      attempts: self.tokenize_attempts,
      backoff:  Duration::from_millis(self.tokenize_backoff_ms),
    }
  }

  pub fn schedule(&self) -> MaintenanceSchedule {
    MaintenanceSchedule {
      prune_every: Duration::from_secs(self.prune_interval_secs),
      stats_every: Duration::from_secs(self.stats_interval_secs),
      retention:   self.retention(),
    }
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
