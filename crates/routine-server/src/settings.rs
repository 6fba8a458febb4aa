//! Server configuration, read from a TOML file and `ROUTINE_*` environment
//! variables (the latter win).

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use chrono::TimeDelta;
use routine_api::DEFAULT_SESSION_TTL_HOURS;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
}

/// Upper bound on `session_ttl_hours`: one leap year.
pub const MAX_SESSION_TTL_HOURS: i64 = 366 * 24;

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/reset-routine/routine.db") }
fn default_session_ttl_hours() -> i64 { DEFAULT_SESSION_TTL_HOURS }

impl ServerConfig {
  /// Layer `path` (optional) under the environment and deserialise.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROUTINE"))
      .build()
      .context("failed to read config file")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
      bail!(
        "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
        self.session_ttl_hours
      );
    }
    Ok(())
  }

  /// Lifetime of a freshly issued session token.
  pub fn session_ttl(&self) -> anyhow::Result<TimeDelta> {
    TimeDelta::try_hours(self.session_ttl_hours)
      .with_context(|| format!("session_ttl_hours {} is out of range", self.session_ttl_hours))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
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

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(src: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(src, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.session_ttl_hours, 720);
  }

  #[test]
  fn explicit_values_override_defaults() {
    let cfg = from_toml(
      "host = \"0.0.0.0\"\nport = 9000\nstore_path = \"/var/lib/routine.db\"\nsession_ttl_hours = 24\n",
    );
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/var/lib/routine.db"));
    assert_eq!(cfg.session_ttl_hours, 24);
  }

  #[test]
  fn session_ttl_must_be_positive_and_bounded() {
    for bad in [0, -5, MAX_SESSION_TTL_HOURS + 1, 3_000_000_000] {
      let cfg = from_toml(&format!("session_ttl_hours = {bad}\n"));
      assert!(cfg.validate().is_err(), "{bad} should be rejected");
    }

    let cfg = from_toml(&format!("session_ttl_hours = {MAX_SESSION_TTL_HOURS}\n"));
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.session_ttl().unwrap(), TimeDelta::hours(MAX_SESSION_TTL_HOURS));
  }

  #[test]
  fn load_rejects_a_bad_session_ttl() {
    let path = std::env::temp_dir().join(format!("routine-ttl-{}.toml", std::process::id()));
    std::fs::write(&path, "session_ttl_hours = -1\n").unwrap();
    let result = ServerConfig::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
  }

  #[test]
  fn tilde_is_left_alone_without_a_slash() {
    assert_eq!(expand_tilde(Path::new("~routine.db")), PathBuf::from("~routine.db"));
  }
}
