//! Runtime configuration, read from an optional TOML file and `SWOPLY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Argon2 defaults (OWASP minimums, matching the `argon2` crate).
const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_ITERATIONS: u32 = 2;
const DEFAULT_PARALLELISM: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite file holding the key-value namespace. A leading `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_memory_kib")]
  pub argon2_memory_kib:  u32,
  #[serde(default = "default_iterations")]
  pub argon2_iterations:  u32,
  #[serde(default = "default_parallelism")]
  pub argon2_parallelism: u32,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/swoply/swoply.db") }
fn default_memory_kib() -> u32 { DEFAULT_MEMORY_KIB }
fn default_iterations() -> u32 { DEFAULT_ITERATIONS }
fn default_parallelism() -> u32 { DEFAULT_PARALLELISM }

impl AppConfig {
  /// Layer `path` (if it exists) under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("SWOPLY").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  /// The store path with `~` expanded.
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

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = AppConfig::load(Path::new("/nonexistent/swoply.toml")).unwrap();
    assert_eq!(cfg.argon2_iterations, DEFAULT_ITERATIONS);
    assert_eq!(cfg.argon2_parallelism, DEFAULT_PARALLELISM);
  }

  #[test]
  fn relative_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("data/swoply.db")), PathBuf::from("data/swoply.db"));
  }
}
