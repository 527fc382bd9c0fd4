//! `swoply`, the Swoply marketplace from the command line.
//!
//! Reads `swoply.toml` (or the path given with `--config`), opens the SQLite
//! store, resumes the saved session, and runs one subcommand.
//!
//! # Usage
//!
//! ```text
//! swoply register --email anna@example.com --name "Анна К."
//! swoply listing create --title "iPhone 14 Pro" --description "..." \
//!   --price 85000 --category electronics --condition excellent --location Москва
//! swoply listing search iphone --max-price 90000
//! ```

mod commands;
mod config;
mod render;


use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use swoply_auth::{AuthService, CredentialHasher};
use swoply_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, config::AppConfig};

#[derive(Parser)]
#[command(name = "swoply", version, about = "Swoply marketplace from the command line")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "swoply.toml")]
  config: PathBuf,

  /// Override the configured store path.
  #[arg(long)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = AppConfig::load(&cli.config)?;
  if let Some(store) = cli.store {
    cfg.store_path = store;
  }

  let store_path = cfg.resolved_store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(path = %store_path.display(), "store opened");

  let hasher = CredentialHasher::with_costs(
    cfg.argon2_memory_kib,
    cfg.argon2_iterations,
    cfg.argon2_parallelism,
  )
  .context("invalid argon2 parameters")?;

  let mut auth = AuthService::restore(store, hasher)
    .await
    .context("failed to restore session")?;

  commands::run(&mut auth, cli.command).await
}
