//! `dayplan`: command-line client for a running dayplan server.
//!
//! # Usage
//!
//! ```text
//! dayplan list
//! dayplan --password swordfish set Jack 2025-06-01 no
//! dayplan --password swordfish clear Jack 2025-06-01
//! dayplan --config ~/.config/dayplan/cli.toml status
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use dayplan_core::{
  calendar::group_by_date,
  preference::{EventDate, PreferenceAction, PreferenceKind},
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dayplan", about = "Command-line client for the dayplan server")]
struct Args {
  /// Path to a TOML config file (url, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the dayplan server (default: http://localhost:5000).
  #[arg(long, env = "DAYPLAN_URL")]
  url: Option<String>,

  /// Shared admin password, sent as `X-Admin-Password`.
  #[arg(long, env = "DAYPLAN_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print every stored preference, grouped by date.
  List,
  /// Record a preference for a user on a date.
  Set {
    user: String,
    date: EventDate,
    kind: PreferenceKind,
  },
  /// Remove a user's preference for a date.
  Clear { user: String, date: EventDate },
  /// Report whether the configured password unlocks edit mode.
  Status,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(file_cfg.url))
      .unwrap_or_else(|| "http://localhost:5000".to_string()),
    password: args
      .password
      .or_else(|| non_empty(file_cfg.password))
      .unwrap_or_default(),
  };
  tracing::debug!(url = %api_config.base_url, "using dayplan server");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List => {
      let preferences = client.list().await?;
      if preferences.is_empty() {
        println!("no preferences recorded");
      }
      for (date, users) in group_by_date(preferences) {
        let entries = users
          .iter()
          .map(|(user, kind)| format!("{user}={kind}"))
          .collect::<Vec<_>>()
          .join(", ");
        println!("{date}  {entries}");
      }
    }
    Command::Set { user, date, kind } => {
      let reply = client.update(&user, date, PreferenceAction::Set(kind)).await?;
      println!("{}", reply.message);
    }
    Command::Clear { user, date } => {
      let reply = client.update(&user, date, PreferenceAction::Clear).await?;
      println!("{}", reply.message);
    }
    Command::Status => {
      let unlocked = client.check_password().await?;
      println!("{}", if unlocked { "unlocked" } else { "locked" });
    }
  }

  Ok(())
}
