//! dayplan server binary.
//!
//! Settings come from `dayplan.toml` (see `--config`), then `DAYPLAN_*`
//! environment variables, with `.env` loaded first. Run with
//! `--hash-password` to turn a password read from stdin into the argon2 PHC
//! string expected by `admin_password_hash`.

use std::{io::BufRead as _, path::PathBuf};

use anyhow::{Context as _, anyhow};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use dayplan_server::ServerConfig;
use dayplan_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Shared preference calendar server")]
struct Cli {
  /// TOML settings file; a missing file is not an error.
  #[arg(short, long, default_value = "dayplan.toml")]
  config: PathBuf,

  /// Hash a password from stdin for `admin_password_hash`, then exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    println!("{}", hash_stdin_password()?);
    return Ok(());
  }

  let cfg = load_config(cli.config)?;
  serve(cfg).await
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  dotenvy::dotenv().ok();

  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("DAYPLAN")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("users"),
    )
    .build()
    .context("reading settings")?
    .try_deserialize()
    .context("parsing settings")
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = SqliteStore::open(&cfg.database_path, cfg.roster())
    .await
    .with_context(|| format!("opening database {}", cfg.database_path.display()))?;

  let state = cfg.app_state(store).context("invalid settings")?;
  let app = dayplan_server::router(state, &cfg).context("invalid settings")?;

  let listener = TcpListener::bind((cfg.host.as_str(), cfg.port))
    .await
    .with_context(|| format!("binding {}:{}", cfg.host, cfg.port))?;
  tracing::info!(
    addr = %listener.local_addr()?,
    users = ?cfg.users,
    "dayplan listening"
  );

  axum::serve(listener, app).await.context("serving")
}

fn hash_stdin_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  let mut line = String::new();
  std::io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\r', '\n']);

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow!("hashing password: {e}"))
}
