//! creatorlink server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store and photo directory, and serves the site over HTTP.
//!
//! # Signing in locally
//!
//! Mint a one-time sign-in link for an email address and exit:
//!
//! ```
//! cargo run -p creatorlink-server --bin server -- --issue-code ana@example.com
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::TimeDelta;
use clap::Parser;
use creatorlink_api::ApiState;
use creatorlink_server::ServerConfig;
use creatorlink_store_sqlite::{FsPhotoStore, SqliteStore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CreatorLink marketplace server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a one-time sign-in link for this email and exit.
  #[arg(long, value_name = "EMAIL")]
  issue_code: Option<String>,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CREATORLINK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let photo_dir = expand_tilde(&server_cfg.photo_dir);

  let session_ttl = TimeDelta::try_hours(server_cfg.session_ttl_hours)
    .context("session_ttl_hours is out of range")?;
  let code_ttl = TimeDelta::try_minutes(server_cfg.auth_code_ttl_minutes)
    .context("auth_code_ttl_minutes is out of range")?;

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_ttls(session_ttl, code_ttl);

  if let Some(email) = cli.issue_code {
    let code = store
      .issue_code(&email)
      .await
      .with_context(|| format!("failed to issue a sign-in code for {email}"))?;
    let base_url = server_cfg.base_url.trim_end_matches('/');
    println!("{base_url}/auth/callback?code={code}");
    return Ok(());
  }

  let purged = store
    .purge_expired()
    .await
    .context("failed to purge expired sessions")?;
  if purged > 0 {
    tracing::info!(purged, "removed expired sign-in codes and sessions");
  }

  let photos = FsPhotoStore::new(&photo_dir, server_cfg.base_url.clone());
  let state = ApiState::new(Arc::new(store), Arc::new(photos));

  let app = creatorlink_server::router(state, &photo_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
