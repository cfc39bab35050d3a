//! trendhub server binary.
//!
//! Settings come from `config.toml` (or `--config`), then `TRENDHUB_*`
//! environment variables, then the `--store`/`--port` flags. The store is
//! opened once and its current date coverage logged before serving.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trendhub_api::{AppState, ServerConfig};
use trendhub_core::store::FactStore as _;
use trendhub_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Loan trend hub server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
  /// SQLite file to serve, overriding `store_path`.
  #[arg(long)]
  store:  Option<PathBuf>,
  /// Listen port, overriding `port`.
  #[arg(short, long)]
  port:   Option<u16>,
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
  let server_cfg = load_config(&cli)?;
  tracing::info!(
    host = %server_cfg.host,
    port = server_cfg.port,
    store = %server_cfg.store_path.display(),
    max_upload_mib = server_cfg.max_upload_bytes / (1024 * 1024),
    "configuration resolved"
  );

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;
  match store.date_bounds().await.context("failed to read store date range")? {
    Some(bounds) => tracing::info!(from = %bounds.min, to = %bounds.max, "store opened"),
    None => tracing::info!("store opened; no reports ingested yet"),
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg),
  };
  let app = trendhub_api::router(state);

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Layer the config file, environment, and command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("TRENDHUB"))
    .build()
    .context("failed to read config file")?;

  let mut cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if let Some(store) = &cli.store {
    cfg.store_path = store.clone();
  }
  if let Some(port) = cli.port {
    cfg.port = port;
  }
  cfg.store_path = expand_tilde(&cfg.store_path);
  Ok(cfg)
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
