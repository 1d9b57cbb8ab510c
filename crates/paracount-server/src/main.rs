//! paracount server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and either serves the JSON API or runs one maintenance job and
//! prints its report.
//!
//! ```text
//! paracount serve            # HTTP API + in-process maintenance scheduler
//! paracount prune            # one retention pruning run
//! paracount stats            # one daily statistics snapshot
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use chrono::Utc;
use clap::{Parser, Subcommand};
use paracount_api::{AppState, api_router};
use paracount_core::maintenance::{run_daily_statistics, run_retention_pruning};
use paracount_server::{ServerConfig, scheduler::spawn_maintenance};
use paracount_store_sqlite::SqliteStore;
use tokio::{net::TcpListener, sync::watch};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Paragraph word-occurrence index")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Delete paragraphs older than the retention period and exit.
  Prune,
  /// Print today's index statistics and exit.
  Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so `prune` and `stats` can print JSON on stdout.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let store_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg, store).await,
    Command::Prune => {
      let report = run_retention_pruning(&store, Utc::now(), cfg.retention())
        .await
        .context("retention pruning failed")?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::Stats => {
      let stats = run_daily_statistics(&store, Utc::now())
        .await
        .context("daily statistics failed")?;
      println!("{}", serde_json::to_string_pretty(&stats)?);
      Ok(())
    }
  }
}

async fn serve(cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let store = Arc::new(store);
  let (shutdown_tx, shutdown_rx) = watch::channel(false);

  let jobs = if cfg.scheduler_enabled {
    spawn_maintenance(store.clone(), cfg.schedule(), shutdown_rx)
  } else {
    tracing::info!("maintenance scheduler disabled");
    Vec::new()
  };

  let state = AppState { store, retry: cfg.retry_policy() };
  let app = Router::new().nest("/api", api_router(state));

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
      tracing::info!("shutdown requested");
    })
    .await
    .context("server error")?;

  shutdown_tx.send(true).ok();
  for job in jobs {
    job.await.ok();
  }

  Ok(())
}
