//! Background maintenance loops.
//!
//! Retention pruning and daily statistics each run on their own interval,
//! outside the request path. A failed run is logged and the loop carries on.
//! On shutdown the run in progress finishes and no further run is started.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use paracount_core::{
  maintenance::{run_daily_statistics, run_retention_pruning},
  store::ParagraphStore,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSchedule {
  pub prune_every: Duration,
  pub stats_every: Duration,
  pub retention:   chrono::Duration,
}

/// Spawn one task per maintenance job. The tasks exit once `shutdown`
/// changes.
pub fn spawn_maintenance<S>(
  store: Arc<S>,
  schedule: MaintenanceSchedule,
  shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>>
where
  S: ParagraphStore + 'static,
{
  let prune_store = store.clone();
  let prune_job = move || {
    let store = prune_store.clone();
    async move {
      run_retention_pruning(store.as_ref(), Utc::now(), schedule.retention)
        .await
        .map(|report| debug!(deleted_count = report.deleted_count, "prune run complete"))
    }
  };

  let stats_job = move || {
    let store = store.clone();
    async move {
      run_daily_statistics(store.as_ref(), Utc::now()).await.map(|stats| {
        match serde_json::to_string(&stats) {
          Ok(json) => info!(stats = %json, "daily statistics"),
          Err(e) => warn!(error = %e, "could not serialise daily statistics"),
        }
      })
    }
  };

  let prune = tokio::spawn(job_loop(
    "retention_pruning",
    schedule.prune_every,
    shutdown.clone(),
    prune_job,
  ));
  let stats = tokio::spawn(job_loop("daily_statistics", schedule.stats_every, shutdown, stats_job));

  vec![prune, stats]
}

async fn job_loop<F, Fut>(
  name: &'static str,
  every: Duration,
  mut shutdown: watch::Receiver<bool>,
  mut run: F,
) where
  F: FnMut() -> Fut,
  Fut: Future<Output = paracount_core::Result<()>>,
{
  info!(job = name, interval_secs = every.as_secs(), "maintenance loop started");

  loop {
    tokio::select! {
      _ = tokio::time::sleep(every) => {},
      _ = shutdown.changed() => {
        info!(job = name, "maintenance loop shutting down");
        break;
      }
    }

    if let Err(e) = run().await {
      warn!(job = name, error = %e, "maintenance job failed");
    }
  }
}
