//! Scheduled maintenance over the occurrence index.
//!
//! Both jobs take `now` explicitly; the scheduler passes the wall clock.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{Error, Result, paragraph::WordTotal, store::ParagraphStore};

/// How long paragraphs are kept before retention pruning removes them.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

/// Number of words reported in [`DailyStats::top_words_today`].
pub const TOP_WORDS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
  pub deleted_count: u64,
  pub cutoff:        DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
  pub timestamp:         DateTime<Utc>,
  pub total_paragraphs:  u64,
  pub total_occurrences: u64,
  pub top_words_today:   Vec<WordTotal>,
}

/// Delete every paragraph created strictly before `now - retention`.
///
/// Occurrences go with their paragraphs, so an interrupted run leaves no
/// orphans and can simply be run again. A retention shorter than one day is
/// rejected before anything is deleted.
pub async fn run_retention_pruning<S>(
  store: &S,
  now: DateTime<Utc>,
  retention: Duration,
) -> Result<PruneReport>
where
  S: ParagraphStore,
{
  if retention < Duration::days(1) {
    return Err(Error::validation(format!(
      "retention must be at least one day, got {retention}"
    )));
  }
  let cutoff = now
    .checked_sub_signed(retention)
    .ok_or_else(|| Error::validation(format!("retention {retention} is out of range")))?;
  let deleted_count = store
    .delete_paragraphs_before(cutoff)
    .await
    .map_err(Error::storage)?;

  tracing::info!(deleted_count, cutoff = %cutoff, "retention pruning finished");
  Ok(PruneReport { deleted_count, cutoff })
}

/// Snapshot index totals and the most frequent words in paragraphs created
/// on `now`'s calendar date (UTC). Read-only.
pub async fn run_daily_statistics<S>(store: &S, now: DateTime<Utc>) -> Result<DailyStats>
where
  S: ParagraphStore,
{
  let total_paragraphs = store.count_paragraphs().await.map_err(Error::storage)?;
  let total_occurrences = store.count_occurrences().await.map_err(Error::storage)?;
  let top_words_today = store
    .top_words_for_date(now.date_naive(), TOP_WORDS)
    .await
    .map_err(Error::storage)?;

  tracing::info!(
    total_paragraphs,
    total_occurrences,
    top_words = top_words_today.len(),
    "daily statistics computed"
  );

  Ok(DailyStats { timestamp: now, total_paragraphs, total_occurrences, top_words_today })
}
