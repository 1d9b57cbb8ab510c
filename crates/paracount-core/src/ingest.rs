//! The ingest pipeline: raw text → paragraphs → recorded occurrences.
//!
//! A call to [`ingest`] is all-or-nothing. Paragraphs are created and
//! tokenized one at a time in input order; if any step fails, every
//! paragraph created by that call is deleted again before the error is
//! returned. The owner's display name is only updated once the whole batch
//! is stored.
//!
//! [`ingest`] must be polled to completion for that to hold. Callers that
//! can be cancelled, such as HTTP handlers, use [`ingest_to_completion`].

use std::{
  sync::{Arc, LazyLock},
  time::Duration,
};

use backoff::{ExponentialBackoffBuilder, backoff::Backoff as _};
use regex::Regex;
use serde::Serialize;

use crate::{
  Error, Result,
  paragraph::{NewParagraph, Owner, ParagraphId},
  store::ParagraphStore,
  tokenizer::tokenize,
};

static PARAGRAPH_BREAK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\n{2,}").expect("paragraph break pattern compiles"));

// ─── Retry ───────────────────────────────────────────────────────────────────

/// Bounded retry for storage calls that are safe to repeat.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Total attempts, including the first. Zero is treated as one.
  pub attempts: u32,
  /// Initial delay of the exponential backoff between attempts.
  pub backoff:  Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self { Self { attempts: 3, backoff: Duration::from_millis(50) } }
}

impl RetryPolicy {
  /// Run `op` until it succeeds, the attempts are used up, or the backoff
  /// gives up.
  async fn run<T, E, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
  {
    let mut backoff = ExponentialBackoffBuilder::new()
      .with_initial_interval(self.backoff)
      .with_max_elapsed_time(None)
      .build();

    let mut attempts = 0;
    loop {
      attempts += 1;
      let e = match op().await {
        Ok(v) => return Ok(v),
        Err(e) => e,
      };

      if attempts >= self.attempts.max(1) {
        return Err(Error::storage(e));
      }
      match backoff.next_backoff() {
        Some(delay) => {
          tracing::warn!(
            operation = what,
            attempt = attempts,
            error = %e,
            retry_in_ms = delay.as_millis(),
            "storage call failed, retrying"
          );
          tokio::time::sleep(delay).await;
        }
        None => return Err(Error::storage(e)),
      }
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Tokenization statistics for one paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphReport {
  pub paragraph_id: ParagraphId,
  pub total_words:  usize,
  pub unique_words: usize,
  /// Occurrence rows written by this run; zero when the paragraph had
  /// already been tokenized.
  #[serde(skip)]
  pub inserted:     usize,
}

/// Result of tokenizing a single stored paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeOutcome {
  Recorded(ParagraphReport),
  /// The paragraph was deleted before it could be tokenized.
  NotFound(ParagraphId),
}

/// Result of a successful [`ingest`] call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
  pub paragraph_ids: Vec<ParagraphId>,
  pub count:         usize,
  pub paragraphs:    Vec<ParagraphReport>,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Split submitted text into paragraphs at blank lines.
///
/// Two or more consecutive newlines separate paragraphs. Segments are
/// trimmed and empty ones dropped.
pub fn split_paragraphs(raw_text: &str) -> Vec<String> {
  let normalized = raw_text.replace("\r\n", "\n");
  PARAGRAPH_BREAK
    .split(normalized.trim())
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Tokenize a stored paragraph and record its occurrences.
///
/// Safe to call repeatedly: occurrences already recorded are left as they
/// are, so a retry after a storage failure cannot double-count.
pub async fn tokenize_paragraph<S>(
  store: &S,
  id: ParagraphId,
  retry: &RetryPolicy,
) -> Result<TokenizeOutcome>
where
  S: ParagraphStore,
{
  let Some(paragraph) = retry.run("get_paragraph", || store.get_paragraph(id)).await? else {
    return Ok(TokenizeOutcome::NotFound(id));
  };

  let tokens = tokenize(&paragraph.raw_text);
  let inserted = retry
    .run("record_occurrences", || store.record_occurrences(id, &tokens))
    .await?;

  let Some(inserted) = inserted else {
    return Ok(TokenizeOutcome::NotFound(id));
  };

  tracing::debug!(
    paragraph_id = %id,
    total_words = tokens.total_words,
    unique_words = tokens.unique_words,
    inserted,
    "paragraph tokenized"
  );

  Ok(TokenizeOutcome::Recorded(ParagraphReport {
    paragraph_id: id,
    total_words:  tokens.total_words,
    unique_words: tokens.unique_words,
    inserted,
  }))
}

/// Split `raw_text` into paragraphs owned by `owner`, persist each one and
/// record its word occurrences before returning.
pub async fn ingest<S>(
  store: &S,
  owner: &Owner,
  raw_text: &str,
  retry: &RetryPolicy,
) -> Result<IngestOutcome>
where
  S: ParagraphStore,
{
  if raw_text.trim().is_empty() {
    return Err(Error::validation("Please enter at least one paragraph"));
  }

  let segments = split_paragraphs(raw_text);
  if segments.is_empty() {
    return Err(Error::validation("No valid paragraphs found"));
  }

  let mut created: Vec<ParagraphId> = Vec::with_capacity(segments.len());
  let mut reports = Vec::with_capacity(segments.len());

  for segment in segments {
    match ingest_one(store, owner, segment, retry, &mut created).await {
      Ok(report) => reports.push(report),
      Err(cause) => return Err(roll_back(store, created, cause).await),
    }
  }

  if let Err(cause) = retry.run("update_owner", || store.update_owner(owner)).await {
    return Err(roll_back(store, created, cause).await);
  }

  tracing::info!(
    user_id = %owner.user_id,
    paragraphs = created.len(),
    "ingested paragraphs"
  );

  Ok(IngestOutcome { count: created.len(), paragraph_ids: created, paragraphs: reports })
}

/// Run [`ingest`] on its own task and wait for the result.
///
/// Dropping the returned future does not cancel the batch: the task still
/// stores every paragraph or rolls all of them back.
pub async fn ingest_to_completion<S>(
  store: Arc<S>,
  owner: Owner,
  raw_text: String,
  retry: RetryPolicy,
) -> Result<IngestOutcome>
where
  S: ParagraphStore + 'static,
{
  let task =
    tokio::spawn(async move { ingest(store.as_ref(), &owner, &raw_text, &retry).await });
  task.await.map_err(Error::storage)?
}

async fn ingest_one<S>(
  store: &S,
  owner: &Owner,
  segment: String,
  retry: &RetryPolicy,
  created: &mut Vec<ParagraphId>,
) -> Result<ParagraphReport>
where
  S: ParagraphStore,
{
  // Paragraph creation is not idempotent, so it is never retried.
  let paragraph = store
    .create_paragraph(NewParagraph::new(owner.clone(), segment))
    .await
    .map_err(Error::storage)?;
  created.push(paragraph.paragraph_id);

  match tokenize_paragraph(store, paragraph.paragraph_id, retry).await? {
    TokenizeOutcome::Recorded(report) => Ok(report),
    TokenizeOutcome::NotFound(id) => Err(Error::NotFound(id)),
  }
}

/// Delete the paragraphs an aborted ingest created, newest first.
async fn roll_back<S>(store: &S, created: Vec<ParagraphId>, cause: Error) -> Error
where
  S: ParagraphStore,
{
  tracing::warn!(error = %cause, paragraphs = created.len(), "ingest failed, rolling back");

  let mut orphaned = Vec::new();
  for id in created.into_iter().rev() {
    if let Err(e) = store.delete_paragraph(id).await {
      tracing::error!(paragraph_id = %id, error = %e, "rollback could not delete paragraph");
      orphaned.push(id);
    }
  }

  if orphaned.is_empty() {
    cause
  } else {
    Error::PartialIngest { cause: Box::new(cause), orphaned }
  }
}
