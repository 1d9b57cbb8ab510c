//! The `ParagraphStore` trait: the occurrence index and its storage contract.
//!
//! The trait is implemented by storage backends (e.g.
//! `paracount-store-sqlite`). The ingest pipeline, search service and
//! maintenance jobs depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  paragraph::{
    NewParagraph, Owner, Paragraph, ParagraphId, RankedParagraph, WordOccurrence, WordTotal,
  },
  tokenizer::TokenCounts,
};

/// Abstraction over a paragraph store and its word-occurrence index.
///
/// Backends must enforce two invariants natively, not in application code:
///
/// - `(paragraph, word)` is unique across all occurrence rows, and an insert
///   for an existing pair leaves the row untouched.
/// - Deleting a paragraph deletes every occurrence row referencing it.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ParagraphStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Paragraphs ────────────────────────────────────────────────────────

  /// Persist a new paragraph and return it with its assigned id. An owner
  /// seen for the first time is registered under the given display name;
  /// a known owner's name is left as it is.
  fn create_paragraph(
    &self,
    input: NewParagraph,
  ) -> impl Future<Output = Result<Paragraph, Self::Error>> + Send + '_;

  /// Retrieve a paragraph by id. Returns `None` if not found.
  fn get_paragraph(
    &self,
    id: ParagraphId,
  ) -> impl Future<Output = Result<Option<Paragraph>, Self::Error>> + Send + '_;

  /// Delete a paragraph and, by cascade, its occurrences. Returns `false` if
  /// there was nothing to delete.
  fn delete_paragraph(
    &self,
    id: ParagraphId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every paragraph created strictly before `cutoff`. Returns the
  /// number of paragraphs removed.
  fn delete_paragraphs_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Record `owner`'s current display name. Idempotent.
  fn update_owner<'a>(
    &'a self,
    owner: &'a Owner,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Occurrences ───────────────────────────────────────────────────────

  /// Insert one occurrence row per word in `tokens`, skipping words already
  /// recorded for the paragraph. Existing counts are never changed.
  ///
  /// Returns the number of rows inserted, or `None` if the paragraph does
  /// not exist.
  fn record_occurrences<'a>(
    &'a self,
    id: ParagraphId,
    tokens: &'a TokenCounts,
  ) -> impl Future<Output = Result<Option<usize>, Self::Error>> + Send + 'a;

  /// All occurrence rows for a paragraph, ordered by word.
  fn occurrences(
    &self,
    id: ParagraphId,
  ) -> impl Future<Output = Result<Vec<WordOccurrence>, Self::Error>> + Send + '_;

  // ── Rankings and aggregates ───────────────────────────────────────────

  /// Up to `limit` paragraphs containing `word`, by descending count and
  /// then ascending paragraph id.
  fn top_paragraphs_for_word<'a>(
    &'a self,
    word: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<RankedParagraph>, Self::Error>> + Send + 'a;

  fn count_paragraphs(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_occurrences(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The `limit` words with the highest summed count over paragraphs
  /// created on `date` (UTC), ties broken by word.
  fn top_words_for_date(
    &self,
    date: NaiveDate,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<WordTotal>, Self::Error>> + Send + '_;
}
