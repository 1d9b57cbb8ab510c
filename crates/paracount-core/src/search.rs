//! Top-K paragraph search by word.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  paragraph::{ParagraphId, RankedParagraph},
  store::ParagraphStore,
  tokenizer::MIN_WORD_CHARS,
};

/// Results returned when the caller does not ask for a limit. Also the most
/// that will ever be returned.
pub const MAX_RESULTS: usize = 10;

/// Characters of paragraph text included in each result.
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
  pub paragraph_id: ParagraphId,
  pub user_name:    String,
  /// The first [`PREVIEW_CHARS`] characters of the paragraph.
  pub raw_text:     String,
  pub word_count:   u32,
  pub created_at:   DateTime<Utc>,
}

impl From<RankedParagraph> for SearchResult {
  fn from(r: RankedParagraph) -> Self {
    Self {
      paragraph_id: r.paragraph.paragraph_id,
      user_name:    r.paragraph.owner.display_name,
      raw_text:     preview(&r.paragraph.raw_text),
      word_count:   r.count,
      created_at:   r.paragraph.created_at,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
  pub word:          String,
  pub results_count: usize,
  pub results:       Vec<SearchResult>,
}

fn preview(text: &str) -> String {
  match text.char_indices().nth(PREVIEW_CHARS) {
    Some((end, _)) => text[..end].to_owned(),
    None => text.to_owned(),
  }
}

/// Normalize a query word: trimmed and lowercased, at least two characters.
pub fn normalize_word(word: &str) -> Result<String> {
  let word = word.trim().to_lowercase();
  if word.is_empty() {
    return Err(Error::validation("Please provide a word parameter"));
  }
  if word.chars().count() < MIN_WORD_CHARS {
    return Err(Error::validation("Word must be at least 2 characters"));
  }
  Ok(word)
}

/// Find the paragraphs in which `word` occurs most often.
///
/// `limit` defaults to [`MAX_RESULTS`] and is capped at it.
pub async fn search<S>(store: &S, word: &str, limit: Option<usize>) -> Result<SearchResponse>
where
  S: ParagraphStore,
{
  let word = normalize_word(word)?;
  let limit = limit.unwrap_or(MAX_RESULTS).min(MAX_RESULTS);

  let ranked = store
    .top_paragraphs_for_word(&word, limit)
    .await
    .map_err(Error::storage)?;

  let results: Vec<SearchResult> = ranked.into_iter().map(SearchResult::from).collect();
  tracing::debug!(word = %word, results = results.len(), "search");

  Ok(SearchResponse { word, results_count: results.len(), results })
}
