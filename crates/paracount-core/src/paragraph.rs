//! Paragraphs and the word-occurrence facts recorded against them.
//!
//! A paragraph is immutable once created. Its occurrences are written once,
//! at first tokenization, and only ever disappear together with the paragraph.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned paragraph identifier. Monotonically increasing, never
/// reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParagraphId(pub i64);

impl fmt::Display for ParagraphId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// The user a paragraph belongs to, as attached by the upstream
/// access-control layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub user_id:      Uuid,
  pub display_name: String,
}

/// Input to [`ParagraphStore::create_paragraph`](crate::store::ParagraphStore::create_paragraph).
#[derive(Debug, Clone)]
pub struct NewParagraph {
  pub owner:      Owner,
  pub raw_text:   String,
  pub created_at: DateTime<Utc>,
}

impl NewParagraph {
  /// A paragraph stamped with the current time.
  pub fn new(owner: Owner, raw_text: impl Into<String>) -> Self {
    Self { owner, raw_text: raw_text.into(), created_at: Utc::now() }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
  pub paragraph_id: ParagraphId,
  pub owner:        Owner,
  pub raw_text:     String,
  pub created_at:   DateTime<Utc>,
}

/// How many times `word` appeared in a paragraph when it was first tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordOccurrence {
  pub paragraph_id: ParagraphId,
  pub word:         String,
  pub count:        u32,
}

/// One row of a per-word ranking: the paragraph plus the word's count in it.
#[derive(Debug, Clone)]
pub struct RankedParagraph {
  pub paragraph: Paragraph,
  pub count:     u32,
}

/// A word with its count summed over a set of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTotal {
  pub word:  String,
  pub count: u64,
}
