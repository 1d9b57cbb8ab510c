//! Text → normalized word counts.
//!
//! Input is `&str`, so encoding is checked where text enters the system
//! (the JSON body extractor rejects invalid UTF-8). Tokenizing itself
//! cannot fail.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Words shorter than this many code points are never indexed.
pub const MIN_WORD_CHARS: usize = 2;

static WORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern compiles"));

/// The result of tokenizing one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
  /// Indexed words and how often each appeared.
  pub counts:       BTreeMap<String, u32>,
  /// Every extracted token, including ones too short to index.
  pub total_words:  usize,
  /// Number of distinct indexed words.
  pub unique_words: usize,
}

impl TokenCounts {
  pub fn is_empty(&self) -> bool { self.counts.is_empty() }

  pub fn get(&self, word: &str) -> Option<u32> { self.counts.get(word).copied() }
}

/// Lowercase `text`, extract `\w+` runs, drop single-character words and
/// count the rest.
pub fn tokenize(text: &str) -> TokenCounts {
  let lowered = text.to_lowercase();
  let mut counts = BTreeMap::new();
  let mut total_words = 0;

  for m in WORD.find_iter(&lowered) {
    total_words += 1;
    let word = m.as_str();
    if word.chars().count() < MIN_WORD_CHARS {
      continue;
    }
    *counts.entry(word.to_owned()).or_insert(0) += 1;
  }

  let unique_words = counts.len();
  TokenCounts { counts, total_words, unique_words }
}
