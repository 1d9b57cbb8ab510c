//! Error types for `paracount-core`.

use thiserror::Error;

use crate::paragraph::ParagraphId;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad or empty caller input. Never retried.
  #[error("{0}")]
  Validation(String),

  #[error("paragraph not found: {0}")]
  NotFound(ParagraphId),

  /// A storage backend failure. Idempotent operations may be retried.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// An ingest batch failed and rolling back its paragraphs did not fully
  /// succeed; `orphaned` lists the paragraphs that could not be removed.
  #[error("ingest failed ({cause}); rollback left paragraphs {orphaned:?}")]
  PartialIngest {
    cause:    Box<Error>,
    orphaned: Vec<ParagraphId>,
  },
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
