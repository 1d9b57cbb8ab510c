//! Handlers for `/paragraphs` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/paragraphs` | Body: `{"raw_text":"..."}`; returns 201 + created ids |
//! | `GET`    | `/paragraphs/:id` | Paragraph with its recorded occurrences |
//! | `DELETE` | `/paragraphs/:id` | Owner only; occurrences go with it |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use paracount_core::{
  ingest::{IngestOutcome, ingest_to_completion},
  paragraph::{Paragraph, ParagraphId, WordOccurrence},
  store::ParagraphStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, identity::Identity};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngestBody {
  #[serde(default)]
  pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
  pub status:  &'static str,
  pub message: String,
  #[serde(flatten)]
  pub outcome: IngestOutcome,
}

/// `POST /paragraphs` — split, store and index the submitted text.
///
/// The batch runs on its own task, so a client that disconnects mid-request
/// cannot leave it half-stored.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Identity(owner): Identity,
  Json(body): Json<IngestBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParagraphStore + 'static,
{
  let outcome = ingest_to_completion(state.store, owner, body.raw_text, state.retry).await?;
  let message = format!("Saved and processed {} paragraphs successfully", outcome.count);
  Ok((StatusCode::CREATED, Json(IngestResponse { status: "success", message, outcome })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParagraphDetail {
  #[serde(flatten)]
  pub paragraph:   Paragraph,
  pub occurrences: Vec<WordOccurrence>,
}

/// `GET /paragraphs/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Identity(_): Identity,
  Path(id): Path<ParagraphId>,
) -> Result<Json<ParagraphDetail>, ApiError>
where
  S: ParagraphStore,
{
  let paragraph = state
    .store
    .get_paragraph(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("paragraph {id} not found")))?;
  let occurrences = state
    .store
    .occurrences(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ParagraphDetail { paragraph, occurrences }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /paragraphs/:id` — only the paragraph's owner may delete it.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Identity(caller): Identity,
  Path(id): Path<ParagraphId>,
) -> Result<StatusCode, ApiError>
where
  S: ParagraphStore,
{
  let paragraph = state
    .store
    .get_paragraph(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("paragraph {id} not found")))?;

  if paragraph.owner.user_id != caller.user_id {
    return Err(ApiError::Forbidden(format!("paragraph {id} belongs to another user")));
  }

  let deleted = state
    .store
    .delete_paragraph(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!("paragraph {id} not found")));
  }

  tracing::info!(paragraph_id = %id, user_id = %caller.user_id, "paragraph deleted");
  Ok(StatusCode::NO_CONTENT)
}
