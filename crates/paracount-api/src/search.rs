//! Handler for `GET /search`.

use axum::{
  Json,
  extract::{Query, State},
};
use paracount_core::{
  search::{SearchResponse, search},
  store::ParagraphStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, identity::Identity};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub word:  String,
  /// At most 10; larger values are clamped.
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchBody {
  pub status:   &'static str,
  #[serde(flatten)]
  pub response: SearchResponse,
}

/// `GET /search?word=...[&limit=...]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Identity(_): Identity,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchBody>, ApiError>
where
  S: ParagraphStore,
{
  let response = search(state.store.as_ref(), &params.word, params.limit).await?;
  Ok(Json(SearchBody { status: "success", response }))
}
