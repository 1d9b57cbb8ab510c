//! JSON REST API for Paracount.
//!
//! Exposes an axum [`Router`] backed by any
//! [`paracount_core::store::ParagraphStore`]. Authentication happens
//! upstream; handlers only read the identity it attaches (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", paracount_api::api_router(state))
//! ```

pub mod error;
pub mod identity;
pub mod paragraphs;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use paracount_core::{ingest::RetryPolicy, store::ParagraphStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store: Arc<S>,
  /// Retry policy for the idempotent tokenization step of ingest.
  pub retry: RetryPolicy,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, retry: RetryPolicy::default() } }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ParagraphStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Paragraphs
    .route("/paragraphs", post(paragraphs::create::<S>))
    .route(
      "/paragraphs/{id}",
      get(paragraphs::get_one::<S>).delete(paragraphs::delete_one::<S>),
    )
    // Search
    .route("/search", get(search::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
