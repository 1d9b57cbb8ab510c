//! Caller identity, as attached by the upstream access-control layer.
//!
//! Requests reaching this router have already been authenticated. The proxy
//! in front of it forwards the user as two headers:
//!
//! | Header | Value |
//! |--------|-------|
//! | `x-user-id` | the user's UUID |
//! | `x-user-name` | the user's display name |

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use paracount_core::paragraph::Owner;
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extractor: present in a handler means the request carried a user.
pub struct Identity(pub Owner);

/// Read the caller from request headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Owner, ApiError> {
  let header = |name: &str| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
  };

  let user_id = Uuid::parse_str(header(USER_ID_HEADER)?)
    .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ID_HEADER} header")))?;
  let display_name = header(USER_NAME_HEADER)?.to_owned();

  Ok(Owner { user_id, display_name })
}

impl<S> FromRequestParts<S> for Identity
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    identity_from_headers(&parts.headers).map(Identity)
  }
}
