//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use creatorlink_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CoreError::ProfileRequired | CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) | CoreError::DeadlinePassed => StatusCode::CONFLICT,
        CoreError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else if matches!(status, StatusCode::CONFLICT | StatusCode::PRECONDITION_REQUIRED) {
      tracing::warn!(error = %self, "request rejected");
    } else {
      tracing::debug!(error = %self, "request rejected");
    }

    let body = match &self {
      ApiError::Core(CoreError::Validation(fields)) => {
        json!({ "error": "validation failed", "fields": fields })
      }
      ApiError::Core(CoreError::Store(_)) => json!({ "error": "backend error" }),
      other => json!({ "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_the_error_taxonomy() {
    let cases = [
      (CoreError::invalid("title", "Title is required"), 400),
      (CoreError::Unauthenticated, 401),
      (CoreError::ProfileRequired, 403),
      (CoreError::Forbidden("nope"), 403),
      (CoreError::NotFound("job posting"), 404),
      (CoreError::DeadlinePassed, 409),
      (CoreError::ConfirmationRequired, 428),
    ];
    for (err, code) in cases {
      assert_eq!(ApiError::from(err).status().as_u16(), code);
    }
  }
}
