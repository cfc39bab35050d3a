//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use trendhub_engine::{IngestFailure, error::BoxError};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Ingest(IngestFailure),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl From<trendhub_engine::Error> for ApiError {
  fn from(e: trendhub_engine::Error) -> Self {
    match e {
      trendhub_engine::Error::Ingest(f) => ApiError::Ingest(f),
      trendhub_engine::Error::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Ingest(f) => {
        tracing::warn!(file = %f.file, error = %f.source, "upload rejected");
        let body = json!({ "error": f.to_string(), "messages": f.messages });
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
          .into_response()
      }
    }
  }
}
