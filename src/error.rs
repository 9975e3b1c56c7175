//! HTTP-facing error type. Store and session errors are mapped to status codes here.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::error;
use validator::ValidationErrors;

use crate::protocol::ErrorOut;
use crate::runtime::SessionError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
  BadRequest(String),
  NotFound(String),
  Conflict(String),
  Internal(String),
}

impl ApiError {
  pub fn not_found(message: impl Into<String>) -> Self {
    ApiError::NotFound(message.into())
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::QuizNotFound(_) => ApiError::NotFound(err.to_string()),
      StoreError::Encode(_) => ApiError::Internal(err.to_string()),
    }
  }
}

impl From<SessionError> for ApiError {
  fn from(err: SessionError) -> Self {
    match err {
      SessionError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
      SessionError::UnknownQuestion(_) => ApiError::BadRequest(err.to_string()),
    }
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(err: ValidationErrors) -> Self {
    ApiError::BadRequest(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
      ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
      ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
      ApiError::Internal(message) => {
        error!(target: "quizbuilder_backend", %message, "Internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, message)
      }
    };
    (status, Json(ErrorOut { message })).into_response()
  }
}
