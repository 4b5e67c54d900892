// trattoria_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  /// Carries the client-facing message; the underlying cause is logged where it occurred.
  #[error("Database Error: {0}")]
  Database(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Converts a domain error, replacing store failures with `message`.
  pub fn from_domain(err: trattoria::Error, message: &str) -> Self {
    if err.is_store_failure() {
      tracing::error!(error = %err, "Store operation failed.");
      AppError::Database(message.to_string())
    } else {
      AppError::from(err)
    }
  }
}

impl From<trattoria::Error> for AppError {
  fn from(err: trattoria::Error) -> Self {
    use trattoria::Error as E;
    match err {
      E::Validation(m) => AppError::Validation(m),
      E::Forbidden(m) => AppError::Forbidden(m),
      E::NotFound(m) => AppError::NotFound(m),
      E::Conflict(m) => AppError::Conflict(m),
      e @ E::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
      E::Database(e) => {
        tracing::error!(error = %e, "Database operation failed.");
        AppError::Database("Database operation failed".to_string())
      }
      E::Workflow { source } => AppError::Internal(source.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    let message = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m)
      | AppError::Database(m) => m.as_str(),
      AppError::Config(_) => "Configuration issue",
      AppError::Internal(_) => "An internal error occurred",
    };
    HttpResponse::build(status).json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
