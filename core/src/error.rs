// trattoria/src/error.rs
use thiserror::Error;

use crate::models::OrderStatus;

/// Errors raised by the workflow engine itself, as opposed to its step handlers.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Workflow finished without producing '{output}'")]
  MissingOutput { output: String },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Order status cannot change from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Database Error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },
}

impl Error {
  /// True for failures of the persistence layer rather than of the request.
  pub fn is_store_failure(&self) -> bool {
    matches!(self, Error::Database(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
