//! Pipeline failure taxonomy and its HTTP mapping.
//!
//! Every stage of the content pipeline reports one of these kinds. Callers
//! apply different fallback policies per kind, so provider/config failures
//! must stay distinguishable from parse and schema failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// Caller-supplied input violated a declared constraint. Never retried.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// No provider credential is configured; the outbound call was never made.
  #[error("generative provider is not configured")]
  NotConfigured,

  /// Transport failure or non-success response from the provider.
  #[error("provider unavailable: {0}")]
  ProviderUnavailable(String),

  /// The provider replied but its text did not decode as structured data.
  #[error("malformed provider output: {0}")]
  MalformedOutput(String),

  /// Decoded structure is missing required fields/shape for the task.
  #[error("schema violation: {0}")]
  SchemaViolation(String),

  /// Valid structure, but zero usable elements survived sanitization.
  #[error("no usable elements after sanitization")]
  EmptyResult,
}

#[derive(Serialize)]
struct ErrorOut {
  error: String,
}

impl PipelineError {
  pub fn status(&self) -> StatusCode {
    match self {
      PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      PipelineError::NotConfigured => StatusCode::NOT_IMPLEMENTED,
      PipelineError::ProviderUnavailable(_)
      | PipelineError::MalformedOutput(_)
      | PipelineError::SchemaViolation(_)
      | PipelineError::EmptyResult => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Message shown to the caller. Provider-side failures collapse into a
  /// generic service message; the detailed cause goes to the logs only.
  fn public_message(&self) -> String {
    match self {
      PipelineError::InvalidInput(m) => m.clone(),
      PipelineError::NotConfigured => "content generation is not configured".into(),
      _ => "content generation failed".into(),
    }
  }
}

impl IntoResponse for PipelineError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = Json(ErrorOut { error: self.public_message() });
    (status, body).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_mapping() {
    assert_eq!(PipelineError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(PipelineError::NotConfigured.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
      PipelineError::ProviderUnavailable("x".into()).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      PipelineError::MalformedOutput("x".into()).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(PipelineError::EmptyResult.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn provider_detail_never_reaches_the_caller() {
    let e = PipelineError::ProviderUnavailable("HTTP 500: secret internals".into());
    assert_eq!(e.public_message(), "content generation failed");
  }
}
