//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use tally_core::error::BoxError;
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;

const INTERNAL: &str = "An internal server error occurred";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("method not allowed")]
  MethodNotAllowed,

  /// A server-side failure. The first field is shown to the client; the
  /// source is only logged.
  #[error("{0}: {1}")]
  Internal(String, #[source] BoxError),
}

impl ApiError {
  /// Replace the client-facing message of an [`ApiError::Internal`].
  pub fn context(self, message: impl Into<String>) -> Self {
    match self {
      ApiError::Internal(_, source) => ApiError::Internal(message.into(), source),
      other => other,
    }
  }
}

impl From<tally_core::Error> for ApiError {
  fn from(e: tally_core::Error) -> Self {
    use tally_core::Error as E;
    match e {
      E::InvalidInput(m) => ApiError::BadRequest(m),
      E::NotFound(m) => ApiError::NotFound(m),
      E::CaptchaRejected => ApiError::Forbidden("Invalid captcha".into()),
      E::Captcha(source) => ApiError::Internal(
        "Something went wrong while contacting the reCAPTCHA provider".into(),
        source,
      ),
      E::Storage(source) => ApiError::Internal(
        "Something went wrong while retrieving the data".into(),
        source,
      ),
      other @ E::EmptyNamePool => {
        ApiError::Internal("The server is misconfigured".into(), Box::new(other))
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, errors) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, vec![m]),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, vec![m]),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, vec![m]),
      ApiError::MethodNotAllowed => (
        StatusCode::METHOD_NOT_ALLOWED,
        vec!["That method is not allowed on this resource".to_owned()],
      ),
      ApiError::Internal(m, source) => {
        error!(error = %source, "{m}");
        (StatusCode::INTERNAL_SERVER_ERROR, vec![INTERNAL.to_owned(), m])
      }
    };
    Envelope::<()>::errors(status, errors).into_response()
  }
}
