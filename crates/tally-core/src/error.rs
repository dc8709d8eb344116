//! Error types for `tally-core`.

use thiserror::Error;

/// A boxed error raised by a collaborator (store or CAPTCHA provider).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or out-of-range input; rejected before any storage access.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// The name pool is empty. This is a deployment error, raised once when
  /// the pool is loaded, never per request.
  #[error("the display name pool is empty")]
  EmptyNamePool,

  #[error("captcha rejected")]
  CaptchaRejected,

  #[error("captcha provider error: {0}")]
  Captcha(#[source] BoxError),

  #[error("storage failure: {0}")]
  Storage(#[source] BoxError),
}

impl Error {
  /// Wrap a backend error as [`Error::Storage`].
  pub fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
