//! The CAPTCHA verifier seam.
//!
//! Verification is a precondition gate for comment submission. Concrete
//! verifiers that talk to a provider live in the API crate.

use std::{convert::Infallible, future::Future};

pub trait CaptchaVerifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Returns `Ok(true)` if `token` is a valid response for `address`.
  /// `Err` means the provider could not be asked, not that the check failed.
  fn verify(
    &self,
    token: String,
    address: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Accepts every token. For local development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPass;

impl CaptchaVerifier for AlwaysPass {
  type Error = Infallible;

  async fn verify(&self, _: String, _: String) -> Result<bool, Infallible> {
    Ok(true)
  }
}
