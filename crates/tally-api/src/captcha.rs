//! CAPTCHA verifiers backed by a reCAPTCHA-style `siteverify` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tally_core::captcha::{AlwaysPass, CaptchaVerifier};
use tracing::debug;

/// Google's verification endpoint.
pub const DEFAULT_SITEVERIFY_URL: &str =
  "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
  success: bool,
}

/// Asks the provider whether a response token is valid.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
  client: Client,
  url:    String,
  secret: String,
}

impl RecaptchaVerifier {
  pub fn new(url: impl Into<String>, secret: impl Into<String>) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    Ok(Self { client, url: url.into(), secret: secret.into() })
  }
}

impl CaptchaVerifier for RecaptchaVerifier {
  type Error = reqwest::Error;

  async fn verify(&self, token: String, address: String) -> Result<bool, reqwest::Error> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[
        ("secret", self.secret.as_str()),
        ("response", token.as_str()),
        ("remoteip", address.as_str()),
      ])
      .send()
      .await?
      .error_for_status()?;

    let body: SiteVerifyResponse = resp.json().await?;
    debug!(success = body.success, "captcha verified");
    Ok(body.success)
  }
}

/// The verifier selected at startup.
#[derive(Debug, Clone)]
pub enum Captcha {
  Recaptcha(RecaptchaVerifier),
  /// No secret configured; every token passes.
  Disabled,
}

impl CaptchaVerifier for Captcha {
  type Error = reqwest::Error;

  async fn verify(&self, token: String, address: String) -> Result<bool, reqwest::Error> {
    match self {
      Captcha::Recaptcha(v) => v.verify(token, address).await,
      Captcha::Disabled => AlwaysPass.verify(token, address).await.map_err(|e| match e {}),
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, extract::Query, routing::get};
  use serde_json::{Value, json};
  use std::collections::HashMap;
  use tokio::net::TcpListener;

  use super::*;

  /// Serve a fake `siteverify` that accepts only `good-token` from `1.2.3.4`.
  async fn fake_provider() -> String {
    async fn siteverify(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
      let ok = q.get("secret").map(String::as_str) == Some("s3cret")
        && q.get("response").map(String::as_str) == Some("good-token")
        && q.get("remoteip").map(String::as_str) == Some("1.2.3.4");
      Json(json!({ "success": ok }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/siteverify", get(siteverify));
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/siteverify")
  }

  #[tokio::test]
  async fn recaptcha_passes_valid_token() {
    let url = fake_provider().await;
    let verifier = RecaptchaVerifier::new(url, "s3cret").unwrap();
    assert!(verifier.verify("good-token".into(), "1.2.3.4".into()).await.unwrap());
  }

  #[tokio::test]
  async fn recaptcha_fails_bad_token() {
    let url = fake_provider().await;
    let verifier = RecaptchaVerifier::new(url, "s3cret").unwrap();
    assert!(!verifier.verify("bad-token".into(), "1.2.3.4".into()).await.unwrap());
  }

  #[tokio::test]
  async fn unreachable_provider_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verifier =
      RecaptchaVerifier::new(format!("http://{addr}/siteverify"), "s3cret").unwrap();
    assert!(verifier.verify("good-token".into(), "1.2.3.4".into()).await.is_err());
  }

  #[tokio::test]
  async fn disabled_passes_everything() {
    assert!(Captcha::Disabled.verify(String::new(), String::new()).await.unwrap());
  }
}
