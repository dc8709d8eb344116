//! The JSON response envelope.
//!
//! Success: `{"code": 200, "data": ...}`. Failure: `{"code": 4xx, "errors": [...]}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub code:   u16,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:   Option<T>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<String>,
}

impl<T: Serialize> Envelope<T> {
  pub fn ok(data: T) -> Self {
    Self { code: StatusCode::OK.as_u16(), data: Some(data), errors: Vec::new() }
  }
}

impl Envelope<()> {
  pub fn errors(status: StatusCode, errors: Vec<String>) -> Self {
    Self { code: status.as_u16(), data: None, errors }
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response {
    let status =
      StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(self)).into_response()
  }
}
