//! [`ClientAddress`] extractor.
//!
//! The address is taken from the configured forwarding header (e.g.
//! `CF-Connecting-IP` behind a proxy) when present, else from the socket peer.
//! Whatever string comes out is used as-is; no format validation is done.

use std::net::SocketAddr;

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::request::Parts,
};
use tally_core::store::Store;

use crate::{AppState, error::ApiError};

/// The caller's network address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

fn from_header(parts: &Parts, header: &str) -> Option<String> {
  let value = parts.headers.get(header)?.to_str().ok()?.trim();
  (!value.is_empty()).then(|| value.to_owned())
}

impl<S> FromRequestParts<AppState<S>> for ClientAddress
where
  S: Store + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(header) = state.address_header.as_deref()
      && let Some(address) = from_header(parts, header)
    {
      return Ok(ClientAddress(address));
    }

    parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(peer)| ClientAddress(peer.ip().to_string()))
      .ok_or_else(|| ApiError::BadRequest("Could not determine the client address".into()))
  }
}
