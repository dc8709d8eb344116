//! Handlers for `/posts/{post}/comments`.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tally_core::{PostId, comment::Comment, store::Store};

use crate::{AppState, address::ClientAddress, envelope::Envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub comment: String,
  /// The CAPTCHA response token.
  #[serde(default)]
  pub captcha: String,
}

/// `GET /posts/{post}/comments`, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
) -> Result<Envelope<Vec<Comment>>, ApiError>
where
  S: Store + 'static,
{
  let comments = state.ctx.comments().for_post(post_id).await?;
  Ok(Envelope::ok(comments))
}

/// `POST /posts/{post}/comments`. Body: `{"comment":"...","captcha":"..."}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
  ClientAddress(address): ClientAddress,
  body: Result<Json<CommentBody>, JsonRejection>,
) -> Result<Envelope<Comment>, ApiError>
where
  S: Store + 'static,
{
  let Json(body) = body
    .map_err(|_| ApiError::BadRequest("The body was an invalid JSON payload".into()))?;

  let comment = state
    .ctx
    .comments()
    .submit(state.captcha.as_ref(), post_id, &address, body.comment, body.captcha)
    .await?;
  Ok(Envelope::ok(comment))
}
