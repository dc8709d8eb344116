//! Handlers for the vote ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/posts/{post}/vote`  | Body: `{"action": -1 \| 0 \| 1}`; returns the new score |
//! | `GET`  | `/posts/{post}/vote`  | The caller's own vote as `-1`, `0` or `1` |
//! | `GET`  | `/posts/{post}/score` | `ups - downs` |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tally_core::{
  PostId,
  results::{VoteResult, VoteStateResult},
  store::Store,
};

use crate::{AppState, address::ClientAddress, envelope::Envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub action: i64,
}

/// `POST /posts/{post}/vote`
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
  ClientAddress(address): ClientAddress,
  body: Result<Json<VoteBody>, JsonRejection>,
) -> Result<Envelope<VoteResult>, ApiError>
where
  S: Store + 'static,
{
  let Json(body) = body
    .map_err(|_| ApiError::BadRequest("The body was an invalid JSON payload".into()))?;

  let result = state
    .ctx
    .ledger()
    .cast_vote(post_id, &address, body.action)
    .await
    .map_err(|e| ApiError::from(e).context("The vote action failed"))?;
  Ok(Envelope::ok(result))
}

/// `GET /posts/{post}/score`
pub async fn score<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
) -> Result<Envelope<VoteResult>, ApiError>
where
  S: Store + 'static,
{
  let score = state.ctx.ledger().score_of(post_id).await?;
  Ok(Envelope::ok(VoteResult { score }))
}

/// `GET /posts/{post}/vote`
pub async fn mine<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
  ClientAddress(address): ClientAddress,
) -> Result<Envelope<VoteStateResult>, ApiError>
where
  S: Store + 'static,
{
  let vote = state.ctx.ledger().vote_of(post_id, &address).await?;
  Ok(Envelope::ok(VoteStateResult { vote }))
}
