//! Handlers for `/posts` and the public-post gate.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/posts` | `?page=<n>`, eight per page, newest first, one signed thumbnail each |
//! | `GET`  | `/posts/{post}` | Post with all images, live stats and the caller's vote |

use axum::{
  extract::{Path, Query, Request, State, rejection::QueryRejection},
  middleware::Next,
  response::Response,
};
use serde::Deserialize;
use tally_core::{
  PostId,
  post::{PAGE_SIZE, Post},
  results::PostView,
  store::Store,
};

use crate::{AppState, address::ClientAddress, envelope::Envelope, error::ApiError};

// ─── Gate ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PostPath {
  pub post: PostId,
}

/// Route layer for `/posts/{post}/…`: 404 unless the post exists and is public.
pub async fn require_public_post<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<PostPath>, axum::extract::rejection::PathRejection>,
  req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: Store + 'static,
{
  let Path(PostPath { post }) =
    path.map_err(|_| ApiError::BadRequest("Invalid post identifier".into()))?;

  let exists = state
    .ctx
    .store
    .post_exists(post)
    .await
    .map_err(|e| ApiError::from(tally_core::Error::storage(e)))?;

  if !exists {
    return Err(ApiError::NotFound("The requested post was not found".into()));
  }
  Ok(next.run(req).await)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub page: usize,
}

/// `GET /posts[?page=<n>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Envelope<Vec<Post>>, ApiError>
where
  S: Store + 'static,
{
  let Query(PageParams { page }) = params.map_err(|_| {
    ApiError::BadRequest(
      "Invalid value for parameter 'page', should be an integer".into(),
    )
  })?;

  let offset = page.saturating_mul(PAGE_SIZE);
  let mut posts = state
    .ctx
    .store
    .list_posts(PAGE_SIZE, offset)
    .await
    .map_err(|e| ApiError::from(tally_core::Error::storage(e)))?;

  for post in &mut posts {
    post.images = state.thumbnails.preview(&post.images);
  }
  Ok(Envelope::ok(posts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts/{post}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(post_id): Path<PostId>,
  ClientAddress(address): ClientAddress,
) -> Result<Envelope<PostView>, ApiError>
where
  S: Store + 'static,
{
  let post = state
    .ctx
    .store
    .get_post(post_id)
    .await
    .map_err(|e| ApiError::from(tally_core::Error::storage(e)))?
    .ok_or_else(|| ApiError::NotFound("The requested post was not found".into()))?;

  let vote = state.ctx.ledger().vote_of(post_id, &address).await?;
  Ok(Envelope::ok(PostView { post, vote }))
}
