//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::Store`].
//! TLS and proxying are the caller's responsibility; the client address is
//! read from a configurable forwarding header or the socket peer.
//!
//! # Serving
//!
//! ```rust,ignore
//! let app = tally_api::api_router(state);
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
//! ```

pub mod address;
pub mod captcha;
pub mod comments;
pub mod envelope;
pub mod error;
pub mod posts;
pub mod thumbnail;
pub mod users;
pub mod votes;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tally_core::{Context, store::Store};
use tower_http::trace::TraceLayer;

pub use captcha::Captcha;
pub use error::ApiError;
pub use thumbnail::ThumbnailSigner;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub ctx:            Context<S>,
  pub captcha:        Arc<Captcha>,
  pub thumbnails:     Arc<ThumbnailSigner>,
  /// Header carrying the real client address, e.g. `CF-Connecting-IP`.
  pub address_header: Option<Arc<str>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      ctx:            self.ctx.clone(),
      captcha:        self.captcha.clone(),
      thumbnails:     self.thumbnails.clone(),
      address_header: self.address_header.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Store + 'static,
{
  let per_post = Router::new()
    .route("/posts/{post}", get(posts::get_one::<S>))
    .route(
      "/posts/{post}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/posts/{post}/vote", get(votes::mine::<S>).post(votes::cast::<S>))
    .route("/posts/{post}/score", get(votes::score::<S>))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      posts::require_public_post::<S>,
    ));

  Router::new()
    .route("/posts", get(posts::list::<S>))
    .route("/identity", get(users::me::<S>))
    .route("/users/{user}", get(users::get_one::<S>))
    .merge(per_post)
    .fallback(not_found)
    .method_not_allowed_fallback(method_not_allowed)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn not_found() -> ApiError {
  ApiError::NotFound("The requested resource was not found".into())
}

async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }
