//! Comments and the submission flow that guards them.
//!
//! A comment is only accepted after its text passes length checks, the
//! CAPTCHA verifier passes, and the author's identity has been ensured.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, PostId, Result,
  captcha::CaptchaVerifier,
  identity::Author,
  registry::IdentityRegistry,
  store::Store,
};

/// Comment text must be strictly longer than this many characters.
pub const MIN_COMMENT_CHARS: usize = 5;
/// Comment text must be at most this many characters.
pub const MAX_COMMENT_CHARS: usize = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:      u64,
  pub post_id: PostId,
  pub text:    String,
  pub date:    DateTime<Utc>,
  /// Omitted when listing a single identity's own comments.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author:  Option<Author>,
}

/// Input to [`Store::add_comment`]. The timestamp is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id: PostId,
  pub address: String,
  pub text:    String,
}

/// Check comment length limits.
pub fn validate_text(text: &str) -> Result<()> {
  let chars = text.chars().count();
  if chars <= MIN_COMMENT_CHARS {
    return Err(Error::InvalidInput(format!(
      "Field 'comment' must be longer than {MIN_COMMENT_CHARS} characters"
    )));
  }
  if chars > MAX_COMMENT_CHARS {
    return Err(Error::InvalidInput(format!(
      "Field 'comment' must not be longer than {MAX_COMMENT_CHARS} characters"
    )));
  }
  Ok(())
}

// ─── Board ───────────────────────────────────────────────────────────────────

/// Accepts comments on behalf of an address.
pub struct CommentBoard<S> {
  store:    Arc<S>,
  registry: IdentityRegistry<S>,
}

impl<S: Store> CommentBoard<S> {
  pub fn new(store: Arc<S>, registry: IdentityRegistry<S>) -> Self {
    Self { store, registry }
  }

  /// Validate, verify the CAPTCHA, ensure the identity, then persist.
  pub async fn submit<C: CaptchaVerifier>(
    &self,
    verifier: &C,
    post_id: PostId,
    address: &str,
    text: String,
    captcha_token: String,
  ) -> Result<Comment> {
    validate_text(&text)?;

    let passed = verifier
      .verify(captcha_token, address.to_owned())
      .await
      .map_err(|e| Error::Captcha(Box::new(e)))?;
    if !passed {
      return Err(Error::CaptchaRejected);
    }

    let identity = self.registry.ensure(address).await?;

    let mut comment = self
      .store
      .add_comment(NewComment { post_id, address: address.to_owned(), text })
      .await
      .map_err(Error::storage)?;
    comment.author = Some(identity.author());

    debug!(post_id, comment_id = comment.id, "comment stored");
    Ok(comment)
  }

  /// All comments on a post, newest first, with their authors.
  pub async fn for_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
    self.store.comments_for_post(post_id).await.map_err(Error::storage)
  }
}
