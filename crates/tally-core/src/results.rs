//! Named result types handed to the transport layer for serialisation.

use serde::{Deserialize, Serialize};

use crate::{comment::Comment, identity::Identity, post::Post, vote::VoteState};

/// Outcome of a vote: the post's score after the vote was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
  pub score: i64,
}

/// The caller's own vote on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStateResult {
  pub vote: VoteState,
}

/// A public profile: the identity and its comments, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user:     Identity,
  pub comments: Vec<Comment>,
}

/// A single post as shown to one caller: the post with its live
/// [`Stats`](crate::post::Stats), plus the caller's own vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
  #[serde(flatten)]
  pub post: Post,
  #[serde(rename = "__vote")]
  pub vote: VoteState,
}
