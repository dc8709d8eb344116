//! The `Store` trait.
//!
//! Implemented by storage backends (e.g. `tally-store-sqlite`). The store is
//! the single source of truth and the synchronisation boundary: nothing above
//! it caches identities or votes, so every write method here must be atomic on
//! its own.

use std::future::Future;

use crate::{
  PostId,
  comment::{Comment, NewComment},
  identity::{Identity, Lookup},
  post::Post,
  score::Tally,
  vote::VoteAction,
};

/// Abstraction over a Tally storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  fn identity_exists(
    &self,
    lookup: Lookup,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `None` if no identity matches.
  fn get_identity(
    &self,
    lookup: Lookup,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Create an identity for `address` named `name` unless one already exists,
  /// and return whichever identity holds the address afterwards, along with
  /// `true` if this call created it.
  ///
  /// Must be atomic: concurrent calls for one address yield one identity.
  fn insert_identity_if_absent(
    &self,
    address: String,
    name: String,
  ) -> impl Future<Output = Result<(Identity, bool), Self::Error>> + Send + '_;

  // ── Name pool source ──────────────────────────────────────────────────

  fn load_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Add names to the pool, skipping ones already present. Returns how many
  /// were new.
  fn add_names(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Insert or replace the vote for `(post_id, address)` and return the
  /// post's tally afterwards. The write and the count are one atomic step:
  /// on error, nothing was written.
  fn upsert_vote(
    &self,
    post_id: PostId,
    address: String,
    action: VoteAction,
  ) -> impl Future<Output = Result<Tally, Self::Error>> + Send + '_;

  /// Delete the vote for `(post_id, address)`, if any, and return the post's
  /// tally afterwards. Atomic in the same way as [`Store::upsert_vote`].
  fn delete_vote(
    &self,
    post_id: PostId,
    address: String,
  ) -> impl Future<Output = Result<Tally, Self::Error>> + Send + '_;

  /// `None` means the pair has never voted (or retracted its vote).
  fn get_vote(
    &self,
    post_id: PostId,
    address: String,
  ) -> impl Future<Output = Result<Option<VoteAction>, Self::Error>> + Send + '_;

  /// Up/down counts across all rows for `post_id`.
  fn tally(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Tally, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// True iff the post exists and is public.
  fn post_exists(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Public posts, newest first.
  fn list_posts(
    &self,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a comment. The timestamp is assigned by the store; the returned
  /// comment carries no author.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on a post, newest first, each with its author.
  fn comments_for_post(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Comments left by `address`, newest first, without authors.
  fn comments_by_address(
    &self,
    address: String,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;
}
