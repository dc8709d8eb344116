//! [`VoteLedger`] — one mutable vote per identity per post.
//!
//! State per `(post, address)` pair is one of `NoVote`, `Up`, `Down`. Any
//! state can move to any other; re-casting the same direction leaves the row
//! as it was. Writes go through [`Store::upsert_vote`] and
//! [`Store::delete_vote`], both single atomic steps that also return the new
//! tally, so concurrent votes on one pair can never leave two rows behind and
//! a reported failure never leaves a row behind either.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
  Error, PostId, Result,
  registry::IdentityRegistry,
  results::VoteResult,
  score::Tally,
  store::Store,
  vote::{VoteSignal, VoteState},
};

pub struct VoteLedger<S> {
  store:    Arc<S>,
  registry: IdentityRegistry<S>,
}

impl<S> Clone for VoteLedger<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), registry: self.registry.clone() }
  }
}

impl<S: Store> VoteLedger<S> {
  pub fn new(store: Arc<S>, registry: IdentityRegistry<S>) -> Self {
    Self { store, registry }
  }

  /// Apply a raw `{-1, 0, 1}` action from a caller and return the new score.
  ///
  /// Out-of-range actions fail with [`Error::InvalidInput`] before the store
  /// is touched.
  pub async fn cast_vote(
    &self,
    post_id: PostId,
    address: &str,
    action: i64,
  ) -> Result<VoteResult> {
    let signal = VoteSignal::try_from(action)?;
    self.apply(post_id, address, signal).await
  }

  /// Apply an already-validated signal and return the new score.
  pub async fn apply(
    &self,
    post_id: PostId,
    address: &str,
    signal: VoteSignal,
  ) -> Result<VoteResult> {
    self.registry.ensure(address).await?;

    let written = match signal.action() {
      None => self.store.delete_vote(post_id, address.to_owned()).await,
      Some(action) => self.store.upsert_vote(post_id, address.to_owned(), action).await,
    };
    let tally = written.map_err(|e| {
      warn!(post_id, error = %e, "vote action failed");
      Error::storage(e)
    })?;

    debug!(post_id, ?signal, up = tally.up, down = tally.down, "vote applied");
    Ok(VoteResult { score: tally.score() })
  }

  /// `ups - downs` for the post; zero if nobody has voted.
  pub async fn score_of(&self, post_id: PostId) -> Result<i64> {
    Ok(self.tally_of(post_id).await?.score())
  }

  pub async fn tally_of(&self, post_id: PostId) -> Result<Tally> {
    self.store.tally(post_id).await.map_err(Error::storage)
  }

  /// The caller's own vote; [`VoteState::None`] when there is no row.
  pub async fn vote_of(&self, post_id: PostId, address: &str) -> Result<VoteState> {
    self
      .store
      .get_vote(post_id, address.to_owned())
      .await
      .map(VoteState::from)
      .map_err(Error::storage)
  }
}
