//! In-memory [`Store`] doubles for unit tests.

use std::{collections::BTreeMap, convert::Infallible, sync::Mutex};

use chrono::Utc;
use thiserror::Error;

use crate::{
  PostId,
  captcha::CaptchaVerifier,
  comment::{Comment, NewComment},
  identity::{Identity, Lookup},
  post::Post,
  score::Tally,
  store::Store,
  vote::VoteAction,
};

#[derive(Default)]
struct Inner {
  identities: Vec<Identity>,
  names:      Vec<String>,
  votes:      BTreeMap<(PostId, String), VoteAction>,
  comments:   Vec<(String, Comment)>,
}

impl Inner {
  fn tally(&self, post_id: PostId) -> Tally {
    self
      .votes
      .iter()
      .filter(|((p, _), _)| *p == post_id)
      .map(|(_, action)| *action)
      .collect()
  }
}

/// A store backed by a mutex-guarded map. Every method holds the lock for its
/// whole body, which makes each one atomic.
#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  /// Number of ledger rows for the pair (0 or 1 by construction of the map).
  pub fn rows_for(&self, post_id: PostId, address: &str) -> usize {
    let inner = self.inner.lock().unwrap();
    inner
      .votes
      .keys()
      .filter(|(p, a)| *p == post_id && a == address)
      .count()
  }

  pub fn stored_action(&self, post_id: PostId, address: &str) -> Option<VoteAction> {
    let inner = self.inner.lock().unwrap();
    inner.votes.get(&(post_id, address.to_owned())).copied()
  }
}

fn matches(identity: &Identity, lookup: &Lookup) -> bool {
  match lookup {
    Lookup::Id(id) => identity.id == *id,
    Lookup::Address(addr) => identity.address == *addr,
  }
}

impl Store for MemoryStore {
  type Error = Infallible;

  async fn identity_exists(&self, lookup: Lookup) -> Result<bool, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.identities.iter().any(|i| matches(i, &lookup)))
  }

  async fn get_identity(&self, lookup: Lookup) -> Result<Option<Identity>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.identities.iter().find(|i| matches(i, &lookup)).cloned())
  }

  async fn insert_identity_if_absent(
    &self,
    address: String,
    name: String,
  ) -> Result<(Identity, bool), Infallible> {
    let mut inner = self.inner.lock().unwrap();
    if let Some(existing) = inner.identities.iter().find(|i| i.address == address) {
      return Ok((existing.clone(), false));
    }
    let identity = Identity {
      id: inner.identities.len() as u64 + 1,
      display_name: name,
      address,
      vip: false,
      staff: false,
    };
    inner.identities.push(identity.clone());
    Ok((identity, true))
  }

  async fn load_names(&self) -> Result<Vec<String>, Infallible> {
    Ok(self.inner.lock().unwrap().names.clone())
  }

  async fn add_names(&self, names: Vec<String>) -> Result<usize, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    let mut added = 0;
    for name in names {
      if !inner.names.contains(&name) {
        inner.names.push(name);
        added += 1;
      }
    }
    Ok(added)
  }

  async fn upsert_vote(
    &self,
    post_id: PostId,
    address: String,
    action: VoteAction,
  ) -> Result<Tally, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    inner.votes.insert((post_id, address), action);
    Ok(inner.tally(post_id))
  }

  async fn delete_vote(&self, post_id: PostId, address: String) -> Result<Tally, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    inner.votes.remove(&(post_id, address));
    Ok(inner.tally(post_id))
  }

  async fn get_vote(
    &self,
    post_id: PostId,
    address: String,
  ) -> Result<Option<VoteAction>, Infallible> {
    Ok(self.inner.lock().unwrap().votes.get(&(post_id, address)).copied())
  }

  async fn tally(&self, post_id: PostId) -> Result<Tally, Infallible> {
    Ok(self.inner.lock().unwrap().tally(post_id))
  }

  async fn post_exists(&self, _: PostId) -> Result<bool, Infallible> { Ok(false) }

  async fn get_post(&self, _: PostId) -> Result<Option<Post>, Infallible> { Ok(None) }

  async fn list_posts(&self, _: usize, _: usize) -> Result<Vec<Post>, Infallible> {
    Ok(Vec::new())
  }

  async fn add_comment(&self, input: NewComment) -> Result<Comment, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    let comment = Comment {
      id:      inner.comments.len() as u64 + 1,
      post_id: input.post_id,
      text:    input.text,
      date:    Utc::now(),
      author:  None,
    };
    inner.comments.push((input.address, comment.clone()));
    Ok(comment)
  }

  async fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .comments
        .iter()
        .rev()
        .filter(|(_, c)| c.post_id == post_id)
        .map(|(addr, c)| {
          let author = inner
            .identities
            .iter()
            .find(|i| i.address == *addr)
            .map(Identity::author);
          Comment { author, ..c.clone() }
        })
        .collect(),
    )
  }

  async fn comments_by_address(&self, address: String) -> Result<Vec<Comment>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .comments
        .iter()
        .rev()
        .filter(|(addr, _)| *addr == address)
        .map(|(_, c)| c.clone())
        .collect(),
    )
  }
}

// ─── Failure doubles ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("store unavailable")]
pub struct Unavailable;

/// A store whose every call fails.
pub struct FailingStore;

impl Store for FailingStore {
  type Error = Unavailable;

  async fn identity_exists(&self, _: Lookup) -> Result<bool, Unavailable> { Err(Unavailable) }
  async fn get_identity(&self, _: Lookup) -> Result<Option<Identity>, Unavailable> { Err(Unavailable) }
  async fn insert_identity_if_absent(&self, _: String, _: String) -> Result<(Identity, bool), Unavailable> { Err(Unavailable) }
  async fn load_names(&self) -> Result<Vec<String>, Unavailable> { Err(Unavailable) }
  async fn add_names(&self, _: Vec<String>) -> Result<usize, Unavailable> { Err(Unavailable) }
  async fn upsert_vote(&self, _: PostId, _: String, _: VoteAction) -> Result<Tally, Unavailable> { Err(Unavailable) }
  async fn delete_vote(&self, _: PostId, _: String) -> Result<Tally, Unavailable> { Err(Unavailable) }
  async fn get_vote(&self, _: PostId, _: String) -> Result<Option<VoteAction>, Unavailable> { Err(Unavailable) }
  async fn tally(&self, _: PostId) -> Result<Tally, Unavailable> { Err(Unavailable) }
  async fn post_exists(&self, _: PostId) -> Result<bool, Unavailable> { Err(Unavailable) }
  async fn get_post(&self, _: PostId) -> Result<Option<Post>, Unavailable> { Err(Unavailable) }
  async fn list_posts(&self, _: usize, _: usize) -> Result<Vec<Post>, Unavailable> { Err(Unavailable) }
  async fn add_comment(&self, _: NewComment) -> Result<Comment, Unavailable> { Err(Unavailable) }
  async fn comments_for_post(&self, _: PostId) -> Result<Vec<Comment>, Unavailable> { Err(Unavailable) }
  async fn comments_by_address(&self, _: String) -> Result<Vec<Comment>, Unavailable> { Err(Unavailable) }
}

/// A [`MemoryStore`] whose standalone tally reads always fail. With
/// `fail_writes` set, vote writes fail as well; everything else delegates.
#[derive(Default)]
pub struct VoteFaults {
  pub inner:       MemoryStore,
  pub fail_writes: bool,
}

impl Store for VoteFaults {
  type Error = Unavailable;

  async fn identity_exists(&self, lookup: Lookup) -> Result<bool, Unavailable> {
    self.inner.identity_exists(lookup).await.map_err(|e| match e {})
  }

  async fn get_identity(&self, lookup: Lookup) -> Result<Option<Identity>, Unavailable> {
    self.inner.get_identity(lookup).await.map_err(|e| match e {})
  }

  async fn insert_identity_if_absent(
    &self,
    address: String,
    name: String,
  ) -> Result<(Identity, bool), Unavailable> {
    self.inner.insert_identity_if_absent(address, name).await.map_err(|e| match e {})
  }

  async fn load_names(&self) -> Result<Vec<String>, Unavailable> {
    self.inner.load_names().await.map_err(|e| match e {})
  }

  async fn add_names(&self, names: Vec<String>) -> Result<usize, Unavailable> {
    self.inner.add_names(names).await.map_err(|e| match e {})
  }

  async fn upsert_vote(
    &self,
    post_id: PostId,
    address: String,
    action: VoteAction,
  ) -> Result<Tally, Unavailable> {
    if self.fail_writes {
      return Err(Unavailable);
    }
    self.inner.upsert_vote(post_id, address, action).await.map_err(|e| match e {})
  }

  async fn delete_vote(&self, post_id: PostId, address: String) -> Result<Tally, Unavailable> {
    if self.fail_writes {
      return Err(Unavailable);
    }
    self.inner.delete_vote(post_id, address).await.map_err(|e| match e {})
  }

  async fn get_vote(
    &self,
    post_id: PostId,
    address: String,
  ) -> Result<Option<VoteAction>, Unavailable> {
    self.inner.get_vote(post_id, address).await.map_err(|e| match e {})
  }

  async fn tally(&self, _: PostId) -> Result<Tally, Unavailable> { Err(Unavailable) }

  async fn post_exists(&self, _: PostId) -> Result<bool, Unavailable> { Ok(false) }
  async fn get_post(&self, _: PostId) -> Result<Option<Post>, Unavailable> { Ok(None) }
  async fn list_posts(&self, _: usize, _: usize) -> Result<Vec<Post>, Unavailable> { Ok(Vec::new()) }

  async fn add_comment(&self, input: NewComment) -> Result<Comment, Unavailable> {
    self.inner.add_comment(input).await.map_err(|e| match e {})
  }

  async fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, Unavailable> {
    self.inner.comments_for_post(post_id).await.map_err(|e| match e {})
  }

  async fn comments_by_address(&self, address: String) -> Result<Vec<Comment>, Unavailable> {
    self.inner.comments_by_address(address).await.map_err(|e| match e {})
  }
}

/// A verifier that fails every token.
pub struct RejectAll;

impl CaptchaVerifier for RejectAll {
  type Error = Infallible;

  async fn verify(&self, _: String, _: String) -> Result<bool, Infallible> { Ok(false) }
}
