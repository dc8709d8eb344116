//! [`IdentityRegistry`] — address to pseudonymous identity.

use std::sync::Arc;

use tracing::info;

use crate::{
  Error, IdentityId, Result,
  identity::{Identity, Lookup},
  names::NamePool,
  results::Profile,
  store::Store,
};

/// Resolves client addresses to identities, creating them on first contact.
pub struct IdentityRegistry<S> {
  store: Arc<S>,
  names: Arc<NamePool>,
}

impl<S> Clone for IdentityRegistry<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), names: self.names.clone() }
  }
}

impl<S: Store> IdentityRegistry<S> {
  pub fn new(store: Arc<S>, names: Arc<NamePool>) -> Self {
    Self { store, names }
  }

  /// True iff an identity matches `lookup` (by id or by address, never both).
  pub async fn exists(&self, lookup: Lookup) -> Result<bool> {
    self.store.identity_exists(lookup).await.map_err(Error::storage)
  }

  /// Return the identity for `address`, creating one with a random display
  /// name if there is none yet.
  pub async fn ensure(&self, address: &str) -> Result<Identity> {
    if let Some(existing) = self.get_by_address(address).await? {
      return Ok(existing);
    }

    let name = self.names.pick().to_owned();
    let (identity, created) = self
      .store
      .insert_identity_if_absent(address.to_owned(), name)
      .await
      .map_err(Error::storage)?;

    if created {
      info!(id = identity.id, name = %identity.display_name, "identity provisioned");
    }
    Ok(identity)
  }

  pub async fn get_by_address(&self, address: &str) -> Result<Option<Identity>> {
    self
      .store
      .get_identity(Lookup::address(address))
      .await
      .map_err(Error::storage)
  }

  pub async fn get_by_id(&self, id: IdentityId) -> Result<Option<Identity>> {
    self.store.get_identity(Lookup::Id(id)).await.map_err(Error::storage)
  }

  /// Public profile: the identity and every comment it has left.
  pub async fn profile(&self, id: IdentityId) -> Result<Profile> {
    let user = self
      .get_by_id(id)
      .await?
      .ok_or_else(|| Error::NotFound("The requested user was not found".into()))?;

    let comments = self
      .store
      .comments_by_address(user.address.clone())
      .await
      .map_err(Error::storage)?;

    Ok(Profile { user, comments })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::{
    comment::NewComment,
    memory::{FailingStore, MemoryStore},
  };

  fn registry(names: &[&str]) -> IdentityRegistry<MemoryStore> {
    let pool = NamePool::new(names.iter().map(|n| n.to_string())).unwrap();
    IdentityRegistry::new(Arc::new(MemoryStore::default()), Arc::new(pool))
  }

  #[tokio::test]
  async fn ensure_creates_from_pool() {
    let reg = registry(&["Alpha", "Beta"]);
    assert!(!reg.exists(Lookup::address("1.2.3.4")).await.unwrap());

    let identity = reg.ensure("1.2.3.4").await.unwrap();
    assert!(["Alpha", "Beta"].contains(&identity.display_name.as_str()));
    assert_eq!(identity.address, "1.2.3.4");
    assert!(!identity.vip);
    assert!(!identity.staff);
  }

  #[tokio::test]
  async fn ensure_is_idempotent() {
    let reg = registry(&["Alpha", "Beta"]);
    let first = reg.ensure("1.2.3.4").await.unwrap();
    let second = reg.ensure("1.2.3.4").await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn only_the_first_insert_reports_creation() {
    let store = MemoryStore::default();
    let (first, created) = store
      .insert_identity_if_absent("1.2.3.4".into(), "Alpha".into())
      .await
      .unwrap();
    assert!(created);

    let (second, created) = store
      .insert_identity_if_absent("1.2.3.4".into(), "Beta".into())
      .await
      .unwrap();
    assert!(!created);
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn distinct_addresses_get_distinct_ids() {
    let reg = registry(&["Alpha"]);
    let a = reg.ensure("1.2.3.4").await.unwrap();
    let b = reg.ensure("5.6.7.8").await.unwrap();
    assert_ne!(a.id, b.id);
    // Names are not unique.
    assert_eq!(a.display_name, b.display_name);
  }

  #[tokio::test]
  async fn address_lookup_is_case_sensitive() {
    let reg = registry(&["Alpha"]);
    reg.ensure("fe80::ABCD").await.unwrap();
    assert!(reg.exists(Lookup::address("fe80::ABCD")).await.unwrap());
    assert!(!reg.exists(Lookup::address("fe80::abcd")).await.unwrap());
  }

  #[tokio::test]
  async fn lookup_by_id() {
    let reg = registry(&["Alpha"]);
    let identity = reg.ensure("1.2.3.4").await.unwrap();

    assert!(reg.exists(Lookup::Id(identity.id)).await.unwrap());
    assert_eq!(reg.get_by_id(identity.id).await.unwrap(), Some(identity));
    assert_eq!(reg.get_by_id(9_999).await.unwrap(), None);
  }

  #[tokio::test]
  async fn missing_profile_is_not_found() {
    let reg = registry(&["Alpha"]);
    let err = reg.profile(42).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn profile_lists_own_comments() {
    let store = Arc::new(MemoryStore::default());
    let pool = Arc::new(NamePool::new(vec!["Alpha".to_owned()]).unwrap());
    let reg = IdentityRegistry::new(store.clone(), pool);

    let identity = reg.ensure("1.2.3.4").await.unwrap();
    for text in ["first comment", "second comment"] {
      store
        .add_comment(NewComment {
          post_id: 1,
          address: "1.2.3.4".into(),
          text:    text.into(),
        })
        .await
        .unwrap();
    }
    store
      .add_comment(NewComment {
        post_id: 1,
        address: "5.6.7.8".into(),
        text:    "someone else".into(),
      })
      .await
      .unwrap();

    let profile = reg.profile(identity.id).await.unwrap();
    assert_eq!(profile.user, identity);
    let texts: Vec<_> = profile.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["second comment", "first comment"]);
  }

  #[tokio::test]
  async fn storage_failure_is_not_not_found() {
    let pool = Arc::new(NamePool::new(vec!["Alpha".to_owned()]).unwrap());
    let reg = IdentityRegistry::new(Arc::new(FailingStore), pool);

    let err = reg.get_by_address("1.2.3.4").await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(matches!(reg.ensure("1.2.3.4").await, Err(Error::Storage(_))));
  }
}
