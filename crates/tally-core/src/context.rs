//! [`Context`]: the explicitly constructed handle bundle.
//!
//! Holds the store and the loaded name pool. The registry, ledger, and comment
//! board are built from it rather than reaching for process-wide globals.

use std::sync::Arc;

use tracing::info;

use crate::{
  Error, Result,
  comment::CommentBoard,
  ledger::VoteLedger,
  names::NamePool,
  registry::IdentityRegistry,
  store::Store,
};

pub struct Context<S> {
  pub store: Arc<S>,
  pub names: Arc<NamePool>,
}

impl<S> Clone for Context<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), names: self.names.clone() }
  }
}

impl<S: Store> Context<S> {
  pub fn new(store: Arc<S>, names: NamePool) -> Self {
    Self { store, names: Arc::new(names) }
  }

  /// Load the name pool from the store. Fails with [`Error::EmptyNamePool`]
  /// if the store has no names.
  pub async fn load(store: Arc<S>) -> Result<Self> {
    let names = store.load_names().await.map_err(Error::storage)?;
    let pool = NamePool::new(names)?;
    info!(names = pool.as_slice().len(), "name pool loaded");
    Ok(Self::new(store, pool))
  }

  pub fn registry(&self) -> IdentityRegistry<S> {
    IdentityRegistry::new(self.store.clone(), self.names.clone())
  }

  pub fn ledger(&self) -> VoteLedger<S> {
    VoteLedger::new(self.store.clone(), self.registry())
  }

  pub fn comments(&self) -> CommentBoard<S> {
    CommentBoard::new(self.store.clone(), self.registry())
  }
}
