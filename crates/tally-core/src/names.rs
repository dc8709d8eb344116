//! The display name pool.
//!
//! Loaded once at startup and immutable afterwards, so it is shared behind an
//! `Arc` with no locking.

use rand::seq::SliceRandom;

use crate::{Error, Result};

/// A non-empty list of candidate display names.
#[derive(Debug, Clone)]
pub struct NamePool {
  names: Vec<String>,
}

impl NamePool {
  /// Build a pool, dropping blank entries. Fails with
  /// [`Error::EmptyNamePool`] if nothing is left.
  pub fn new(names: impl IntoIterator<Item = String>) -> Result<Self> {
    let names: Vec<String> = names
      .into_iter()
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty())
      .collect();

    if names.is_empty() {
      return Err(Error::EmptyNamePool);
    }
    Ok(Self { names })
  }

  /// Pick a name uniformly at random. Names may repeat across identities.
  pub fn pick(&self) -> &str {
    // Non-empty by construction.
    self
      .names
      .choose(&mut rand::thread_rng())
      .map(String::as_str)
      .unwrap_or_default()
  }

  /// Every name in the pool, blanks already removed.
  pub fn as_slice(&self) -> &[String] { &self.names }
}
