//! Pseudonymous identities keyed by client address.
//!
//! There are no credentials. Whoever presents an address is that address's
//! identity; the display name is assigned once, at random, from the name pool.

use serde::{Deserialize, Serialize};

use crate::IdentityId;

/// A pseudonymous account.
///
/// The address is the natural key and is never serialised: it is only known
/// to the store and to the request that presented it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:           IdentityId,
  #[serde(rename = "name")]
  pub display_name: String,
  #[serde(skip)]
  pub address:      String,
  pub vip:          bool,
  pub staff:        bool,
}

impl Identity {
  /// The public projection shown next to posts and comments.
  pub fn author(&self) -> Author {
    Author {
      id:    self.id,
      name:  self.display_name.clone(),
      vip:   self.vip,
      staff: self.staff,
    }
  }
}

/// Public view of an identity: everything except the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  pub id:    IdentityId,
  pub name:  String,
  pub vip:   bool,
  pub staff: bool,
}

/// How to find an identity. Exactly one key is used per lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
  Id(IdentityId),
  /// Exact, case-sensitive match; no normalisation is applied.
  Address(String),
}

impl Lookup {
  pub fn address(address: impl Into<String>) -> Self {
    Self::Address(address.into())
  }
}

impl std::fmt::Display for Lookup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Lookup::Id(id) => write!(f, "identity {id}"),
      Lookup::Address(addr) => write!(f, "identity for address {addr:?}"),
    }
  }
}
