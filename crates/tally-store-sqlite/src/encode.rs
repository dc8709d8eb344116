//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Ids are `INTEGER` (i64) in the
//! database and `u64` in the domain. Vote actions are `-1` / `1`; "no vote" is
//! the absence of a row and has no column encoding.

use chrono::{DateTime, Utc};
use tally_core::{
  identity::{Author, Identity},
  post::{Post, Stats, split_images},
  comment::Comment,
  vote::VoteAction,
};

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: u64) -> Result<i64> {
  i64::try_from(id).map_err(|_| Error::IdOutOfRange(id.to_string()))
}

pub fn decode_id(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::IdOutOfRange(raw.to_string()))
}

pub fn encode_count(n: usize) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::IdOutOfRange(n.to_string()))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── VoteAction ──────────────────────────────────────────────────────────────

pub fn encode_action(action: VoteAction) -> i64 { action.weight() }

pub fn decode_action(raw: i64) -> Result<VoteAction> {
  match raw {
    1 => Ok(VoteAction::Up),
    -1 => Ok(VoteAction::Down),
    other => Err(Error::UnknownVoteAction(other)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `identities` row.
pub struct RawIdentity {
  pub id:      i64,
  pub name:    String,
  pub address: String,
  pub vip:     bool,
  pub staff:   bool,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      id:           decode_id(self.id)?,
      display_name: self.name,
      address:      self.address,
      vip:          self.vip,
      staff:        self.staff,
    })
  }
}

/// Raw values read from a `posts` row joined with its author's identity.
pub struct RawPost {
  pub id:           i64,
  pub title:        String,
  pub text:         String,
  pub images:       String,
  pub verified:     bool,
  pub views:        i64,
  pub created_at:   String,
  pub author_id:    i64,
  pub author_name:  String,
  pub author_vip:   bool,
  pub author_staff: bool,
  pub comments:     i64,
  pub score:        i64,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:       decode_id(self.id)?,
      title:    self.title,
      text:     self.text,
      images:   split_images(&self.images),
      verified: self.verified,
      date:     decode_dt(&self.created_at)?,
      stats:    Stats {
        views:    decode_id(self.views)?,
        comments: decode_id(self.comments)?,
        score:    self.score,
      },
      author:   Author {
        id:    decode_id(self.author_id)?,
        name:  self.author_name,
        vip:   self.author_vip,
        staff: self.author_staff,
      },
    })
  }
}

/// Raw values read from a `comments` row, optionally joined with its author.
pub struct RawComment {
  pub id:         i64,
  pub post_id:    i64,
  pub text:       String,
  pub created_at: String,
  pub author:     Option<(i64, String, bool, bool)>,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    let author = self
      .author
      .map(|(id, name, vip, staff)| -> Result<Author> {
        Ok(Author { id: decode_id(id)?, name, vip, staff })
      })
      .transpose()?;

    Ok(Comment {
      id: decode_id(self.id)?,
      post_id: decode_id(self.post_id)?,
      text: self.text,
      date: decode_dt(&self.created_at)?,
      author,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn action_encoding_is_signed() {
    assert_eq!(encode_action(VoteAction::Up), 1);
    assert_eq!(encode_action(VoteAction::Down), -1);
    assert_eq!(decode_action(-1).unwrap(), VoteAction::Down);
    assert!(matches!(decode_action(0), Err(Error::UnknownVoteAction(0))));
  }

  #[test]
  fn negative_ids_are_rejected() {
    assert!(decode_id(-1).is_err());
    assert!(encode_id(u64::MAX).is_err());
    assert_eq!(decode_id(encode_id(42).unwrap()).unwrap(), 42);
  }
}
