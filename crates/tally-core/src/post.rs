//! Posts, as read by the API. Posts are authored elsewhere; this backend only
//! lists them and gates the per-post routes on their existence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PostId, identity::Author};

/// Number of posts per page in listings.
pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:       PostId,
  pub title:    String,
  pub text:     String,
  pub images:   Vec<String>,
  pub verified: bool,
  pub date:     DateTime<Utc>,
  pub stats:    Stats,
  pub author:   Author,
}

/// Counters shown alongside a post. `score` is derived from the vote ledger
/// at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
  pub views:    u64,
  pub comments: u64,
  pub score:    i64,
}

/// Split a comma-separated image column. An empty column means no images.
pub fn split_images(raw: &str) -> Vec<String> {
  if raw.is_empty() {
    return Vec::new();
  }
  raw.split(',').map(str::to_owned).collect()
}
