//! Score aggregation shared by the ledger, the stores, and post views.
//!
//! A score is never stored. It is always recomputed from the ledger rows as
//! `ups - downs`, so there is no cached value that can drift.

use serde::{Deserialize, Serialize};

use crate::vote::VoteAction;

/// Up/down counts for a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
  pub up:   u64,
  pub down: u64,
}

impl Tally {
  pub fn new(up: u64, down: u64) -> Self { Self { up, down } }

  fn record(&mut self, action: VoteAction) {
    match action {
      VoteAction::Up => self.up += 1,
      VoteAction::Down => self.down += 1,
    }
  }

  /// `ups - downs`, saturating at the `i64` bounds.
  pub fn score(&self) -> i64 {
    let up = i64::try_from(self.up).unwrap_or(i64::MAX);
    let down = i64::try_from(self.down).unwrap_or(i64::MAX);
    up.saturating_sub(down)
  }
}

impl FromIterator<VoteAction> for Tally {
  fn from_iter<I: IntoIterator<Item = VoteAction>>(iter: I) -> Self {
    let mut tally = Tally::default();
    for action in iter {
      tally.record(action);
    }
    tally
  }
}
