//! Vote types.
//!
//! Three related enums cover the three places a vote shows up:
//!
//! - [`VoteSignal`]: what the caller asks for (`0` remove, `-1` down, `+1` up).
//! - [`VoteAction`]: what a stored ledger row holds. Only directed votes are
//!   stored; "no vote" is the absence of a row, never a column value.
//! - [`VoteState`]: what is read back for a `(post, address)` pair.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Stored action ───────────────────────────────────────────────────────────

/// A directed vote as held by a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
  Up,
  Down,
}

impl VoteAction {
  /// Signed contribution to a score.
  pub fn weight(self) -> i64 {
    match self {
      VoteAction::Up => 1,
      VoteAction::Down => -1,
    }
  }
}

// ─── Caller signal ───────────────────────────────────────────────────────────

/// The three-way request accepted by
/// [`VoteLedger::cast_vote`](crate::ledger::VoteLedger::cast_vote).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteSignal {
  Remove,
  Down,
  Up,
}

impl VoteSignal {
  /// The row to store, or `None` if the pair's row should be deleted.
  pub fn action(self) -> Option<VoteAction> {
    match self {
      VoteSignal::Remove => None,
      VoteSignal::Down => Some(VoteAction::Down),
      VoteSignal::Up => Some(VoteAction::Up),
    }
  }
}

impl TryFrom<i64> for VoteSignal {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      0 => Ok(VoteSignal::Remove),
      -1 => Ok(VoteSignal::Down),
      1 => Ok(VoteSignal::Up),
      other => Err(Error::InvalidInput(format!(
        "vote action must be -1, 0 or 1, got {other}"
      ))),
    }
  }
}

// ─── Read-back state ─────────────────────────────────────────────────────────

/// The current vote of one identity on one post.
///
/// Serialised as an integer (`-1`, `0`, `1`) so clients can render it next
/// to the score without a lookup table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(into = "i8", try_from = "i8")]
pub enum VoteState {
  #[default]
  None,
  Up,
  Down,
}

impl From<Option<VoteAction>> for VoteState {
  fn from(action: Option<VoteAction>) -> Self {
    match action {
      None => VoteState::None,
      Some(VoteAction::Up) => VoteState::Up,
      Some(VoteAction::Down) => VoteState::Down,
    }
  }
}

impl From<VoteState> for i8 {
  fn from(state: VoteState) -> Self {
    match state {
      VoteState::None => 0,
      VoteState::Up => 1,
      VoteState::Down => -1,
    }
  }
}

impl TryFrom<i8> for VoteState {
  type Error = String;

  fn try_from(value: i8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(VoteState::None),
      1 => Ok(VoteState::Up),
      -1 => Ok(VoteState::Down),
      other => Err(format!("invalid vote state {other}")),
    }
  }
}
