//! Core types and trait definitions for the Tally backend.
//!
//! This crate holds the anonymous identity and voting subsystem: the
//! [`IdentityRegistry`](registry::IdentityRegistry), the
//! [`VoteLedger`](ledger::VoteLedger), and the scoring helper they share. It is
//! free of HTTP and database dependencies; storage backends implement
//! [`Store`](store::Store).

// Trait impls use native `async fn`; the trait signatures carry the `Send`
// bounds.
#![allow(async_fn_in_trait)]

pub mod captcha;
pub mod comment;
pub mod context;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod names;
pub mod post;
pub mod registry;
pub mod results;
pub mod score;
pub mod store;
pub mod vote;

#[cfg(test)]
mod memory;

pub use context::Context;
pub use error::{Error, Result};

/// Surrogate key of a post.
pub type PostId = u64;

/// Surrogate key of an identity.
pub type IdentityId = u64;
