//! Handlers for identities.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/identity` | The caller's identity, provisioned on first call |
//! | `GET`  | `/users/{user}` | Public profile with comments; 404 if unknown |

use axum::extract::{Path, State, rejection::PathRejection};
use tally_core::{IdentityId, identity::Identity, results::Profile, store::Store};

use crate::{AppState, address::ClientAddress, envelope::Envelope, error::ApiError};

/// `GET /identity`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  ClientAddress(address): ClientAddress,
) -> Result<Envelope<Identity>, ApiError>
where
  S: Store + 'static,
{
  let identity = state.ctx.registry().ensure(&address).await?;
  Ok(Envelope::ok(identity))
}

/// `GET /users/{user}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<IdentityId>, PathRejection>,
) -> Result<Envelope<Profile>, ApiError>
where
  S: Store + 'static,
{
  let Path(id) =
    path.map_err(|_| ApiError::BadRequest("Invalid user identifier".into()))?;

  let profile = state.ctx.registry().profile(id).await?;
  Ok(Envelope::ok(profile))
}
