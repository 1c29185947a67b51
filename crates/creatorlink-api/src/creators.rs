//! Handlers for the creator directory.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/creators` | `?q=&country=`; public creators by username |
//! | `GET`  | `/creators/{username}` | 404 unless public (or the viewer's own) |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use creatorlink_core::{
  filter::CreatorFilter,
  profile::Profile,
  store::PhotoStorage,
  workflow::{self, CreatorDirectory},
};

use crate::{ApiState, Backend, error::ApiError, session::MaybeViewer};

/// `GET /creators[?q=...][&country=...]`
pub async fn list<S, P>(
  State(state): State<ApiState<S, P>>,
  Query(filter): Query<CreatorFilter>,
) -> Result<Json<CreatorDirectory>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  Ok(Json(workflow::creator_directory(state.store.as_ref(), &filter).await?))
}

/// `GET /creators/{username}`
pub async fn get_one<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  Path(username): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let profile =
    workflow::creator_profile(state.store.as_ref(), viewer.as_ref(), &username).await?;
  Ok(Json(profile))
}
