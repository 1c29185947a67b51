//! Handler for `GET /me`: the session/profile loader.

use axum::Json;
use creatorlink_core::{profile::Profile, session::Identity};
use serde::Serialize;

use crate::session::CurrentViewer;

#[derive(Debug, Serialize)]
pub struct MeResponse {
  pub identity:         Identity,
  pub profile:          Option<Profile>,
  /// False when registration still has to run.
  pub profile_complete: bool,
}

/// `GET /me`: 401 when anonymous.
pub async fn handler(CurrentViewer(viewer): CurrentViewer) -> Json<MeResponse> {
  let profile_complete = viewer.profile.as_ref().is_some_and(Profile::is_complete);
  Json(MeResponse {
    identity: viewer.identity,
    profile: viewer.profile,
    profile_complete,
  })
}
