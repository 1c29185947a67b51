//! Handlers for `/profile` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/profile` | Registration submit; body: [`RegistrationForm`] |
//! | `PUT`  | `/profile` | Profile edit; body: [`ProfileUpdate`] |
//! | `PUT`  | `/profile/photo?filename=` | Raw image body; returns `{"url":...}` |

use axum::{
  Json,
  body::Bytes,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use creatorlink_core::{
  profile::{Profile, ProfileUpdate},
  registration::{RegistrationForm, photo_object_name},
  store::{PhotoStorage, StoreResultExt as _},
  workflow,
};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiState, Backend, error::ApiError, session::CurrentViewer};

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /profile`: create the viewer's profile from the registration form.
pub async fn register<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let profile =
    workflow::register_profile(state.store.as_ref(), &viewer.identity, form).await?;
  state.sessions.invalidate_user(viewer.identity.user_id).await;
  tracing::info!(username = %profile.username, role = profile.user_type.as_str(), "profile registered");
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// `PUT /profile`
pub async fn update<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let profile = workflow::update_profile(state.store.as_ref(), &viewer, update).await?;
  state.sessions.invalidate_user(viewer.identity.user_id).await;
  Ok(Json(profile))
}

// ─── Photo ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PhotoParams {
  /// Original file name; only its extension is kept.
  pub filename: String,
}

/// `PUT /profile/photo?filename=<name>`: available before registration
/// completes, since the wizard uploads the photo first.
pub async fn upload_photo<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Query(params): Query<PhotoParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest("photo body is empty".into()));
  }
  let name = photo_object_name(viewer.identity.user_id, &params.filename);
  let url = state.photos.upload(&name, body.to_vec()).await.lift()?;
  Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}
