//! HTTP front for creatorlink.
//!
//! Mounts the JSON API under `/api`, the page routes (session guards and the
//! sign-in callback), and static serving of uploaded profile photos.

pub mod pages;
pub mod views;

use std::path::{Path, PathBuf};

use axum::{
  Router,
  routing::{get, post},
};
use creatorlink_api::{ApiState, Backend, api_router};
use creatorlink_core::store::PhotoStorage;
use creatorlink_store_sqlite::{DEFAULT_CODE_TTL_MINUTES, DEFAULT_SESSION_TTL_HOURS};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CREATORLINK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  /// Public origin, used for photo URLs and printed sign-in links.
  pub base_url:              String,
  pub store_path:            PathBuf,
  pub photo_dir:             PathBuf,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:     i64,
  #[serde(default = "default_auth_code_ttl_minutes")]
  pub auth_code_ttl_minutes: i64,
}

fn default_session_ttl_hours() -> i64 { DEFAULT_SESSION_TTL_HOURS }

fn default_auth_code_ttl_minutes() -> i64 { DEFAULT_CODE_TTL_MINUTES }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, P>(state: ApiState<S, P>, photo_dir: impl AsRef<Path>) -> Router
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  Router::new()
    .route("/",                    get(pages::home))
    .route("/register",            get(pages::register))
    .route("/dashboard",           get(pages::dashboard))
    .route("/find-work",           get(pages::find_work::<S, P>))
    .route("/find-work/{slug}",    get(pages::job_detail::<S, P>))
    .route("/creators",            get(pages::creators::<S, P>))
    .route("/creators/{username}", get(pages::creator::<S, P>))
    .route("/auth/callback",       get(pages::auth_callback::<S, P>))
    .route("/auth/error",          get(pages::auth_error))
    .route("/auth/signout",        post(pages::sign_out::<S, P>))
    .with_state(state.clone())
    .nest("/api", api_router(state))
    .nest_service("/photos", ServeDir::new(photo_dir.as_ref()))
    .layer(TraceLayer::new_for_http())
}
