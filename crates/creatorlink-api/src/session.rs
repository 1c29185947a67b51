//! The process-wide session cache and the viewer extractors.
//!
//! Handlers never talk to the identity provider directly: they take a
//! [`CurrentViewer`] or [`MaybeViewer`], which resolve the request's token
//! through one shared [`SessionCache`]. Entries are invalidated on sign-in,
//! sign-out, registration and profile edits, and evicted once expired.

use std::{collections::HashMap, convert::Infallible};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use creatorlink_core::{
  Error, Result,
  session::Viewer,
  store::{PhotoStorage, StoreResultExt as _},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ApiState, Backend, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "creatorlink_session";

/// The session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if let Some(token) = bearer {
    return Some(token.to_owned());
  }
  CookieJar::from_headers(headers)
    .get(SESSION_COOKIE)
    .map(|c| c.value().trim().to_owned())
    .filter(|t| !t.is_empty())
}

// ─── Cache ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Entry {
  viewer:     Viewer,
  expires_at: DateTime<Utc>,
}

/// Token → viewer cache shared by every request.
#[derive(Default)]
pub struct SessionCache {
  entries: RwLock<HashMap<String, Entry>>,
}

impl SessionCache {
  pub fn new() -> Self { Self::default() }

  /// A live cached viewer for `token`. Expired entries are evicted.
  pub async fn get(&self, token: &str) -> Option<Viewer> {
    {
      let entries = self.entries.read().await;
      match entries.get(token) {
        None => return None,
        Some(e) if e.expires_at > Utc::now() => return Some(e.viewer.clone()),
        Some(_) => {}
      }
    }
    self.entries.write().await.remove(token);
    None
  }

  /// Cache `viewer` under `token`, sweeping out every expired entry.
  pub async fn insert(&self, token: String, viewer: Viewer, expires_at: DateTime<Utc>) {
    let now = Utc::now();
    let mut entries = self.entries.write().await;
    entries.retain(|_, e| e.expires_at > now);
    entries.insert(token, Entry { viewer, expires_at });
  }

  pub async fn invalidate(&self, token: &str) {
    self.entries.write().await.remove(token);
  }

  /// Drop every cached session belonging to `user_id`, e.g. after their
  /// profile changed.
  pub async fn invalidate_user(&self, user_id: Uuid) {
    self
      .entries
      .write()
      .await
      .retain(|_, e| e.viewer.identity.user_id != user_id);
  }

  pub async fn len(&self) -> usize { self.entries.read().await.len() }
}

/// Resolve `token` to a viewer, consulting the cache before the backend.
pub async fn load_viewer<S: Backend>(
  store: &S,
  cache: &SessionCache,
  token: &str,
) -> Result<Option<Viewer>> {
  if let Some(viewer) = cache.get(token).await {
    return Ok(Some(viewer));
  }
  let Some(session) = store.resolve_session(token).await.lift()? else {
    return Ok(None);
  };
  let profile = store.get_profile(session.identity.user_id).await.lift()?;
  let viewer = Viewer { identity: session.identity, profile };
  cache
    .insert(token.to_owned(), viewer.clone(), session.expires_at)
    .await;
  Ok(Some(viewer))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The signed-in viewer, if any. Backend failures while resolving the
/// session are logged and the request proceeds as anonymous.
pub struct MaybeViewer(pub Option<Viewer>);

/// The signed-in viewer; rejects anonymous requests with 401.
pub struct CurrentViewer(pub Viewer);

impl<S, P> FromRequestParts<ApiState<S, P>> for MaybeViewer
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let Some(token) = session_token(&parts.headers) else {
      return Ok(MaybeViewer(None));
    };
    match load_viewer(state.store.as_ref(), &state.sessions, &token).await {
      Ok(viewer) => Ok(MaybeViewer(viewer)),
      Err(e) => {
        tracing::error!(error = %e, "session lookup failed; continuing as anonymous");
        Ok(MaybeViewer(None))
      }
    }
  }
}

impl<S, P> FromRequestParts<ApiState<S, P>> for CurrentViewer
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let MaybeViewer(viewer) = match MaybeViewer::from_request_parts(parts, state).await {
      Ok(v) => v,
      Err(never) => match never {},
    };
    viewer
      .map(CurrentViewer)
      .ok_or(ApiError::Core(Error::Unauthenticated))
  }
}
