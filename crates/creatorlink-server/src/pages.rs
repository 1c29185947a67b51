//! Server-rendered page routes.
//!
//! These are thin: each one resolves the viewer, applies the page's session
//! guard, and either redirects or renders a template from [`crate::views`].
//! Mutations go through the JSON API.

use axum::{
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, Uri},
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
  CookieJar,
  cookie::{Cookie, SameSite},
};
use creatorlink_api::{ApiState, Backend, MaybeViewer, SESSION_COOKIE, session::session_token};
use creatorlink_core::{
  Error as CoreError,
  filter::CreatorFilter,
  profile::Profile,
  registration::RegistrationWizard,
  store::{PhotoStorage, StoreResultExt as _},
  workflow::{self, local_now},
};
use serde::Deserialize;

use crate::views::{self, render};

const UNKNOWN_AUTH_ERROR: &str = "An unknown authentication error occurred";

/// Only same-site absolute paths are followed after sign-in.
fn is_local_path(url: &str) -> bool {
  url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

/// Sign-in redirect that brings the viewer back to `uri` afterwards.
fn sign_in_then(uri: &Uri) -> Redirect {
  Redirect::to(&format!("/?returnUrl={}", uri.path()))
}

fn load_failure(e: CoreError, what: &'static str, back: &'static str) -> Response {
  match e {
    CoreError::NotFound(_) => views::NotFound { what, back }.into_response(),
    e => {
      tracing::error!(error = %e, "failed to load page");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

// ─── Home ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct HomeParams {
  #[serde(rename = "returnUrl")]
  pub return_url: Option<String>,
}

/// `GET /`: a signed-in viewer arriving with a local `returnUrl` is sent
/// back there.
pub async fn home(
  MaybeViewer(viewer): MaybeViewer,
  Query(params): Query<HomeParams>,
) -> Response {
  if viewer.is_some()
    && let Some(url) = params.return_url.as_deref().filter(|u| is_local_path(u))
  {
    return Redirect::to(url).into_response();
  }
  render(&views::Home { email: viewer.map(|v| v.identity.email) })
}

// ─── Registration ────────────────────────────────────────────────────────────

/// `GET /register`: the wizard shell, prefilled with the identity email.
pub async fn register(MaybeViewer(viewer): MaybeViewer) -> Response {
  let Some(viewer) = viewer else {
    return Redirect::to("/").into_response();
  };
  if viewer.profile.as_ref().is_some_and(Profile::is_complete) {
    return Redirect::to("/dashboard").into_response();
  }
  let wizard = RegistrationWizard::new(viewer.identity.email);
  render(&views::Register::from(&wizard))
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// `GET /dashboard`: anonymous viewers go home; viewers without a complete
/// profile go to `/register`.
pub async fn dashboard(MaybeViewer(viewer): MaybeViewer) -> Response {
  let Some(viewer) = viewer else {
    return Redirect::to("/").into_response();
  };
  let Some(profile) = viewer.profile.filter(Profile::is_complete) else {
    return Redirect::to("/register").into_response();
  };
  render(&views::Dashboard { profile })
}

// ─── Find work ───────────────────────────────────────────────────────────────

/// `GET /find-work`: signed-in only; renders the current listing.
pub async fn find_work<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  uri: Uri,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let Some(viewer) = viewer else {
    return sign_in_then(&uri).into_response();
  };
  let page = match workflow::fetch_listing(state.store.as_ref(), Some(&viewer)).await {
    Ok(board) => views::FindWork {
      postings:    board.visible().into_iter().cloned().collect(),
      total:       board.postings().len(),
      load_failed: false,
    },
    Err(e) => {
      tracing::error!(error = %e, "failed to fetch job postings");
      views::FindWork::failed()
    }
  };
  render(&page)
}

/// `GET /find-work/{slug}`: signed-in only; the posting with the viewer's
/// actions.
pub async fn job_detail<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  Path(slug): Path<String>,
  uri: Uri,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let Some(viewer) = viewer else {
    return sign_in_then(&uri).into_response();
  };
  match workflow::fetch_detail(state.store.as_ref(), Some(&viewer), &slug, local_now()).await {
    Ok(detail) => render(&views::JobDetail::from(detail)),
    Err(e) => load_failure(e, "This job posting", "/find-work"),
  }
}

// ─── Creators ────────────────────────────────────────────────────────────────

/// `GET /creators[?q=...][&country=...]`
pub async fn creators<S, P>(
  State(state): State<ApiState<S, P>>,
  Query(filter): Query<CreatorFilter>,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let page = match workflow::creator_directory(state.store.as_ref(), &filter).await {
    Ok(directory) => views::Creators {
      creators:    directory.creators,
      total:       directory.total,
      load_failed: false,
    },
    Err(e) => {
      tracing::error!(error = %e, "failed to fetch creators");
      views::Creators { creators: Vec::new(), total: 0, load_failed: true }
    }
  };
  render(&page)
}

/// `GET /creators/{username}`
pub async fn creator<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  Path(username): Path<String>,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  match workflow::creator_profile(state.store.as_ref(), viewer.as_ref(), &username).await {
    Ok(profile) => render(&views::Creator::from(profile)),
    Err(e) => load_failure(e, "This creator", "/creators"),
  }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
  pub code: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE, token))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build()
}

/// `GET /auth/callback?code=`: exchange a one-time code for a session and
/// set the session cookie. A session the browser already carried is revoked.
pub async fn auth_callback<S, P>(
  State(state): State<ApiState<S, P>>,
  jar: CookieJar,
  Query(params): Query<CallbackParams>,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let Some(code) = params.code.filter(|c| !c.trim().is_empty()) else {
    return Redirect::to("/").into_response();
  };

  let session = match state.store.exchange_code(code.trim()).await {
    Ok(session) => session,
    Err(e) => {
      let e: CoreError = e.into();
      let target = match e {
        CoreError::Unauthenticated => {
          tracing::warn!("sign-in code rejected");
          "/auth/error?error=invalid_code&error_description=The+sign-in+link+is+invalid+or+has+expired"
        }
        other => {
          tracing::error!(error = %other, "error exchanging code for session");
          "/auth/error?error=server_error"
        }
      };
      return Redirect::to(target).into_response();
    }
  };

  if let Some(previous) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
    && previous != session.token
  {
    if let Err(e) = state.store.revoke_session(&previous).await {
      tracing::warn!(error = %e, "failed to revoke previous session");
    }
    state.sessions.invalidate(&previous).await;
  }
  let user_id = session.identity.user_id;
  state.sessions.invalidate_user(user_id).await;
  tracing::info!(%user_id, "signed in");

  let profile = match state.store.get_profile(user_id).await.lift() {
    Ok(profile) => profile,
    Err(e) => {
      tracing::error!(error = %e, "error checking profile");
      None
    }
  };
  let target = if profile.as_ref().is_some_and(Profile::is_complete) {
    "/dashboard"
  } else {
    "/register"
  };
  (jar.add(session_cookie(session.token)), Redirect::to(target)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthErrorParams {
  pub error:             Option<String>,
  pub error_description: Option<String>,
}

impl AuthErrorParams {
  pub fn message(&self) -> String {
    let present = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    match (present(&self.error), present(&self.error_description)) {
      (Some(error), Some(description)) => format!("{error}: {description}"),
      (Some(error), None) => error,
      (None, _) => UNKNOWN_AUTH_ERROR.to_owned(),
    }
  }
}

/// `GET /auth/error`
pub async fn auth_error(Query(params): Query<AuthErrorParams>) -> Response {
  render(&views::AuthError { message: params.message() })
}

/// `POST /auth/signout`: revoke the session and clear the cookie.
pub async fn sign_out<S, P>(
  State(state): State<ApiState<S, P>>,
  headers: HeaderMap,
  jar: CookieJar,
) -> Response
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  if let Some(token) = session_token(&headers) {
    if let Err(e) = state.store.revoke_session(&token).await {
      tracing::error!(error = %e, "failed to revoke session");
    }
    state.sessions.invalidate(&token).await;
  }
  let removal = Cookie::build(SESSION_COOKIE).path("/");
  (jar.remove(removal), Redirect::to("/")).into_response()
}
