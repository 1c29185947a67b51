//! JSON API for creatorlink.
//!
//! Exposes an axum [`Router`] backed by any [`MarketplaceStore`] that is also
//! an [`IdentityProvider`], plus a [`PhotoStorage`] for profile photos. TLS
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", creatorlink_api::api_router(state.clone()))
//! ```

pub mod creators;
pub mod error;
pub mod jobs;
pub mod me;
pub mod profile;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use creatorlink_core::store::{IdentityProvider, MarketplaceStore, PhotoStorage};

pub use error::ApiError;
pub use session::{CurrentViewer, MaybeViewer, SESSION_COOKIE, SessionCache};

/// The backend the API runs against: table access plus session lookup.
pub trait Backend: MarketplaceStore + IdentityProvider + 'static {}

impl<T: MarketplaceStore + IdentityProvider + 'static> Backend for T {}

/// Shared state threaded through all handlers.
pub struct ApiState<S, P> {
  pub store:    Arc<S>,
  pub photos:   Arc<P>,
  pub sessions: Arc<SessionCache>,
}

impl<S, P> ApiState<S, P> {
  pub fn new(store: Arc<S>, photos: Arc<P>) -> Self {
    Self { store, photos, sessions: Arc::new(SessionCache::new()) }
  }
}

impl<S, P> Clone for ApiState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      photos:   Arc::clone(&self.photos),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(state: ApiState<S, P>) -> Router<()>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  Router::new()
    // Session & profile
    .route("/me", get(me::handler))
    .route("/profile", post(profile::register::<S, P>).put(profile::update::<S, P>))
    .route("/profile/photo", put(profile::upload_photo::<S, P>))
    // Creators
    .route("/creators", get(creators::list::<S, P>))
    .route("/creators/{username}", get(creators::get_one::<S, P>))
    // Jobs
    .route("/jobs", get(jobs::list::<S, P>).post(jobs::create::<S, P>))
    .route("/jobs/by-slug/{slug}", get(jobs::detail::<S, P>))
    .route("/jobs/{id}", put(jobs::update::<S, P>).delete(jobs::delete::<S, P>))
    .route("/jobs/{id}/save", post(jobs::save::<S, P>).delete(jobs::unsave::<S, P>))
    .route("/jobs/{id}/apply", post(jobs::apply::<S, P>))
    .route("/jobs/{id}/applicants", get(jobs::applicants::<S, P>))
    .with_state(state)
}
