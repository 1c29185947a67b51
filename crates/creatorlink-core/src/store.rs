//! Backend traits: the relational store, the identity provider, and photo
//! storage.
//!
//! Traits are implemented by backends (e.g. `creatorlink-store-sqlite`).
//! Workflow code and the HTTP layer depend on these abstractions, never on a
//! concrete backend. Every backend error converts into [`crate::Error`] so
//! callers can tell conflicts and missing rows apart from outages.

use std::{collections::HashSet, future::Future};

use uuid::Uuid;

use crate::{
  engagement::{Applicant, JobApplication, SavedJob},
  posting::{JobPosting, NewJobPosting, PostingFields, PostingWithOwner},
  profile::{NewProfile, Profile, ProfileUpdate},
  session::Session,
};

/// Table-level access to profiles, postings, saved jobs and applications.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MarketplaceStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Insert a profile. Fails with a conflict if the id or username is taken.
  fn insert_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn get_profile_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Overwrite the mutable fields. Returns `None` if no such profile exists.
  fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Public creator profiles ordered by username.
  fn list_public_creators(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  // ── Job postings ──────────────────────────────────────────────────────

  /// Every posting joined with its owner, newest first. Unpaginated.
  fn list_postings(
    &self,
  ) -> impl Future<Output = Result<Vec<PostingWithOwner>, Self::Error>> + Send + '_;

  fn get_posting(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PostingWithOwner>, Self::Error>> + Send + '_;

  fn get_posting_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<PostingWithOwner>, Self::Error>> + Send + 'a;

  /// Insert a posting; `id` and `created_at` are assigned by the store.
  fn insert_posting(
    &self,
    input: NewJobPosting,
  ) -> impl Future<Output = Result<JobPosting, Self::Error>> + Send + '_;

  /// Overwrite the editable fields only. Slug and owner are never touched.
  fn update_posting(
    &self,
    id: Uuid,
    fields: PostingFields,
  ) -> impl Future<Output = Result<Option<JobPosting>, Self::Error>> + Send + '_;

  /// Delete a posting and its saved/application rows. Returns `false` if it
  /// did not exist.
  fn delete_posting(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Saved jobs ────────────────────────────────────────────────────────

  fn saved_posting_ids(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<HashSet<Uuid>, Self::Error>> + Send + '_;

  fn is_saved(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fails with a conflict if the pair is already saved.
  fn insert_saved(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<SavedJob, Self::Error>> + Send + '_;

  fn delete_saved(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn find_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<Option<JobApplication>, Self::Error>> + Send + '_;

  /// Fails with a conflict if the pair already applied.
  fn insert_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<JobApplication, Self::Error>> + Send + '_;

  /// Applicants of a posting, most recent application first.
  fn list_applicants(
    &self,
    posting_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Applicant>, Self::Error>> + Send + '_;
}

/// Session issuance and lookup. Tokens are opaque to the application.
pub trait IdentityProvider: Send + Sync {
  type AuthError: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Exchange a one-time authorization code for a session.
  fn exchange_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Session, Self::AuthError>> + Send + 'a;

  /// Look up a live session by token. Expired or unknown tokens yield `None`.
  fn resolve_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::AuthError>> + Send + 'a;

  fn revoke_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<(), Self::AuthError>> + Send + 'a;
}

/// Upload-then-public-URL object storage for profile photos.
pub trait PhotoStorage: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Store `bytes` under `name` and return its public URL.
  fn upload<'a>(
    &'a self,
    name: &'a str,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  fn public_url(&self, name: &str) -> String;
}

/// Lift a backend result into the core error type.
pub trait StoreResultExt<T> {
  fn lift(self) -> crate::Result<T>;
}

impl<T, E: Into<crate::Error>> StoreResultExt<T> for Result<T, E> {
  fn lift(self) -> crate::Result<T> { self.map_err(Into::into) }
}
