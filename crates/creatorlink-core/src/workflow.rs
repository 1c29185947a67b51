//! Workflow operations: the listing fetcher, the detail view, and the
//! mutation handlers.
//!
//! Every operation takes the backend as a [`MarketplaceStore`] and the
//! caller as an optional [`Viewer`]. Role and ownership guards run before
//! any remote write. A failed write returns the error and leaves local state
//! untouched.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  board::JobBoard,
  engagement::{Applicant, JobApplication},
  filter::{CreatorFilter, filter_creators},
  posting::{JobPostingView, NewJobPosting, PostingFields, PostingForm, PostingWithOwner},
  profile::{Profile, ProfileUpdate},
  registration::{RegistrationForm, check_profile_update},
  session::{Identity, Viewer},
  store::{MarketplaceStore, StoreResultExt as _},
};

/// Wall-clock "now" for deadline checks, in local time.
pub fn local_now() -> NaiveDateTime { Local::now().naive_local() }

// ─── Listing fetcher ─────────────────────────────────────────────────────────

/// Fetch every posting joined with its owner and, for creators, mark the
/// viewer's saved postings.
pub async fn fetch_listing<S: MarketplaceStore>(
  store: &S,
  viewer: Option<&Viewer>,
) -> Result<JobBoard> {
  let joined = store.list_postings().await.lift()?;
  let profile = viewer.and_then(|v| v.profile.as_ref());
  let saved = match profile {
    Some(p) if p.is_creator() => store.saved_posting_ids(p.id).await.lift()?,
    _ => Default::default(),
  };
  let postings = joined
    .into_iter()
    .map(|j| JobPostingView::new(j, false))
    .collect();
  Ok(JobBoard::new(profile.map(|p| p.id), postings, saved))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// What the viewer may do on a posting's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewerActions {
  /// Edit, delete, and review applicants.
  Owner { applicants: Vec<Applicant> },
  /// Save and apply. Applying is disabled once the deadline has passed or
  /// an application exists.
  Creator {
    is_saved:        bool,
    has_applied:     bool,
    deadline_passed: bool,
  },
  /// Neither save nor apply; only a prompt to sign in as a creator.
  SignInPrompt,
}

impl ViewerActions {
  pub fn can_apply(&self) -> bool {
    matches!(
      self,
      ViewerActions::Creator { has_applied: false, deadline_passed: false, .. }
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingDetail {
  pub posting:         JobPostingView,
  pub deadline_passed: bool,
  pub actions:         ViewerActions,
}

/// Load a posting by slug with the viewer's action set.
pub async fn fetch_detail<S: MarketplaceStore>(
  store: &S,
  viewer: Option<&Viewer>,
  slug: &str,
  now: NaiveDateTime,
) -> Result<PostingDetail> {
  let joined = store
    .get_posting_by_slug(slug)
    .await
    .lift()?
    .ok_or(Error::NotFound("job posting"))?;
  let mut posting = JobPostingView::new(joined, false);
  let deadline_passed = posting.is_deadline_passed(now);

  let actions = match viewer.and_then(|v| v.profile.as_ref()) {
    Some(p) if posting.is_owned_by(p.id) => ViewerActions::Owner {
      applicants: store.list_applicants(posting.id).await.lift()?,
    },
    Some(p) if p.is_creator() => {
      let is_saved = store.is_saved(p.id, posting.id).await.lift()?;
      let has_applied = store
        .find_application(p.id, posting.id)
        .await
        .lift()?
        .is_some();
      posting.is_saved = is_saved;
      ViewerActions::Creator { is_saved, has_applied, deadline_passed }
    }
    _ => ViewerActions::SignInPrompt,
  };

  Ok(PostingDetail { posting, deadline_passed, actions })
}

/// Applicants of a posting, newest first. Owner only.
pub async fn list_applicants<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
) -> Result<Vec<Applicant>> {
  owned_posting(store, viewer, posting_id).await?;
  store.list_applicants(posting_id).await.lift()
}

/// Fetch a posting and check that the viewer owns it.
async fn owned_posting<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
) -> Result<PostingWithOwner> {
  let profile = viewer.require_profile()?;
  let joined = store
    .get_posting(posting_id)
    .await
    .lift()?
    .ok_or(Error::NotFound("job posting"))?;
  if joined.posting.profile_id != profile.id {
    return Err(Error::Forbidden("only the owner can manage this posting"));
  }
  Ok(joined)
}

// ─── Posting mutations ───────────────────────────────────────────────────────

/// Create a posting with a fresh slug. Businesses only.
pub async fn create_posting<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  form: PostingForm,
) -> Result<JobPostingView> {
  let owner = viewer.require_business()?;
  let fields = form.validate()?;
  let posting = store
    .insert_posting(NewJobPosting::new(owner.id, fields))
    .await
    .lift()?;
  Ok(JobPostingView::new(
    PostingWithOwner { posting, owner: owner.into() },
    false,
  ))
}

/// Overwrite a posting's editable fields. Owner only; slug and ownership
/// never change.
pub async fn update_posting<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
  form: PostingForm,
) -> Result<PostingFields> {
  owned_posting(store, viewer, posting_id).await?;
  let fields = form.validate()?;
  let updated = store
    .update_posting(posting_id, fields)
    .await
    .lift()?
    .ok_or(Error::NotFound("job posting"))?;
  Ok(updated.fields())
}

/// Delete a posting. Owner only, and only once the owner has confirmed.
pub async fn delete_posting<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
  confirmed: bool,
) -> Result<()> {
  owned_posting(store, viewer, posting_id).await?;
  if !confirmed {
    return Err(Error::ConfirmationRequired);
  }
  if store.delete_posting(posting_id).await.lift()? {
    Ok(())
  } else {
    Err(Error::NotFound("job posting"))
  }
}

// ─── Save / apply ────────────────────────────────────────────────────────────

/// Save or unsave a posting for the viewer. Creators only. Saving twice or
/// unsaving something not saved is not an error.
pub async fn set_saved<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
  saved: bool,
) -> Result<bool> {
  let profile = viewer.require_creator()?;
  if saved {
    if store.get_posting(posting_id).await.lift()?.is_none() {
      return Err(Error::NotFound("job posting"));
    }
    match store.insert_saved(profile.id, posting_id).await.lift() {
      Ok(_) | Err(Error::Conflict(_)) => {}
      Err(e) => return Err(e),
    }
  } else {
    store.delete_saved(profile.id, posting_id).await.lift()?;
  }
  Ok(saved)
}

/// Apply to a posting. Rejected for non-creators, for the posting's owner,
/// after the deadline, and when the viewer already applied.
pub async fn apply_to_posting<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  posting_id: Uuid,
  now: NaiveDateTime,
) -> Result<JobApplication> {
  let profile = viewer.require_creator()?;
  let joined = store
    .get_posting(posting_id)
    .await
    .lift()?
    .ok_or(Error::NotFound("job posting"))?;
  let posting = &joined.posting;
  if posting.profile_id == profile.id {
    return Err(Error::Forbidden("you cannot apply to your own posting"));
  }
  if crate::posting::is_deadline_passed(
    posting.has_deadline,
    posting.deadline_date,
    posting.deadline_time,
    now,
  ) {
    return Err(Error::DeadlinePassed);
  }
  if store
    .find_application(profile.id, posting_id)
    .await
    .lift()?
    .is_some()
  {
    return Err(Error::Conflict("you have already applied to this job".into()));
  }
  store.insert_application(profile.id, posting_id).await.lift()
}

// ─── Local listing state ─────────────────────────────────────────────────────

/// A fetched listing bound to its backend. Each mutation performs the remote
/// write first and patches the local [`JobBoard`] only when it succeeds.
pub struct Listing<'s, S> {
  store:  &'s S,
  viewer: Option<Viewer>,
  board:  JobBoard,
}

impl<'s, S: MarketplaceStore> Listing<'s, S> {
  pub async fn fetch(store: &'s S, viewer: Option<Viewer>) -> Result<Self> {
    let board = fetch_listing(store, viewer.as_ref()).await?;
    Ok(Self { store, viewer, board })
  }

  pub fn board(&self) -> &JobBoard { &self.board }

  /// Mutable access for filter changes.
  pub fn board_mut(&mut self) -> &mut JobBoard { &mut self.board }

  pub fn viewer(&self) -> Option<&Viewer> { self.viewer.as_ref() }

  fn signed_in(&self) -> Result<&Viewer> {
    self.viewer.as_ref().ok_or(Error::Unauthenticated)
  }

  pub async fn create(&mut self, form: PostingForm) -> Result<Uuid> {
    let job = create_posting(self.store, self.signed_in()?, form).await?;
    let id = job.id;
    self.board.insert_created(job);
    Ok(id)
  }

  pub async fn update(&mut self, id: Uuid, form: PostingForm) -> Result<()> {
    let fields = update_posting(self.store, self.signed_in()?, id, form).await?;
    self.board.apply_update(id, &fields);
    Ok(())
  }

  pub async fn delete(&mut self, id: Uuid, confirmed: bool) -> Result<()> {
    delete_posting(self.store, self.signed_in()?, id, confirmed).await?;
    self.board.remove(id);
    Ok(())
  }

  /// Flip the saved state of `id`, returning the new state.
  pub async fn toggle_save(&mut self, id: Uuid) -> Result<bool> {
    let next = !self.board.saved_ids().contains(&id);
    set_saved(self.store, self.signed_in()?, id, next).await?;
    self.board.mark_saved(id, next);
    Ok(next)
  }

  pub async fn apply(&mut self, id: Uuid, now: NaiveDateTime) -> Result<JobApplication> {
    apply_to_posting(self.store, self.signed_in()?, id, now).await
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Insert the profile collected by the registration wizard, keyed by the
/// signed-in identity.
pub async fn register_profile<S: MarketplaceStore>(
  store: &S,
  identity: &Identity,
  form: RegistrationForm,
) -> Result<Profile> {
  if store.get_profile(identity.user_id).await.lift()?.is_some() {
    return Err(Error::Conflict("a profile already exists for this account".into()));
  }
  let input = form.into_new_profile(identity.user_id)?;
  if store
    .get_profile_by_username(&input.username)
    .await
    .lift()?
    .is_some()
  {
    return Err(Error::invalid("username", "Username is already taken"));
  }
  store.insert_profile(input).await.lift()
}

/// Edit the viewer's own profile.
pub async fn update_profile<S: MarketplaceStore>(
  store: &S,
  viewer: &Viewer,
  update: ProfileUpdate,
) -> Result<Profile> {
  let profile = viewer.require_profile()?;
  check_profile_update(&update)?;
  if let Some(other) = store.get_profile_by_username(update.username.trim()).await.lift()?
    && other.id != profile.id
  {
    return Err(Error::invalid("username", "Username is already taken"));
  }
  store
    .update_profile(profile.id, update.for_role(profile.user_type))
    .await
    .lift()?
    .ok_or(Error::NotFound("profile"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorDirectory {
  pub creators: Vec<Profile>,
  /// Public creators before filtering.
  pub total:    usize,
  pub shown:    usize,
}

/// Public creators, filtered client-side.
pub async fn creator_directory<S: MarketplaceStore>(
  store: &S,
  filter: &CreatorFilter,
) -> Result<CreatorDirectory> {
  let all = store.list_public_creators().await.lift()?;
  let creators: Vec<Profile> =
    filter_creators(&all, filter).into_iter().cloned().collect();
  Ok(CreatorDirectory { total: all.len(), shown: creators.len(), creators })
}

/// A creator's public profile. Private profiles are visible only to their
/// owner.
pub async fn creator_profile<S: MarketplaceStore>(
  store: &S,
  viewer: Option<&Viewer>,
  username: &str,
) -> Result<Profile> {
  let profile = store
    .get_profile_by_username(username)
    .await
    .lift()?
    .filter(Profile::is_creator)
    .ok_or(Error::NotFound("creator"))?;
  let own = viewer.and_then(Viewer::profile_id) == Some(profile.id);
  if profile.is_public || own {
    Ok(profile)
  } else {
    Err(Error::NotFound("creator"))
  }
}
