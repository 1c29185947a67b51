//! [`JobBoard`]: the viewer's local copy of the job listing.
//!
//! The board is filled once from the store and then patched in place after
//! each successful remote write; it is never re-fetched after a mutation. It
//! keeps the base listing, the viewer's saved-posting set, the current
//! filter, and the currently visible subset.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  filter::{ListingFilter, filter_postings},
  posting::{JobPostingView, PostingFields},
};

#[derive(Debug, Clone, Default)]
pub struct JobBoard {
  /// Profile id of the viewer, if signed in with a profile.
  viewer:    Option<Uuid>,
  /// Base listing, newest first.
  postings:  Vec<JobPostingView>,
  saved_ids: HashSet<Uuid>,
  filter:    ListingFilter,
  /// Ids of the filtered view, in listing order.
  visible:   Vec<Uuid>,
}

impl JobBoard {
  /// Build a board from freshly fetched postings, marking `is_saved` by
  /// membership in `saved_ids`.
  pub fn new(
    viewer: Option<Uuid>,
    mut postings: Vec<JobPostingView>,
    saved_ids: HashSet<Uuid>,
  ) -> Self {
    for job in &mut postings {
      job.is_saved = saved_ids.contains(&job.id);
    }
    let mut board = Self {
      viewer,
      postings,
      saved_ids,
      filter: ListingFilter::default(),
      visible: Vec::new(),
    };
    board.recompute();
    board
  }

  pub fn viewer(&self) -> Option<Uuid> { self.viewer }

  pub fn postings(&self) -> &[JobPostingView] { &self.postings }

  pub fn saved_ids(&self) -> &HashSet<Uuid> { &self.saved_ids }

  pub fn filter(&self) -> &ListingFilter { &self.filter }

  pub fn get(&self, id: Uuid) -> Option<&JobPostingView> {
    self.postings.iter().find(|job| job.id == id)
  }

  /// The filtered view, in listing order.
  pub fn visible(&self) -> Vec<&JobPostingView> {
    self.visible.iter().filter_map(|id| self.get(*id)).collect()
  }

  pub fn is_visible(&self, id: Uuid) -> bool { self.visible.contains(&id) }

  // ── Filter changes ────────────────────────────────────────────────────────

  /// Replace the filter and recompute the visible set.
  pub fn set_filter(&mut self, filter: ListingFilter) {
    self.filter = filter;
    self.recompute();
  }

  /// Edit the filter in place and recompute the visible set.
  pub fn update_filter(&mut self, edit: impl FnOnce(&mut ListingFilter)) {
    edit(&mut self.filter);
    self.recompute();
  }

  fn recompute(&mut self) {
    self.visible = filter_postings(&self.postings, &self.filter, self.viewer)
      .into_iter()
      .map(|job| job.id)
      .collect();
  }

  // ── Patches after remote writes ───────────────────────────────────────────

  /// Prepend a newly created posting. It joins the visible set only if it
  /// passes the current filter.
  pub fn insert_created(&mut self, job: JobPostingView) {
    let shown = self.filter.matches(&job, self.viewer);
    let id = job.id;
    self.postings.insert(0, job);
    if shown {
      self.visible.insert(0, id);
    }
  }

  /// Overwrite the editable fields of a posting. Returns `false` if the
  /// posting is not on the board.
  pub fn apply_update(&mut self, id: Uuid, fields: &PostingFields) -> bool {
    match self.postings.iter_mut().find(|job| job.id == id) {
      Some(job) => {
        job.apply_fields(fields);
        true
      }
      None => false,
    }
  }

  /// Drop a deleted posting from the listing and the visible set.
  pub fn remove(&mut self, id: Uuid) -> Option<JobPostingView> {
    let idx = self.postings.iter().position(|job| job.id == id)?;
    self.visible.retain(|v| *v != id);
    self.saved_ids.remove(&id);
    Some(self.postings.remove(idx))
  }

  /// Record a save or unsave. Unsaving while "saved only" is active also
  /// removes the posting from the visible set right away.
  pub fn mark_saved(&mut self, id: Uuid, saved: bool) {
    if saved {
      self.saved_ids.insert(id);
    } else {
      self.saved_ids.remove(&id);
      if self.filter.saved_only() {
        self.visible.retain(|v| *v != id);
      }
    }
    if let Some(job) = self.postings.iter_mut().find(|job| job.id == id) {
      job.is_saved = saved;
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    filter::Scope,
    posting::fixtures::view,
    profile::{Role, fixtures::profile},
  };

  fn board() -> (JobBoard, Vec<Uuid>) {
    let business = profile(Role::Business, "Acme", "Co");
    let creator = profile(Role::Creator, "Ana", "Silva");
    let jobs = vec![
      view(&business, "Summer Campaign", "Reels"),
      view(&business, "Autumn Campaign", "Stories"),
    ];
    let ids = jobs.iter().map(|j| j.id).collect::<Vec<_>>();
    let saved = HashSet::from([ids[1]]);
    (JobBoard::new(Some(creator.id), jobs, saved), ids)
  }

  #[test]
  fn new_marks_saved_flags_by_membership() {
    let (b, ids) = board();
    assert!(!b.get(ids[0]).unwrap().is_saved);
    assert!(b.get(ids[1]).unwrap().is_saved);
    assert_eq!(b.visible().len(), 2);
  }

  #[test]
  fn save_then_unsave_round_trips_and_tracks_saved_view() {
    let (mut b, ids) = board();
    let job = ids[0];
    assert!(!b.get(job).unwrap().is_saved);

    b.mark_saved(job, true);
    assert!(b.get(job).unwrap().is_saved);
    b.update_filter(|f| f.set_saved_only(true));
    assert!(b.is_visible(job));

    b.mark_saved(job, false);
    assert!(!b.get(job).unwrap().is_saved);
    assert!(!b.saved_ids().contains(&job));
    assert!(!b.is_visible(job), "unsaved job leaves the saved-only view at once");
    assert_eq!(b.visible().len(), 1);
  }

  #[test]
  fn unsave_without_saved_filter_keeps_job_visible() {
    let (mut b, ids) = board();
    b.mark_saved(ids[1], false);
    assert!(b.is_visible(ids[1]));
    assert!(!b.get(ids[1]).unwrap().is_saved);
  }

  #[test]
  fn created_posting_is_prepended_and_filtered() {
    let (mut b, _) = board();
    let owner = profile(Role::Business, "Other", "Biz");
    b.update_filter(|f| f.set_query("summer"));

    let hidden = view(&owner, "Winter Push", "Snow");
    let hidden_id = hidden.id;
    b.insert_created(hidden);
    assert_eq!(b.postings()[0].id, hidden_id);
    assert!(!b.is_visible(hidden_id));

    let shown = view(&owner, "Summer Encore", "Sun");
    let shown_id = shown.id;
    b.insert_created(shown);
    assert_eq!(b.visible()[0].id, shown_id);
  }

  #[test]
  fn update_patches_fields_but_not_slug() {
    let (mut b, ids) = board();
    let slug = b.get(ids[0]).unwrap().slug.clone();
    let fields = PostingFields {
      title:         "Renamed".into(),
      description:   "New text".into(),
      has_deadline:  true,
      deadline_date: NaiveDate::from_ymd_opt(2030, 1, 1),
      deadline_time: None,
    };
    assert!(b.apply_update(ids[0], &fields));
    let job = b.get(ids[0]).unwrap();
    assert_eq!(job.title, "Renamed");
    assert!(job.has_deadline);
    assert_eq!(job.slug, slug);
    assert!(!b.apply_update(Uuid::new_v4(), &fields));
  }

  #[test]
  fn remove_drops_from_listing_and_view() {
    let (mut b, ids) = board();
    assert!(b.remove(ids[1]).is_some());
    assert!(b.get(ids[1]).is_none());
    assert!(!b.is_visible(ids[1]));
    assert!(!b.saved_ids().contains(&ids[1]));
    assert!(b.remove(ids[1]).is_none());
  }

  #[test]
  fn mine_only_uses_viewer_identity() {
    let (mut b, _) = board();
    b.update_filter(|f| f.set_mine_only(true));
    assert_eq!(b.filter().scope(), Scope::MineOnly);
    assert!(b.visible().is_empty(), "the creator owns nothing");
  }
}
