//! The client-side filter engine.
//!
//! Filtering is a pure function over an in-memory listing: it never mutates
//! its input and is recomputed whenever an input changes. Text matching is a
//! case-insensitive substring test; country matching is exact.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{posting::JobPostingView, profile::Profile};

// ─── Job listing filter ──────────────────────────────────────────────────────

/// Which subset of the listing to show. "Saved only" and "mine only" are
/// mutually exclusive, so they share one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
  #[default]
  All,
  SavedOnly,
  MineOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
  query:   String,
  country: Option<String>,
  scope:   Scope,
}

impl ListingFilter {
  pub fn new() -> Self { Self::default() }

  pub fn query(&self) -> &str { &self.query }

  pub fn country(&self) -> Option<&str> { self.country.as_deref() }

  pub fn scope(&self) -> Scope { self.scope }

  pub fn saved_only(&self) -> bool { self.scope == Scope::SavedOnly }

  pub fn mine_only(&self) -> bool { self.scope == Scope::MineOnly }

  pub fn is_active(&self) -> bool { *self != Self::default() }

  pub fn set_query(&mut self, query: impl Into<String>) {
    self.query = query.into();
  }

  /// An empty country means "any country".
  pub fn set_country(&mut self, country: Option<String>) {
    self.country = country.filter(|c| !c.is_empty());
  }

  /// Enabling "saved only" clears "mine only".
  pub fn set_saved_only(&mut self, on: bool) {
    if on {
      self.scope = Scope::SavedOnly;
    } else if self.saved_only() {
      self.scope = Scope::All;
    }
  }

  /// Enabling "mine only" clears "saved only".
  pub fn set_mine_only(&mut self, on: bool) {
    if on {
      self.scope = Scope::MineOnly;
    } else if self.mine_only() {
      self.scope = Scope::All;
    }
  }

  pub fn toggle_saved_only(&mut self) { self.set_saved_only(!self.saved_only()) }

  pub fn toggle_mine_only(&mut self) { self.set_mine_only(!self.mine_only()) }

  pub fn clear(&mut self) { *self = Self::default(); }

  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    self.set_query(query);
    self
  }

  pub fn with_country(mut self, country: impl Into<String>) -> Self {
    self.set_country(Some(country.into()));
    self
  }

  pub fn with_scope(mut self, scope: Scope) -> Self {
    self.scope = scope;
    self
  }

  /// Whether `job` passes every active predicate. `viewer` is the viewing
  /// profile's id; "mine only" matches nothing without one.
  pub fn matches(&self, job: &JobPostingView, viewer: Option<Uuid>) -> bool {
    match self.scope {
      Scope::All => {}
      Scope::SavedOnly if !job.is_saved => return false,
      Scope::SavedOnly => {}
      Scope::MineOnly => match viewer {
        Some(id) if job.is_owned_by(id) => {}
        _ => return false,
      },
    }

    if let Some(country) = &self.country
      && job.country != *country
    {
      return false;
    }

    if self.query.is_empty() {
      return true;
    }
    let needle = self.query.to_lowercase();
    [
      job.title.as_str(),
      job.description.as_str(),
      job.city.as_str(),
      job.owner_name().as_str(),
    ]
    .iter()
    .any(|hay| hay.to_lowercase().contains(&needle))
  }
}

/// Apply `filter` to the full listing, preserving order.
pub fn filter_postings<'a>(
  postings: &'a [JobPostingView],
  filter:   &ListingFilter,
  viewer:   Option<Uuid>,
) -> Vec<&'a JobPostingView> {
  postings.iter().filter(|job| filter.matches(job, viewer)).collect()
}

// ─── Creator directory filter ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatorFilter {
  #[serde(default, alias = "q")]
  pub query:   String,
  #[serde(default)]
  pub country: String,
}

impl CreatorFilter {
  pub fn matches(&self, creator: &Profile) -> bool {
    if !self.country.is_empty() && creator.country != self.country {
      return false;
    }
    if self.query.is_empty() {
      return true;
    }
    let needle = self.query.to_lowercase();
    [
      creator.username.as_str(),
      creator.first_name.as_str(),
      creator.last_name.as_str(),
      creator.full_name().as_str(),
      creator.city.as_str(),
    ]
    .iter()
    .any(|hay| hay.to_lowercase().contains(&needle))
  }
}

pub fn filter_creators<'a>(
  creators: &'a [Profile],
  filter:   &CreatorFilter,
) -> Vec<&'a Profile> {
  creators.iter().filter(|c| filter.matches(c)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    posting::fixtures::view,
    profile::{Role, fixtures::profile},
  };

  struct Fixture {
    me:       Profile,
    other:    Profile,
    postings: Vec<JobPostingView>,
  }

  fn fixture() -> Fixture {
    let me = profile(Role::Business, "Maria", "Costa");
    let mut other = profile(Role::Business, "John", "Smith");
    other.city = "Berlin".into();
    other.country = "Germany".into();

    let mut a = view(&me, "Summer Campaign", "Beachwear reels");
    a.is_saved = true;
    let b = view(&other, "Winter launch", "Ski gear unboxing");
    let mut c = view(&other, "Coffee review", "Short form video");
    c.is_saved = true;

    Fixture { me, other, postings: vec![a, b, c] }
  }

  fn titles(v: &[&JobPostingView]) -> Vec<String> {
    v.iter().map(|j| j.title.clone()).collect()
  }

  #[test]
  fn empty_filter_returns_everything_in_order() {
    let f = fixture();
    let out = filter_postings(&f.postings, &ListingFilter::new(), None);
    assert_eq!(titles(&out), ["Summer Campaign", "Winter launch", "Coffee review"]);
  }

  #[test]
  fn text_query_is_case_insensitive_across_fields() {
    let f = fixture();
    let by_title = ListingFilter::new().with_query("SUMMER");
    assert_eq!(titles(&filter_postings(&f.postings, &by_title, None)), ["Summer Campaign"]);

    let by_description = ListingFilter::new().with_query("unboxing");
    assert_eq!(
      titles(&filter_postings(&f.postings, &by_description, None)),
      ["Winter launch"]
    );

    let by_city = ListingFilter::new().with_query("berl");
    assert_eq!(filter_postings(&f.postings, &by_city, None).len(), 2);

    let by_full_name = ListingFilter::new().with_query("john smith");
    assert_eq!(filter_postings(&f.postings, &by_full_name, None).len(), 2);
  }

  #[test]
  fn country_is_exact_match() {
    let f = fixture();
    let germany = ListingFilter::new().with_country("Germany");
    assert_eq!(filter_postings(&f.postings, &germany, None).len(), 2);
    let partial = ListingFilter::new().with_country("Germ");
    assert!(filter_postings(&f.postings, &partial, None).is_empty());
  }

  #[test]
  fn empty_country_means_any() {
    let mut filter = ListingFilter::new();
    filter.set_country(Some(String::new()));
    assert_eq!(filter.country(), None);
    assert!(!filter.is_active());
  }

  #[test]
  fn saved_and_mine_are_mutually_exclusive() {
    let mut filter = ListingFilter::new();
    filter.toggle_saved_only();
    assert!(filter.saved_only());
    filter.toggle_mine_only();
    assert!(filter.mine_only());
    assert!(!filter.saved_only());
    filter.set_saved_only(true);
    assert!(filter.saved_only());
    assert!(!filter.mine_only());
    filter.set_mine_only(false);
    assert!(filter.saved_only(), "clearing the inactive toggle is a no-op");
    filter.toggle_saved_only();
    assert_eq!(filter.scope(), Scope::All);
  }

  #[test]
  fn saved_only_and_mine_only_predicates() {
    let f = fixture();
    let saved = ListingFilter::new().with_scope(Scope::SavedOnly);
    assert_eq!(
      titles(&filter_postings(&f.postings, &saved, Some(f.me.id))),
      ["Summer Campaign", "Coffee review"]
    );

    let mine = ListingFilter::new().with_scope(Scope::MineOnly);
    assert_eq!(
      titles(&filter_postings(&f.postings, &mine, Some(f.other.id))),
      ["Winter launch", "Coffee review"]
    );
    assert!(filter_postings(&f.postings, &mine, None).is_empty());
  }

  #[test]
  fn every_combination_yields_a_consistent_subset() {
    let f = fixture();
    let queries = ["", "a", "REVIEW", "lisbon", "maria costa", "zzz"];
    let countries = [None, Some("Germany"), Some("Portugal")];
    let scopes = [Scope::All, Scope::SavedOnly, Scope::MineOnly];
    let viewers = [None, Some(f.me.id), Some(f.other.id)];

    for q in queries {
      for country in countries {
        for scope in scopes {
          for viewer in viewers {
            let mut filter = ListingFilter::new().with_query(q).with_scope(scope);
            filter.set_country(country.map(str::to_owned));
            let out = filter_postings(&f.postings, &filter, viewer);
            assert!(out.len() <= f.postings.len());
            for job in &out {
              assert!(f.postings.contains(job));
              if let Some(c) = country {
                assert_eq!(job.country, c);
              }
              if scope == Scope::SavedOnly {
                assert!(job.is_saved);
              }
              if scope == Scope::MineOnly {
                assert_eq!(Some(job.user_id), viewer);
              }
              if !q.is_empty() {
                let q = q.to_lowercase();
                let hit = job.title.to_lowercase().contains(&q)
                  || job.description.to_lowercase().contains(&q)
                  || job.city.to_lowercase().contains(&q)
                  || job.owner_name().to_lowercase().contains(&q);
                assert!(hit);
              }
            }
          }
        }
      }
    }
  }

  #[test]
  fn creator_filter_matches_username_names_and_city() {
    let mut a = profile(Role::Creator, "Ana", "Silva");
    a.username = "ana.films".into();
    let mut b = profile(Role::Creator, "Tom", "Berg");
    b.city = "Oslo".into();
    b.country = "Norway".into();
    let creators = vec![a, b];

    let by_username = CreatorFilter { query: "FILMS".into(), country: String::new() };
    assert_eq!(filter_creators(&creators, &by_username).len(), 1);

    let by_full = CreatorFilter { query: "tom berg".into(), country: String::new() };
    assert_eq!(filter_creators(&creators, &by_full)[0].first_name, "Tom");

    let by_city = CreatorFilter { query: "osl".into(), country: "Norway".into() };
    assert_eq!(filter_creators(&creators, &by_city).len(), 1);

    let wrong_country = CreatorFilter { query: "osl".into(), country: "Portugal".into() };
    assert!(filter_creators(&creators, &wrong_country).is_empty());
  }
}
