//! Job postings: business-authored listings addressed by a generated slug.
//!
//! A posting is owned by exactly one business profile. Its slug and owner
//! are fixed at creation; only the fields in [`PostingFields`] may change
//! afterwards.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, FieldErrors, Result,
  profile::{Profile, Role},
  random::base36_token,
};

/// Length of the random suffix appended to every slug.
pub const SLUG_SUFFIX_LEN: usize = 6;

// ─── Stored row ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
  pub id:            Uuid,
  pub profile_id:    Uuid,
  pub title:         String,
  pub description:   String,
  pub has_deadline:  bool,
  pub deadline_date: Option<NaiveDate>,
  #[serde(with = "time_hm")]
  pub deadline_time: Option<NaiveTime>,
  pub created_at:    DateTime<Utc>,
  pub slug:          String,
}

impl JobPosting {
  pub fn fields(&self) -> PostingFields {
    PostingFields {
      title:         self.title.clone(),
      description:   self.description.clone(),
      has_deadline:  self.has_deadline,
      deadline_date: self.deadline_date,
      deadline_time: self.deadline_time,
    }
  }

  pub fn deadline(&self) -> Option<NaiveDateTime> {
    deadline_at(self.has_deadline, self.deadline_date, self.deadline_time)
  }
}

// ─── Form input ──────────────────────────────────────────────────────────────

/// The create/edit form as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostingForm {
  #[serde(default)]
  pub title:         String,
  #[serde(default)]
  pub description:   String,
  #[serde(default)]
  pub has_deadline:  bool,
  #[serde(default, deserialize_with = "date_opt::deserialize")]
  pub deadline_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "time_hm::deserialize")]
  pub deadline_time: Option<NaiveTime>,
}

/// Validated, normalised posting fields. The only fields an update may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingFields {
  pub title:         String,
  pub description:   String,
  pub has_deadline:  bool,
  pub deadline_date: Option<NaiveDate>,
  #[serde(with = "time_hm")]
  pub deadline_time: Option<NaiveTime>,
}

impl PostingForm {
  /// Check required fields and normalise the deadline.
  ///
  /// With the deadline disabled, date and time are cleared. A time without a
  /// date carries no meaning and is dropped.
  pub fn validate(self) -> Result<PostingFields> {
    let mut errors = FieldErrors::new();
    if self.title.trim().is_empty() {
      errors.insert("title", "Title is required".into());
    }
    if self.description.trim().is_empty() {
      errors.insert("description", "Description is required".into());
    }
    if self.has_deadline && self.deadline_date.is_none() {
      errors.insert(
        "deadline_date",
        "Date is required when deadline is enabled".into(),
      );
    }
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    let (deadline_date, deadline_time) = if self.has_deadline {
      (self.deadline_date, self.deadline_time)
    } else {
      (None, None)
    };

    Ok(PostingFields {
      title: self.title.trim().to_owned(),
      description: self.description,
      has_deadline: self.has_deadline,
      deadline_date,
      deadline_time: deadline_date.and(deadline_time),
    })
  }
}

/// Input for inserting a posting; id and `created_at` come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobPosting {
  pub profile_id: Uuid,
  pub slug:       String,
  pub fields:     PostingFields,
}

impl NewJobPosting {
  /// Build an insert for `owner`, generating a fresh slug from the title.
  pub fn new(owner: Uuid, fields: PostingFields) -> Self {
    Self {
      profile_id: owner,
      slug:       generate_slug(&fields.title),
      fields,
    }
  }
}

// ─── Slugs ───────────────────────────────────────────────────────────────────

/// Lowercase the title, collapse whitespace runs to `-`, and drop anything
/// outside `[a-z0-9_-]`.
pub fn slug_base(title: &str) -> String {
  let mut out = String::with_capacity(title.len());
  let mut in_space = false;
  for c in title.to_lowercase().chars() {
    if c.is_whitespace() {
      if !in_space {
        out.push('-');
        in_space = true;
      }
      continue;
    }
    in_space = false;
    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
      out.push(c);
    }
  }
  out
}

/// `slug_base(title)` followed by `-` and a random base-36 suffix.
///
/// Uniqueness is probabilistic; the store's UNIQUE constraint catches the
/// rare collision.
pub fn generate_slug(title: &str) -> String {
  format!("{}-{}", slug_base(title), base36_token(SLUG_SUFFIX_LEN))
}

// ─── Deadlines ───────────────────────────────────────────────────────────────

/// Combine a deadline date with its optional time; a missing time means the
/// end of that day (23:59:59).
pub fn deadline_at(
  has_deadline: bool,
  date: Option<NaiveDate>,
  time: Option<NaiveTime>,
) -> Option<NaiveDateTime> {
  if !has_deadline {
    return None;
  }
  date.and_then(|d| match time {
    Some(t) => Some(d.and_time(t)),
    None => d.and_hms_opt(23, 59, 59),
  })
}

/// True iff a deadline exists and `now` is strictly after it.
///
/// Evaluated on every call against the caller's wall clock; nothing is
/// cached.
pub fn is_deadline_passed(
  has_deadline: bool,
  date: Option<NaiveDate>,
  time: Option<NaiveTime>,
  now: NaiveDateTime,
) -> bool {
  deadline_at(has_deadline, date, time).is_some_and(|deadline| now > deadline)
}

/// Parse `HH:MM` or `HH:MM:SS`. Seconds are discarded.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
  let t = NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .ok()?;
  NaiveTime::from_hms_opt(t.hour(), t.minute(), 0)
}

// ─── Joined view model ───────────────────────────────────────────────────────

/// The owner fields selected alongside a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingOwner {
  pub id:                Uuid,
  pub username:          String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub first_name:        String,
  pub last_name:         String,
  pub user_type:         Role,
}

impl From<&Profile> for PostingOwner {
  fn from(p: &Profile) -> Self {
    Self {
      id:                p.id,
      username:          p.username.clone(),
      profile_photo_url: p.profile_photo_url.clone(),
      city:              p.city.clone(),
      country:           p.country.clone(),
      first_name:        p.first_name.clone(),
      last_name:         p.last_name.clone(),
      user_type:         p.user_type,
    }
  }
}

/// A posting row joined with its owner, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingWithOwner {
  pub posting: JobPosting,
  pub owner:   PostingOwner,
}

/// The flattened listing entry rendered by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostingView {
  pub id:                Uuid,
  pub title:             String,
  pub description:       String,
  pub has_deadline:      bool,
  pub deadline_date:     Option<NaiveDate>,
  #[serde(with = "time_hm")]
  pub deadline_time:     Option<NaiveTime>,
  pub created_at:        DateTime<Utc>,
  pub profile_id:        Uuid,
  pub slug:              String,
  pub username:          String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  /// The owner's profile id, duplicated from the join.
  pub user_id:           Uuid,
  pub first_name:        String,
  pub last_name:         String,
  pub user_type:         Role,
  pub is_saved:          bool,
}

impl JobPostingView {
  pub fn new(joined: PostingWithOwner, is_saved: bool) -> Self {
    let PostingWithOwner { posting, owner } = joined;
    Self {
      id: posting.id,
      title: posting.title,
      description: posting.description,
      has_deadline: posting.has_deadline,
      deadline_date: posting.deadline_date,
      deadline_time: posting.deadline_time,
      created_at: posting.created_at,
      profile_id: posting.profile_id,
      slug: posting.slug,
      username: owner.username,
      profile_photo_url: owner.profile_photo_url,
      city: owner.city,
      country: owner.country,
      user_id: owner.id,
      first_name: owner.first_name,
      last_name: owner.last_name,
      user_type: owner.user_type,
      is_saved,
    }
  }

  /// Overwrite the editable fields in place. Slug and owner stay as they are.
  pub fn apply_fields(&mut self, fields: &PostingFields) {
    self.title = fields.title.clone();
    self.description = fields.description.clone();
    self.has_deadline = fields.has_deadline;
    self.deadline_date = fields.deadline_date;
    self.deadline_time = fields.deadline_time;
  }

  pub fn owner_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn is_owned_by(&self, profile_id: Uuid) -> bool {
    self.user_id == profile_id
  }

  pub fn is_deadline_passed(&self, now: NaiveDateTime) -> bool {
    is_deadline_passed(
      self.has_deadline,
      self.deadline_date,
      self.deadline_time,
      now,
    )
  }
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// `Option<NaiveTime>` as `"HH:MM"`; accepts `HH:MM[:SS]` and `""`.
pub(crate) mod time_hm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    t: &Option<NaiveTime>,
    s: S,
  ) -> Result<S::Ok, S::Error> {
    match t {
      Some(t) => s.serialize_some(&t.format("%H:%M").to_string()),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<NaiveTime>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(s) => super::parse_time(s)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid time: {s:?}"))),
    }
  }
}

/// `Option<NaiveDate>` that also accepts `""` as absent.
pub(crate) mod date_opt {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, de::Error as _};

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid date {s:?}: {e}"))),
    }
  }
}

#[cfg(test)]
pub(crate) mod fixtures {
  use super::*;

  pub fn view(owner: &Profile, title: &str, description: &str) -> JobPostingView {
    let posting = JobPosting {
      id:            Uuid::new_v4(),
      profile_id:    owner.id,
      title:         title.into(),
      description:   description.into(),
      has_deadline:  false,
      deadline_date: None,
      deadline_time: None,
      created_at:    Utc::now(),
      slug:          generate_slug(title),
    };
    JobPostingView::new(
      PostingWithOwner { posting, owner: PostingOwner::from(owner) },
      false,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
  }

  fn assert_suffix(slug: &str, prefix: &str) {
    let suffix = slug.strip_prefix(prefix).unwrap_or_else(|| panic!("{slug}"));
    assert_eq!(suffix.len(), SLUG_SUFFIX_LEN, "{slug}");
    assert!(
      suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
      "{slug}"
    );
  }

  // ── Slugs ─────────────────────────────────────────────────────────────────

  #[test]
  fn summer_campaign_slug() {
    assert_suffix(&generate_slug("Summer Campaign"), "summer-campaign-");
  }

  #[test]
  fn slug_strips_punctuation_and_collapses_spaces() {
    assert_eq!(slug_base("  Hello,   World! "), "-hello-world-");
    assert_eq!(slug_base("UGC video (x3) for Café"), "ugc-video-x3-for-caf");
    assert_eq!(slug_base("snake_case-ok"), "snake_case-ok");
  }

  #[test]
  fn slugs_differ_between_calls() {
    let a = generate_slug("Same Title");
    let b = generate_slug("Same Title");
    assert_suffix(&a, "same-title-");
    assert_suffix(&b, "same-title-");
    // 36^6 possibilities; a clash here would point at a broken RNG.
    assert_ne!(a, b);
  }

  // ── Deadlines ─────────────────────────────────────────────────────────────

  #[test]
  fn deadline_without_time_ends_at_day_end() {
    let d = Some(date(2025, 6, 1));
    assert!(!is_deadline_passed(true, d, None, at(2025, 6, 1, 23, 59, 59)));
    assert!(is_deadline_passed(true, d, None, at(2025, 6, 2, 0, 0, 0)));
  }

  #[test]
  fn deadline_with_time_is_strict() {
    let d = Some(date(2025, 6, 1));
    let t = NaiveTime::from_hms_opt(14, 30, 0);
    assert!(!is_deadline_passed(true, d, t, at(2025, 6, 1, 14, 30, 0)));
    assert!(is_deadline_passed(true, d, t, at(2025, 6, 1, 14, 30, 1)));
  }

  #[test]
  fn no_deadline_never_passes() {
    let far_future = at(2999, 1, 1, 0, 0, 0);
    assert!(!is_deadline_passed(false, Some(date(2000, 1, 1)), None, far_future));
    assert!(!is_deadline_passed(true, None, None, far_future));
  }

  #[test]
  fn parse_time_accepts_both_forms() {
    assert_eq!(parse_time("09:05"), NaiveTime::from_hms_opt(9, 5, 0));
    assert_eq!(parse_time("09:05:42"), NaiveTime::from_hms_opt(9, 5, 0));
    assert_eq!(parse_time("9am"), None);
  }

  // ── Form validation ───────────────────────────────────────────────────────

  #[test]
  fn form_requires_title_and_description() {
    let Error::Validation(fields) = PostingForm::default().validate().unwrap_err()
    else {
      panic!("expected a validation error")
    };
    assert!(fields.contains_key("title"));
    assert!(fields.contains_key("description"));
    assert!(!fields.contains_key("deadline_date"));
  }

  #[test]
  fn form_requires_date_when_deadline_enabled() {
    let form = PostingForm {
      title: "Reel".into(),
      description: "One reel".into(),
      has_deadline: true,
      ..Default::default()
    };
    let Error::Validation(fields) = form.validate().unwrap_err() else {
      panic!()
    };
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("deadline_date"));
  }

  #[test]
  fn disabling_deadline_clears_date_and_time() {
    let form = PostingForm {
      title:         "Reel".into(),
      description:   "One reel".into(),
      has_deadline:  false,
      deadline_date: Some(date(2025, 1, 1)),
      deadline_time: NaiveTime::from_hms_opt(10, 0, 0),
    };
    let fields = form.validate().unwrap();
    assert_eq!(fields.deadline_date, None);
    assert_eq!(fields.deadline_time, None);
  }

  #[test]
  fn form_deserializes_html_style_values() {
    let form: PostingForm = serde_json::from_str(
      r#"{"title":"T","description":"D","has_deadline":true,
          "deadline_date":"2025-03-04","deadline_time":"18:00"}"#,
    )
    .unwrap();
    assert_eq!(form.deadline_date, Some(date(2025, 3, 4)));
    assert_eq!(form.deadline_time, NaiveTime::from_hms_opt(18, 0, 0));

    let blank: PostingForm = serde_json::from_str(
      r#"{"title":"T","description":"D","deadline_date":"","deadline_time":""}"#,
    )
    .unwrap();
    assert_eq!(blank.deadline_date, None);
    assert_eq!(blank.deadline_time, None);
  }

  #[test]
  fn view_serializes_time_as_hours_and_minutes() {
    let owner = crate::profile::fixtures::profile(Role::Business, "Acme", "Co");
    let mut v = fixtures::view(&owner, "T", "D");
    v.has_deadline = true;
    v.deadline_date = Some(date(2025, 3, 4));
    v.deadline_time = NaiveTime::from_hms_opt(18, 0, 0);
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["deadline_time"], "18:00");
    assert_eq!(json["deadline_date"], "2025-03-04");
    assert_eq!(json["user_type"], "business");
  }
}
