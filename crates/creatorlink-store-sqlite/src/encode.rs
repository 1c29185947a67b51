//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! `ORDER BY created_at` sorts chronologically. Dates are `YYYY-MM-DD`,
//! times `HH:MM:SS`. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound as _, Utc};
use creatorlink_core::{
  engagement::{Applicant, JobApplication},
  posting::{JobPosting, PostingOwner, PostingWithOwner},
  profile::{Profile, Role},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// The current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "creator" => Ok(Role::Creator),
    "business" => Ok(Role::Business),
    other => Err(Error::Role(other.to_owned())),
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "id, username, first_name, last_name, email,
  phone_number, profile_photo_url, city, country, user_type, instagram_url,
  tiktok_url, youtube_url, is_public, is_collaborated, created_at";

/// A `profiles` row as read from SQLite, before decoding.
pub struct RawProfile {
  pub id:                String,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub email:             String,
  pub phone_number:      String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub user_type:         String,
  pub instagram_url:     Option<String>,
  pub tiktok_url:        Option<String>,
  pub youtube_url:       Option<String>,
  pub is_public:         bool,
  pub is_collaborated:   bool,
  pub created_at:        String,
}

impl RawProfile {
  /// Read a row selected with [`PROFILE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      username:          row.get(1)?,
      first_name:        row.get(2)?,
      last_name:         row.get(3)?,
      email:             row.get(4)?,
      phone_number:      row.get(5)?,
      profile_photo_url: row.get(6)?,
      city:              row.get(7)?,
      country:           row.get(8)?,
      user_type:         row.get(9)?,
      instagram_url:     row.get(10)?,
      tiktok_url:        row.get(11)?,
      youtube_url:       row.get(12)?,
      is_public:         row.get(13)?,
      is_collaborated:   row.get(14)?,
      created_at:        row.get(15)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:                decode_uuid(&self.id)?,
      username:          self.username,
      first_name:        self.first_name,
      last_name:         self.last_name,
      email:             self.email,
      phone_number:      self.phone_number,
      profile_photo_url: self.profile_photo_url,
      city:              self.city,
      country:           self.country,
      user_type:         decode_role(&self.user_type)?,
      instagram_url:     self.instagram_url,
      tiktok_url:        self.tiktok_url,
      youtube_url:       self.youtube_url,
      is_public:         self.is_public,
      is_collaborated:   self.is_collaborated,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

// ─── Postings ────────────────────────────────────────────────────────────────

/// Posting columns joined with the owner's profile fields.
pub const POSTING_SELECT: &str = "SELECT
    p.id, p.profile_id, p.title, p.description, p.has_deadline,
    p.deadline_date, p.deadline_time, p.created_at, p.slug,
    o.username, o.profile_photo_url, o.city, o.country,
    o.first_name, o.last_name, o.user_type
  FROM job_postings p
  JOIN profiles o ON o.id = p.profile_id";

pub struct RawPosting {
  pub id:            String,
  pub profile_id:    String,
  pub title:         String,
  pub description:   String,
  pub has_deadline:  bool,
  pub deadline_date: Option<String>,
  pub deadline_time: Option<String>,
  pub created_at:    String,
  pub slug:          String,
}

impl RawPosting {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      profile_id:    row.get(1)?,
      title:         row.get(2)?,
      description:   row.get(3)?,
      has_deadline:  row.get(4)?,
      deadline_date: row.get(5)?,
      deadline_time: row.get(6)?,
      created_at:    row.get(7)?,
      slug:          row.get(8)?,
    })
  }

  pub fn into_posting(self) -> Result<JobPosting> {
    Ok(JobPosting {
      id:            decode_uuid(&self.id)?,
      profile_id:    decode_uuid(&self.profile_id)?,
      title:         self.title,
      description:   self.description,
      has_deadline:  self.has_deadline,
      deadline_date: self.deadline_date.as_deref().map(decode_date).transpose()?,
      deadline_time: self.deadline_time.as_deref().map(decode_time).transpose()?,
      created_at:    decode_dt(&self.created_at)?,
      slug:          self.slug,
    })
  }
}

/// A row selected with [`POSTING_SELECT`].
pub struct RawPostingWithOwner {
  pub posting:           RawPosting,
  pub username:          String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub first_name:        String,
  pub last_name:         String,
  pub user_type:         String,
}

impl RawPostingWithOwner {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      posting:           RawPosting::from_row(row)?,
      username:          row.get(9)?,
      profile_photo_url: row.get(10)?,
      city:              row.get(11)?,
      country:           row.get(12)?,
      first_name:        row.get(13)?,
      last_name:         row.get(14)?,
      user_type:         row.get(15)?,
    })
  }

  pub fn into_joined(self) -> Result<PostingWithOwner> {
    let posting = self.posting.into_posting()?;
    let owner = PostingOwner {
      id:                posting.profile_id,
      username:          self.username,
      profile_photo_url: self.profile_photo_url,
      city:              self.city,
      country:           self.country,
      first_name:        self.first_name,
      last_name:         self.last_name,
      user_type:         decode_role(&self.user_type)?,
    };
    Ok(PostingWithOwner { posting, owner })
  }
}

// ─── Applications ────────────────────────────────────────────────────────────

pub struct RawApplication {
  pub id:             String,
  pub profile_id:     String,
  pub job_posting_id: String,
  pub created_at:     String,
}

impl RawApplication {
  pub fn into_application(self) -> Result<JobApplication> {
    Ok(JobApplication {
      id:             decode_uuid(&self.id)?,
      profile_id:     decode_uuid(&self.profile_id)?,
      job_posting_id: decode_uuid(&self.job_posting_id)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawApplicant {
  pub id:                String,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub applied_at:        String,
}

impl RawApplicant {
  pub fn into_applicant(self) -> Result<Applicant> {
    Ok(Applicant {
      id:                decode_uuid(&self.id)?,
      username:          self.username,
      first_name:        self.first_name,
      last_name:         self.last_name,
      profile_photo_url: self.profile_photo_url,
      city:              self.city,
      country:           self.country,
      created_at:        decode_dt(&self.applied_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sortable() {
    let a = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-05-01T09:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_role_is_an_error() {
    assert!(matches!(decode_role("admin"), Err(Error::Role(_))));
    assert_eq!(decode_role("business").unwrap(), Role::Business);
  }
}
