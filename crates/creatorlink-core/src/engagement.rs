//! Saved jobs and applications: the creator-side join records.
//!
//! Both are unique per (profile, posting) pair. The store enforces that with
//! a UNIQUE constraint; workflow code additionally pre-checks applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A creator's bookmark of a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJob {
  pub profile_id:     Uuid,
  pub job_posting_id: Uuid,
  pub created_at:     DateTime<Utc>,
}

/// A creator's application to a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
  pub id:             Uuid,
  pub profile_id:     Uuid,
  pub job_posting_id: Uuid,
  pub created_at:     DateTime<Utc>,
}

/// An applicant as shown to the posting owner: a profile summary plus the
/// time the application was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
  pub id:                Uuid,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  /// When the application was submitted.
  pub created_at:        DateTime<Utc>,
}
