//! [`SqliteStore`]: the SQLite implementation of [`MarketplaceStore`].

use std::{collections::HashSet, path::Path};

use chrono::TimeDelta;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use creatorlink_core::{
  engagement::{Applicant, JobApplication, SavedJob},
  posting::{JobPosting, NewJobPosting, PostingFields, PostingWithOwner},
  profile::{NewProfile, Profile, ProfileUpdate},
  store::MarketplaceStore,
};

use crate::{
  Result,
  encode::{
    PROFILE_COLUMNS, POSTING_SELECT, RawApplicant, RawApplication, RawPosting,
    RawPostingWithOwner, RawProfile, decode_uuid, encode_date, encode_dt,
    encode_time, encode_uuid, now,
  },
  schema::SCHEMA,
};

/// Default lifetime of an issued session, in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
/// Default lifetime of a one-time sign-in code, in minutes.
pub const DEFAULT_CODE_TTL_MINUTES: i64 = 10;

// ─── Store ───────────────────────────────────────────────────────────────────

/// The creatorlink backend: profiles, postings, saved jobs, applications,
/// and the local identity provider, all in one SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:        tokio_rusqlite::Connection,
  pub(crate) session_ttl: TimeDelta,
  pub(crate) code_ttl:    TimeDelta,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      session_ttl: TimeDelta::hours(DEFAULT_SESSION_TTL_HOURS),
      code_ttl: TimeDelta::minutes(DEFAULT_CODE_TTL_MINUTES),
    })
  }

  /// Override how long sessions and sign-in codes stay valid.
  pub fn with_ttls(mut self, session_ttl: TimeDelta, code_ttl: TimeDelta) -> Self {
    self.session_ttl = session_ttl;
    self.code_ttl = code_ttl;
    self
  }

  async fn query_profile(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Profile>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn query_posting(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<PostingWithOwner>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("{POSTING_SELECT} WHERE p.{column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawPostingWithOwner::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPostingWithOwner::into_joined).transpose()
  }
}

// ─── MarketplaceStore impl ───────────────────────────────────────────────────

impl MarketplaceStore for SqliteStore {
  type Error = crate::Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn insert_profile(&self, input: NewProfile) -> Result<Profile> {
    let profile = Profile {
      id:                input.id,
      username:          input.username,
      first_name:        input.first_name,
      last_name:         input.last_name,
      email:             input.email,
      phone_number:      input.phone_number,
      profile_photo_url: input.profile_photo_url,
      city:              input.city,
      country:           input.country,
      user_type:         input.user_type,
      instagram_url:     input.instagram_url,
      tiktok_url:        input.tiktok_url,
      youtube_url:       input.youtube_url,
      is_public:         input.is_public,
      is_collaborated:   input.is_collaborated,
      created_at:        now(),
    };

    let p = profile.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             id, username, first_name, last_name, email, phone_number,
             profile_photo_url, city, country, user_type, instagram_url,
             tiktok_url, youtube_url, is_public, is_collaborated, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          rusqlite::params![
            encode_uuid(p.id),
            p.username,
            p.first_name,
            p.last_name,
            p.email,
            p.phone_number,
            p.profile_photo_url,
            p.city,
            p.country,
            p.user_type.as_str(),
            p.instagram_url,
            p.tiktok_url,
            p.youtube_url,
            p.is_public,
            p.is_collaborated,
            encode_dt(p.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self.query_profile("id", encode_uuid(id)).await
  }

  async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
    self.query_profile("username", username.to_owned()).await
  }

  async fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE profiles SET
             username = ?2, first_name = ?3, last_name = ?4, phone_number = ?5,
             profile_photo_url = ?6, city = ?7, country = ?8,
             instagram_url = ?9, tiktok_url = ?10, youtube_url = ?11,
             is_public = ?12, is_collaborated = ?13
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            update.username,
            update.first_name,
            update.last_name,
            update.phone_number,
            update.profile_photo_url,
            update.city,
            update.country,
            update.instagram_url,
            update.tiktok_url,
            update.youtube_url,
            update.is_public,
            update.is_collaborated,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_profile(id).await
  }

  async fn list_public_creators(&self) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {PROFILE_COLUMNS} FROM profiles
           WHERE user_type = 'creator' AND is_public = 1
           ORDER BY username"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Job postings ──────────────────────────────────────────────────────────

  async fn list_postings(&self) -> Result<Vec<PostingWithOwner>> {
    let raws: Vec<RawPostingWithOwner> = self
      .conn
      .call(|conn| {
        let sql = format!("{POSTING_SELECT} ORDER BY p.created_at DESC, p.rowid DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPostingWithOwner::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPostingWithOwner::into_joined).collect()
  }

  async fn get_posting(&self, id: Uuid) -> Result<Option<PostingWithOwner>> {
    self.query_posting("id", encode_uuid(id)).await
  }

  async fn get_posting_by_slug(&self, slug: &str) -> Result<Option<PostingWithOwner>> {
    self.query_posting("slug", slug.to_owned()).await
  }

  async fn insert_posting(&self, input: NewJobPosting) -> Result<JobPosting> {
    let NewJobPosting { profile_id, slug, fields } = input;
    let posting = JobPosting {
      id: Uuid::new_v4(),
      profile_id,
      title: fields.title,
      description: fields.description,
      has_deadline: fields.has_deadline,
      deadline_date: fields.deadline_date,
      deadline_time: fields.deadline_time,
      created_at: now(),
      slug,
    };

    let p = posting.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO job_postings (
             id, profile_id, title, description, has_deadline,
             deadline_date, deadline_time, created_at, slug)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            encode_uuid(p.id),
            encode_uuid(p.profile_id),
            p.title,
            p.description,
            p.has_deadline,
            p.deadline_date.map(encode_date),
            p.deadline_time.map(encode_time),
            encode_dt(p.created_at),
            p.slug,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(posting)
  }

  async fn update_posting(
    &self,
    id: Uuid,
    fields: PostingFields,
  ) -> Result<Option<JobPosting>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE job_postings SET
             title = ?2, description = ?3, has_deadline = ?4,
             deadline_date = ?5, deadline_time = ?6
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            fields.title,
            fields.description,
            fields.has_deadline,
            fields.deadline_date.map(encode_date),
            fields.deadline_time.map(encode_time),
          ],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT id, profile_id, title, description, has_deadline,
                      deadline_date, deadline_time, created_at, slug
               FROM job_postings WHERE id = ?1",
              rusqlite::params![id_str],
              RawPosting::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPosting::into_posting).transpose()
  }

  async fn delete_posting(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM job_postings WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Saved jobs ────────────────────────────────────────────────────────────

  async fn saved_posting_ids(&self, profile_id: Uuid) -> Result<HashSet<Uuid>> {
    let profile_str = encode_uuid(profile_id);
    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT job_posting_id FROM saved_jobs WHERE profile_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![profile_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn is_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<bool> {
    let (profile_str, posting_str) = (encode_uuid(profile_id), encode_uuid(posting_id));
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM saved_jobs WHERE profile_id = ?1 AND job_posting_id = ?2",
              rusqlite::params![profile_str, posting_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn insert_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<SavedJob> {
    let saved = SavedJob {
      profile_id,
      job_posting_id: posting_id,
      created_at: now(),
    };
    let (profile_str, posting_str, at_str) = (
      encode_uuid(profile_id),
      encode_uuid(posting_id),
      encode_dt(saved.created_at),
    );
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO saved_jobs (profile_id, job_posting_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![profile_str, posting_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(saved)
  }

  async fn delete_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<bool> {
    let (profile_str, posting_str) = (encode_uuid(profile_id), encode_uuid(posting_id));
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM saved_jobs WHERE profile_id = ?1 AND job_posting_id = ?2",
          rusqlite::params![profile_str, posting_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn find_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> Result<Option<JobApplication>> {
    let (profile_str, posting_str) = (encode_uuid(profile_id), encode_uuid(posting_id));
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, profile_id, job_posting_id, created_at
               FROM job_applications
               WHERE profile_id = ?1 AND job_posting_id = ?2",
              rusqlite::params![profile_str, posting_str],
              |row| {
                Ok(RawApplication {
                  id:             row.get(0)?,
                  profile_id:     row.get(1)?,
                  job_posting_id: row.get(2)?,
                  created_at:     row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  async fn insert_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> Result<JobApplication> {
    let application = JobApplication {
      id: Uuid::new_v4(),
      profile_id,
      job_posting_id: posting_id,
      created_at: now(),
    };
    let (id_str, profile_str, posting_str, at_str) = (
      encode_uuid(application.id),
      encode_uuid(profile_id),
      encode_uuid(posting_id),
      encode_dt(application.created_at),
    );
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO job_applications (id, profile_id, job_posting_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, profile_str, posting_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(application)
  }

  async fn list_applicants(&self, posting_id: Uuid) -> Result<Vec<Applicant>> {
    let posting_str = encode_uuid(posting_id);
    let raws: Vec<RawApplicant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT o.id, o.username, o.first_name, o.last_name,
                  o.profile_photo_url, o.city, o.country, a.created_at
           FROM job_applications a
           JOIN profiles o ON o.id = a.profile_id
           WHERE a.job_posting_id = ?1
           ORDER BY a.created_at DESC, a.rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![posting_str], |row| {
            Ok(RawApplicant {
              id:                row.get(0)?,
              username:          row.get(1)?,
              first_name:        row.get(2)?,
              last_name:         row.get(3)?,
              profile_photo_url: row.get(4)?,
              city:              row.get(5)?,
              country:           row.get(6)?,
              applied_at:        row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApplicant::into_applicant).collect()
  }
}
