//! In-memory [`MarketplaceStore`] used by the workflow tests.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  engagement::{Applicant, JobApplication, SavedJob},
  posting::{JobPosting, NewJobPosting, PostingFields, PostingOwner, PostingWithOwner},
  profile::{NewProfile, Profile, ProfileUpdate},
  store::MarketplaceStore,
};

#[derive(Default)]
struct Tables {
  profiles:     HashMap<Uuid, Profile>,
  postings:     Vec<JobPosting>,
  saved:        Vec<SavedJob>,
  applications: Vec<JobApplication>,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
    let mut guard = self.tables.lock().unwrap();
    f(&mut guard)
  }

  /// Seed a profile directly, bypassing registration.
  pub fn seed_profile(&self, profile: Profile) {
    self.with(|t| t.profiles.insert(profile.id, profile));
  }

  /// Seed a posting directly, e.g. one whose deadline is already past.
  pub fn seed_posting(&self, posting: JobPosting) {
    self.with(|t| t.postings.insert(0, posting));
  }

  pub fn application_count(&self) -> usize {
    self.with(|t| t.applications.len())
  }
}

fn join(t: &Tables, posting: &JobPosting) -> Option<PostingWithOwner> {
  let owner = t.profiles.get(&posting.profile_id)?;
  Some(PostingWithOwner {
    posting: posting.clone(),
    owner:   PostingOwner::from(owner),
  })
}

impl MarketplaceStore for MemoryStore {
  type Error = Error;

  async fn insert_profile(&self, input: NewProfile) -> Result<Profile> {
    self.with(|t| {
      if t.profiles.contains_key(&input.id)
        || t.profiles.values().any(|p| p.username == input.username)
      {
        return Err(Error::Conflict("profile already exists".into()));
      }
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
        created_at:        Utc::now(),
      };
      t.profiles.insert(profile.id, profile.clone());
      Ok(profile)
    })
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    Ok(self.with(|t| t.profiles.get(&id).cloned()))
  }

  async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
    Ok(self.with(|t| t.profiles.values().find(|p| p.username == username).cloned()))
  }

  async fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Option<Profile>> {
    self.with(|t| {
      if t.profiles.values().any(|p| p.id != id && p.username == update.username) {
        return Err(Error::Conflict("username taken".into()));
      }
      Ok(t.profiles.get_mut(&id).map(|p| {
        update.apply_to(p);
        p.clone()
      }))
    })
  }

  async fn list_public_creators(&self) -> Result<Vec<Profile>> {
    let mut out = self.with(|t| {
      t.profiles
        .values()
        .filter(|p| p.is_creator() && p.is_public)
        .cloned()
        .collect::<Vec<_>>()
    });
    out.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(out)
  }

  async fn list_postings(&self) -> Result<Vec<PostingWithOwner>> {
    Ok(self.with(|t| t.postings.iter().filter_map(|p| join(t, p)).collect()))
  }

  async fn get_posting(&self, id: Uuid) -> Result<Option<PostingWithOwner>> {
    Ok(self.with(|t| {
      t.postings.iter().find(|p| p.id == id).and_then(|p| join(t, p))
    }))
  }

  async fn get_posting_by_slug(&self, slug: &str) -> Result<Option<PostingWithOwner>> {
    Ok(self.with(|t| {
      t.postings.iter().find(|p| p.slug == slug).and_then(|p| join(t, p))
    }))
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
      created_at: Utc::now(),
      slug,
    };
    self.with(|t| t.postings.insert(0, posting.clone()));
    Ok(posting)
  }

  async fn update_posting(
    &self,
    id: Uuid,
    fields: PostingFields,
  ) -> Result<Option<JobPosting>> {
    Ok(self.with(|t| {
      t.postings.iter_mut().find(|p| p.id == id).map(|p| {
        p.title = fields.title;
        p.description = fields.description;
        p.has_deadline = fields.has_deadline;
        p.deadline_date = fields.deadline_date;
        p.deadline_time = fields.deadline_time;
        p.clone()
      })
    }))
  }

  async fn delete_posting(&self, id: Uuid) -> Result<bool> {
    Ok(self.with(|t| {
      let before = t.postings.len();
      t.postings.retain(|p| p.id != id);
      t.saved.retain(|s| s.job_posting_id != id);
      t.applications.retain(|a| a.job_posting_id != id);
      t.postings.len() != before
    }))
  }

  async fn saved_posting_ids(&self, profile_id: Uuid) -> Result<HashSet<Uuid>> {
    Ok(self.with(|t| {
      t.saved
        .iter()
        .filter(|s| s.profile_id == profile_id)
        .map(|s| s.job_posting_id)
        .collect()
    }))
  }

  async fn is_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<bool> {
    Ok(self.with(|t| {
      t.saved
        .iter()
        .any(|s| s.profile_id == profile_id && s.job_posting_id == posting_id)
    }))
  }

  async fn insert_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<SavedJob> {
    self.with(|t| {
      if t
        .saved
        .iter()
        .any(|s| s.profile_id == profile_id && s.job_posting_id == posting_id)
      {
        return Err(Error::Conflict("already saved".into()));
      }
      let row = SavedJob {
        profile_id,
        job_posting_id: posting_id,
        created_at: Utc::now(),
      };
      t.saved.push(row.clone());
      Ok(row)
    })
  }

  async fn delete_saved(&self, profile_id: Uuid, posting_id: Uuid) -> Result<bool> {
    Ok(self.with(|t| {
      let before = t.saved.len();
      t.saved
        .retain(|s| !(s.profile_id == profile_id && s.job_posting_id == posting_id));
      t.saved.len() != before
    }))
  }

  async fn find_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> Result<Option<JobApplication>> {
    Ok(self.with(|t| {
      t.applications
        .iter()
        .find(|a| a.profile_id == profile_id && a.job_posting_id == posting_id)
        .cloned()
    }))
  }

  async fn insert_application(
    &self,
    profile_id: Uuid,
    posting_id: Uuid,
  ) -> Result<JobApplication> {
    self.with(|t| {
      if t
        .applications
        .iter()
        .any(|a| a.profile_id == profile_id && a.job_posting_id == posting_id)
      {
        return Err(Error::Conflict("already applied".into()));
      }
      let row = JobApplication {
        id: Uuid::new_v4(),
        profile_id,
        job_posting_id: posting_id,
        created_at: Utc::now(),
      };
      t.applications.push(row.clone());
      Ok(row)
    })
  }

  async fn list_applicants(&self, posting_id: Uuid) -> Result<Vec<Applicant>> {
    Ok(self.with(|t| {
      t.applications
        .iter()
        .rev()
        .filter(|a| a.job_posting_id == posting_id)
        .filter_map(|a| {
          let p = t.profiles.get(&a.profile_id)?;
          Some(Applicant {
            id:                p.id,
            username:          p.username.clone(),
            first_name:        p.first_name.clone(),
            last_name:         p.last_name.clone(),
            profile_photo_url: p.profile_photo_url.clone(),
            city:              p.city.clone(),
            country:           p.country.clone(),
            created_at:        a.created_at,
          })
        })
        .collect()
    }))
  }
}
