//! Profiles: the identity and role record of a registered user.
//!
//! A profile is keyed by the identity provider's user id. It is created once
//! when registration completes and edited in place afterwards; the
//! application never deletes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the marketplace a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Creator,
  Business,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Creator => "creator",
      Role::Business => "business",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:                Uuid,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub email:             String,
  pub phone_number:      String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub user_type:         Role,
  // Creator-only fields; always empty/false for businesses.
  pub instagram_url:     Option<String>,
  pub tiktok_url:        Option<String>,
  pub youtube_url:       Option<String>,
  pub is_public:         bool,
  pub is_collaborated:   bool,
  pub created_at:        DateTime<Utc>,
}

impl Profile {
  pub fn is_creator(&self) -> bool { self.user_type == Role::Creator }

  pub fn is_business(&self) -> bool { self.user_type == Role::Business }

  /// A profile without both names is treated as an unfinished registration.
  pub fn is_complete(&self) -> bool {
    !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
  }

  /// "First Last", as used by search and display.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input for creating a profile; `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
  pub id:                Uuid,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub email:             String,
  pub phone_number:      String,
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  pub user_type:         Role,
  pub instagram_url:     Option<String>,
  pub tiktok_url:        Option<String>,
  pub youtube_url:       Option<String>,
  pub is_public:         bool,
  pub is_collaborated:   bool,
}

/// The mutable subset of a profile. Id, email, role and creation time are
/// fixed once registration completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  #[serde(default)]
  pub phone_number:      String,
  #[serde(default)]
  pub profile_photo_url: Option<String>,
  pub city:              String,
  pub country:           String,
  #[serde(default)]
  pub instagram_url:     Option<String>,
  #[serde(default)]
  pub tiktok_url:        Option<String>,
  #[serde(default)]
  pub youtube_url:       Option<String>,
  #[serde(default)]
  pub is_public:         bool,
  #[serde(default)]
  pub is_collaborated:   bool,
}

impl ProfileUpdate {
  /// Apply this update to `profile`, dropping creator-only fields for
  /// business profiles.
  pub fn apply_to(self, profile: &mut Profile) {
    let update = self.for_role(profile.user_type);
    update.write_into(profile);
  }

  /// Drop the creator-only fields unless `role` is a creator.
  pub fn for_role(mut self, role: Role) -> Self {
    if role == Role::Business {
      self.instagram_url = None;
      self.tiktok_url = None;
      self.youtube_url = None;
      self.is_public = false;
      self.is_collaborated = false;
    }
    self
  }

  fn write_into(self, profile: &mut Profile) {
    profile.username = self.username;
    profile.first_name = self.first_name;
    profile.last_name = self.last_name;
    profile.phone_number = self.phone_number;
    profile.profile_photo_url = self.profile_photo_url;
    profile.city = self.city;
    profile.country = self.country;
    profile.instagram_url = self.instagram_url;
    profile.tiktok_url = self.tiktok_url;
    profile.youtube_url = self.youtube_url;
    profile.is_public = self.is_public;
    profile.is_collaborated = self.is_collaborated;
  }
}
