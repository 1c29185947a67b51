//! Registration: the multi-step form that creates a [`Profile`].
//!
//! The wizard runs `ChooseRole → BasicInfo → CreatorInfo` for creators and
//! `ChooseRole → BasicInfo → Review` for businesses. Each forward step
//! validates the fields it owns; submission re-validates everything.
//!
//! [`Profile`]: crate::profile::Profile

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, FieldErrors, Result,
  profile::{NewProfile, ProfileUpdate, Role},
  random::base36_token,
};

/// Everything collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
  #[serde(default)]
  pub username:          String,
  #[serde(default)]
  pub first_name:        String,
  #[serde(default)]
  pub last_name:         String,
  #[serde(default)]
  pub email:             String,
  #[serde(default)]
  pub phone_number:      String,
  /// Public URL of an already uploaded photo.
  #[serde(default)]
  pub profile_photo_url: Option<String>,
  #[serde(default)]
  pub city:              String,
  #[serde(default)]
  pub country:           String,
  pub user_type:         Role,
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

impl RegistrationForm {
  /// An empty form with the email pre-filled from the identity provider.
  pub fn prefilled(email: impl Into<String>) -> Self {
    Self {
      username:          String::new(),
      first_name:        String::new(),
      last_name:         String::new(),
      email:             email.into(),
      phone_number:      String::new(),
      profile_photo_url: None,
      city:              String::new(),
      country:           String::new(),
      user_type:         Role::Creator,
      instagram_url:     None,
      tiktok_url:        None,
      youtube_url:       None,
      is_public:         false,
      is_collaborated:   false,
    }
  }

  /// Validate the basic-info step.
  pub fn check_basic(&self, errors: &mut FieldErrors) {
    BasicFields {
      email: Some(self.email.trim().to_owned()),
      phone_number: Some(self.phone_number.trim().to_owned()),
      ..BasicFields::new(&self.username, &self.first_name, &self.last_name, &self.city, &self.country)
    }
    .check(errors);
  }

  /// Validate the creator-info step. Social links are optional.
  pub fn check_creator(&self, errors: &mut FieldErrors) {
    check_social_links(
      errors,
      self.instagram_url.as_deref(),
      self.tiktok_url.as_deref(),
      self.youtube_url.as_deref(),
    );
  }

  /// Validate every step and build the profile insert for `user_id`.
  pub fn into_new_profile(self, user_id: Uuid) -> Result<NewProfile> {
    let mut errors = FieldErrors::new();
    self.check_basic(&mut errors);
    if self.user_type == Role::Creator {
      self.check_creator(&mut errors);
    }
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    let creator = self.user_type == Role::Creator;
    Ok(NewProfile {
      id:                user_id,
      username:          self.username.trim().to_owned(),
      first_name:        self.first_name.trim().to_owned(),
      last_name:         self.last_name.trim().to_owned(),
      email:             self.email.trim().to_owned(),
      phone_number:      self.phone_number.trim().to_owned(),
      profile_photo_url: non_blank(self.profile_photo_url),
      city:              self.city.trim().to_owned(),
      country:           self.country,
      user_type:         self.user_type,
      instagram_url:     non_blank(self.instagram_url).filter(|_| creator),
      tiktok_url:        non_blank(self.tiktok_url).filter(|_| creator),
      youtube_url:       non_blank(self.youtube_url).filter(|_| creator),
      is_public:         creator && self.is_public,
      is_collaborated:   creator && self.is_collaborated,
    })
  }
}

/// Validate a profile edit with the same rules as registration, minus the
/// email and phone checks (email is fixed; phone may be cleared).
pub fn check_profile_update(update: &ProfileUpdate) -> Result<()> {
  let mut errors = FieldErrors::new();
  BasicFields::new(
    &update.username,
    &update.first_name,
    &update.last_name,
    &update.city,
    &update.country,
  )
  .check(&mut errors);
  check_social_links(
    &mut errors,
    update.instagram_url.as_deref(),
    update.tiktok_url.as_deref(),
    update.youtube_url.as_deref(),
  );
  if errors.is_empty() { Ok(()) } else { Err(Error::Validation(errors)) }
}

/// The always-required registration fields, trimmed. Email and phone are
/// only checked when present, since profile edits never send them.
#[derive(Debug, Default, Validate)]
struct BasicFields {
  #[validate(length(min = 1, message = "Username is required"))]
  username:     String,
  #[validate(length(min = 1, message = "First name is required"))]
  first_name:   String,
  #[validate(length(min = 1, message = "Last name is required"))]
  last_name:    String,
  #[validate(length(min = 1, message = "City is required"))]
  city:         String,
  #[validate(length(min = 1, message = "Country is required"))]
  country:      String,
  #[validate(length(min = 1, message = "Email is required"))]
  email:        Option<String>,
  #[validate(length(min = 1, message = "Phone number is required"))]
  phone_number: Option<String>,
}

impl BasicFields {
  fn new(username: &str, first_name: &str, last_name: &str, city: &str, country: &str) -> Self {
    Self {
      username: username.trim().to_owned(),
      first_name: first_name.trim().to_owned(),
      last_name: last_name.trim().to_owned(),
      city: city.trim().to_owned(),
      country: country.trim().to_owned(),
      ..Self::default()
    }
  }

  fn check(&self, errors: &mut FieldErrors) {
    if let Err(invalid) = self.validate() {
      for (field, found) in invalid.field_errors() {
        if let Some(message) = found.first().and_then(|e| e.message.as_ref()) {
          errors.insert(field, message.to_string());
        }
      }
    }
    if let Some(email) = self.email.as_deref()
      && !email.is_empty()
      && !looks_like_email(email)
    {
      errors.insert("email", "Email is invalid".into());
    }
  }
}

fn present(v: Option<&str>) -> Option<&str> {
  v.map(str::trim).filter(|s| !s.is_empty())
}

fn check_social_links(
  errors: &mut FieldErrors,
  instagram: Option<&str>,
  tiktok: Option<&str>,
  youtube: Option<&str>,
) {
  if let Some(url) = present(instagram)
    && !url.contains("instagram.com")
  {
    errors.insert("instagram_url", "Please enter a valid Instagram URL".into());
  }
  if let Some(url) = present(tiktok)
    && !url.contains("tiktok.com")
  {
    errors.insert("tiktok_url", "Please enter a valid TikTok URL".into());
  }
  if let Some(url) = present(youtube)
    && !url.contains("youtube.com")
    && !url.contains("youtu.be")
  {
    errors.insert("youtube_url", "Please enter a valid YouTube URL".into());
  }
}

fn non_blank(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

static EMAIL_SHAPE: LazyLock<Option<Regex>> =
  LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

/// Loose `\S+@\S+\.\S+` shape check.
pub fn looks_like_email(s: &str) -> bool {
  EMAIL_SHAPE.as_ref().is_some_and(|re| re.is_match(s))
}

/// Object name for an uploaded profile photo:
/// `{user_id}-{random token}.{extension}`.
pub fn photo_object_name(user_id: Uuid, original_filename: &str) -> String {
  let ext = original_filename
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
  let stem = format!("{user_id}-{}", base36_token(11));
  match ext {
    Some(ext) => format!("{stem}.{ext}"),
    None => stem,
  }
}

// ─── Wizard ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  ChooseRole,
  BasicInfo,
  /// Social links and visibility; creators only.
  CreatorInfo,
  /// Final confirmation; businesses only.
  Review,
}

impl Step {
  /// Zero-based position in the three-step progress indicator.
  pub fn index(self) -> usize {
    match self {
      Step::ChooseRole => 0,
      Step::BasicInfo => 1,
      Step::CreatorInfo | Step::Review => 2,
    }
  }
}

#[derive(Debug, Clone)]
pub struct RegistrationWizard {
  step: Step,
  data: RegistrationForm,
}

impl RegistrationWizard {
  pub fn new(email: impl Into<String>) -> Self {
    Self { step: Step::ChooseRole, data: RegistrationForm::prefilled(email) }
  }

  pub fn step(&self) -> Step { self.step }

  pub fn data(&self) -> &RegistrationForm { &self.data }

  pub fn data_mut(&mut self) -> &mut RegistrationForm { &mut self.data }

  /// Pick a role and move to the basic-info step.
  pub fn select_role(&mut self, role: Role) {
    self.data.user_type = role;
    self.step = Step::BasicInfo;
  }

  /// Validate the current step and advance.
  pub fn next(&mut self) -> Result<Step> {
    match self.step {
      Step::ChooseRole => self.step = Step::BasicInfo,
      Step::BasicInfo => {
        let mut errors = FieldErrors::new();
        self.data.check_basic(&mut errors);
        if !errors.is_empty() {
          return Err(Error::Validation(errors));
        }
        self.step = match self.data.user_type {
          Role::Creator => Step::CreatorInfo,
          Role::Business => Step::Review,
        };
      }
      Step::CreatorInfo | Step::Review => {}
    }
    Ok(self.step)
  }

  pub fn previous(&mut self) -> Step {
    self.step = match self.step {
      Step::ChooseRole | Step::BasicInfo => Step::ChooseRole,
      Step::CreatorInfo | Step::Review => Step::BasicInfo,
    };
    self.step
  }

  /// Finish the wizard. Only possible from the last step.
  pub fn submit(&self, user_id: Uuid) -> Result<NewProfile> {
    match self.step {
      Step::CreatorInfo | Step::Review => {
        self.data.clone().into_new_profile(user_id)
      }
      _ => Err(Error::invalid("step", "registration is not finished")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filled(role: Role) -> RegistrationForm {
    RegistrationForm {
      username:     "ana.films".into(),
      first_name:   "Ana".into(),
      last_name:    "Silva".into(),
      phone_number: "+351 900 000 000".into(),
      city:         "Lisbon".into(),
      country:      "Portugal".into(),
      user_type:    role,
      ..RegistrationForm::prefilled("ana@example.com")
    }
  }

  #[test]
  fn email_shape() {
    assert!(looks_like_email("a@b.co"));
    assert!(looks_like_email("first.last@mail.example.org"));
    assert!(!looks_like_email("a@b"));
    assert!(!looks_like_email("@b.co"));
    assert!(!looks_like_email("a@.co"));
    assert!(!looks_like_email("a@ b.co"));
    assert!(!looks_like_email("plain"));
  }

  #[test]
  fn basic_step_reports_every_missing_field() {
    let mut w = RegistrationWizard::new("");
    w.select_role(Role::Business);
    let Err(Error::Validation(fields)) = w.next() else { panic!() };
    for f in ["username", "first_name", "last_name", "email", "phone_number", "city", "country"] {
      assert!(fields.contains_key(f), "missing {f}");
    }
    assert_eq!(w.step(), Step::BasicInfo);
  }

  #[test]
  fn creator_path_goes_through_creator_info() {
    let mut w = RegistrationWizard::new("ana@example.com");
    assert_eq!(w.step().index(), 0);
    w.select_role(Role::Creator);
    *w.data_mut() = filled(Role::Creator);
    assert_eq!(w.next().unwrap(), Step::CreatorInfo);
    assert_eq!(w.step().index(), 2);

    w.data_mut().instagram_url = Some("https://example.com/ana".into());
    let Err(Error::Validation(fields)) = w.submit(Uuid::new_v4()) else { panic!() };
    assert!(fields.contains_key("instagram_url"));

    w.data_mut().instagram_url = Some("https://instagram.com/ana".into());
    w.data_mut().youtube_url = Some("https://youtu.be/xyz".into());
    w.data_mut().is_public = true;
    let id = Uuid::new_v4();
    let profile = w.submit(id).unwrap();
    assert_eq!(profile.id, id);
    assert_eq!(profile.user_type, Role::Creator);
    assert!(profile.is_public);
    assert_eq!(profile.instagram_url.as_deref(), Some("https://instagram.com/ana"));
  }

  #[test]
  fn business_path_skips_creator_fields() {
    let mut w = RegistrationWizard::new("biz@example.com");
    w.select_role(Role::Business);
    *w.data_mut() = RegistrationForm {
      instagram_url: Some("not a url".into()),
      is_public: true,
      ..filled(Role::Business)
    };
    assert_eq!(w.next().unwrap(), Step::Review);
    let profile = w.submit(Uuid::new_v4()).unwrap();
    assert_eq!(profile.instagram_url, None);
    assert!(!profile.is_public);
    assert_eq!(w.previous(), Step::BasicInfo);
    assert_eq!(w.previous(), Step::ChooseRole);
  }

  #[test]
  fn submit_before_last_step_is_rejected() {
    let mut w = RegistrationWizard::new("ana@example.com");
    w.select_role(Role::Creator);
    *w.data_mut() = filled(Role::Creator);
    assert!(w.submit(Uuid::new_v4()).is_err());
  }

  #[test]
  fn blank_optional_links_are_dropped() {
    let form = RegistrationForm {
      tiktok_url: Some("   ".into()),
      profile_photo_url: Some(String::new()),
      ..filled(Role::Creator)
    };
    let profile = form.into_new_profile(Uuid::new_v4()).unwrap();
    assert_eq!(profile.tiktok_url, None);
    assert_eq!(profile.profile_photo_url, None);
  }

  #[test]
  fn whitespace_only_fields_count_as_missing() {
    let mut form = filled(Role::Business);
    form.username = "   ".into();
    form.city = "\t".into();
    form.email = "  ".into();
    let Err(Error::Validation(fields)) = form.into_new_profile(Uuid::new_v4()) else {
      panic!("expected validation errors")
    };
    assert_eq!(fields["username"], "Username is required");
    assert_eq!(fields["city"], "City is required");
    assert_eq!(fields["email"], "Email is required");
    assert!(!fields.contains_key("first_name"));
  }

  #[test]
  fn malformed_email_is_invalid_not_missing() {
    let mut form = filled(Role::Business);
    form.email = "ana@example".into();
    let Err(Error::Validation(fields)) = form.into_new_profile(Uuid::new_v4()) else {
      panic!("expected validation errors")
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["email"], "Email is invalid");
  }

  #[test]
  fn social_links_are_checked_after_trimming() {
    let mut form = filled(Role::Creator);
    form.instagram_url = Some("  https://instagram.com/ana  ".into());
    form.tiktok_url = Some(" https://example.com/ana ".into());
    form.youtube_url = Some("https://youtu.be/x".into());
    let mut errors = FieldErrors::new();
    form.check_creator(&mut errors);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["tiktok_url"], "Please enter a valid TikTok URL");
  }

  #[test]
  fn profile_update_skips_contact_fields() {
    let update = ProfileUpdate {
      username:          "ana".into(),
      first_name:        "Ana".into(),
      last_name:         " ".into(),
      phone_number:      String::new(),
      profile_photo_url: None,
      city:              "Lisbon".into(),
      country:           "Portugal".into(),
      instagram_url:     None,
      tiktok_url:        None,
      youtube_url:       Some("https://vimeo.com/ana".into()),
      is_public:         true,
      is_collaborated:   false,
    };
    let Err(Error::Validation(fields)) = check_profile_update(&update) else {
      panic!("expected validation errors")
    };
    assert_eq!(fields.keys().copied().collect::<Vec<_>>(), ["last_name", "youtube_url"]);
  }

  #[test]
  fn photo_names_keep_extension() {
    let id = Uuid::new_v4();
    let name = photo_object_name(id, "Me At Beach.JPG");
    assert!(name.starts_with(&format!("{id}-")));
    assert!(name.ends_with(".jpg"));
    assert_ne!(name, photo_object_name(id, "Me At Beach.JPG"));
    assert!(!photo_object_name(id, "noext").contains('.'));
    assert!(!photo_object_name(id, "evil.../x").ends_with("/x"));
  }
}
