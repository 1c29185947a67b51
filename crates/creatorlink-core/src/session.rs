//! Identities, sessions, and the signed-in viewer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, profile::Profile};

/// Who the identity provider says the user is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id: Uuid,
  pub email:   String,
}

/// An issued session. The token is opaque to everything but the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  #[serde(skip_serializing)]
  pub token:      String,
  pub identity:   Identity,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}

/// The signed-in user making a request, with their profile if registration
/// is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
  pub identity: Identity,
  pub profile:  Option<Profile>,
}

impl Viewer {
  pub fn profile_id(&self) -> Option<Uuid> {
    self.profile.as_ref().map(|p| p.id)
  }

  pub fn is_creator(&self) -> bool {
    self.profile.as_ref().is_some_and(Profile::is_creator)
  }

  /// The viewer's profile, or [`Error::ProfileRequired`].
  pub fn require_profile(&self) -> Result<&Profile> {
    self.profile.as_ref().ok_or(Error::ProfileRequired)
  }

  pub fn require_creator(&self) -> Result<&Profile> {
    let profile = self.require_profile()?;
    if profile.is_creator() {
      Ok(profile)
    } else {
      Err(Error::Forbidden("only creators can do this"))
    }
  }

  pub fn require_business(&self) -> Result<&Profile> {
    let profile = self.require_profile()?;
    if profile.is_business() {
      Ok(profile)
    } else {
      Err(Error::Forbidden("only businesses can post jobs"))
    }
  }
}
