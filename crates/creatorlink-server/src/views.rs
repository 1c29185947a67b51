//! Page templates. Rendered with askama; every interpolation is escaped.

use askama::Template;
use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use creatorlink_core::{
  engagement::Applicant,
  posting::JobPostingView,
  profile::Profile,
  registration::RegistrationWizard,
  workflow::{PostingDetail, ViewerActions},
};

/// Render `template`, or a bare 500 if rendering fails.
pub fn render(template: &impl Template) -> Response {
  match template.render() {
    Ok(html) => Html(html).into_response(),
    Err(e) => {
      tracing::error!(error = %e, "failed to render page");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct Home {
  pub email: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct Register {
  pub step_number: usize,
  pub step:        String,
  pub email:       String,
}

impl From<&RegistrationWizard> for Register {
  fn from(wizard: &RegistrationWizard) -> Self {
    Self {
      step_number: wizard.step().index() + 1,
      step:        format!("{:?}", wizard.step()),
      email:       wizard.data().email.clone(),
    }
  }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard {
  pub profile: Profile,
}

#[derive(Template)]
#[template(path = "find_work.html")]
pub struct FindWork {
  pub postings:    Vec<JobPostingView>,
  pub total:       usize,
  pub load_failed: bool,
}

impl FindWork {
  pub fn failed() -> Self {
    Self { postings: Vec::new(), total: 0, load_failed: true }
  }
}

#[derive(Template)]
#[template(path = "job_detail.html")]
pub struct JobDetail {
  pub job:             JobPostingView,
  pub deadline:        Option<String>,
  pub deadline_passed: bool,
  pub is_owner:        bool,
  pub applicants:      Vec<Applicant>,
  pub is_creator:      bool,
  pub is_saved:        bool,
  pub has_applied:     bool,
  pub can_apply:       bool,
}

impl From<PostingDetail> for JobDetail {
  fn from(detail: PostingDetail) -> Self {
    let can_apply = detail.actions.can_apply();
    let job = detail.posting;
    let deadline = job.deadline_date.map(|date| match job.deadline_time {
      Some(time) => format!("{date} {}", time.format("%H:%M")),
      None => date.to_string(),
    });
    let mut page = Self {
      job,
      deadline,
      deadline_passed: detail.deadline_passed,
      is_owner: false,
      applicants: Vec::new(),
      is_creator: false,
      is_saved: false,
      has_applied: false,
      can_apply,
    };
    match detail.actions {
      ViewerActions::Owner { applicants } => {
        page.is_owner = true;
        page.applicants = applicants;
      }
      ViewerActions::Creator { is_saved, has_applied, .. } => {
        page.is_creator = true;
        page.is_saved = is_saved;
        page.has_applied = has_applied;
      }
      ViewerActions::SignInPrompt => {}
    }
    page
  }
}

#[derive(Template)]
#[template(path = "creators.html")]
pub struct Creators {
  pub creators:    Vec<Profile>,
  pub total:       usize,
  pub load_failed: bool,
}

#[derive(Template)]
#[template(path = "creator.html")]
pub struct Creator {
  pub profile: Profile,
  pub links:   Vec<(&'static str, String)>,
}

impl From<Profile> for Creator {
  fn from(profile: Profile) -> Self {
    let links = [
      ("Instagram", &profile.instagram_url),
      ("TikTok", &profile.tiktok_url),
      ("YouTube", &profile.youtube_url),
    ]
    .into_iter()
    .filter_map(|(label, url)| url.clone().map(|url| (label, url)))
    .collect();
    Self { profile, links }
  }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFound {
  pub what: &'static str,
  pub back: &'static str,
}

impl IntoResponse for NotFound {
  fn into_response(self) -> Response {
    (StatusCode::NOT_FOUND, render(&self)).into_response()
  }
}

#[derive(Template)]
#[template(path = "auth_error.html")]
pub struct AuthError {
  pub message: String,
}
