//! Handlers for `/jobs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/jobs` | `?q=&country=&saved_only=&mine_only=` |
//! | `POST`   | `/jobs` | Businesses only; body: [`PostingForm`] |
//! | `GET`    | `/jobs/by-slug/{slug}` | Posting plus the viewer's actions |
//! | `PUT`    | `/jobs/{id}` | Owner only; slug and owner never change |
//! | `DELETE` | `/jobs/{id}?confirm=true` | Owner only; 428 without `confirm` |
//! | `POST`   | `/jobs/{id}/save` | Creators only |
//! | `DELETE` | `/jobs/{id}/save` | Creators only |
//! | `POST`   | `/jobs/{id}/apply` | Creators only; deadline and duplicate guarded |
//! | `GET`    | `/jobs/{id}/applicants` | Owner only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use creatorlink_core::{
  engagement::Applicant,
  filter::{ListingFilter, Scope},
  posting::{JobPostingView, PostingFields, PostingForm},
  store::PhotoStorage,
  workflow::{self, PostingDetail, local_now},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState, Backend,
  error::ApiError,
  session::{CurrentViewer, MaybeViewer},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default, alias = "query")]
  pub q:          String,
  #[serde(default)]
  pub country:    String,
  #[serde(default)]
  pub saved_only: bool,
  #[serde(default)]
  pub mine_only:  bool,
}

impl ListParams {
  pub fn to_filter(&self) -> Result<ListingFilter, ApiError> {
    let scope = match (self.saved_only, self.mine_only) {
      (true, true) => {
        return Err(ApiError::BadRequest(
          "saved_only and mine_only are mutually exclusive".into(),
        ));
      }
      (true, false) => Scope::SavedOnly,
      (false, true) => Scope::MineOnly,
      (false, false) => Scope::All,
    };
    let mut filter = ListingFilter::new().with_query(self.q.clone()).with_scope(scope);
    filter.set_country(Some(self.country.clone()));
    Ok(filter)
  }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
  pub postings: Vec<JobPostingView>,
  /// Size of the unfiltered listing.
  pub total:    usize,
  pub shown:    usize,
}

/// `GET /jobs`
pub async fn list<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  Query(params): Query<ListParams>,
) -> Result<Json<ListingResponse>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let filter = params.to_filter()?;
  let mut board = workflow::fetch_listing(state.store.as_ref(), viewer.as_ref()).await?;
  board.set_filter(filter);
  let postings: Vec<JobPostingView> = board.visible().into_iter().cloned().collect();
  Ok(Json(ListingResponse {
    total: board.postings().len(),
    shown: postings.len(),
    postings,
  }))
}

// ─── Create / update / delete ────────────────────────────────────────────────

/// `POST /jobs`
pub async fn create<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Json(form): Json<PostingForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let job = workflow::create_posting(state.store.as_ref(), &viewer, form).await?;
  tracing::info!(slug = %job.slug, "job posting created");
  Ok((StatusCode::CREATED, Json(job)))
}

/// `PUT /jobs/{id}`
pub async fn update<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
  Json(form): Json<PostingForm>,
) -> Result<Json<PostingFields>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let fields = workflow::update_posting(state.store.as_ref(), &viewer, id, form).await?;
  Ok(Json(fields))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub confirm: bool,
}

/// `DELETE /jobs/{id}?confirm=true`
pub async fn delete<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  workflow::delete_posting(state.store.as_ref(), &viewer, id, params.confirm).await?;
  tracing::info!(%id, "job posting deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /jobs/by-slug/{slug}`
pub async fn detail<S, P>(
  State(state): State<ApiState<S, P>>,
  MaybeViewer(viewer): MaybeViewer,
  Path(slug): Path<String>,
) -> Result<Json<PostingDetail>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let detail =
    workflow::fetch_detail(state.store.as_ref(), viewer.as_ref(), &slug, local_now())
      .await?;
  Ok(Json(detail))
}

/// `GET /jobs/{id}/applicants`
pub async fn applicants<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Applicant>>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  Ok(Json(workflow::list_applicants(state.store.as_ref(), &viewer, id).await?))
}

// ─── Save / apply ────────────────────────────────────────────────────────────

/// `POST /jobs/{id}/save`
pub async fn save<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let saved = workflow::set_saved(state.store.as_ref(), &viewer, id, true).await?;
  Ok(Json(json!({ "saved": saved })))
}

/// `DELETE /jobs/{id}/save`
pub async fn unsave<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let saved = workflow::set_saved(state.store.as_ref(), &viewer, id, false).await?;
  Ok(Json(json!({ "saved": saved })))
}

/// `POST /jobs/{id}/apply`
pub async fn apply<S, P>(
  State(state): State<ApiState<S, P>>,
  CurrentViewer(viewer): CurrentViewer,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
  P: PhotoStorage + 'static,
{
  let application =
    workflow::apply_to_posting(state.store.as_ref(), &viewer, id, local_now()).await?;
  tracing::info!(posting = %id, "application submitted");
  Ok((StatusCode::CREATED, Json(application)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn both_toggles_is_a_bad_request() {
    let params = ListParams { saved_only: true, mine_only: true, ..Default::default() };
    assert!(matches!(params.to_filter(), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn params_map_onto_filter() {
    let params = ListParams {
      q: "Summer".into(),
      country: "Portugal".into(),
      mine_only: true,
      ..Default::default()
    };
    let filter = params.to_filter().unwrap();
    assert_eq!(filter.query(), "Summer");
    assert_eq!(filter.country(), Some("Portugal"));
    assert_eq!(filter.scope(), Scope::MineOnly);
    assert_eq!(ListParams::default().to_filter().unwrap(), ListingFilter::default());
  }
}
