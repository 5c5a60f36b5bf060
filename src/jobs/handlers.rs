use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{JobForm, JobMutationResponse, JobResponse, ListJobsQuery};
use super::repo::Job;
use crate::{
    auth::{require_owned, AuthUser},
    db::search_filter,
    errors::AppError,
    pagination::Page,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:id", get(get_job).put(update_job).delete(delete_job))
}

const JOB_NOT_FOUND: &str = "Job not found";

/// Loads a job and rejects callers that do not own it.
async fn load_owned(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Job, AppError> {
    require_owned(Job::find_by_id(&state.db, id).await?, user_id, JOB_NOT_FOUND)
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListJobsQuery>,
) -> Result<Json<Page<JobResponse>>, AppError> {
    let params = q.page_params();
    let search = search_filter(q.search.as_deref());
    let (rows, total) =
        Job::list_by_user(&state.db, user_id, search.as_deref(), params.limit(), params.offset())
            .await?;
    Ok(Json(Page::new(rows, params, total).map(JobResponse::from)))
}

#[instrument(skip(state, form))]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(form): Json<JobForm>,
) -> Result<(StatusCode, Json<JobMutationResponse>), AppError> {
    let valid = form.validate()?;
    let job = Job::create(&state.db, user_id, &valid).await?;
    info!(%user_id, job_id = %job.id, "job created");
    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            message: "Job created successfully.",
            job: job.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = load_owned(&state, user_id, id).await?;
    Ok(Json(job.into()))
}

#[instrument(skip(state, form))]
pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(form): Json<JobForm>,
) -> Result<Json<JobMutationResponse>, AppError> {
    load_owned(&state, user_id, id).await?;
    let valid = form.validate()?;
    let job = Job::update(&state.db, id, user_id, &valid).await?;
    info!(%user_id, job_id = %id, "job updated");
    Ok(Json(JobMutationResponse {
        message: "Job updated successfully.",
        job: job.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    load_owned(&state, user_id, id).await?;
    Job::delete(&state.db, id, user_id).await?;
    info!(%user_id, job_id = %id, "job deleted");
    Ok(Json(json!({ "message": "Job deleted successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use time::OffsetDateTime;

    fn job(owner: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Platform Engineer".into(),
            description: "Rust and Postgres".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn foreign_job_is_forbidden() {
        let owner = Uuid::new_v4();
        let err = require_owned(Some(job(owner)), Uuid::new_v4(), JOB_NOT_FOUND).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_job_is_not_found() {
        let err = require_owned(None::<Job>, Uuid::new_v4(), JOB_NOT_FOUND).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn own_job_is_returned() {
        let owner = Uuid::new_v4();
        let found = require_owned(Some(job(owner)), owner, JOB_NOT_FOUND).unwrap();
        assert_eq!(found.user_id, owner);
    }
}
