use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{AnalyticsIndex, AnalyticsQuery, HistoryItem, MatchDetail, ScanResponse};
use super::repo::Match;
use crate::{
    auth::{require_owned, AuthUser},
    errors::AppError,
    jobs::repo::Job,
    pagination::Page,
    resumes::repo::Resume,
    scan::{self, ScanRequest},
    state::AppState,
};

const MATCH_NOT_FOUND: &str = "Match not found.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(index))
        .route("/analytics/scan", post(run_scan))
        .route("/analytics/matches/:id", get(show_match).delete(delete_match))
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsIndex>, AppError> {
    let params = q.page_params();
    let jobs = Job::summaries_by_user(&state.db, user_id).await?;
    let resumes = Resume::summaries_by_user(&state.db, user_id).await?;
    let (rows, total) =
        Match::history_by_user(&state.db, user_id, q.job_id, params.limit(), params.offset())
            .await?;

    Ok(Json(AnalyticsIndex {
        jobs,
        resumes,
        matched_history: Page::new(rows, params, total).map(HistoryItem::from),
    }))
}

#[instrument(skip(state))]
pub async fn show_match(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchDetail>, AppError> {
    let row = require_owned(Match::detail(&state.db, id).await?, user_id, MATCH_NOT_FOUND)?;
    Ok(Json(row.into()))
}

/// POST /analytics/scan { job_id, resume_ids: [...] }
#[instrument(skip(state, req))]
pub async fn run_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ScanResponse>), AppError> {
    let match_ids = scan::run_scan(&state, user_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScanResponse {
            message: "Scan completed successfully!",
            match_ids,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_match(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_owned(Match::owner_of(&state.db, id).await?, user_id, MATCH_NOT_FOUND)?;
    Match::delete(&state.db, id, user_id).await?;
    info!(%user_id, match_id = %id, "match deleted");
    Ok(Json(json!({ "message": "Match Deleted successfully!" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::repo::MatchDetailRow;
    use axum::response::IntoResponse;
    use time::OffsetDateTime;

    fn detail(owner: Uuid) -> MatchDetailRow {
        MatchDetailRow {
            record: Match {
                id: Uuid::new_v4(),
                user_id: owner,
                job_description_id: Uuid::new_v4(),
                resume_id: Uuid::new_v4(),
                match_percentage: Some(80.0),
                semantic_score: None,
                keyword_score: None,
                keyword_gap: None,
                ai_result: None,
                created_at: OffsetDateTime::now_utc(),
                updated_at: OffsetDateTime::now_utc(),
            },
            job_title: Some("Data Engineer".into()),
            resume_name: Some("CV".into()),
        }
    }

    #[test]
    fn foreign_match_detail_is_forbidden() {
        let err = require_owned(Some(detail(Uuid::new_v4())), Uuid::new_v4(), MATCH_NOT_FOUND)
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn deleting_someone_elses_match_is_forbidden() {
        let owner = Some(Uuid::new_v4());
        let err = require_owned(owner, Uuid::new_v4(), MATCH_NOT_FOUND).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let err = require_owned(None::<Uuid>, Uuid::new_v4(), MATCH_NOT_FOUND).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn own_match_detail_passes() {
        let me = Uuid::new_v4();
        let row = require_owned(Some(detail(me)), me, MATCH_NOT_FOUND).unwrap();
        assert_eq!(MatchDetail::from(row).job_title, "Data Engineer");
    }
}
