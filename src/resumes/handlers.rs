use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{ListResumesQuery, ResumeForm, ResumeMutationResponse, ResumeResponse, Upload};
use super::repo::Resume;
use super::services::{
    keep_if_saved, remove_file, replace_upload, store_upload, DOWNLOAD_TTL_SECS,
};
use crate::{
    auth::{require_owned, AuthUser},
    db::search_filter,
    errors::AppError,
    pagination::Page,
    state::AppState,
};

const RESUME_NOT_FOUND: &str = "Resume not found";

/// Room for multipart framing and the `name` part on top of the file itself.
const MULTIPART_HEADROOM: usize = 1024 * 1024;

/// Request body cap for résumé uploads. Oversized files still reach
/// `Upload::validate` and get its size message.
pub fn body_limit(upload_max_bytes: usize) -> usize {
    upload_max_bytes.saturating_add(MULTIPART_HEADROOM)
}

pub fn routes(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/resumes", get(list_resumes).post(create_resume))
        .route(
            "/resumes/:id",
            get(get_resume).put(update_resume).delete(delete_resume),
        )
        .route("/resumes/:id/file", get(download_resume))
        .layer(DefaultBodyLimit::max(body_limit(upload_max_bytes)))
}

async fn load_owned(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Resume, AppError> {
    require_owned(Resume::find_by_id(&state.db, id).await?, user_id, RESUME_NOT_FOUND)
}

/// Reads `name` and `file` parts; an empty file part counts as no file.
async fn read_form(mut mp: Multipart) -> Result<ResumeForm, AppError> {
    let mut form = ResumeForm::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable name field: {e}")))?;
                form.name = Some(text);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable file field: {e}")))?;
                if !(file_name.is_empty() && body.is_empty()) {
                    form.file = Some(Upload { file_name, body });
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

#[instrument(skip(state))]
pub async fn list_resumes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListResumesQuery>,
) -> Result<Json<Page<ResumeResponse>>, AppError> {
    let params = q.page_params();
    let search = search_filter(q.search.as_deref());
    let (rows, total) = Resume::list_by_user(
        &state.db,
        user_id,
        search.as_deref(),
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(Page::new(rows, params, total).map(ResumeResponse::from)))
}

/// POST /resumes (multipart: name, file)
#[instrument(skip(state, mp))]
pub async fn create_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<ResumeMutationResponse>), AppError> {
    let form = read_form(mp).await?;
    let name = form.validated_name()?;
    let upload = form
        .file
        .ok_or_else(|| AppError::validation("The file field is required."))?;

    let key = store_upload(
        state.storage.as_ref(),
        user_id,
        upload,
        state.config.upload_max_bytes,
    )
    .await?;

    let saved = Resume::create(&state.db, user_id, &name, &key).await;
    let resume = keep_if_saved(state.storage.as_ref(), Some(key.as_str()), saved)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, %key, "insert resume failed");
            AppError::from(e)
        })?;

    info!(%user_id, resume_id = %resume.id, "resume uploaded");
    Ok((
        StatusCode::CREATED,
        Json(ResumeMutationResponse {
            message: "Resume uploaded successfully.",
            resume: resume.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let resume = load_owned(&state, user_id, id).await?;
    Ok(Json(resume.into()))
}

/// 307 to a short-lived download URL for the stored file.
#[instrument(skip(state))]
pub async fn download_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let resume = load_owned(&state, user_id, id).await?;
    let url = state
        .storage
        .presign_get(&resume.file_path, DOWNLOAD_TTL_SECS)
        .await
        .map_err(|e| AppError::Storage(format!("presign {}: {e:#}", resume.file_path)))?;
    Ok(Redirect::temporary(&url))
}

/// PUT /resumes/:id (multipart: name, optional file)
#[instrument(skip(state, mp))]
pub async fn update_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<ResumeMutationResponse>, AppError> {
    let resume = load_owned(&state, user_id, id).await?;
    let form = read_form(mp).await?;
    let name = form.validated_name()?;

    let new_key = match form.file {
        Some(upload) => Some(
            replace_upload(
                state.storage.as_ref(),
                user_id,
                &resume.file_path,
                upload,
                state.config.upload_max_bytes,
            )
            .await?,
        ),
        None => None,
    };

    let saved = Resume::update(&state.db, id, user_id, &name, new_key.as_deref()).await;
    let updated = keep_if_saved(state.storage.as_ref(), new_key.as_deref(), saved)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, resume_id = %id, "update resume failed");
            AppError::from(e)
        })?;
    info!(%user_id, resume_id = %id, file_replaced = new_key.is_some(), "resume updated");
    Ok(Json(ResumeMutationResponse {
        message: "Resume updated successfully.",
        resume: updated.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let resume = load_owned(&state, user_id, id).await?;
    remove_file(state.storage.as_ref(), &resume.file_path).await?;
    Resume::delete(&state.db, id, user_id).await?;
    info!(%user_id, resume_id = %id, "resume deleted");
    Ok(Json(json!({ "message": "Resume deleted successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use time::OffsetDateTime;

    fn resume(owner: Uuid) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Backend CV".into(),
            file_path: format!("resumes/{owner}/cv.pdf"),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn foreign_resume_is_forbidden() {
        let err = require_owned(Some(resume(Uuid::new_v4())), Uuid::new_v4(), RESUME_NOT_FOUND)
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_resume_is_not_found() {
        let err = require_owned(None::<Resume>, Uuid::new_v4(), RESUME_NOT_FOUND).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_limit_follows_upload_limit() {
        let configured = 64 * 1024 * 1024;
        assert!(body_limit(configured) > configured);
        assert_eq!(body_limit(usize::MAX), usize::MAX);
    }
}
