use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::Upload;
use crate::errors::AppError;
use crate::storage::StorageClient;

pub const DOWNLOAD_TTL_SECS: u64 = 10 * 60;

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain; charset=utf-8",
        "json" => "application/json",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

fn storage_key(user_id: Uuid, ext: &str) -> String {
    format!("resumes/{}/{}.{}", user_id, Uuid::new_v4(), ext)
}

/// Validates the upload, then writes it under a fresh key.
pub async fn store_upload(
    storage: &dyn StorageClient,
    user_id: Uuid,
    upload: Upload,
    max_bytes: usize,
) -> Result<String, AppError> {
    let ext = upload.validate(max_bytes)?;
    let key = storage_key(user_id, &ext);
    storage
        .put_object(&key, upload.body, content_type_for(&ext))
        .await
        .map_err(|e| AppError::Storage(format!("put_object {key}: {e:#}")))?;
    debug!(%user_id, %key, "resume file stored");
    Ok(key)
}

/// Swaps the stored file: validate, drop the old blob, store the new one.
pub async fn replace_upload(
    storage: &dyn StorageClient,
    user_id: Uuid,
    old_key: &str,
    upload: Upload,
    max_bytes: usize,
) -> Result<String, AppError> {
    upload.validate(max_bytes)?;
    remove_file(storage, old_key).await?;
    store_upload(storage, user_id, upload, max_bytes).await
}

pub async fn remove_file(storage: &dyn StorageClient, key: &str) -> Result<(), AppError> {
    storage
        .delete_object(key)
        .await
        .map_err(|e| AppError::Storage(format!("delete_object {key}: {e:#}")))?;
    debug!(%key, "resume file deleted");
    Ok(())
}

/// Best-effort cleanup of a blob whose database row never made it.
pub async fn discard_orphan(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, %key, "failed to clean up orphaned resume file");
    }
}

/// Passes the row write through, dropping the freshly stored `key` when it failed.
pub async fn keep_if_saved<T>(
    storage: &dyn StorageClient,
    key: Option<&str>,
    saved: sqlx::Result<T>,
) -> sqlx::Result<T> {
    if saved.is_err() {
        if let Some(key) = key {
            discard_orphan(storage, key).await;
        }
    }
    saved
}
