use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::ResumeResponse;
use crate::auth::Owned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub file_path: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Owned for Resume {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl From<Resume> for ResumeResponse {
    fn from(r: Resume) -> Self {
        Self {
            id: r.id,
            name: r.name,
            file_path: r.file_path,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: String,
    pub file_path: String,
}

const COLUMNS: &str = "id, user_id, name, file_path, created_at, updated_at";

impl Resume {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Resume>, i64)> {
        let rows = sqlx::query_as::<_, Resume>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM resumes
            WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM resumes
            WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE $2)
            "#,
        )
        .bind(user_id)
        .bind(search)
        .fetch_one(db)
        .await?;

        Ok((rows, total))
    }

    pub async fn summaries_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<ResumeSummary>> {
        sqlx::query_as::<_, ResumeSummary>(
            r#"
            SELECT id, name, file_path
            FROM resumes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Resume>> {
        sqlx::query_as::<_, Resume>(&format!("SELECT {COLUMNS} FROM resumes WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// The caller's résumés among `ids`, in no particular order.
    pub async fn find_many_owned(
        db: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> sqlx::Result<Vec<Resume>> {
        sqlx::query_as::<_, Resume>(&format!(
            "SELECT {COLUMNS} FROM resumes WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        file_path: &str,
    ) -> sqlx::Result<Resume> {
        sqlx::query_as::<_, Resume>(&format!(
            r#"
            INSERT INTO resumes (user_id, name, file_path)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(file_path)
        .fetch_one(db)
        .await
    }

    /// `file_path = None` keeps the stored file.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        file_path: Option<&str>,
    ) -> sqlx::Result<Resume> {
        sqlx::query_as::<_, Resume>(&format!(
            r#"
            UPDATE resumes
            SET name = $3, file_path = COALESCE($4, file_path), updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(file_path)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<u64> {
        let res = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
