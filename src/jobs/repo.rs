use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{JobResponse, ValidJob};
use crate::auth::Owned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Owned for Job {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl From<Job> for JobResponse {
    fn from(j: Job) -> Self {
        Self {
            id: j.id,
            title: j.title,
            description: j.description,
            created_at: j.created_at,
            updated_at: j.updated_at,
        }
    }
}

/// Short form used by the analytics scan picker.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

impl Job {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Job>, i64)> {
        let rows = sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM job_descriptions
            WHERE user_id = $1 AND ($2::text IS NULL OR title ILIKE $2)
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
            FROM job_descriptions
            WHERE user_id = $1 AND ($2::text IS NULL OR title ILIKE $2)
            "#,
        )
        .bind(user_id)
        .bind(search)
        .fetch_one(db)
        .await?;

        Ok((rows, total))
    }

    pub async fn summaries_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<JobSummary>> {
        sqlx::query_as::<_, JobSummary>(
            r#"
            SELECT id, title, description
            FROM job_descriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {COLUMNS} FROM job_descriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<Option<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {COLUMNS} FROM job_descriptions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: Uuid, job: &ValidJob) -> sqlx::Result<Job> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO job_descriptions (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&job.title)
        .bind(&job.description)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: Uuid, user_id: Uuid, job: &ValidJob) -> sqlx::Result<Job> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE job_descriptions
            SET title = $3, description = $4, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&job.title)
        .bind(&job.description)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<u64> {
        let res = sqlx::query("DELETE FROM job_descriptions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
