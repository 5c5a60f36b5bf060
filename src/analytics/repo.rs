use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::Owned;
use crate::scan::normalize::Scores;

/// A stored scan result. Never updated after insert.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Match {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description_id: Uuid,
    pub resume_id: Uuid,
    pub match_percentage: Option<f64>,
    pub semantic_score: Option<f64>,
    pub keyword_score: Option<f64>,
    pub keyword_gap: Option<f64>,
    pub ai_result: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// History row joined with the résumé name (gone résumés give `None`).
#[derive(Debug, Clone, FromRow)]
pub struct MatchHistoryRow {
    #[sqlx(flatten)]
    pub record: Match,
    pub resume_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MatchDetailRow {
    #[sqlx(flatten)]
    pub record: Match,
    pub job_title: Option<String>,
    pub resume_name: Option<String>,
}

impl Owned for MatchDetailRow {
    fn owner_id(&self) -> Uuid {
        self.record.user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Uuid,
    pub scores: Scores,
    pub ai_result: String,
}

impl Match {
    /// Scores with absent or non-finite columns read as 0.
    pub fn scores(&self) -> Scores {
        let column = |v: Option<f64>| v.filter(|v| v.is_finite()).unwrap_or(0.0);
        Scores {
            match_percentage: column(self.match_percentage),
            semantic_score: column(self.semantic_score),
            keyword_score: column(self.keyword_score),
            keyword_gap: column(self.keyword_gap),
        }
    }

    async fn insert_tx(tx: &mut Transaction<'_, Postgres>, m: &NewMatch) -> anyhow::Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO matches (user_id, job_description_id, resume_id,
                                 match_percentage, semantic_score, keyword_score, keyword_gap,
                                 ai_result)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(m.user_id)
        .bind(m.job_id)
        .bind(m.resume_id)
        .bind(m.scores.match_percentage)
        .bind(m.scores.semantic_score)
        .bind(m.scores.keyword_score)
        .bind(m.scores.keyword_gap)
        .bind(&m.ai_result)
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("insert match for resume {}", m.resume_id))?;
        Ok(id)
    }

    /// Writes every row of one scan in a single transaction.
    pub async fn insert_all(db: &PgPool, rows: &[NewMatch]) -> anyhow::Result<Vec<Uuid>> {
        let mut tx = db.begin().await.context("begin tx")?;
        let mut ids = Vec::with_capacity(rows.len());
        for m in rows {
            ids.push(Self::insert_tx(&mut tx, m).await?);
        }
        tx.commit().await.context("commit tx")?;
        Ok(ids)
    }

    pub async fn history_by_user(
        db: &PgPool,
        user_id: Uuid,
        job_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<MatchHistoryRow>, i64)> {
        let rows = sqlx::query_as::<_, MatchHistoryRow>(
            r#"
            SELECT m.id, m.user_id, m.job_description_id, m.resume_id,
                   m.match_percentage, m.semantic_score, m.keyword_score, m.keyword_gap,
                   m.ai_result, m.created_at, m.updated_at,
                   r.name AS resume_name
            FROM matches m
            LEFT JOIN resumes r ON r.id = m.resume_id
            WHERE m.user_id = $1 AND ($2::uuid IS NULL OR m.job_description_id = $2)
            ORDER BY m.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM matches
            WHERE user_id = $1 AND ($2::uuid IS NULL OR job_description_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_one(db)
        .await?;

        Ok((rows, total))
    }

    pub async fn detail(db: &PgPool, id: Uuid) -> sqlx::Result<Option<MatchDetailRow>> {
        sqlx::query_as::<_, MatchDetailRow>(
            r#"
            SELECT m.id, m.user_id, m.job_description_id, m.resume_id,
                   m.match_percentage, m.semantic_score, m.keyword_score, m.keyword_gap,
                   m.ai_result, m.created_at, m.updated_at,
                   j.title AS job_title,
                   r.name AS resume_name
            FROM matches m
            LEFT JOIN job_descriptions j ON j.id = m.job_description_id
            LEFT JOIN resumes r ON r.id = m.resume_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn owner_of(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Uuid>> {
        sqlx::query_scalar("SELECT user_id FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<u64> {
        let res = sqlx::query("DELETE FROM matches WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_non_finite_columns_score_zero() {
        let m = Match {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            job_description_id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            match_percentage: Some(88.0),
            semantic_score: None,
            keyword_score: Some(12.5),
            keyword_gap: Some(f64::NAN),
            ai_result: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        assert_eq!(
            m.scores(),
            Scores { match_percentage: 88.0, semantic_score: 0.0, keyword_score: 12.5, keyword_gap: 0.0 }
        );
    }
}
