use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Match, MatchDetailRow, MatchHistoryRow};
use super::view::{detail_view, history_view};
use crate::jobs::repo::JobSummary;
use crate::pagination::{Page, PageParams};
use crate::resumes::repo::ResumeSummary;

const MISSING: &str = "N/A";

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub job_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AnalyticsQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_description_id: Uuid,
    pub created_at: OffsetDateTime,
    pub resume_name: String,
    pub ai_result: Map<String, Value>,
}

impl From<MatchHistoryRow> for HistoryItem {
    fn from(row: MatchHistoryRow) -> Self {
        let m = row.record;
        Self {
            ai_result: history_view(m.ai_result.as_deref(), m.scores()),
            id: m.id,
            resume_id: m.resume_id,
            job_description_id: m.job_description_id,
            created_at: m.created_at,
            resume_name: row.resume_name.unwrap_or_else(|| MISSING.into()),
        }
    }
}

/// Everything the analytics page needs: scan pickers plus history.
#[derive(Debug, Serialize)]
pub struct AnalyticsIndex {
    pub jobs: Vec<JobSummary>,
    pub resumes: Vec<ResumeSummary>,
    pub matched_history: Page<HistoryItem>,
}

#[derive(Debug, Serialize)]
pub struct MatchDetail {
    #[serde(rename = "match")]
    pub record: Match,
    pub ai_data: Map<String, Value>,
    pub job_title: String,
    pub resume_name: String,
}

impl From<MatchDetailRow> for MatchDetail {
    fn from(row: MatchDetailRow) -> Self {
        Self {
            ai_data: detail_view(row.record.ai_result.as_deref(), row.record.scores()),
            record: row.record,
            job_title: row.job_title.unwrap_or_else(|| MISSING.into()),
            resume_name: row.resume_name.unwrap_or_else(|| MISSING.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: &'static str,
    pub match_ids: Vec<Uuid>,
}
