use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::PageParams;

const TITLE_MAX: usize = 255;

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListJobsQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.per_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct JobForm {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A job form that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidJob {
    pub title: String,
    pub description: String,
}

impl JobForm {
    pub fn validate(self) -> Result<ValidJob, AppError> {
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.is_empty() {
            return Err(AppError::validation("The title field is required."));
        }
        if title.chars().count() > TITLE_MAX {
            return Err(AppError::validation(
                "The title field must not be greater than 255 characters.",
            ));
        }
        let description = self.description.unwrap_or_default();
        if description.trim().is_empty() {
            return Err(AppError::validation("The description field is required."));
        }
        Ok(ValidJob { title, description })
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct JobMutationResponse {
    pub message: &'static str,
    pub job: JobResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: Option<&str>, description: Option<&str>) -> JobForm {
        JobForm {
            title: title.map(Into::into),
            description: description.map(Into::into),
        }
    }

    #[test]
    fn accepts_and_trims_title() {
        let job = form(Some("  Backend Engineer "), Some("Need Python")).validate().unwrap();
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.description, "Need Python");
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(form(None, Some("x")).validate(), Err(AppError::Validation(_))));
        assert!(matches!(form(Some("   "), Some("x")).validate(), Err(AppError::Validation(_))));
        assert!(matches!(form(Some("t"), None).validate(), Err(AppError::Validation(_))));
        assert!(matches!(form(Some("t"), Some("  ")).validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_long_title() {
        let long = "x".repeat(256);
        assert!(form(Some(&long), Some("d")).validate().is_err());
        let max = "é".repeat(255);
        assert!(form(Some(&max), Some("d")).validate().is_ok());
    }
}
