use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::file_extension;
use crate::pagination::PageParams;

pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "txt", "json", "xml"];
const NAME_MAX: usize = 255;

#[derive(Debug, Deserialize)]
pub struct ListResumesQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListResumesQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.per_page)
    }
}

/// An uploaded file as read from the multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub body: Bytes,
}

impl Upload {
    /// Checks type and size; returns the lowercased extension.
    pub fn validate(&self, max_bytes: usize) -> Result<String, AppError> {
        let ext = file_extension(&self.file_name)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::validation(
                    "The file field must be a file of type: pdf, doc, docx, txt, json, xml.",
                )
            })?;
        if self.body.is_empty() {
            return Err(AppError::validation("The file field must not be empty."));
        }
        if self.body.len() > max_bytes {
            return Err(AppError::validation(format!(
                "The file field must not be greater than {} kilobytes.",
                max_bytes / 1024
            )));
        }
        Ok(ext)
    }
}

/// Raw multipart form for create and update.
#[derive(Debug, Default)]
pub struct ResumeForm {
    pub name: Option<String>,
    pub file: Option<Upload>,
}

impl ResumeForm {
    pub fn validated_name(&self) -> Result<String, AppError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(AppError::validation("The name field is required."));
        }
        if name.chars().count() > NAME_MAX {
            return Err(AppError::validation(
                "The name field must not be greater than 255 characters.",
            ));
        }
        Ok(name.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub id: Uuid,
    pub name: String,
    pub file_path: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ResumeMutationResponse {
    pub message: &'static str,
    pub resume: ResumeResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, body: &'static [u8]) -> Upload {
        Upload { file_name: name.into(), body: Bytes::from_static(body) }
    }

    #[test]
    fn accepts_allow_listed_extensions_case_insensitively() {
        for name in ["cv.pdf", "cv.DOC", "cv.Docx", "cv.txt", "cv.json", "cv.XML"] {
            assert!(upload(name, b"x").validate(1024).is_ok(), "{name}");
        }
        assert_eq!(upload("CV.PDF", b"x").validate(1024).unwrap(), "pdf");
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["cv.exe", "cv.png", "cv", "cv.pdf.zip"] {
            assert!(matches!(upload(name, b"x").validate(1024), Err(AppError::Validation(_))), "{name}");
        }
    }

    #[test]
    fn rejects_empty_and_oversized_files() {
        assert!(upload("cv.txt", b"").validate(1024).is_err());
        assert!(upload("cv.txt", b"12345").validate(4).is_err());
        assert!(upload("cv.txt", b"1234").validate(4).is_ok());
    }

    #[test]
    fn name_is_required_and_bounded() {
        let mut form = ResumeForm::default();
        assert!(form.validated_name().is_err());
        form.name = Some("   ".into());
        assert!(form.validated_name().is_err());
        form.name = Some("x".repeat(256));
        assert!(form.validated_name().is_err());
        form.name = Some(" Backend CV ".into());
        assert_eq!(form.validated_name().unwrap(), "Backend CV");
    }
}
