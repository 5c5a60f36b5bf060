//! The external analysis agent that scores résumés against a job.
//!
//! Every scan goes through [`AnalysisAgent`]; the production implementation is
//! [`client::ChatAgent`], which talks to an OpenAI-compatible endpoint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod client;
pub mod prompts;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("agent returned empty content")]
    EmptyContent,
}

/// One résumé as handed to the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeInput {
    pub id: Uuid,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub job_title: String,
    pub job_description: String,
    pub resumes: Vec<ResumeInput>,
    /// Résumé id → uppercased file extension ("PDF", "DOCX", ...).
    pub file_types: BTreeMap<Uuid, String>,
}

#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Returns the raw model text, expected to hold a JSON array with one
    /// element per résumé in request order.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AgentError>;
}
