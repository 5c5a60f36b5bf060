//! Résumé/job scan: extract text, ask the agent once, normalize its answer and
//! record one match per résumé.

pub mod normalize;
pub mod parse;
pub mod skills;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::ai::{AnalysisAgent, AnalysisRequest, ResumeInput};
use crate::analytics::repo::{Match, NewMatch};
use crate::errors::AppError;
use crate::extract::{file_extension, TextExtractor};
use crate::jobs::repo::Job;
use crate::resumes::repo::Resume;
use crate::state::AppState;
use crate::storage::StorageClient;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub job_id: Option<Uuid>,
    #[serde(default)]
    pub resume_ids: Vec<Uuid>,
}

/// A résumé with its extracted text, ready for the agent.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    /// Uppercased extension, e.g. "PDF".
    pub file_type: String,
}

/// Drops repeated ids, keeping each first occurrence in place.
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Resolves the request to the caller's job and résumés, in request order.
pub async fn load_inputs(
    state: &AppState,
    user_id: Uuid,
    req: &ScanRequest,
) -> Result<(Job, Vec<Resume>), AppError> {
    let job_id = req
        .job_id
        .ok_or_else(|| AppError::validation("The job id field is required."))?;
    let ids = dedup_ids(&req.resume_ids);
    if ids.is_empty() {
        return Err(AppError::validation("The resume ids field is required."));
    }

    let job = Job::find_owned(&state.db, user_id, job_id)
        .await?
        .ok_or_else(|| AppError::validation("The selected job id is invalid."))?;

    let mut by_id: HashMap<Uuid, Resume> = Resume::find_many_owned(&state.db, user_id, &ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let resumes = ids
        .iter()
        .map(|id| by_id.remove(id))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| AppError::validation("The selected resume ids are invalid."))?;

    Ok((job, resumes))
}

async fn extract_content(
    storage: &dyn StorageClient,
    extractor: &Arc<dyn TextExtractor>,
    resume: &Resume,
) -> anyhow::Result<String> {
    let data = storage.get_object(&resume.file_path).await?;
    let extractor = Arc::clone(extractor);
    let path = resume.file_path.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&path, &data)).await?
}

/// Reads and extracts every résumé. Extraction failures yield empty content.
pub async fn collect_documents(
    storage: &dyn StorageClient,
    extractor: &Arc<dyn TextExtractor>,
    resumes: &[Resume],
) -> Vec<ResumeDocument> {
    let mut docs = Vec::with_capacity(resumes.len());
    for resume in resumes {
        let file_type = file_extension(&resume.file_path)
            .map(|ext| ext.to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".into());
        let content = match extract_content(storage, extractor, resume).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, resume_id = %resume.id, path = %resume.file_path, "text extraction failed");
                String::new()
            }
        };
        docs.push(ResumeDocument {
            id: resume.id,
            name: resume.name.clone(),
            content,
            file_type,
        });
    }
    docs
}

pub fn build_request(job: &Job, docs: &[ResumeDocument]) -> AnalysisRequest {
    AnalysisRequest {
        job_title: job.title.clone(),
        job_description: job.description.clone(),
        resumes: docs
            .iter()
            .map(|d| ResumeInput {
                id: d.id,
                name: d.name.clone(),
                content: d.content.clone(),
            })
            .collect(),
        file_types: docs
            .iter()
            .map(|d| (d.id, d.file_type.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Pairs agent elements with résumés by position and prepares the rows.
pub fn build_matches(
    user_id: Uuid,
    job: &Job,
    docs: &[ResumeDocument],
    elements: Vec<serde_json::Value>,
) -> Result<Vec<NewMatch>, AppError> {
    let mut elements = elements.into_iter();
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let element = elements.next();
        let Some(result) =
            normalize::normalize(element, &job.description, &doc.content, &doc.file_type)
        else {
            warn!(resume_id = %doc.id, "agent returned nothing for resume; skipping");
            continue;
        };

        let ai_result = serde_json::to_string(&result.ai_result).map_err(|e| {
            error!(error = %e, resume_id = %doc.id, data = ?result.ai_result, "serializing ai result failed");
            AppError::ScanResult(format!("serialize result for resume {}: {e}", doc.id))
        })?;

        out.push(NewMatch {
            user_id,
            job_id: job.id,
            resume_id: doc.id,
            scores: result.scores,
            ai_result,
        });
    }
    Ok(out)
}

/// Steps after validation and before persistence: extract, call the agent
/// once, parse and normalize.
pub async fn analyze(
    storage: &dyn StorageClient,
    extractor: &Arc<dyn TextExtractor>,
    agent: &dyn AnalysisAgent,
    user_id: Uuid,
    job: &Job,
    resumes: &[Resume],
) -> Result<Vec<NewMatch>, AppError> {
    let docs = collect_documents(storage, extractor, resumes).await;
    let request = build_request(job, &docs);

    let raw = agent.analyze(&request).await.map_err(|e| {
        error!(error = %e, job_id = %job.id, "error during ai analysis");
        AppError::AiScan(e.to_string())
    })?;

    let elements = parse::parse_results(&raw).map_err(|e| {
        error!(error = %e, ai_result = %raw, "invalid ai result format");
        AppError::ScanResult(e.to_string())
    })?;

    build_matches(user_id, job, &docs, elements)
}

/// Full scan for one request; all rows commit together or not at all.
#[instrument(skip(state, req), fields(job_id = ?req.job_id, resumes = req.resume_ids.len()))]
pub async fn run_scan(
    state: &AppState,
    user_id: Uuid,
    req: ScanRequest,
) -> Result<Vec<Uuid>, AppError> {
    let (job, resumes) = load_inputs(state, user_id, &req).await?;

    let matches = analyze(
        state.storage.as_ref(),
        &state.extractor,
        state.agent.as_ref(),
        user_id,
        &job,
        &resumes,
    )
    .await?;

    let ids = Match::insert_all(&state.db, &matches).await.map_err(|e| {
        error!(error = %e, job_id = %job.id, "saving ai results failed");
        AppError::ScanResult(e.to_string())
    })?;

    info!(%user_id, job_id = %job.id, saved = ids.len(), "scan completed");
    Ok(ids)
}
