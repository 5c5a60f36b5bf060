use serde_json::json;

use super::AnalysisRequest;

pub const SYSTEM_PROMPT: &str = r#"You are an expert technical recruiter and ATS (Applicant Tracking System) analyst.
You compare résumés against a single job description and respond with JSON only.

Return a JSON array with exactly one object per résumé, in the same order as the input résumés.
Each object has this shape:
{
  "resume_id": "<id of the résumé>",
  "overall_match_percentage": <number 0-100>,
  "scores": {
    "semantic_score": <number 0-100>,
    "keyword_score": <number 0-100>,
    "keyword_gap": <number 0-100>
  },
  "ats_best_practice": {
    "resume_file_type": "<advice about the file type>",
    "email_address": "<advice>",
    "phone_number": "<advice>",
    "linkedin_profile": "<advice>",
    "job_title_match": "<advice>",
    "education_match": "<advice>",
    "experience_match": "<advice>",
    "ats_score": <number 0-100>
  },
  "skills_analysis": [
    {"skill": "<skill>", "resume_count": <int>, "job_count": <int>, "gap": <int>, "matched": <bool>}
  ],
  "summary": "<two or three sentences>"
}

Do not add commentary outside the JSON array."#;

/// Builds the user message carrying the job and every résumé.
pub fn build_prompt(req: &AnalysisRequest) -> String {
    let resumes: Vec<_> = req
        .resumes
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.name,
                "file_type": req.file_types.get(&r.id).map(String::as_str).unwrap_or("UNKNOWN"),
                "content": r.content,
            })
        })
        .collect();

    format!(
        "Job title: {}\n\nJob description:\n{}\n\nRésumés ({} total):\n{}",
        req.job_title,
        req.job_description,
        req.resumes.len(),
        serde_json::to_string_pretty(&resumes).unwrap_or_else(|_| "[]".into()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ResumeInput;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[test]
    fn prompt_carries_job_and_resumes_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut file_types = BTreeMap::new();
        file_types.insert(a, "PDF".to_string());
        let req = AnalysisRequest {
            job_title: "Backend Engineer".into(),
            job_description: "Need Python and SQL skills".into(),
            resumes: vec![
                ResumeInput { id: a, name: "First".into(), content: "I know Python well".into() },
                ResumeInput { id: b, name: "Second".into(), content: "Café ☕ SQL".into() },
            ],
            file_types,
        };

        let prompt = build_prompt(&req);
        assert!(prompt.contains("Job title: Backend Engineer"));
        assert!(prompt.contains("Need Python and SQL skills"));
        assert!(prompt.contains("Résumés (2 total)"));
        assert!(prompt.contains("\"PDF\""));
        assert!(prompt.contains("\"UNKNOWN\""));
        assert!(prompt.contains("Café ☕ SQL"));
        let first = prompt.find(&a.to_string()).unwrap();
        let second = prompt.find(&b.to_string()).unwrap();
        assert!(first < second);
    }
}
