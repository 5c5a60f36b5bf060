use serde_json::{json, Map, Value};

use super::skills::skills_analysis;

/// The four numeric columns stored beside the JSON blob.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    pub match_percentage: f64,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub keyword_gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub scores: Scores,
    pub ai_result: Map<String, Value>,
}

/// Absent, null, "", 0, false, [] and {} all count as "not provided".
pub fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

/// Finite numbers and numeric strings; anything else scores 0.
pub fn score(v: Option<&Value>) -> f64 {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn extract_scores(result: &Map<String, Value>) -> Scores {
    let sub = result.get("scores");
    let sub_score = |key: &str| score(sub.and_then(|s| s.get(key)));
    Scores {
        match_percentage: score(result.get("overall_match_percentage")),
        semantic_score: sub_score("semantic_score"),
        keyword_score: sub_score("keyword_score"),
        keyword_gap: sub_score("keyword_gap"),
    }
}

/// Static advisory block used when the agent gives no ATS notes.
pub fn default_ats_block(file_type: &str) -> Value {
    json!({
        "resume_file_type": format!(
            "Your resume is a {file_type}, which can be scanned by ATS systems."
        ),
        "email_address": "Check that your email address is on your resume.",
        "phone_number": "Check that your phone number is on your resume.",
        "linkedin_profile": "Include LinkedIn profile for better ATS scoring.",
        "job_title_match": "Include your target job title.",
        "education_match": "Make sure your education matches JD requirements.",
        "experience_match": "Include your relevant experience clearly.",
        "ats_score": 0
    })
}

/// Normalizes one agent element. `None` means nothing usable was returned
/// for this résumé and no match should be written.
pub fn normalize(
    element: Option<Value>,
    job_description: &str,
    resume_content: &str,
    file_type: &str,
) -> Option<NormalizedResult> {
    let mut result = match element {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => return None,
    };

    let scores = extract_scores(&result);

    if is_blank(result.get("ats_best_practice")) {
        result.insert("ats_best_practice".into(), default_ats_block(file_type));
    }
    if is_blank(result.get("skills_analysis")) {
        let rows = skills_analysis(job_description, resume_content);
        result.insert("skills_analysis".into(), json!(rows));
    }

    Some(NormalizedResult { scores, ai_result: result })
}
