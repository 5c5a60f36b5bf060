use serde_json::{json, Map, Value};

use crate::scan::normalize::Scores;

/// Decodes a stored blob. Objects are used as-is, any other text is kept
/// under `ai_text`, nothing at all is an empty object.
pub fn decode_ai_result(raw: Option<&str>) -> Map<String, Value> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Map::new(),
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("ai_text".into(), Value::String(raw.to_string()));
            map
        }
    }
}

/// Stored columns win over whatever the blob says about scores.
fn merge_scores(data: &mut Map<String, Value>, scores: Scores) {
    data.insert(
        "overall_match_percentage".into(),
        json!(scores.match_percentage),
    );
    data.insert(
        "scores".into(),
        json!({
            "semantic_score": scores.semantic_score,
            "keyword_score": scores.keyword_score,
            "keyword_gap": scores.keyword_gap,
        }),
    );
}

pub fn history_view(raw: Option<&str>, scores: Scores) -> Map<String, Value> {
    let mut data = decode_ai_result(raw);
    merge_scores(&mut data, scores);
    data
}

/// Like [`history_view`], with the two sections always present.
pub fn detail_view(raw: Option<&str>, scores: Scores) -> Map<String, Value> {
    let mut data = history_view(raw, scores);
    for (key, empty) in [("ats_best_practice", json!({})), ("skills_analysis", json!([]))] {
        if data.get(key).map_or(true, Value::is_null) {
            data.insert(key.into(), empty);
        }
    }
    data
}
