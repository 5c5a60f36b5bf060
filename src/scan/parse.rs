use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),
}

/// Removes a surrounding ```json ... ``` or ``` ... ``` fence, if any.
pub fn strip_fences(raw: &str) -> &str {
    lazy_static! {
        static ref OPEN: Regex = Regex::new(r"(?i)^```(json)?\s*").unwrap();
        static ref CLOSE: Regex = Regex::new(r"\s*```$").unwrap();
    }
    let text = raw.trim();
    let text = match OPEN.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    match CLOSE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Parses the agent output into one element per résumé, in request order.
pub fn parse_results(raw: &str) -> Result<Vec<Value>, ParseError> {
    match serde_json::from_str::<Value>(strip_fences(raw))? {
        Value::Array(items) => Ok(items),
        other => Err(ParseError::NotAnArray(kind(&other))),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("  ```JSON [1] ```  "), "[1]");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_fences("```\n[{\"a\":1}]\n```"), "[{\"a\":1}]");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_fences(" [1, 2] "), "[1, 2]");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let body = r#"[{"overall_match_percentage": 80}, {"overall_match_percentage": 40}]"#;
        let fenced = format!("```json\n{body}\n```");
        assert_eq!(parse_results(body).unwrap(), parse_results(&fenced).unwrap());
        assert_eq!(parse_results(body).unwrap()[1], json!({"overall_match_percentage": 40}));
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(matches!(
            parse_results(r#"{"overall_match_percentage": 80}"#),
            Err(ParseError::NotAnArray("an object"))
        ));
        assert!(matches!(parse_results("\"ok\""), Err(ParseError::NotAnArray(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_results("Sorry, I cannot help"), Err(ParseError::Json(_))));
        assert!(matches!(parse_results("```json\n[1, 2\n```"), Err(ParseError::Json(_))));
    }
}
