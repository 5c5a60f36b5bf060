use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{prompts, AgentError, AnalysisAgent, AnalysisRequest};
use crate::config::AiConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions backed agent. One HTTP call per scan, never retried.
#[derive(Clone)]
pub struct ChatAgent {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatAgent {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl AnalysisAgent for ChatAgent {
    #[instrument(skip_all, fields(model = %self.model, resumes = request.resumes.len()))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AgentError> {
        let prompt = prompts::build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage { role: "system", content: prompts::SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "agent call succeeded"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AgentError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base_url: &str) -> AiConfig {
        AiConfig {
            base_url: base_url.into(),
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let agent = ChatAgent::new(&cfg("http://localhost:11434/v1/")).unwrap();
        assert_eq!(agent.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn chat_response_content_is_read() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"[]"}}],"usage":{"prompt_tokens":10,"completion_tokens":1}}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("[]"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 1);
    }

    #[test]
    fn api_error_message_is_extracted() {
        let raw = r#"{"error":{"message":"invalid api key","type":"auth"}}"#;
        let parsed: ApiError = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "invalid api key");
    }
}
