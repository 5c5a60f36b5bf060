use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// OpenAI-compatible chat completions endpoint used by the scan agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub upload_max_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require_env("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "skillsync".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "skillsync-users".into()),
            ttl_minutes: parse_env("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_env("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let storage = StorageConfig {
            endpoint: require_env("MINIO_ENDPOINT")?,
            bucket: require_env("MINIO_BUCKET")?,
            access_key: require_env("MINIO_ACCESS_KEY")?,
            secret_key: require_env("MINIO_SECRET_KEY")?,
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
        };
        let ai = AiConfig {
            base_url: std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            api_key: require_env("AI_API_KEY")?,
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout_secs: parse_env("AI_TIMEOUT_SECS", 180),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            ai,
            upload_max_bytes: parse_env("UPLOAD_MAX_BYTES", 10 * 1024 * 1024),
        })
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
