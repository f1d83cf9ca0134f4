use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::embeddings::OPENAI_EMBEDDINGS_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub embedding_api_url: String,
    pub embedding_timeout: Duration,
    /// Maximum in-flight candidate embedding calls per chat request.
    /// 1 keeps the calls strictly sequential.
    pub embedding_concurrency: usize,
    pub chat_timeout: Duration,
    /// Embed every candidate once at startup instead of on every request.
    pub precompute_embeddings: bool,
    pub dataset_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_concurrency: usize = optional_env("EMBEDDING_CONCURRENCY", 1)?;
        if embedding_concurrency == 0 {
            anyhow::bail!("EMBEDDING_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            embedding_api_url: std::env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| OPENAI_EMBEDDINGS_URL.to_string()),
            embedding_timeout: Duration::from_secs(optional_env("EMBEDDING_TIMEOUT_SECS", 30)?),
            embedding_concurrency,
            chat_timeout: Duration::from_secs(optional_env("CHAT_TIMEOUT_SECS", 120)?),
            precompute_embeddings: optional_env("PRECOMPUTE_EMBEDDINGS", false)?,
            dataset_path: std::env::var("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets/salaries.json")),
            port: optional_env("PORT", 3001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
