use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_MAX_UPLOAD_MB: usize = 25;

/// Service configuration loaded from environment variables.
///
/// Only deployment-level settings live here. Per-run secrets (model API key,
/// sender mailbox password) are entered in the form and never read from env.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_api_base: String,
    pub llm_model: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            llm_api_base: DEFAULT_API_BASE.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let max_upload_mb = parse_env("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: env_or("RUST_LOG", &defaults.rust_log),
            llm_api_base: env_or("LLM_API_BASE", &defaults.llm_api_base),
            llm_model: env_or("LLM_MODEL", &defaults.llm_model),
            smtp_host: env_or("SMTP_HOST", &defaults.smtp_host),
            smtp_port: parse_env("SMTP_PORT", defaults.smtp_port)?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
