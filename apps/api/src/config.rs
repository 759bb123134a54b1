use std::str::FromStr;

use anyhow::{Context, Result};

use crate::report::prompt_builder::{PromptMode, DEFAULT_MAX_PROMPT_CHARS};

/// Default soft limit on uploaded genotype files (4 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the completion service. `None` switches generation to stub mode.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
    /// When set, reports are persisted in Redis; otherwise they live in process memory.
    pub redis_url: Option<String>,
    pub report_store_key: String,
    pub prompt_mode: PromptMode,
    pub max_prompt_chars: usize,
    pub max_upload_bytes: usize,
    /// Reject unknown tier selectors instead of falling back to the lowest tier.
    pub strict_tiers: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 4096)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            redis_url: optional_env("REDIS_URL"),
            report_store_key: std::env::var("REPORT_STORE_KEY")
                .unwrap_or_else(|_| crate::report::store::DEFAULT_STORE_KEY.to_string()),
            prompt_mode: parse_env("PROMPT_MODE", PromptMode::Markers)?,
            max_prompt_chars: parse_env("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            strict_tiers: parse_env("STRICT_TIERS", false)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating blank values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_value(key, &raw),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_numbers_and_bools() {
        assert_eq!(parse_value::<u16>("PORT", "9000").unwrap(), 9000);
        assert!(parse_value::<bool>("STRICT_TIERS", "true").unwrap());
    }

    #[test]
    fn test_parse_value_reports_variable_name() {
        let err = parse_value::<u16>("PORT", "not-a-port").unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn test_parse_value_prompt_mode() {
        assert_eq!(
            parse_value::<PromptMode>("PROMPT_MODE", "raw_text").unwrap(),
            PromptMode::RawText
        );
        assert!(parse_value::<PromptMode>("PROMPT_MODE", "everything").is_err());
    }
}
