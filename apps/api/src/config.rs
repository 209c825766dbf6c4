use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if the model API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub analyzer: AnalyzerSettings,
    pub fetcher: FetcherSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: parse_port(std::env::var("PORT").ok().as_deref())?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analyzer: AnalyzerSettings::default(),
            fetcher: FetcherSettings::default(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_port(raw: Option<&str>) -> Result<u16> {
    raw.unwrap_or("8080")
        .parse::<u16>()
        .context("PORT must be a valid port number")
}

/// Tunables for the compatibility analyzer.
///
/// Budgets and attempt counts are operating choices, not part of the API
/// contract, so they live here rather than as constants in the client.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Base URL of the generative language API (no trailing slash).
    pub api_base: String,
    /// Candidate models, tried in order. The first is the primary.
    pub models: Vec<String>,
    /// Requests allowed per model. Only HTTP 429 spends more than one.
    pub attempts_per_model: u32,
    /// Fixed wait after a 429 before retrying the same model.
    pub rate_limit_backoff: Duration,
    pub request_timeout: Duration,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Character budget for the resume text embedded in the prompt.
    pub resume_char_budget: usize,
    /// Character budget for the job description embedded in the prompt.
    pub job_char_budget: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-flash-8b".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
            attempts_per_model: 2,
            rate_limit_backoff: Duration::from_secs(2),
            request_timeout: Duration::from_secs(60),
            temperature: 0.3,
            max_output_tokens: 2048,
            resume_char_budget: 8000,
            job_char_budget: 4000,
        }
    }
}

/// Tunables for resolving and downloading shared resume links.
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Hosts a share link may point at.
    pub share_hosts: Vec<String>,
    /// Base URL of the direct-download endpoint (no trailing slash).
    pub download_base: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Largest body accepted from the file host.
    pub max_download_bytes: usize,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            share_hosts: vec![
                "drive.google.com".to_string(),
                "docs.google.com".to_string(),
            ],
            download_base: "https://drive.google.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            timeout: Duration::from_secs(30),
            max_download_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_to_8080() {
        assert_eq!(parse_port(None).unwrap(), 8080);
    }

    #[test]
    fn test_port_parses_explicit_value() {
        assert_eq!(parse_port(Some("3000")).unwrap(), 3000);
    }

    #[test]
    fn test_port_rejects_garbage() {
        let err = parse_port(Some("eighty")).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_analyzer_defaults_have_a_primary_model() {
        let settings = AnalyzerSettings::default();
        assert_eq!(settings.models[0], "gemini-1.5-flash");
        assert!(settings.models.len() > 1, "fallback models expected");
        assert!(settings.resume_char_budget > settings.job_char_budget);
    }
}
