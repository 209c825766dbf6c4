/// LLM Client: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the model API directly.
/// All LLM interactions MUST go through this module.
///
/// Calls walk an attempt queue of `(model, remaining_attempts)` entries:
/// - HTTP 200 with a parseable payload ends the walk successfully.
/// - HTTP 429 waits a fixed backoff and retries the same model while it has budget.
/// - Any other status, transport error, timeout, or unparseable 200 drops the
///   model and moves to the next one.
///
/// Worst-case latency is bounded by models × attempts × timeout.
use std::collections::VecDeque;

use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AnalyzerSettings;

pub mod prompts;

/// Longest slice of an upstream error body kept for diagnostics.
const DIAGNOSTIC_BODY_CHARS: usize = 300;

/// Asks the API for a bare JSON reply instead of prose.
const JSON_MIME_TYPE: &str = "application/json";

/// Why a single attempt against one model did not produce a result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttemptFailure {
    #[error("model '{model}' is rate limited (HTTP 429)")]
    RateLimited { model: String },

    #[error("model '{model}' returned HTTP {status}: {detail}")]
    Status {
        model: String,
        status: u16,
        detail: String,
    },

    #[error("request to model '{model}' failed: {detail}")]
    Transport { model: String, detail: String },

    #[error("model '{model}' returned an unusable payload: {detail}")]
    Malformed { model: String, detail: String },

    #[error("no candidate models are configured")]
    NoModels,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("analysis unavailable after {attempts} attempt(s); last error: {last_failure}")]
    Unavailable {
        attempts: u32,
        last_failure: AttemptFailure,
    },
}

impl LlmError {
    pub fn last_failure(&self) -> &AttemptFailure {
        match self {
            LlmError::Unavailable { last_failure, .. } => last_failure,
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of `candidates[0].content.parts[0]`, if the envelope carries one.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// One entry of the attempt queue.
#[derive(Debug)]
struct PendingModel<'a> {
    model: &'a str,
    remaining: u32,
}

/// The single LLM client used by the analysis pipeline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    settings: AnalyzerSettings,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl LlmClient {
    pub fn new(api_key: String, settings: AnalyzerSettings) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Sends `prompt` through the fallback queue and deserializes the model's
    /// JSON reply as `T`. A reply that fails to deserialize counts as a failed
    /// attempt for that model, so validation belongs in `T`'s `Deserialize`.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, LlmError> {
        self.call_json_with_schema(prompt, None).await
    }

    /// Like [`LlmClient::call_json`], but also constrains the reply to `schema`
    /// (an OpenAPI-style object schema) on the API side.
    pub async fn call_json_with_schema<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<T, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
                response_mime_type: JSON_MIME_TYPE,
                response_schema: schema,
            },
        };

        let mut queue: VecDeque<PendingModel> = self
            .settings
            .models
            .iter()
            .map(|model| PendingModel {
                model,
                remaining: self.settings.attempts_per_model,
            })
            .collect();

        let mut attempts = 0u32;
        let mut last_failure = AttemptFailure::NoModels;

        while let Some(mut entry) = queue.pop_front() {
            if entry.remaining == 0 {
                continue;
            }
            entry.remaining -= 1;
            attempts += 1;

            match self.attempt::<T>(entry.model, &body).await {
                Ok(value) => {
                    info!("LLM call succeeded on model {} (attempt {attempts})", entry.model);
                    return Ok(value);
                }
                Err(failure) => {
                    warn!("LLM attempt {attempts} failed: {failure}");
                    let rate_limited = matches!(failure, AttemptFailure::RateLimited { .. });
                    last_failure = failure;

                    if rate_limited && entry.remaining > 0 {
                        debug!(
                            "Retrying {} after {}ms backoff ({} attempt(s) left)",
                            entry.model,
                            self.settings.rate_limit_backoff.as_millis(),
                            entry.remaining
                        );
                        tokio::time::sleep(self.settings.rate_limit_backoff).await;
                        queue.push_front(entry);
                    }
                }
            }
        }

        Err(LlmError::Unavailable {
            attempts,
            last_failure,
        })
    }

    /// One request against one model. Never retries.
    async fn attempt<T: DeserializeOwned>(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<T, AttemptFailure> {
        let url = self.endpoint(model)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport {
                model: model.to_string(),
                detail: describe_transport_error(e),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptFailure::RateLimited {
                model: model.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| AttemptFailure::Transport {
            model: model.to_string(),
            detail: describe_transport_error(e),
        })?;

        if status != StatusCode::OK {
            return Err(AttemptFailure::Status {
                model: model.to_string(),
                status: status.as_u16(),
                detail: prompts::truncate_chars(text.trim(), DIAGNOSTIC_BODY_CHARS).to_string(),
            });
        }

        parse_reply(&text).map_err(|detail| AttemptFailure::Malformed {
            model: model.to_string(),
            detail,
        })
    }

    fn endpoint(&self, model: &str) -> Result<Url, AttemptFailure> {
        let raw = format!(
            "{}/v1beta/models/{model}:generateContent",
            self.settings.api_base
        );
        let mut url = Url::parse(&raw).map_err(|e| AttemptFailure::Transport {
            model: model.to_string(),
            detail: format!("invalid endpoint: {e}"),
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn describe_transport_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "could not connect".to_string()
    } else {
        // Strip the URL: it carries the API key in its query string.
        e.without_url().to_string()
    }
}

/// Parses the API envelope and the JSON document embedded in its first part.
fn parse_reply<T: DeserializeOwned>(body: &str) -> Result<T, String> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid envelope: {e}"))?;

    match envelope.candidates.as_deref() {
        None | Some([]) => return Err("response contained no candidates".to_string()),
        Some(_) => {}
    }

    let text = envelope
        .text()
        .ok_or_else(|| "first candidate carried no text part".to_string())?;

    serde_json::from_str(strip_json_fences(text)).map_err(|e| format!("invalid verdict JSON: {e}"))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag (```json, ```JSON, ```javascript).
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
