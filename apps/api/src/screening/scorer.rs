//! Compatibility scoring: pluggable, trait-based backend behind the pipeline.
//!
//! Default: `LlmCompatibilityScorer` (remote model with fallback, via `LlmClient`).
//! `AppState` holds an `Arc<dyn CompatibilityScorer>` so handlers and the
//! pipeline never name a concrete backend.

use async_trait::async_trait;
use tracing::info;

use crate::llm_client::prompts::{build_analysis_prompt, VERDICT_SCHEMA};
use crate::llm_client::{LlmClient, LlmError};
use crate::screening::verdict::AnalysisResult;

#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    /// Short backend name, reported for transparency.
    fn backend(&self) -> &'static str;

    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, LlmError>;
}

/// Scores a resume by asking a generative model to act as an ATS.
pub struct LlmCompatibilityScorer {
    llm: LlmClient,
}

impl LlmCompatibilityScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompatibilityScorer for LlmCompatibilityScorer {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, LlmError> {
        let settings = self.llm.settings();
        let prompt = build_analysis_prompt(
            resume_text,
            job_description,
            settings.resume_char_budget,
            settings.job_char_budget,
        );
        info!(
            "Requesting compatibility analysis ({} prompt chars)",
            prompt.chars().count()
        );
        self.llm
            .call_json_with_schema::<AnalysisResult>(&prompt, Some(&*VERDICT_SCHEMA))
            .await
    }
}
