//! Screening Pipeline: one resume against one job description.
//!
//! Flow: validate inputs → fetch → extract → count words → score → report.
//!
//! Input checks run before any I/O. Every component failure is converted into
//! `AppError` at this boundary; there is no partial result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::documents::{extract_text_blocking, DocumentFetcher, ResumeSource};
use crate::errors::AppError;
use crate::screening::roles::JobDescription;
use crate::screening::scorer::CompatibilityScorer;
use crate::screening::verdict::{AnalysisResult, ScoreBand};
use crate::tokenizer;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Result of a completed screening run, returned to the UI as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    /// Label of the predefined role, or "Custom Job Description".
    pub role: String,
    pub resume_word_count: usize,
    pub scorer_backend: &'static str,
    pub verdict: AnalysisResult,
    pub band: ScoreBand,
    pub band_label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs a full screening.
///
/// Steps:
/// 1. reject missing resume / job description (no I/O)
/// 2. fetcher.fetch() → PDF bytes
/// 3. extract_text_blocking() → resume text
/// 4. tokenizer word count
/// 5. scorer.score() → AnalysisResult
pub async fn run_screening(
    fetcher: &DocumentFetcher,
    scorer: &dyn CompatibilityScorer,
    resume: Option<ResumeSource>,
    job: Option<JobDescription>,
) -> Result<ScreeningReport, AppError> {
    let resume = resume.ok_or_else(|| {
        AppError::InputMissing("upload a PDF resume or paste a share link".to_string())
    })?;
    let job = job
        .filter(|j| !j.text.trim().is_empty())
        .ok_or_else(|| AppError::InputMissing("the job description is empty".to_string()))?;

    let request_id = Uuid::new_v4();
    let span = info_span!("screening", %request_id);

    async move {
        let source_kind = match &resume {
            ResumeSource::UploadedBytes(_) => "upload",
            ResumeSource::RemoteLink(_) => "link",
        };
        info!("Screening resume ({source_kind}) against '{}'", job.label);

        let bytes = fetcher.fetch(&resume).await?;
        info!("Resume bytes ready ({} bytes)", bytes.len());

        let text = extract_text_blocking(bytes).await?;
        let resume_word_count = tokenizer::init().word_count(&text);
        info!("Extracted resume text ({resume_word_count} words)");

        let verdict = scorer.score(&text, &job.text).await?;
        let band = ScoreBand::from_score(verdict.compatibility_score);
        info!(
            "Screening complete: score {} ({:?}) via {}",
            verdict.compatibility_score,
            band,
            scorer.backend()
        );

        Ok(ScreeningReport {
            request_id,
            analyzed_at: Utc::now(),
            role: job.label,
            resume_word_count,
            scorer_backend: scorer.backend(),
            verdict,
            band,
            band_label: band.label(),
        })
    }
    .instrument(span)
    .await
}
