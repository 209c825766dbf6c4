//! Axum route handlers for the Screening API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::documents::ResumeSource;
use crate::errors::AppError;
use crate::screening::pipeline::{run_screening, ScreeningReport};
use crate::screening::roles::{resolve_job_description, RoleDescription, CUSTOM_ROLE_KEY, ROLES};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: &'static [RoleDescription],
    pub custom_key: &'static str,
}

/// Fields of the analyze form, as received.
#[derive(Debug, Default)]
struct AnalyzeForm {
    resume: Option<Bytes>,
    resume_link: Option<String>,
    role: Option<String>,
    job_description: Option<String>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| form_error("Malformed form data", e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| form_error("Invalid resume file", e))?;
                    // Browsers send an empty part when no file was chosen.
                    form.resume = Some(data).filter(|d| !d.is_empty());
                }
                "resume_link" | "role" | "job_description" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| form_error(&format!("Invalid field '{name}'"), e))?;
                    let value = Some(value).filter(|v| !v.trim().is_empty());
                    match name.as_str() {
                        "resume_link" => form.resume_link = value,
                        "role" => form.role = value,
                        _ => form.job_description = value,
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// An uploaded file wins over a share link.
    fn resume_source(&mut self) -> Option<ResumeSource> {
        match (self.resume.take(), self.resume_link.take()) {
            (Some(bytes), _) => Some(ResumeSource::UploadedBytes(bytes)),
            (None, Some(link)) => Some(ResumeSource::RemoteLink(link.trim().to_string())),
            (None, None) => None,
        }
    }
}

/// Hitting the body limit mid-stream surfaces as a multipart error; keep it apart
/// from genuinely malformed forms.
fn form_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<RoleListResponse> {
    Json(RoleListResponse {
        roles: ROLES,
        custom_key: CUSTOM_ROLE_KEY,
    })
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningReport>, AppError> {
    let mut form = AnalyzeForm::read(multipart).await?;
    let resume = form.resume_source();

    // A missing resume is reported ahead of any role problem.
    if resume.is_none() {
        return Err(AppError::InputMissing(
            "upload a PDF resume or paste a share link".to_string(),
        ));
    }
    let job = resolve_job_description(form.role.as_deref(), form.job_description.as_deref())?;

    let report = run_screening(&state.fetcher, state.scorer.as_ref(), resume, Some(job)).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_takes_precedence_over_link() {
        let mut form = AnalyzeForm {
            resume: Some(Bytes::from_static(b"%PDF-1.4")),
            resume_link: Some("https://drive.google.com/file/d/abc/view".into()),
            ..AnalyzeForm::default()
        };
        assert!(matches!(
            form.resume_source(),
            Some(ResumeSource::UploadedBytes(_))
        ));
    }

    #[test]
    fn test_link_used_without_upload() {
        let mut form = AnalyzeForm {
            resume_link: Some("  https://drive.google.com/file/d/abc/view ".into()),
            ..AnalyzeForm::default()
        };
        match form.resume_source() {
            Some(ResumeSource::RemoteLink(link)) => {
                assert_eq!(link, "https://drive.google.com/file/d/abc/view")
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_form_has_no_source() {
        assert!(AnalyzeForm::default().resume_source().is_none());
    }
}
