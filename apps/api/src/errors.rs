use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::{ExtractError, FetchError};
use crate::llm_client::{AttemptFailure, LlmError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input missing: {0}")]
    InputMissing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Link resolution error: {0}")]
    LinkResolution(FetchError),

    #[error("Download error: {0}")]
    Download(FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(LlmError),

    #[error("Response malformed: {0}")]
    ResponseMalformed(LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        if err.is_link_resolution() {
            AppError::LinkResolution(err)
        } else {
            AppError::Download(err)
        }
    }
}

impl From<LlmError> for AppError {
    /// Exhaustion whose last word was a 200 with an unusable payload is reported
    /// as malformed; every other exhaustion means the model was unreachable.
    fn from(err: LlmError) -> Self {
        match err.last_failure() {
            AttemptFailure::Malformed { .. } => AppError::ResponseMalformed(err),
            _ => AppError::AnalysisUnavailable(err),
        }
    }
}

impl AppError {
    /// Status, machine code and user-facing message for this failure.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::InputMissing(msg) => (
                StatusCode::BAD_REQUEST,
                "INPUT_MISSING",
                format!("Please provide your resume and a job description to proceed: {msg}."),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::PayloadTooLarge(detail) => {
                tracing::warn!("Rejected oversized upload: {detail}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    "The resume is too large. Please upload a PDF under 10 MiB.".to_string(),
                )
            }
            AppError::LinkResolution(err) => {
                let message = match err {
                    FetchError::UnsupportedHost(_) => {
                        "Please provide a valid Google Drive link to your resume.".to_string()
                    }
                    FetchError::MalformedUrl(_) => {
                        "The link is not a valid web address. Please paste the full share link \
                         (e.g. https://drive.google.com/file/d/<id>/view)."
                            .to_string()
                    }
                    _ => "Could not find a file ID in the link. Please check the link format \
                          (e.g. https://drive.google.com/file/d/<id>/view)."
                        .to_string(),
                };
                (StatusCode::BAD_REQUEST, "LINK_RESOLUTION_ERROR", message)
            }
            AppError::Download(err) => {
                tracing::warn!("Resume download failed: {err}");
                let message = match err {
                    FetchError::DownloadNotAPdf => {
                        "The shared file is not a downloadable PDF. Make sure the link points to \
                         a PDF and sharing is set to \"Anyone with the link\"."
                    }
                    _ => {
                        "Failed to download the file. Please check the link and its sharing \
                         permissions."
                    }
                };
                (StatusCode::BAD_GATEWAY, "DOWNLOAD_ERROR", message.to_string())
            }
            AppError::Extraction(err) => {
                let message = match err {
                    ExtractError::InvalidPdfSignature => {
                        "The file is not a valid PDF. Please upload your resume as a PDF."
                    }
                    ExtractError::EmptyExtraction { .. } => {
                        "No text could be extracted from the PDF. It may contain only images; \
                         please ensure your resume has selectable text."
                    }
                    ExtractError::CorruptOrProtected(_) => {
                        "This PDF appears to be corrupted or password-protected. Please upload a \
                         different file."
                    }
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    message.to_string(),
                )
            }
            AppError::AnalysisUnavailable(err) => {
                tracing::error!("LLM error: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ANALYSIS_UNAVAILABLE",
                    format!(
                        "The analysis model is unavailable right now, please try again shortly. \
                         ({})",
                        err.last_failure()
                    ),
                )
            }
            AppError::ResponseMalformed(err) => {
                tracing::error!("LLM error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RESPONSE_MALFORMED",
                    format!(
                        "The analysis model returned a response that could not be understood, \
                         please try again. ({})",
                        err.last_failure()
                    ),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(last_failure: AttemptFailure) -> LlmError {
        LlmError::Unavailable {
            attempts: 3,
            last_failure,
        }
    }

    #[test]
    fn test_link_errors_classified_before_download_errors() {
        let link: AppError = FetchError::InvalidLinkFormat("x".into()).into();
        assert!(matches!(link, AppError::LinkResolution(_)));
        let host: AppError = FetchError::UnsupportedHost("example.com".into()).into();
        assert!(matches!(host, AppError::LinkResolution(_)));
        let dl: AppError = FetchError::DownloadNotAPdf.into();
        assert!(matches!(dl, AppError::Download(_)));
        let dl: AppError = FetchError::DownloadFailed("HTTP 404".into()).into();
        assert!(matches!(dl, AppError::Download(_)));
    }

    #[test]
    fn test_link_messages_distinguish_missing_id_from_bad_url() {
        let missing_id = AppError::LinkResolution(FetchError::InvalidLinkFormat("x".into())).parts();
        let bad_url = AppError::LinkResolution(FetchError::MalformedUrl("x".into())).parts();
        assert_eq!(bad_url.0, StatusCode::BAD_REQUEST);
        assert!(missing_id.2.contains("file ID"));
        assert!(!bad_url.2.contains("file ID"));
        assert!(bad_url.2.contains("not a valid web address"));
    }

    #[test]
    fn test_oversized_upload_mentions_limit() {
        let (status, code, message) =
            AppError::PayloadTooLarge("length limit exceeded".into()).parts();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(code, "PAYLOAD_TOO_LARGE");
        assert!(message.contains("10 MiB"));
    }

    #[test]
    fn test_llm_exhaustion_classification() {
        let malformed: AppError = unavailable(AttemptFailure::Malformed {
            model: "m".into(),
            detail: "bad".into(),
        })
        .into();
        assert!(matches!(malformed, AppError::ResponseMalformed(_)));

        let down: AppError = unavailable(AttemptFailure::Status {
            model: "m".into(),
            status: 500,
            detail: String::new(),
        })
        .into();
        assert!(matches!(down, AppError::AnalysisUnavailable(_)));
    }

    #[test]
    fn test_each_kind_has_distinct_code() {
        let errors = vec![
            AppError::InputMissing("no resume".into()),
            AppError::Validation("bad form".into()),
            AppError::PayloadTooLarge("length limit exceeded".into()),
            AppError::LinkResolution(FetchError::InvalidLinkFormat("x".into())),
            AppError::Download(FetchError::DownloadNotAPdf),
            AppError::Extraction(ExtractError::InvalidPdfSignature),
            AppError::AnalysisUnavailable(unavailable(AttemptFailure::NoModels)),
            AppError::ResponseMalformed(unavailable(AttemptFailure::Malformed {
                model: "m".into(),
                detail: "d".into(),
            })),
            AppError::Internal(anyhow::anyhow!("boom")),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.parts().1).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_extraction_messages_are_actionable_and_distinct() {
        let signature = AppError::Extraction(ExtractError::InvalidPdfSignature).parts();
        let empty = AppError::Extraction(ExtractError::EmptyExtraction { pages: 1 }).parts();
        let corrupt =
            AppError::Extraction(ExtractError::CorruptOrProtected("xref".into())).parts();
        assert_eq!(signature.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(signature.2.contains("not a valid PDF"));
        assert!(empty.2.contains("images"));
        assert!(corrupt.2.contains("password-protected"));
    }

    #[test]
    fn test_unavailable_message_carries_last_diagnostic() {
        let (status, code, message) = AppError::from(unavailable(AttemptFailure::Status {
            model: "gemini-1.5-flash".into(),
            status: 503,
            detail: "overloaded".into(),
        }))
        .parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "ANALYSIS_UNAVAILABLE");
        assert!(message.contains("HTTP 503"));
        assert!(message.contains("try again"));
    }

    #[test]
    fn test_internal_error_hides_details() {
        let (status, _, message) = AppError::Internal(anyhow::anyhow!("secret path")).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }
}
