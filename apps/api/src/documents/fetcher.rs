//! Document Fetcher: turns a `ResumeSource` into raw PDF bytes.
//!
//! Uploaded bytes pass straight through. Share links are resolved to a file id,
//! downloaded from the host's direct-download endpoint, and, when the host
//! serves its large-file HTML interstitial instead of the binary, re-requested
//! once with the confirmation token scraped from that page.

use bytes::{Bytes, BytesMut};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FetcherSettings;
use crate::documents::has_pdf_signature;

/// Where a resume comes from. Captured once per request.
#[derive(Debug, Clone)]
pub enum ResumeSource {
    UploadedBytes(Bytes),
    RemoteLink(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not find a file id in link '{0}'")]
    InvalidLinkFormat(String),

    #[error("link '{0}' is not a valid web address")]
    MalformedUrl(String),

    #[error("link host '{0}' is not a supported file-sharing host")]
    UnsupportedHost(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("downloaded content is not a PDF")]
    DownloadNotAPdf,
}

impl FetchError {
    /// True when the link itself is unusable, i.e. no request was made.
    pub fn is_link_resolution(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidLinkFormat(_)
                | FetchError::MalformedUrl(_)
                | FetchError::UnsupportedHost(_)
        )
    }
}

/// File-id matchers, highest priority first.
static FILE_ID_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").unwrap(),
        Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").unwrap(),
        Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap(),
    ]
});

static CONFIRM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"confirm=([a-zA-Z0-9_-]+)").unwrap());

/// Extracts the file id from a share link, trying each pattern in priority order.
pub fn extract_file_id(link: &str) -> Option<&str> {
    FILE_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
    })
}

/// Outcome of a single GET against the download endpoint.
enum Downloaded {
    Pdf(Bytes),
    Interstitial(String),
    Other,
}

#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
    settings: FetcherSettings,
}

impl DocumentFetcher {
    pub fn new(settings: FetcherSettings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Resolves a resume source into document bytes. Single pass, no retries.
    pub async fn fetch(&self, source: &ResumeSource) -> Result<Bytes, FetchError> {
        match source {
            ResumeSource::UploadedBytes(bytes) => Ok(bytes.clone()),
            ResumeSource::RemoteLink(link) => {
                let file_id = self.resolve_link(link)?;
                self.download(&file_id).await
            }
        }
    }

    /// Validates the link and pulls out its file id. Performs no I/O.
    pub fn resolve_link(&self, link: &str) -> Result<String, FetchError> {
        let link = link.trim();
        let file_id = extract_file_id(link)
            .ok_or_else(|| FetchError::InvalidLinkFormat(link.to_string()))?;

        // Links are often pasted without a scheme ("drive.google.com/file/d/...").
        let url = Url::parse(link)
            .or_else(|_| Url::parse(&format!("https://{link}")))
            .map_err(|_| FetchError::MalformedUrl(link.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::MalformedUrl(link.to_string()));
        }
        let host = url.host_str().unwrap_or_default();
        if !self.settings.share_hosts.iter().any(|h| h == host) {
            return Err(FetchError::UnsupportedHost(host.to_string()));
        }

        Ok(file_id.to_string())
    }

    async fn download(&self, file_id: &str) -> Result<Bytes, FetchError> {
        info!("Downloading shared resume (file id {file_id})");

        let html = match self.get(file_id, None).await? {
            Downloaded::Pdf(bytes) => return Ok(bytes),
            Downloaded::Interstitial(html) => html,
            Downloaded::Other => return Err(FetchError::DownloadNotAPdf),
        };

        let token = CONFIRM_TOKEN
            .captures(&html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(FetchError::DownloadNotAPdf)?;

        debug!("File host served an interstitial, retrying with confirmation token");
        match self.get(file_id, Some(&token)).await? {
            Downloaded::Pdf(bytes) => Ok(bytes),
            Downloaded::Interstitial(_) | Downloaded::Other => {
                warn!("Confirmed download for {file_id} still did not yield a PDF");
                Err(FetchError::DownloadNotAPdf)
            }
        }
    }

    fn download_url(&self, file_id: &str, confirm: Option<&str>) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/uc", self.settings.download_base))
            .map_err(|e| FetchError::DownloadFailed(format!("bad download endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("export", "download");
            if let Some(token) = confirm {
                query.append_pair("confirm", token);
            }
            query.append_pair("id", file_id);
        }
        Ok(url)
    }

    async fn get(&self, file_id: &str, confirm: Option<&str>) -> Result<Downloaded, FetchError> {
        let url = self.download_url(file_id, confirm)?;

        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::DownloadFailed(format!(
                    "timed out after {}s",
                    self.settings.timeout.as_secs()
                ))
            } else {
                FetchError::DownloadFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::DownloadFailed(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::DownloadFailed(e.to_string()))?
        {
            if body.len() + chunk.len() > self.settings.max_download_bytes {
                return Err(FetchError::DownloadFailed(format!(
                    "file exceeds {} bytes",
                    self.settings.max_download_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        let body = body.freeze();

        Ok(classify(&content_type, body))
    }
}

fn classify(content_type: &str, body: Bytes) -> Downloaded {
    if has_pdf_signature(&body) || content_type.contains("application/pdf") {
        return Downloaded::Pdf(body);
    }
    if content_type.contains("text/html") || looks_like_markup(&body) {
        return Downloaded::Interstitial(String::from_utf8_lossy(&body).into_owned());
    }
    Downloaded::Other
}

fn looks_like_markup(body: &[u8]) -> bool {
    let head = &body[..body.len().min(512)];
    let head = String::from_utf8_lossy(head).trim_start().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
