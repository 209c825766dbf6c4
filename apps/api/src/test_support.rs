//! Shared test fixtures: an in-process upstream server and a tiny PDF writer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};

/// A canned reply served by [`MockUpstream`].
pub struct MockReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// How long the server waits before answering.
    pub delay: Duration,
}

impl MockReply {
    pub fn pdf(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/pdf",
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "application/json",
            body: body.to_string().into_bytes(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A successful generateContent envelope whose first part carries `text`.
    pub fn model_text(text: &str) -> Self {
        Self::json(
            200,
            &json!({
                "candidates": [{
                    "content": { "parts": [{ "text": text }], "role": "model" },
                    "finishReason": "STOP"
                }]
            }),
        )
    }
}

/// Scripted HTTP server bound to an ephemeral loopback port.
///
/// Every request is recorded as its path-and-query and answered by the
/// responder closure, which receives that same string.
pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> MockReply + Send + Sync + 'static,
    {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let respond = Arc::new(respond);

        let recorded = hits.clone();
        let received = bodies.clone();
        let app = Router::new().fallback(move |uri: Uri, body: String| {
            let recorded = recorded.clone();
            let received = received.clone();
            let respond = respond.clone();
            async move {
                let target = uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default();
                recorded.lock().unwrap().push(target.clone());
                received.lock().unwrap().push(body);
                let reply = respond(&target);
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                let response: Response =
                    (reply.status, [(header::CONTENT_TYPE, reply.content_type)], reply.body)
                        .into_response();
                response
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            bodies,
        }
    }

    /// Path-and-query of every request received so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Request bodies, in the same order as [`MockUpstream::hits`].
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

/// Builds a minimal, well-formed PDF with one page per entry.
///
/// Empty strings produce pages with an empty content stream, i.e. pages with
/// no text layer.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let mut objects: Vec<String> = Vec::new();

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );

    for (i, text) in pages.iter().enumerate() {
        let content_id = 5 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET")
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_fixture_has_signature_and_trailer() {
        let pdf = pdf_with_pages(&["hello"]);
        assert!(pdf.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8(pdf).unwrap();
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_pdf_fixture_xref_points_at_objects() {
        let pdf = pdf_with_pages(&["a", "b"]);
        let text = String::from_utf8(pdf).unwrap();
        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[xref_at..].starts_with("xref"));
        for line in text[xref_at..].lines().skip(3).take(7) {
            let offset: usize = line[..10].parse().unwrap();
            assert!(text[offset..].split_whitespace().nth(2) == Some("obj"));
        }
    }
}
