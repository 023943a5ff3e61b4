//! Shared helpers for integration tests: PDF fixtures, a fake chat
//! completions server, and the path of the compiled `gridai` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

pub fn gridai_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("gridai");
    path
}

/// Build a PDF with one page per entry. `Some(text)` pages draw the text
/// in Helvetica; `None` pages have an empty content stream.
/// Byte offsets in the xref table are computed so pdf-extract and lopdf
/// both parse the result.
pub fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
    let page_count = pages.len();
    // 1 catalog, 2 pages, 3 font, then (page, contents) pairs
    let font_id = 3;
    let first_page_id = 4;
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", first_page_id + 2 * i))
        .collect();

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

    for (i, page) in pages.iter().enumerate() {
        let page_id = first_page_id + 2 * i;
        let contents_id = page_id + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 {} 0 R >> >> >>",
                contents_id, font_id
            )
            .into_bytes(),
        );
        let stream = match page {
            Some(text) => format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", text),
            None => String::new(),
        };
        objects.push(
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            )
            .into_bytes(),
        );
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}

/// A request received by [`FakeOracle`].
#[derive(Debug, Clone)]
pub struct Received {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: String,
    received: Arc<Mutex<Vec<Received>>>,
}

/// A chat completions endpoint that answers every request the same way
/// and records what it was sent.
pub struct FakeOracle {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeOracle {
    /// Reply 200 with a completion whose content is `content`.
    pub async fn answering(content: &str) -> Self {
        let reply = serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        });
        Self::raw(StatusCode::OK, reply.to_string()).await
    }

    /// Reply with an arbitrary status and body.
    pub async fn raw(status: StatusCode, reply: impl Into<String>) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            reply: reply.into(),
            received: Arc::clone(&received),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(complete))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            received,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn complete(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.received.lock().unwrap().push(Received {
        authorization,
        body,
    });
    (state.status, state.reply.clone())
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1", addr)
}
