//! Upstream completion service client.
//!
//! The gateway talks to an OpenAI-compatible chat-completions endpoint in
//! streaming mode. SSE format: `data: {"choices":[{"delta":{"content":"hi"}}]}`
//! per line, terminated by `data: [DONE]`.

use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::json;

use crate::error::GatewayError;
use crate::models::NormalizedRequest;

// One request's forward-only sequence of text deltas
pub type FragmentStream = BoxStream<'static, Result<String, GatewayError>>;

// Seam for the upstream provider; tests substitute a scripted backend
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &NormalizedRequest) -> Result<FragmentStream, GatewayError>;
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &NormalizedRequest) -> Result<FragmentStream, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": request.messages(),
            "temperature": request.temperature,
            "stream": true,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Upstream request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream(format!(
                "Upstream returned {status}: {detail}"
            )));
        }

        Ok(sse_deltas(response.bytes_stream().boxed()))
    }
}

// State threaded through the unfold stream
struct SseState {
    stream: BoxStream<'static, Result<bytes::Bytes, reqwest::Error>>,
    buf: BytesMut,
    done: bool,
}

// Turn an SSE byte stream into a stream of non-empty content deltas.
// Lines are reassembled in `buf`; nothing else is buffered, so deltas go
// out in upstream emission order as soon as they are complete.
fn sse_deltas(
    byte_stream: BoxStream<'static, Result<bytes::Bytes, reqwest::Error>>,
) -> FragmentStream {
    let state = SseState {
        stream: byte_stream,
        buf: BytesMut::new(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }

        loop {
            // Drain complete lines from the buffer first
            if let Some(line_end) = st.buf.iter().position(|&b| b == b'\n') {
                let line = st.buf.split_to(line_end + 1);
                let line = String::from_utf8_lossy(&line);
                let trimmed = line.trim();

                // Skip blanks and SSE comments
                if trimmed.is_empty() || trimmed.starts_with(':') {
                    continue;
                }

                let Some(data) = trimmed.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();

                if data == "[DONE]" {
                    return None;
                }

                if let Ok(chunk) = serde_json::from_str::<serde_json::Value>(data) {
                    let delta = chunk["choices"][0]["delta"]["content"]
                        .as_str()
                        .unwrap_or("");
                    if !delta.is_empty() {
                        return Some((Ok(delta.to_string()), st));
                    }
                }

                // Unrecognised or empty chunk, keep reading
                continue;
            }

            // Need more bytes from upstream
            match st.stream.next().await {
                Some(Ok(bytes)) => st.buf.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    st.done = true;
                    return Some((
                        Err(GatewayError::Upstream(format!("Stream interrupted: {e}"))),
                        st,
                    ));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
