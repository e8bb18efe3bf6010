//! Streaming relay: upstream fragments → chunked plain-text response.
//!
//! Once the response headers are out, a failure cannot become a structured
//! error any more, so every fault after that point degrades to a single
//! in-band `Error: <message>` fragment that closes the stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::metrics::STREAM_ERRORS;
use crate::models::NormalizedRequest;
use crate::rate_limit::Admission;
use crate::upstream::{CompletionBackend, FragmentStream};

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";

// Open the upstream call and relay its fragments as they arrive.
// Failures at open time are reported the same way as mid-stream ones:
// in-band, as the last visible fragment.
pub async fn stream_response(
    backend: Arc<dyn CompletionBackend>,
    request: NormalizedRequest,
    admission: Admission,
) -> Response {
    let fragments = match backend.complete(&request).await {
        Ok(stream) => stream,
        // contain_errors turns this into the in-band marker
        Err(e) => futures_util::stream::iter(vec![Err(e)]).boxed(),
    };

    let body = Body::from_stream(contain_errors(fragments));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(HEADER_LIMIT, admission.limit)
        .header(HEADER_REMAINING, admission.remaining)
        .header(HEADER_RESET, admission.reset_at)
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// Forward fragments unchanged and in order; convert the first failure into
// a terminal error marker. No exception escapes past this point.
fn contain_errors(fragments: FragmentStream) -> BoxStream<'static, Result<Bytes, Infallible>> {
    futures_util::stream::unfold(Some(fragments), |state| async move {
        let mut fragments = state?;
        match fragments.next().await {
            Some(Ok(text)) => Some((Ok(Bytes::from(text)), Some(fragments))),
            Some(Err(e)) => {
                tracing::error!("Streaming error: {e}");
                STREAM_ERRORS.inc();
                // terminal marker, then end of stream
                Some((Ok(Bytes::from(format!("Error: {e}"))), None))
            }
            None => None,
        }
    })
    .boxed()
}
