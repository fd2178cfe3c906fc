use ajaxkit_interface::{
    BodyStream, Error as AjaxError, Headers, RawBody, RawResponse, RequestConfig, ResponseType,
};
use futures::stream::{self, Stream};
use tokio::runtime::Handle;
use tracing::trace;

use crate::error::{ReqwestBackendError, Result};

pub(crate) async fn into_raw_response(
    response: reqwest::Response,
    config: &RequestConfig,
) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let mut headers = Headers::new();
    for (name, value) in response.headers() {
        headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    trace!(status, headers = headers.len(), "response head received");

    let body = match config.effective_response_type() {
        ResponseType::Stream => RawBody::Stream(stream_body(response)),
        _ => RawBody::Bytes(collect_all_bytes(response, config.max_response_size).await?),
    };
    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

async fn collect_all_bytes(
    mut response: reqwest::Response,
    max_response_size: Option<u64>,
) -> Result<Vec<u8>> {
    let exceeds = |len: u64| max_response_size.is_some_and(|max| len > max);
    if response.content_length().is_some_and(exceeds) {
        return Err(ReqwestBackendError::ResponseTooLarge);
    }
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if exceeds((buf.len() + chunk.len()) as u64) {
            return Err(ReqwestBackendError::ResponseTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// The body may be polled after the exchange left the runtime that received it, so every
/// poll re-enters that runtime.
fn stream_body(response: reqwest::Response) -> BodyStream {
    let handle = Handle::try_current().ok();
    let mut chunks = Box::pin(response.bytes_stream());
    Box::pin(stream::poll_fn(move |cx| {
        let _enter = handle.as_ref().map(Handle::enter);
        chunks.as_mut().poll_next(cx).map(|chunk| {
            chunk.map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| AjaxError::from(ReqwestBackendError::Reqwest(e)))
            })
        })
    }))
}
