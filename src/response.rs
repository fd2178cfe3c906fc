use std::fmt;
use std::sync::Arc;

use ajaxkit_interface::{
    BodyStream, CancellationToken, Error, Headers, RawBody, RawResponse, RequestConfig,
    ResponseType, Result,
};
use futures::StreamExt;
use serde::de::DeserializeOwned;

/// A decoded response.
///
/// Responses produced by the transport carry the real status and headers. Responses
/// produced by a `before_fail` hook carry whatever that hook put in.
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// The decoded body.
    pub data: ResponseData,
    /// The configuration the request was sent with.
    pub config: Arc<RequestConfig>,
}

/// A response body decoded according to the configured [`ResponseType`].
pub enum ResponseData {
    /// The body was empty.
    Empty,
    /// A parsed JSON document.
    Json(serde_json::Value),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Parsed urlencoded form fields.
    Form(Vec<(String, String)>),
    /// The undecoded body stream.
    Stream(BodyStream),
}

impl Response {
    /// A `200` response without headers, typically built by a `before_fail` hook to
    /// recover from an error.
    pub fn new(config: Arc<RequestConfig>, data: impl Into<ResponseData>) -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            data: data.into(),
            config,
        }
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Validates the status and decodes the body of a transport response.
    pub(crate) async fn decode(raw: RawResponse, config: Arc<RequestConfig>) -> Result<Self> {
        if !config.accepts_status(raw.status) {
            return Err(Error::Status(raw.status));
        }
        let data = match config.effective_response_type() {
            ResponseType::Stream => ResponseData::Stream(raw.body.into_stream()),
            response_type => {
                let bytes = raw.body.collect(config.max_response_size).await?;
                ResponseData::decode(response_type, bytes)?
            }
        };
        Ok(Self {
            status: raw.status,
            headers: raw.headers,
            data,
            config,
        })
    }

    /// Ties a streamed body to `token`: once it fires, the stream yields the token's
    /// error and ends.
    pub(crate) fn cancellable_by(mut self, token: CancellationToken) -> Self {
        if let ResponseData::Stream(inner) = self.data {
            self.data = ResponseData::Stream(cancellable_stream(inner, token));
        }
        self
    }

    /// Whether the status is within 200 to 299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body into `T`.
    ///
    /// Works for JSON, text and byte bodies. An empty body deserializes from `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(match &self.data {
            ResponseData::Empty => serde_json::from_value(serde_json::Value::Null)?,
            ResponseData::Json(value) => T::deserialize(value)?,
            ResponseData::Text(text) => serde_json::from_str(text)?,
            ResponseData::Bytes(bytes) => serde_json::from_slice(bytes)?,
            ResponseData::Form(_) | ResponseData::Stream(_) => {
                return Err(Error::custom("response body is not JSON"))
            }
        })
    }

    /// The body as text, if it was decoded as text.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The body as bytes, if it was kept as bytes.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ResponseData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Takes the body stream, if the response type was [`ResponseType::Stream`].
    pub fn into_stream(self) -> Option<BodyStream> {
        match self.data {
            ResponseData::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

fn cancellable_stream(mut inner: BodyStream, token: CancellationToken) -> BodyStream {
    Box::pin(async_stream::stream! {
        loop {
            let next = tokio::select! {
                biased;
                reason = token.cancelled() => Err(reason),
                item = inner.next() => Ok(item),
            };
            match next {
                Ok(Some(item)) => yield item,
                Ok(None) => break,
                Err(reason) => {
                    yield Err(reason.into_error());
                    break;
                }
            }
        }
    })
}

impl ResponseData {
    fn decode(response_type: ResponseType, bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(match response_type {
                ResponseType::Text => Self::Text(String::new()),
                _ => Self::Empty,
            });
        }
        Ok(match response_type {
            ResponseType::Json => Self::Json(serde_json::from_slice(&bytes)?),
            ResponseType::Text => Self::Text(String::from_utf8(bytes).map_err(Error::other)?),
            ResponseType::Bytes => Self::Bytes(bytes),
            ResponseType::FormData => {
                Self::Form(form_urlencoded::parse(&bytes).into_owned().collect())
            }
            ResponseType::Stream => Self::Stream(RawBody::Bytes(bytes).into_stream()),
        })
    }

    /// Whether the body was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<serde_json::Value> for ResponseData {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for ResponseData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ResponseData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for ResponseData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<()> for ResponseData {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl fmt::Debug for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Form(fields) => f.debug_tuple("Form").field(fields).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("url", &self.config.url)
            .finish()
    }
}
