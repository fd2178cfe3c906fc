//! Request configuration.
//!
//! A [`RequestConfig`] is one *layer*: every field is optional and unset fields inherit
//! from less specific layers when layers are merged by the `ajaxkit` facade.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Body, CancellationToken, Headers, Method, Params};

/// Transport-specific passthrough values, merged key-wise.
pub type Extensions = BTreeMap<String, serde_json::Value>;

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseType {
    /// Parse the body as JSON.
    #[default]
    Json,
    /// Decode the body as UTF-8 text.
    Text,
    /// Keep the raw bytes.
    #[serde(alias = "blob", alias = "arrayBuffer")]
    Bytes,
    /// Parse the body as urlencoded form fields.
    FormData,
    /// Hand the body over as a stream without buffering it.
    Stream,
}

/// HTTP basic authentication credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// The user name.
    pub username: String,
    /// The password.
    pub password: String,
}

impl BasicAuth {
    /// Creates credentials from a user name and a password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decides whether a response status counts as a success.
#[derive(Clone, Default)]
pub struct StatusValidator(Validator);

#[derive(Clone, Default)]
enum Validator {
    #[default]
    Success,
    AcceptAll,
    Custom(Arc<dyn Fn(u16) -> bool + Send + Sync>),
}

impl StatusValidator {
    /// Accepts the statuses for which `f` returns `true`.
    pub fn new(f: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self {
        Self(Validator::Custom(Arc::new(f)))
    }

    /// Accepts 200 to 299. This is the default.
    pub fn success() -> Self {
        Self(Validator::Success)
    }

    /// Accepts every status.
    pub fn accept_all() -> Self {
        Self(Validator::AcceptAll)
    }

    /// Returns whether `status` is accepted.
    pub fn validate(&self, status: u16) -> bool {
        match &self.0 {
            Validator::Success => (200..300).contains(&status),
            Validator::AcceptAll => true,
            Validator::Custom(f) => f(status),
        }
    }
}

impl fmt::Debug for StatusValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Validator::Success => f.write_str("StatusValidator(2xx)"),
            Validator::AcceptAll => f.write_str("StatusValidator(*)"),
            Validator::Custom(v) => write!(f, "StatusValidator({:p})", Arc::as_ptr(v)),
        }
    }
}

impl PartialEq for StatusValidator {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Validator::Success, Validator::Success) => true,
            (Validator::AcceptAll, Validator::AcceptAll) => true,
            (Validator::Custom(a), Validator::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// One layer of request configuration.
///
/// Empty `headers`, `params` and `extensions` are the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// Absolute URL, or a path joined onto the URL of less specific layers.
    pub url: Option<String>,
    /// Request method. Defaults to `GET`.
    pub method: Option<Method>,
    /// Request headers.
    pub headers: Headers,
    /// Query parameters appended to the URL.
    pub params: Params,
    /// Request body.
    pub body: Option<Body>,
    /// Time the request may take before it fails as timed out. Zero disables the timer.
    pub timeout: Option<Duration>,
    /// External cancellation, e.g. from a UI scope.
    pub cancel_token: Option<CancellationToken>,
    /// How the response body is decoded. Defaults to JSON.
    pub response_type: Option<ResponseType>,
    /// Basic authentication credentials.
    pub auth: Option<BasicAuth>,
    /// Which statuses count as success. Defaults to 2xx.
    pub validate_status: Option<StatusValidator>,
    /// Maximum number of redirects to follow. Zero disables redirects.
    pub max_redirects: Option<u32>,
    /// Maximum size in bytes of a buffered response body.
    pub max_response_size: Option<u64>,
    /// Values passed through to the transport untouched.
    pub extensions: Extensions,
}

macro_rules! method_ctor {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {$(
        $(#[$doc])*
        pub fn $name(url: impl Into<String>) -> Self {
            Self::new().with_method(Method::$method).with_url(url)
        }
    )*};
}

macro_rules! method_body_ctor {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {$(
        $(#[$doc])*
        pub fn $name(url: impl Into<String>, body: impl Into<Body>) -> Self {
            Self::new()
                .with_method(Method::$method)
                .with_url(url)
                .with_body(body)
        }
    )*};
}

impl RequestConfig {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    method_ctor! {
        /// A `GET` layer for `url`.
        get => Get;
        /// A `DELETE` layer for `url`.
        delete => Delete;
        /// A `HEAD` layer for `url`.
        head => Head;
        /// An `OPTIONS` layer for `url`.
        options => Options;
    }

    method_body_ctor! {
        /// A `POST` layer for `url` carrying `body`.
        post => Post;
        /// A `PUT` layer for `url` carrying `body`.
        put => Put;
        /// A `PATCH` layer for `url` carrying `body`.
        patch => Patch;
    }

    /// Sets the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a header, replacing previous values of the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a query parameter, replacing previous values of the same name.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches an external cancellation token.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Sets how the response body is decoded.
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Sets basic authentication credentials.
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth::new(username, password));
        self
    }

    /// Sets the status validator.
    pub fn with_validate_status(mut self, validator: StatusValidator) -> Self {
        self.validate_status = Some(validator);
        self
    }

    /// Sets the maximum number of redirects.
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = Some(max_redirects);
        self
    }

    /// Sets the maximum size of a buffered response body.
    pub fn with_max_response_size(mut self, size: u64) -> Self {
        self.max_response_size = Some(size);
        self
    }

    /// Sets a passthrough value for the transport.
    pub fn with_extension(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// The method, falling back to `GET`.
    pub fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or_default()
    }

    /// The response type, falling back to JSON.
    pub fn effective_response_type(&self) -> ResponseType {
        self.response_type.unwrap_or_default()
    }

    /// The timeout, or `None` if unset or zero.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    /// Whether `status` counts as success under the configured validator.
    pub fn accepts_status(&self, status: u16) -> bool {
        match &self.validate_status {
            Some(validator) => validator.validate(status),
            None => StatusValidator::success().validate(status),
        }
    }

    /// The URL with `params` appended as a query string, before any fragment.
    ///
    /// Returns `None` if no URL is set.
    pub fn full_url(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        if self.params.is_empty() {
            return Some(url.to_owned());
        }
        let (base, fragment) = match url.find('#') {
            Some(pos) => url.split_at(pos),
            None => (url, ""),
        };
        let separator = if !base.contains('?') {
            "?"
        } else if base.ends_with('?') || base.ends_with('&') {
            ""
        } else {
            "&"
        };
        Some(format!(
            "{base}{separator}{}{fragment}",
            self.params.to_query_string()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        let testcases = [
            ("https://x.com/a", vec![], "https://x.com/a"),
            ("https://x.com/a", vec![("q", "1")], "https://x.com/a?q=1"),
            ("https://x.com/a?v=2", vec![("q", "a b")], "https://x.com/a?v=2&q=a+b"),
            ("https://x.com/a?", vec![("q", "1")], "https://x.com/a?q=1"),
            ("/a#top", vec![("q", "1"), ("r", "2")], "/a?q=1&r=2#top"),
        ];
        for (url, params, expected) in testcases {
            let config = RequestConfig {
                url: Some(url.into()),
                params: params.into_iter().collect(),
                ..Default::default()
            };
            assert_eq!(config.full_url().as_deref(), Some(expected), "{url}");
        }
        assert_eq!(RequestConfig::new().with_param("q", "1").full_url(), None);
    }

    #[test]
    fn test_method_constructors() {
        let config = RequestConfig::post("/users", Body::plain_text("x"));
        assert_eq!(config.method, Some(Method::Post));
        assert_eq!(config.url.as_deref(), Some("/users"));
        assert_eq!(config.body, Some(Body::plain_text("x")));

        let config = RequestConfig::head("/ping");
        assert_eq!(config.effective_method(), Method::Head);
        assert_eq!(config.body, None);
        assert_eq!(RequestConfig::new().effective_method(), Method::Get);
    }

    #[test]
    fn test_effective_defaults() {
        let config = RequestConfig::new();
        assert_eq!(config.effective_response_type(), ResponseType::Json);
        assert_eq!(config.effective_timeout(), None);
        assert!(config.accepts_status(204));
        assert!(!config.accepts_status(304));

        let config = config.with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), None);
        let config = config.with_timeout(Duration::from_secs(3));
        assert_eq!(config.effective_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_status_validator() {
        let testcases = [
            (StatusValidator::success(), 200, true),
            (StatusValidator::success(), 299, true),
            (StatusValidator::success(), 300, false),
            (StatusValidator::success(), 199, false),
            (StatusValidator::accept_all(), 503, true),
            (StatusValidator::new(|s| s < 500), 404, true),
            (StatusValidator::new(|s| s < 500), 500, false),
        ];
        for (validator, status, expected) in testcases {
            assert_eq!(validator.validate(status), expected, "{validator:?} {status}");
        }
        assert_eq!(StatusValidator::default(), StatusValidator::success());
        let custom = StatusValidator::new(|_| true);
        assert_eq!(custom.clone(), custom);
        assert_ne!(custom, StatusValidator::new(|_| true));
    }

    #[test]
    fn test_response_type_serde() {
        let parsed: ResponseType = serde_json::from_str("\"arrayBuffer\"").unwrap();
        assert_eq!(parsed, ResponseType::Bytes);
        let parsed: ResponseType = serde_json::from_str("\"formData\"").unwrap();
        assert_eq!(parsed, ResponseType::FormData);
        assert_eq!(serde_json::to_string(&ResponseType::Text).unwrap(), "\"text\"");
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let auth = BasicAuth::new("root", "hunter2");
        let debug = format!("{auth:?}");
        assert!(debug.contains("root"));
        assert!(!debug.contains("hunter2"));
    }
}
