use ajaxkit_interface::{Method, RequestConfig};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};

use crate::error::{ReqwestBackendError, Result};

pub fn convert_method(method: &Method) -> Result<reqwest::Method> {
    Ok(match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Patch => reqwest::Method::PATCH,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Other(other) => reqwest::Method::from_bytes(other.as_bytes())
            .map_err(|_| ReqwestBackendError::InvalidMethod(other.to_string()))?,
    })
}

pub fn build_url(config: &RequestConfig) -> Result<Url> {
    let url = config.full_url().unwrap_or_default();
    Url::parse(&url).map_err(|_| ReqwestBackendError::InvalidUrl(url))
}

fn convert_header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ReqwestBackendError::InvalidHeaderName(name.into()))
}

fn convert_header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ReqwestBackendError::InvalidHeaderValue(name.into()))
}

/// Translates a resolved configuration into a reqwest request.
///
/// A `content-type` set in the headers wins over the one implied by the body.
pub fn build_request(
    client: &Client,
    config: &RequestConfig,
) -> ajaxkit_interface::Result<RequestBuilder> {
    let url = build_url(config)?;
    let method = convert_method(&config.effective_method())?;

    let mut request_builder = client.request(method, url);

    for (name, value) in config.headers.iter() {
        let value = convert_header_value(name, value)?;
        request_builder = request_builder.header(convert_header_name(name)?, value);
    }

    if let Some(auth) = &config.auth {
        request_builder = request_builder.basic_auth(&auth.username, Some(&auth.password));
    }

    if let Some(body) = &config.body {
        if !config.headers.contains_key(CONTENT_TYPE.as_str()) {
            let content_type = convert_header_value(CONTENT_TYPE.as_str(), body.content_type())?;
            request_builder = request_builder.header(CONTENT_TYPE, content_type);
        }
        request_builder = request_builder.body(body.to_bytes()?.into_owned());
    }

    Ok(request_builder)
}

#[cfg(test)]
mod tests {
    use ajaxkit_interface::{Body, Error};
    use reqwest::header::AUTHORIZATION;

    use super::*;

    fn build(config: &RequestConfig) -> ajaxkit_interface::Result<reqwest::Request> {
        Ok(build_request(&Client::new(), config)?
            .build()
            .map_err(ReqwestBackendError::from)?)
    }

    #[test]
    fn test_convert_method() {
        let testcases = [
            (Method::Get, "GET"),
            (Method::Post, "POST"),
            (Method::Put, "PUT"),
            (Method::Delete, "DELETE"),
            (Method::Head, "HEAD"),
            (Method::Patch, "PATCH"),
            (Method::Options, "OPTIONS"),
            (Method::from_name("purge"), "PURGE"),
        ];
        for (method, expected) in testcases {
            assert_eq!(convert_method(&method).unwrap().as_str(), expected);
        }
        assert!(matches!(
            convert_method(&Method::from_name("BAD METHOD")),
            Err(ReqwestBackendError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_build_url() {
        let testcases = [
            (RequestConfig::get("https://a.test/x"), "https://a.test/x"),
            (
                RequestConfig::get("https://a.test/x?a=1").with_param("b", "2 3"),
                "https://a.test/x?a=1&b=2+3",
            ),
            (
                RequestConfig::get("http://a.test/x#top").with_param("q", "r"),
                "http://a.test/x?q=r#top",
            ),
        ];
        for (config, expected) in testcases {
            assert_eq!(build_url(&config).unwrap().as_str(), expected);
        }
    }

    #[test]
    fn test_build_url_rejects_relative() {
        let err = build_url(&RequestConfig::get("/users")).unwrap_err();
        assert!(matches!(err, ReqwestBackendError::InvalidUrl(url) if url == "/users"));
    }

    #[test]
    fn test_build_request_headers_and_auth() {
        let config = RequestConfig::get("https://a.test/")
            .with_header("X-Trace", "abc")
            .with_auth("user", "pass");
        let req = build(&config).unwrap();
        assert_eq!(req.method(), &reqwest::Method::GET);
        assert_eq!(req.headers()["x-trace"], "abc");
        assert_eq!(req.headers()[AUTHORIZATION], "Basic dXNlcjpwYXNz");
        assert!(req.body().is_none());
    }

    #[test]
    fn test_build_request_body_content_type() {
        let testcases = [
            (Body::plain_text("hi"), "text/plain", &b"hi"[..]),
            (
                Body::form([("a", "1"), ("b", "x y")]),
                "application/x-www-form-urlencoded",
                &b"a=1&b=x+y"[..],
            ),
            (Body::Json(serde_json::json!([1])), "application/json", &b"[1]"[..]),
        ];
        for (body, content_type, bytes) in testcases {
            let req = build(&RequestConfig::post("https://a.test/", body)).unwrap();
            assert_eq!(req.method(), &reqwest::Method::POST);
            assert_eq!(req.headers()[CONTENT_TYPE], content_type);
            assert_eq!(req.body().and_then(|b| b.as_bytes()), Some(bytes));
        }
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let config = RequestConfig::post("https://a.test/", "{}")
            .with_header("Content-Type", "application/merge-patch+json");
        let req = build(&config).unwrap();
        let values: Vec<_> = req.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "application/merge-patch+json");
    }

    #[test]
    fn test_invalid_header() {
        let config = RequestConfig::get("https://a.test/").with_header("bad header", "x");
        assert!(matches!(build(&config), Err(Error::Other(_))));
        let config = RequestConfig::get("https://a.test/").with_header("x-ok", "line\nbreak");
        assert!(matches!(build(&config), Err(Error::Other(_))));
    }
}
