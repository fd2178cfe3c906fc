use hyper::{body::Incoming, Request};

/// Conveniences for inspecting requests inside fixtures.
pub trait RequestExt {
    fn header_str(&self, name: &str) -> Option<&str>;
    fn query_pairs(&self) -> Vec<(String, String)>;
}

impl RequestExt for Request<Incoming> {
    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let query = self.uri().query().unwrap_or_default();
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }
}
