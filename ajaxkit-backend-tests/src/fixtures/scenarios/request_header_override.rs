#[cfg(test)]
mod tests {
    use ajaxkit::{RequestConfig, ResponseType};

    use crate::*;

    const HEADER: &str = "x-override-test";

    /// Answers with every value of [`HEADER`], comma separated.
    fn header_echo_fixture(path: &str) -> Fixture {
        mount(path, |req: Request<Incoming>| async move {
            let values: Result<Vec<_>, _> = req
                .headers()
                .get_all(HEADER)
                .iter()
                .map(|v| v.to_str().map(str::to_owned))
                .collect();
            match values {
                Ok(values) => (reply(values.join(",")), Ok(())),
                Err(err) => (reply(Bytes::new()), Err(format!("non-ascii header: {err}"))),
            }
        })
    }

    fn as_text() -> RequestConfig {
        RequestConfig::new().with_response_type(ResponseType::Text)
    }

    #[tokio::test]
    async fn test_request_header_override() {
        let fixture = header_echo_fixture("scenarios/request_header_override");
        let service = fixture
            .service()
            .unwrap()
            .config(as_text())
            .header("X-Override-Test", "service")
            .build();

        let default = service.get("").await.unwrap();
        assert_eq!(default.text(), Some("service"));
        let overridden = service.request(as_text().with_header(HEADER, "call")).await.unwrap();
        assert_eq!(overridden.text(), Some("call"));
    }

    #[tokio::test]
    async fn test_request_hook_header_wins() {
        let fixture = header_echo_fixture("scenarios/request_hook_header");
        let parent = fixture
            .service()
            .unwrap()
            .config(as_text())
            .header(HEADER, "parent")
            .build();
        let child = parent
            .extend()
            .header(HEADER, "child")
            .before_request(|config| async move { Ok(config.with_header(HEADER, "hook")) })
            .build();

        let res = child
            .request(RequestConfig::new().with_header(HEADER, "call"))
            .await
            .unwrap();
        assert_eq!(res.text(), Some("hook"));
    }
}
