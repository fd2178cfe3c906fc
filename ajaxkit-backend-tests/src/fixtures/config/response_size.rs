#[cfg(test)]
mod tests {
    use ajaxkit::{Error, RequestConfig, ResponseType};
    use futures::stream;
    use http_body_util::StreamBody;

    use crate::*;

    const BODY: &str = "1234567890"; // 10 bytes

    async fn static_handler() -> (Response<Full<Bytes>>, Checked) {
        (reply(BODY), Ok(()))
    }

    /// Same body without a content length.
    async fn chunked_handler() -> (Response<FixtureBody>, Checked) {
        let frames = stream::iter(
            [&BODY[..4], &BODY[4..]]
                .map(|chunk| Ok::<_, hyper::Error>(hyper::body::Frame::data(Bytes::from(chunk)))),
        );
        (Response::new(StreamBody::new(frames).boxed()), Ok(()))
    }

    fn limited_text(max_response_size: u64) -> RequestConfig {
        RequestConfig::new()
            .with_response_type(ResponseType::Text)
            .with_max_response_size(max_response_size)
    }

    #[tokio::test]
    async fn test_response_within_limit() {
        let fixture = mount("config/response_within_limit", |_| static_handler());
        let service = fixture.service().unwrap().build();

        let res = service.request(limited_text(10)).await.unwrap();
        assert_eq!(res.text(), Some(BODY));
    }

    #[tokio::test]
    async fn test_response_exceeds_limit() {
        let fixed = mount("config/response_exceeds_limit", |_| static_handler());
        let chunked = mount("config/response_exceeds_limit_chunked", |_| chunked_handler());

        for fixture in [&fixed, &chunked] {
            let service = fixture.service().unwrap().build();
            let err = service.request(limited_text(9)).await.unwrap_err();
            assert!(matches!(err.error(), Error::ResponseTooLarge), "{}", fixture.path);
        }
    }
}
