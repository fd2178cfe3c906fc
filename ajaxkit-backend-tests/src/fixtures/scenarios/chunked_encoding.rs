#[cfg(test)]
mod tests {
    use ajaxkit::{RequestConfig, ResponseType};
    use futures::{stream, TryStreamExt};
    use hyper::Method;

    use crate::*;

    const CHUNKS: [&str; 4] = ["Hello", ", ", "chunked ", "world!"];

    fn chunked_fixture(path: &str) -> Fixture {
        mount(path, |req| async move {
            let frames = stream::iter(CHUNKS.map(|chunk| {
                Ok::<_, hyper::Error>(hyper::body::Frame::data(Bytes::from_static(
                    chunk.as_bytes(),
                )))
            }));
            let res = Response::new(http_body_util::StreamBody::new(frames).boxed());
            (res, expect_method(&req, Method::GET))
        })
    }

    #[tokio::test]
    async fn test_chunked_encoding_buffered() {
        let fixture = chunked_fixture("scenarios/chunked_encoding_buffered");
        let service = fixture.service().unwrap().build();

        let config = RequestConfig::new().with_response_type(ResponseType::Text);
        let res = service.request(config).await.unwrap();
        assert_eq!(res.text(), Some(CHUNKS.concat().as_str()));
    }

    #[tokio::test]
    async fn test_chunked_encoding_streamed() {
        let fixture = chunked_fixture("scenarios/chunked_encoding_streamed");
        let service = fixture.service().unwrap().build();

        let config = RequestConfig::new().with_response_type(ResponseType::Stream);
        let res = service.request(config).await.unwrap();
        let chunks: Vec<Vec<u8>> = res.into_stream().unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), CHUNKS.concat().as_bytes());
    }
}
