#[cfg(test)]
mod tests {
    use hyper::{header::CONTENT_TYPE, Method};
    use serde::Deserialize;

    use crate::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Message {
        message: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_get_json() {
        let fixture = mount("get_json", |req| async move {
            let body = r#"{"message": "Hello, world!", "count": 3}"#;
            let res = Response::builder()
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(body)))
                .unwrap();
            (res, expect_method(&req, Method::GET))
        });
        let service = fixture.service().unwrap().build();

        let res = service.get("").await.unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.headers.get("content-type"), Some("application/json"));
        assert_eq!(
            res.json::<Message>().unwrap(),
            Message {
                message: "Hello, world!".into(),
                count: 3
            }
        );
    }
}
