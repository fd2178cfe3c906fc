#[cfg(test)]
mod tests {
    use ajaxkit::{Error, ErrorKind};
    use hyper::header::CONTENT_TYPE;

    use crate::*;

    #[tokio::test]
    async fn test_json_deserialization_error() {
        const INVALID_JSON: &str = r#"{"name": "Test User", "age": 30, invalid_json}"#;
        let fixture = mount("errors/invalid_json_response", |_| async move {
            let res = Response::builder()
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(INVALID_JSON)))
                .unwrap();
            (res, Ok(()))
        });
        let service = fixture.service().unwrap().build();

        let err = service.get("").await.unwrap_err();
        assert!(matches!(err.error(), Error::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Generic);
    }

    #[tokio::test]
    async fn test_typed_deserialization_error() {
        #[allow(unused)]
        #[derive(serde::Deserialize, Debug)]
        struct User {
            name: String,
            age: u32,
        }

        let fixture = mount("errors/typed_json_mismatch", |_| async move {
            (reply(r#"{"name": 1}"#), Ok(()))
        });
        let service = fixture.service().unwrap().build();

        let res = service.get("").await.unwrap();
        assert!(matches!(res.json::<User>().unwrap_err(), Error::Json(_)));
    }
}
