#[cfg(test)]
mod tests {
    use ajaxkit::{Error, ErrorKind, RequestConfig, StatusValidator};
    use hyper::{Method, StatusCode};

    use crate::*;

    #[tokio::test]
    async fn test_unsuccessful_status_codes() {
        let fixture = mount("errors/unsuccessful_status_codes", |req| async move {
            let status = match *req.method() {
                Method::GET => StatusCode::BAD_REQUEST,
                Method::POST => StatusCode::NOT_FOUND,
                Method::PUT => StatusCode::INTERNAL_SERVER_ERROR,
                _ => {
                    let checked = Err(format!("unexpected method {}", req.method()));
                    return (reply("Error response"), checked);
                }
            };
            let mut res = reply("Error response");
            *res.status_mut() = status;
            (res, Ok(()))
        });
        let service = fixture.service().unwrap().build();

        let errors = [
            (400, service.get("").await.unwrap_err()),
            (404, service.post("", "x").await.unwrap_err()),
            (500, service.put("", "x").await.unwrap_err()),
        ];
        for (status_code, err) in errors {
            assert_eq!(err.kind(), ErrorKind::Network);
            match err.error() {
                Error::Status(received_status) => assert_eq!(*received_status, status_code),
                error => panic!("Expected Status error, got: {error:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_custom_status_validator() {
        let fixture = mount("errors/custom_status_validator", |_| async move {
            let mut res = reply(Bytes::new());
            *res.status_mut() = StatusCode::NOT_MODIFIED;
            (res, Ok(()))
        });
        let service = fixture.service().unwrap().build();

        let rejected = service.get("").await.unwrap_err();
        assert_eq!(rejected.status(), Some(304));

        let lenient = service
            .extend()
            .config(RequestConfig::new().with_validate_status(StatusValidator::new(
                |status| status < 400,
            )))
            .build();
        let accepted = lenient.get("").await.unwrap();
        assert_eq!(accepted.status, 304);
        assert!(accepted.data.is_empty());
    }
}
