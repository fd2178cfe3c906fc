#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ajaxkit::{Error, ErrorKind, Service};
    use ajaxkit_backend_reqwest::ReqwestTransport;

    /// A local address nothing listens on.
    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let routed = Arc::new(Mutex::new(Vec::new()));
        let (fail, abort) = (routed.clone(), routed.clone());
        let service = Service::builder(ReqwestTransport::builder().no_proxy().build())
            .base_url(closed_port_url().await)
            .on_fail(move |error, _| fail.lock().unwrap().push(("fail", error.kind())))
            .on_abort(move |error, _| abort.lock().unwrap().push(("abort", error.kind())))
            .build();

        let err = service.get("/nothing-here").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "Network Error");
        assert_eq!(*routed.lock().unwrap(), [("fail", ErrorKind::Network)]);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let service = Service::builder(ReqwestTransport::new()).build();
        let err = service.get("http://exa mple.test/").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(matches!(
            err.error(),
            Error::InvalidUrl(url) if url == "http://exa mple.test/"
        ));
    }
}
