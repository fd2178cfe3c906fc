//! End-to-end tests of `ajaxkit` services over the reqwest transport.
//!
//! Every test mounts one or more fixtures on a shared local HTTP server. A fixture is an
//! async handler bound to a path; it answers the request and reports whether the request
//! looked the way the test expected. Unmounting a fixture (dropping its [`Fixture`])
//! fails the test if any of its checks failed.
//!
//! The server runs on a dedicated thread with its own runtime, so tests can use any
//! runtime, or none at all.

#![cfg(test)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, LazyLock, Mutex};
use std::thread;

use ajaxkit::{Service, ServiceBuilder};
use ajaxkit_backend_reqwest::ReqwestTransport;
use futures::future::BoxFuture;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

mod fixtures;
mod request_ext;

pub use request_ext::RequestExt;

type FixtureBody = BoxBody<Bytes, hyper::Error>;

/// The outcome of a fixture's checks on the request it received.
type Checked = Result<(), String>;

type Handler = Arc<
    dyn Fn(Request<Incoming>) -> BoxFuture<'static, (Response<FixtureBody>, Checked)>
        + Send
        + Sync,
>;

struct Route {
    handler: Handler,
    failures: Vec<String>,
}

static ROUTES: LazyLock<Mutex<HashMap<String, Route>>> = LazyLock::new(Default::default);

static SERVER: LazyLock<io::Result<SocketAddr>> = LazyLock::new(start_server);

/// Responses a fixture handler may answer with.
trait IntoFixtureResponse {
    fn into_fixture_response(self) -> Response<FixtureBody>;
}

impl IntoFixtureResponse for Response<Full<Bytes>> {
    fn into_fixture_response(self) -> Response<FixtureBody> {
        self.map(|body| body.map_err(|never| match never {}).boxed())
    }
}

impl IntoFixtureResponse for Response<FixtureBody> {
    fn into_fixture_response(self) -> Response<FixtureBody> {
        self
    }
}

/// A `200` response with `body`.
fn reply(body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::new(Full::new(body.into()))
}

fn expect_method(req: &Request<Incoming>, expected: Method) -> Checked {
    if req.method() == expected {
        Ok(())
    } else {
        Err(format!("expected {expected}, got {}", req.method()))
    }
}

/// A handler mounted on the fixture server. Unmounted on drop.
#[must_use]
struct Fixture {
    path: String,
}

impl Fixture {
    fn url(&self) -> io::Result<String> {
        Ok(format!("http://{}{}", server_addr()?, self.path))
    }

    /// A service rooted at this fixture, sending through `transport`.
    fn service_with(&self, transport: ReqwestTransport) -> io::Result<ServiceBuilder> {
        Ok(Service::builder(transport).base_url(self.url()?))
    }

    /// A service rooted at this fixture, bypassing any system proxy.
    fn service(&self) -> io::Result<ServiceBuilder> {
        self.service_with(ReqwestTransport::builder().no_proxy().build())
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let route = ROUTES.lock().unwrap().remove(&self.path);
        let failures = route.map(|route| route.failures).unwrap_or_default();
        if !failures.is_empty() && !thread::panicking() {
            panic!("fixture {} saw unexpected requests: {failures:#?}", self.path);
        }
    }
}

fn mount<F, Fut, R>(path: &str, handler: F) -> Fixture
where
    F: Fn(Request<Incoming>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (R, Checked)> + Send + 'static,
    R: IntoFixtureResponse,
{
    let path = format!("/{}", path.trim_start_matches('/'));
    let handler: Handler = Arc::new(move |req| {
        let fut = handler(req);
        Box::pin(async move {
            let (response, checked) = fut.await;
            (response.into_fixture_response(), checked)
        })
    });
    let route = Route {
        handler,
        failures: Vec::new(),
    };
    let previous = ROUTES.lock().unwrap().insert(path.clone(), route);
    assert!(previous.is_none(), "fixture {path} mounted twice");
    Fixture { path }
}

async fn dispatch(req: Request<Incoming>) -> Result<Response<FixtureBody>, Infallible> {
    let path = req.uri().path().to_owned();
    let handler = ROUTES
        .lock()
        .unwrap()
        .get(&path)
        .map(|route| route.handler.clone());
    let Some(handler) = handler else {
        let mut response = reply(format!("no fixture mounted at {path}"));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return Ok(response.into_fixture_response());
    };

    let request_line = format!("{} {}", req.method(), req.uri());
    let (response, checked) = handler(req).await;
    if let Err(failure) = checked {
        if let Some(route) = ROUTES.lock().unwrap().get_mut(&path) {
            route.failures.push(format!("{request_line}: {failure}"));
        }
    }
    Ok(response)
}

fn server_addr() -> io::Result<SocketAddr> {
    match &*SERVER {
        Ok(addr) => Ok(*addr),
        Err(err) => Err(io::Error::new(err.kind(), err.to_string())),
    }
}

fn start_server() -> io::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("fixture-server")
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("fixture-server".into())
        .spawn(move || {
            if let Err(err) = runtime.block_on(serve(listener)) {
                eprintln!("fixture server stopped: {err}");
            }
        })?;
    Ok(addr)
}

async fn serve(listener: std::net::TcpListener) -> io::Result<()> {
    let listener = TcpListener::from_std(listener)?;
    loop {
        let (stream, _) = listener.accept().await?;
        tokio::spawn(async move {
            let connection = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service_fn(dispatch));
            if let Err(err) = connection.await {
                eprintln!("fixture connection failed: {err}");
            }
        });
    }
}
