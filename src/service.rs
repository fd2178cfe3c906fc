use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ajaxkit_interface::{
    Body, CancellationToken, Error, Method, RequestConfig, Result as BaseResult, Transport,
};

use crate::hook::{Hook, HookSet};
use crate::{Orchestrator, Response, Result};

/// A request entity with default configuration and interceptors.
///
/// Services form a hierarchy: [`Service::extend`] derives a child that inherits the
/// parent's configuration layers and hooks. Parent layers are less specific than the
/// child's, and parent hooks run before the child's. Both are resolved once when the child
/// is built.
///
/// Cloning a service is cheap.
#[derive(Clone, Debug)]
pub struct Service {
    inner: Arc<ServiceInner>,
}

#[derive(Debug)]
struct ServiceInner {
    orchestrator: Orchestrator,
    layers: Vec<RequestConfig>,
    hooks: HookSet,
}

/// Builds a [`Service`].
#[derive(Debug)]
#[must_use]
pub struct ServiceBuilder {
    orchestrator: Orchestrator,
    inherited_layers: Vec<RequestConfig>,
    inherited_hooks: HookSet,
    config: RequestConfig,
    hooks: HookSet,
}

macro_rules! alias {
    ($($(#[$doc:meta])* $name:ident, $name_with:ident => $method:ident;)*) => {$(
        $(#[$doc])*
        pub async fn $name(&self, url: impl Into<String>) -> Result<Response> {
            self.$name_with(url, RequestConfig::new()).await
        }

        $(#[$doc])*
        ///
        /// The method and `url` replace those of `config`.
        pub async fn $name_with(
            &self,
            url: impl Into<String>,
            config: RequestConfig,
        ) -> Result<Response> {
            self.request(config.with_method(Method::$method).with_url(url)).await
        }
    )*};
}

macro_rules! alias_with_body {
    ($($(#[$doc:meta])* $name:ident, $name_with:ident => $method:ident;)*) => {$(
        $(#[$doc])*
        pub async fn $name(
            &self,
            url: impl Into<String>,
            body: impl Into<Body>,
        ) -> Result<Response> {
            self.$name_with(url, body, RequestConfig::new()).await
        }

        $(#[$doc])*
        ///
        /// The method, `url` and `body` replace those of `config`.
        pub async fn $name_with(
            &self,
            url: impl Into<String>,
            body: impl Into<Body>,
            config: RequestConfig,
        ) -> Result<Response> {
            self.request(
                config
                    .with_method(Method::$method)
                    .with_url(url)
                    .with_body(body),
            )
            .await
        }
    )*};
}

impl Service {
    /// Starts building a root service on top of `transport`.
    pub fn builder(transport: impl Transport) -> ServiceBuilder {
        ServiceBuilder {
            orchestrator: Orchestrator::new(transport),
            inherited_layers: Vec::new(),
            inherited_hooks: HookSet::new(),
            config: RequestConfig::new(),
            hooks: HookSet::new(),
        }
    }

    /// Starts building a child service sharing this service's transport.
    pub fn extend(&self) -> ServiceBuilder {
        ServiceBuilder {
            orchestrator: self.inner.orchestrator.clone(),
            inherited_layers: self.inner.layers.clone(),
            inherited_hooks: self.inner.hooks.clone(),
            config: RequestConfig::new(),
            hooks: HookSet::new(),
        }
    }

    /// Sends a request. `config` is the most specific layer.
    pub async fn request(&self, config: RequestConfig) -> Result<Response> {
        let layers = self.inner.layers.iter().chain(std::iter::once(&config));
        self.inner.orchestrator.execute(layers, &self.inner.hooks).await
    }

    alias! {
        /// Sends a `GET` request.
        get, get_with => Get;
        /// Sends a `DELETE` request.
        delete, delete_with => Delete;
        /// Sends a `HEAD` request.
        head, head_with => Head;
        /// Sends an `OPTIONS` request.
        options, options_with => Options;
    }

    alias_with_body! {
        /// Sends a `POST` request with `body`.
        post, post_with => Post;
        /// Sends a `PUT` request with `body`.
        put, put_with => Put;
        /// Sends a `PATCH` request with `body`.
        patch, patch_with => Patch;
    }

    /// The resolved configuration layers, least specific first.
    pub fn layers(&self) -> &[RequestConfig] {
        &self.inner.layers
    }

    /// The resolved hooks, ancestors first.
    pub fn hooks(&self) -> &HookSet {
        &self.inner.hooks
    }
}

impl ServiceBuilder {
    /// Merges `config` over this service's own configuration layer.
    pub fn config(mut self, config: RequestConfig) -> Self {
        self.config = crate::merge([&self.config, &config]);
        self
    }

    /// Sets the URL, joined onto the parent's.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    /// Sets a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Sets a default query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.params.insert(name, value);
        self
    }

    /// Sets the default timeout.
    ///
    /// The timer runs on Tokio: a request with a timeout issued outside a Tokio runtime
    /// fails without being sent.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token to every request of this service.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.config.cancel_token = Some(token);
        self
    }

    /// Registers a hook.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Registers a [`Hook::before_request`] hook.
    pub fn before_request<F, Fut>(self, f: F) -> Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BaseResult<RequestConfig>> + Send + 'static,
    {
        self.hook(Hook::before_request(f))
    }

    /// Registers a [`Hook::before_success`] hook.
    pub fn before_success<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BaseResult<Response>> + Send + 'static,
    {
        self.hook(Hook::before_success(f))
    }

    /// Registers a [`Hook::before_fail`] hook.
    pub fn before_fail<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Error, Arc<RequestConfig>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BaseResult<Response>> + Send + 'static,
    {
        self.hook(Hook::before_fail(f))
    }

    /// Registers a [`Hook::on_success`] hook.
    pub fn on_success(self, f: impl Fn(&Response) + Send + Sync + 'static) -> Self {
        self.hook(Hook::on_success(f))
    }

    /// Registers a [`Hook::on_fail`] hook.
    pub fn on_fail(self, f: impl Fn(&Error, &RequestConfig) + Send + Sync + 'static) -> Self {
        self.hook(Hook::on_fail(f))
    }

    /// Registers a [`Hook::on_abort`] hook.
    pub fn on_abort(self, f: impl Fn(&Error, &RequestConfig) + Send + Sync + 'static) -> Self {
        self.hook(Hook::on_abort(f))
    }

    /// Registers a [`Hook::on_complete`] hook.
    pub fn on_complete(
        self,
        f: impl Fn(std::result::Result<&Response, &Error>, &RequestConfig) + Send + Sync + 'static,
    ) -> Self {
        self.hook(Hook::on_complete(f))
    }

    /// Builds the service, resolving inherited layers and hooks.
    pub fn build(self) -> Service {
        let mut layers = self.inherited_layers;
        layers.push(self.config);
        Service {
            inner: Arc::new(ServiceInner {
                orchestrator: self.orchestrator,
                layers,
                hooks: HookSet::chained(&self.inherited_hooks, &self.hooks),
            }),
        }
    }
}
