use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use tokio::runtime::Runtime;

use crate::error::{ReqwestBackendError, Result};

/// Settings shared by every request of a transport.
#[derive(Debug, Clone)]
pub(crate) struct ClientOptions {
    pub user_agent: Option<String>,
    pub use_default_proxy: bool,
    pub ignore_certificate_errors: bool,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            use_default_proxy: true,
            ignore_certificate_errors: false,
            connect_timeout: None,
        }
    }
}

/// reqwest fixes the redirect policy per client, so one client is kept per limit.
#[derive(Clone)]
pub(crate) struct ReqwestClient {
    options: Arc<ClientOptions>,
    clients: Arc<Mutex<HashMap<Option<u32>, Client>>>,
    pub(crate) managed_runtime: Arc<OnceLock<Runtime>>,
}

impl ReqwestClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options: Arc::new(options),
            clients: Arc::default(),
            managed_runtime: Arc::new(OnceLock::new()),
        }
    }

    pub fn client_for(&self, max_redirects: Option<u32>) -> Result<Client> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&max_redirects) {
            return Ok(client.clone());
        }
        let client = build_reqwest_client(&self.options, max_redirects)?;
        clients.insert(max_redirects, client.clone());
        Ok(client)
    }

    #[cfg(test)]
    pub fn cached_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub fn build_reqwest_client(options: &ClientOptions, max_redirects: Option<u32>) -> Result<Client> {
    let mut builder = Client::builder();

    if let Some(user_agent) = &options.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if !options.use_default_proxy {
        builder = builder.no_proxy();
    }
    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    #[cfg(any(feature = "rustls-tls", feature = "native-tls"))]
    {
        builder = builder.danger_accept_invalid_certs(options.ignore_certificate_errors);
    }

    builder
        .redirect(redirect_policy(max_redirects))
        .build()
        .map_err(ReqwestBackendError::Reqwest)
}

fn redirect_policy(max_redirects: Option<u32>) -> Policy {
    match max_redirects {
        None => Policy::default(),
        Some(0) => Policy::none(),
        Some(max) => Policy::limited(max as usize),
    }
}
