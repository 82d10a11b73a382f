//! JSON-over-HTTP base adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapter::DataAdapter;
use crate::request::{AjaxOptions, AjaxRequest, Method};
use crate::response::Response;
use crate::FetchError;

/// Sends built requests over the wire.
///
/// Implemented by the host for its HTTP stack; the adapter only builds
/// requests and interprets responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: AjaxRequest) -> Result<Response, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: AjaxRequest) -> Result<Response, FetchError> {
        (**self).send(request).await
    }
}

/// Adapter that talks JSON to an HTTP API through a [`Transport`].
pub struct HttpAdapter<T> {
    transport: T,
    base_url: Option<String>,
    default_headers: BTreeMap<String, String>,
}

impl<T: Transport> HttpAdapter<T> {
    /// Create an adapter with no base URL.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base_url: None,
            default_headers: BTreeMap::new(),
        }
    }

    /// Prepend a base URL to relative request URLs.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve a request URL against the base URL.
    pub fn full_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(url) => {
                format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
            }
            _ => url.to_string(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[async_trait]
impl<T: Transport> DataAdapter for HttpAdapter<T> {
    async fn ajax(&self, url: &str, method: Method, options: AjaxOptions) -> Result<Value, FetchError> {
        let mut request = AjaxRequest::from_options(method, &self.full_url(url), &options)?;
        for (key, value) in &self.default_headers {
            request.headers.entry(key.clone()).or_insert_with(|| value.clone());
        }

        tracing::trace!(method = %method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?.error_for_status()?;
        response.json()
    }
}
