//! Store responses during the server render, consume them once on the client.

use std::future::Future;

use handoff_core::{HandoffConfig, RenderMode, DEFAULT_NAMESPACE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{EncodingError, HandoffError, HandoffResult};
use crate::exclusion::ExclusionList;
use crate::key::{CacheKey, RequestShape};
use crate::shoebox::Shoebox;

/// What the bridge did for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffStatus {
    /// Served from the payload box.
    Hit,
    /// Nothing boxed for this request.
    Miss,
    /// Response written to the payload box.
    Stored,
    /// URL is on the exclusion list, nothing written.
    Excluded,
    /// Not participating in this render mode.
    Bypass,
}

impl std::fmt::Display for HandoffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Stored => write!(f, "STORED"),
            Self::Excluded => write!(f, "EXCLUDED"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}

/// Bridges one render pass to the shoebox.
///
/// On the server every successful, non-excluded response is boxed under its
/// cache key. On the client a boxed payload is removed and returned the first
/// time a matching request is made. When detached, nothing is read or written.
#[derive(Debug, Clone)]
pub struct HandoffBridge {
    mode: RenderMode,
    shoebox: Shoebox,
    namespace: String,
}

impl HandoffBridge {
    /// Create a bridge for a render pass.
    pub fn new(mode: RenderMode, shoebox: Shoebox) -> Self {
        Self {
            mode,
            shoebox,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// A bridge for execution outside any handoff flow.
    pub fn detached() -> Self {
        Self::new(RenderMode::Detached, Shoebox::new())
    }

    /// Create a bridge using the configured namespace.
    pub fn from_config(mode: RenderMode, shoebox: Shoebox, config: &HandoffConfig) -> Self {
        Self::new(mode, shoebox).with_namespace(config.namespace.clone())
    }

    /// Set the shoebox namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn shoebox(&self) -> &Shoebox {
        &self.shoebox
    }

    /// Remove and return the boxed payload for a request.
    ///
    /// Only the client consumes payloads, and only when the box it received
    /// is non-empty. Returns `None` in every other case.
    pub fn retrieve(&self, shape: &RequestShape) -> HandoffResult<Option<String>> {
        Ok(self.take(shape)?.map(|(_, payload)| payload))
    }

    /// Box a response for the client.
    ///
    /// Writes only on the server and only when the URL is not excluded. A
    /// previous payload under the same key is replaced.
    pub fn store<T: Serialize + ?Sized>(
        &self,
        shape: &RequestShape,
        response: &T,
        exclusions: &ExclusionList,
    ) -> HandoffResult<HandoffStatus> {
        match self.prepare_store(shape, exclusions)? {
            Ok(key) => {
                let payload = serde_json::to_string(response)
                    .map_err(|e| EncodingError::new("response", e))?;
                Ok(self.write(&key, payload))
            }
            Err(status) => Ok(status),
        }
    }

    /// Run a request through the bridge.
    ///
    /// A boxed payload short-circuits `request` entirely. Otherwise the
    /// request runs; on the server its successful response is boxed and
    /// returned unchanged. Request errors are returned as-is.
    pub async fn fetch_through<T, E, F, Fut>(
        &self,
        shape: &RequestShape,
        exclusions: &ExclusionList,
        request: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<HandoffError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some((key, payload)) = self.take(shape)? {
            return serde_json::from_str(&payload).map_err(|source| {
                E::from(HandoffError::CorruptPayload {
                    key: key.to_string(),
                    source,
                })
            });
        }

        // Decided before the request runs so exclusion and key errors never
        // follow a completed request.
        let pending = self.prepare_store(shape, exclusions)?;
        let response = request().await?;

        if let Ok(key) = pending {
            match serde_json::to_string(&response) {
                Ok(payload) => {
                    self.write(&key, payload);
                }
                Err(e) => {
                    tracing::warn!(url = %shape.url, error = %e, "response not boxed, failed to encode");
                }
            }
        }

        Ok(response)
    }

    /// Wrap a base request function so every call runs through the bridge.
    pub fn wrap<F, Fut, T, E>(&self, base: F) -> WrappedRequest<F>
    where
        F: Fn(&RequestShape) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        WrappedRequest {
            bridge: self.clone(),
            base,
        }
    }

    fn take(&self, shape: &RequestShape) -> HandoffResult<Option<(CacheKey, String)>> {
        if !self.mode.is_client() {
            return Ok(None);
        }

        let has_payloads = self
            .shoebox
            .with_box(&self.namespace, |payload_box| !payload_box.is_empty())
            .unwrap_or(false);
        if !has_payloads {
            return Ok(None);
        }

        let key = shape.cache_key()?;
        let payload = self
            .shoebox
            .with_box(&self.namespace, |payload_box| payload_box.take(key.as_str()))
            .flatten();

        let status = if payload.is_some() {
            HandoffStatus::Hit
        } else {
            HandoffStatus::Miss
        };
        tracing::debug!(%status, %key, url = %shape.url, "handoff lookup");

        Ok(payload.map(|payload| (key, payload)))
    }

    /// The key to store under, or the status explaining why nothing is stored.
    fn prepare_store(
        &self,
        shape: &RequestShape,
        exclusions: &ExclusionList,
    ) -> HandoffResult<Result<CacheKey, HandoffStatus>> {
        if !self.mode.is_server() {
            return Ok(Err(HandoffStatus::Bypass));
        }
        if exclusions.is_excluded(&shape.url) {
            tracing::debug!(status = %HandoffStatus::Excluded, url = %shape.url, "handoff store skipped");
            return Ok(Err(HandoffStatus::Excluded));
        }
        Ok(Ok(shape.cache_key()?))
    }

    fn write(&self, key: &CacheKey, payload: String) -> HandoffStatus {
        let bytes = payload.len();
        self.shoebox.with_box_or_default(&self.namespace, |payload_box| {
            payload_box.insert(key.as_str(), payload)
        });
        tracing::debug!(status = %HandoffStatus::Stored, %key, bytes, "handoff store");
        HandoffStatus::Stored
    }
}

/// A base request function decorated with a [`HandoffBridge`].
pub struct WrappedRequest<F> {
    bridge: HandoffBridge,
    base: F,
}

impl<F> WrappedRequest<F> {
    /// Issue a request through the bridge.
    pub async fn call<T, E, Fut>(&self, shape: &RequestShape, exclusions: &ExclusionList) -> Result<T, E>
    where
        F: Fn(&RequestShape) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
        E: From<HandoffError>,
    {
        self.bridge
            .fetch_through(shape, exclusions, || (self.base)(shape))
            .await
    }

    /// The bridge this request runs through.
    pub fn bridge(&self) -> &HandoffBridge {
        &self.bridge
    }
}
