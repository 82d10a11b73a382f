//! Data adapters and the handoff decorator.

use std::sync::Arc;

use async_trait::async_trait;
use handoff_cache::{ExclusionList, HandoffBridge, RequestShape};
use handoff_core::HandoffConfig;
use serde_json::Value;

use crate::request::{AjaxOptions, Method};
use crate::FetchError;

/// Issues requests on behalf of a data store.
#[async_trait]
pub trait DataAdapter: Send + Sync {
    /// Perform a request and return its JSON payload.
    async fn ajax(&self, url: &str, method: Method, options: AjaxOptions) -> Result<Value, FetchError>;
}

#[async_trait]
impl<A: DataAdapter + ?Sized> DataAdapter for Arc<A> {
    async fn ajax(&self, url: &str, method: Method, options: AjaxOptions) -> Result<Value, FetchError> {
        (**self).ajax(url, method, options).await
    }
}

/// Host configuration read by [`FastbootAdapter`] on every request.
pub trait AdapterHooks: Send + Sync {
    /// Extra properties mixed into every cache key (e.g. locale or tenant).
    fn extra_cache_key_props(&self) -> Option<Value> {
        None
    }

    /// URL patterns whose responses are never boxed.
    fn exclude_from_fastboot_cache(&self) -> Option<Vec<String>> {
        None
    }
}

/// Hooks that add nothing to keys and exclude nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl AdapterHooks for NoHooks {}

impl AdapterHooks for HandoffConfig {
    fn exclude_from_fastboot_cache(&self) -> Option<Vec<String>> {
        self.exclude_from_fastboot_cache.clone()
    }
}

impl<H: AdapterHooks + ?Sized> AdapterHooks for Arc<H> {
    fn extra_cache_key_props(&self) -> Option<Value> {
        (**self).extra_cache_key_props()
    }

    fn exclude_from_fastboot_cache(&self) -> Option<Vec<String>> {
        (**self).exclude_from_fastboot_cache()
    }
}

/// Adds server-to-client handoff to any adapter.
///
/// Requests made during the server render are boxed in the shoebox; the
/// same requests made while the client boots are answered from the box
/// without touching the inner adapter.
///
/// ```ignore
/// let bridge = HandoffBridge::new(RenderMode::Server, shoebox.clone());
/// let adapter = FastbootAdapter::new(HttpAdapter::new(transport), bridge)
///     .with_hooks(config);
/// let post = adapter.ajax("/posts/1", Method::Get, AjaxOptions::new()).await?;
/// ```
pub struct FastbootAdapter<A, H = NoHooks> {
    inner: A,
    hooks: H,
    bridge: HandoffBridge,
}

impl<A: DataAdapter> FastbootAdapter<A> {
    /// Decorate an adapter with a bridge.
    pub fn new(inner: A, bridge: HandoffBridge) -> Self {
        Self {
            inner,
            hooks: NoHooks,
            bridge,
        }
    }
}

impl<A: DataAdapter, H: AdapterHooks> FastbootAdapter<A, H> {
    /// Replace the host hooks.
    pub fn with_hooks<H2: AdapterHooks>(self, hooks: H2) -> FastbootAdapter<A, H2> {
        FastbootAdapter {
            inner: self.inner,
            hooks,
            bridge: self.bridge,
        }
    }

    /// The decorated adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// The bridge this adapter stores and retrieves through.
    pub fn bridge(&self) -> &HandoffBridge {
        &self.bridge
    }

    /// The request shape keyed for `ajax(url, method, options)`.
    pub fn request_shape(&self, url: &str, method: Method, options: &AjaxOptions) -> RequestShape {
        let mut shape = RequestShape::new(method.as_str(), url);
        if let Some(data) = &options.data {
            shape = shape.with_params(data.clone());
        }
        if let Some(extra) = self.hooks.extra_cache_key_props() {
            shape = shape.with_extra(extra);
        }
        shape
    }
}

#[async_trait]
impl<A: DataAdapter, H: AdapterHooks> DataAdapter for FastbootAdapter<A, H> {
    async fn ajax(&self, url: &str, method: Method, options: AjaxOptions) -> Result<Value, FetchError> {
        let shape = self.request_shape(url, method, &options);
        let exclusions = ExclusionList::from_option(self.hooks.exclude_from_fastboot_cache().as_deref())?;

        self.bridge
            .fetch_through(&shape, &exclusions, || self.inner.ajax(url, method, options))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use handoff_cache::{HandoffError, Shoebox};
    use handoff_core::RenderMode;
    use serde_json::json;

    use super::*;

    /// Echoes the request back and counts calls.
    #[derive(Default)]
    struct EchoAdapter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DataAdapter for EchoAdapter {
        async fn ajax(&self, url: &str, method: Method, options: AjaxOptions) -> Result<Value, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({"url": url, "method": method.as_str(), "data": options.data, "n": n}))
        }
    }

    struct FailingAdapter;

    #[async_trait]
    impl DataAdapter for FailingAdapter {
        async fn ajax(&self, url: &str, _: Method, _: AjaxOptions) -> Result<Value, FetchError> {
            Err(FetchError::HttpError {
                status: 503,
                message: format!("{url} unavailable"),
            })
        }
    }

    /// Hooks whose values can change between calls.
    #[derive(Default)]
    struct MutableHooks {
        locale: Mutex<Option<String>>,
        exclusions: Mutex<Option<Vec<String>>>,
    }

    impl AdapterHooks for MutableHooks {
        fn extra_cache_key_props(&self) -> Option<Value> {
            self.locale
                .lock()
                .unwrap()
                .clone()
                .map(|locale| json!({ "locale": locale }))
        }

        fn exclude_from_fastboot_cache(&self) -> Option<Vec<String>> {
            self.exclusions.lock().unwrap().clone()
        }
    }

    fn transferred(shoebox: &Shoebox) -> Shoebox {
        Shoebox::from_json(&shoebox.to_json()).unwrap()
    }

    #[tokio::test]
    async fn test_server_boxes_and_client_replays() {
        let shoebox = Shoebox::new();
        let server = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Server, shoebox.clone()),
        );
        let options = AjaxOptions::new().with_data(json!({"include": "author"}));

        let rendered = server.ajax("/posts/1", Method::Get, options.clone()).await.unwrap();

        let client = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Client, transferred(&shoebox)),
        );
        let replayed = client.ajax("/posts/1", Method::Get, options.clone()).await.unwrap();
        assert_eq!(replayed, rendered);
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 0);

        let live = client.ajax("/posts/1", Method::Get, options).await.unwrap();
        assert_eq!(live["n"], json!(1));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_method_and_data_are_part_of_key() {
        let shoebox = Shoebox::new();
        let server = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Server, shoebox.clone()),
        );
        server
            .ajax("/posts", Method::Get, AjaxOptions::new().with_data(json!({"page": 1})))
            .await
            .unwrap();

        let client = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Client, transferred(&shoebox)),
        );
        client
            .ajax("/posts", Method::Get, AjaxOptions::new().with_data(json!({"page": 2})))
            .await
            .unwrap();
        client.ajax("/posts", Method::Post, AjaxOptions::new().with_data(json!({"page": 1})))
            .await
            .unwrap();
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hooks_are_read_per_call() {
        let hooks = Arc::new(MutableHooks::default());
        let shoebox = Shoebox::new();
        let server = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Server, shoebox.clone()),
        )
        .with_hooks(hooks.clone());

        *hooks.locale.lock().unwrap() = Some("en".into());
        server.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap();

        *hooks.exclusions.lock().unwrap() = Some(vec!["/posts/2".into()]);
        server.ajax("/posts/2", Method::Get, AjaxOptions::new()).await.unwrap();

        let boxed = shoebox.retrieve(server.bridge().namespace()).unwrap();
        assert_eq!(boxed.len(), 1);

        let client_hooks = Arc::new(MutableHooks::default());
        let client = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Client, transferred(&shoebox)),
        )
        .with_hooks(client_hooks.clone());

        *client_hooks.locale.lock().unwrap() = Some("de".into());
        client.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap();
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);

        *client_hooks.locale.lock().unwrap() = Some("en".into());
        client.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap();
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_config_exclusions() {
        let config = HandoffConfig::new().exclude(r"/^\/session/");
        let shoebox = Shoebox::new();
        let server = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Server, shoebox.clone()),
        )
        .with_hooks(config);

        server.ajax("/session/current", Method::Get, AjaxOptions::new()).await.unwrap();
        server.ajax("/posts", Method::Get, AjaxOptions::new()).await.unwrap();

        assert_eq!(shoebox.retrieve(server.bridge().namespace()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_exclusion_pattern_surfaces() {
        let config = HandoffConfig::new().exclude("/(/");
        let server = FastbootAdapter::new(
            EchoAdapter::default(),
            HandoffBridge::new(RenderMode::Server, Shoebox::new()),
        )
        .with_hooks(config);

        let err = server.ajax("/posts", Method::Get, AjaxOptions::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Handoff(HandoffError::Pattern(_))));
        assert_eq!(server.inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inner_errors_pass_through() {
        let shoebox = Shoebox::new();
        let server = FastbootAdapter::new(
            FailingAdapter,
            HandoffBridge::new(RenderMode::Server, shoebox.clone()),
        );

        let err = server.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpError { status: 503, .. }));
        assert!(shoebox.namespaces().is_empty());
    }

    #[tokio::test]
    async fn test_detached_adapter_always_calls_inner() {
        let adapter = FastbootAdapter::new(EchoAdapter::default(), HandoffBridge::detached());

        adapter.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap();
        adapter.ajax("/posts/1", Method::Get, AjaxOptions::new()).await.unwrap();

        assert_eq!(adapter.inner().calls.load(Ordering::SeqCst), 2);
        assert!(adapter.bridge().shoebox().namespaces().is_empty());
    }

    #[tokio::test]
    async fn test_arc_adapter_is_an_adapter() {
        let inner: Arc<dyn DataAdapter> = Arc::new(EchoAdapter::default());
        let adapter = FastbootAdapter::new(inner, HandoffBridge::detached());
        let value = adapter.ajax("/x", Method::Get, AjaxOptions::new()).await.unwrap();
        assert_eq!(value["url"], json!("/x"));
    }
}
