//! Payload box transferred from the server render to the client.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{HandoffError, HandoffResult};

/// `type` attribute of the script tags carrying shoebox entries.
pub const SHOEBOX_SCRIPT_TYPE: &str = "fastboot/shoebox";

/// Boxed responses for one namespace, keyed by cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBox {
    /// Cache key to JSON-encoded response body.
    #[serde(default)]
    pub queries: BTreeMap<String, String>,
}

impl PayloadBox {
    /// Create an empty box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload, replacing any previous one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, payload: impl Into<String>) -> Option<String> {
        self.queries.insert(key.into(), payload.into())
    }

    /// Remove and return the payload stored under a key.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.queries.remove(key)
    }

    /// Look at a payload without consuming it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.queries.get(key).map(String::as_str)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.queries.contains_key(key)
    }

    /// Number of boxed payloads.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the box holds no payloads.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Shared handle to the shoebox of one render pass.
///
/// Clones share the same underlying boxes, so the host and the bridge can
/// both hold one.
#[derive(Debug, Clone, Default)]
pub struct Shoebox {
    boxes: Arc<Mutex<BTreeMap<String, PayloadBox>>>,
}

impl Shoebox {
    /// Create an empty shoebox (start of a server render pass).
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a shoebox from its transferred JSON form.
    ///
    /// The document maps namespaces to `{ "queries": { ... } }` objects.
    pub fn from_json(json: &str) -> HandoffResult<Self> {
        let boxes: BTreeMap<String, PayloadBox> =
            serde_json::from_str(json).map_err(HandoffError::Shoebox)?;
        Ok(Self {
            boxes: Arc::new(Mutex::new(boxes)),
        })
    }

    /// Serialize every namespace to the transferred JSON form.
    pub fn to_json(&self) -> String {
        let boxes = self.lock();
        // Maps of strings always serialize.
        serde_json::to_string(&*boxes).unwrap_or_else(|_| "{}".to_string())
    }

    /// Put a box under a namespace, replacing any existing one.
    pub fn put(&self, namespace: impl Into<String>, payload_box: PayloadBox) {
        self.lock().insert(namespace.into(), payload_box);
    }

    /// Get a copy of the box stored under a namespace.
    pub fn retrieve(&self, namespace: &str) -> Option<PayloadBox> {
        self.lock().get(namespace).cloned()
    }

    /// Run a closure against a namespace's box if it exists.
    pub fn with_box<R>(&self, namespace: &str, f: impl FnOnce(&mut PayloadBox) -> R) -> Option<R> {
        self.lock().get_mut(namespace).map(f)
    }

    /// Run a closure against a namespace's box, creating it when missing.
    pub fn with_box_or_default<R>(
        &self,
        namespace: &str,
        f: impl FnOnce(&mut PayloadBox) -> R,
    ) -> R {
        let mut boxes = self.lock();
        f(boxes.entry(namespace.to_string()).or_default())
    }

    /// Namespaces currently present.
    pub fn namespaces(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Render one `<script>` tag per namespace for embedding in the page.
    ///
    /// `<`, `>` and `&` are written as JSON unicode escapes so payload
    /// content can never close the script element early.
    pub fn to_script_tags(&self) -> String {
        let boxes = self.lock();
        let mut html = String::new();
        for (namespace, payload_box) in boxes.iter() {
            let json = serde_json::to_string(payload_box).unwrap_or_else(|_| "{}".to_string());
            html.push_str(&format!(
                r#"<script type="{}" id="shoebox-{}">{}</script>"#,
                SHOEBOX_SCRIPT_TYPE,
                escape_attr(namespace),
                escape_script(&json)
            ));
            html.push('\n');
        }
        html
    }

    /// Rebuild a shoebox from a page containing shoebox script tags.
    ///
    /// Reads back what [`to_script_tags`](Self::to_script_tags) writes. Other
    /// markup around the tags is ignored.
    pub fn from_script_tags(html: &str) -> HandoffResult<Self> {
        let open = format!(r#"<script type="{SHOEBOX_SCRIPT_TYPE}" id="shoebox-"#);
        let mut boxes = BTreeMap::new();
        let mut rest = html;

        while let Some(start) = rest.find(&open) {
            rest = &rest[start + open.len()..];
            let Some((namespace, after)) = rest.split_once(r#"">"#) else {
                break;
            };
            let Some((json, after)) = after.split_once("</script>") else {
                break;
            };
            let payload_box: PayloadBox = serde_json::from_str(json).map_err(HandoffError::Shoebox)?;
            boxes.insert(unescape_attr(namespace), payload_box);
            rest = after;
        }

        Ok(Self {
            boxes: Arc::new(Mutex::new(boxes)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, PayloadBox>> {
        self.boxes.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("recovering poisoned shoebox lock");
            poisoned.into_inner()
        })
    }
}

fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
