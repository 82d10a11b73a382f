//! Cache key derivation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::EncodingError;

/// Prefix of every derived key. Keeps keys clear of reserved property names.
pub const KEY_PREFIX: &str = "q-";

/// A cache key identifying one boxed response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key (for debugging).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    components: Vec<String>,
}

impl CacheKey {
    /// Wrap an existing key string (e.g. one read back from a payload box).
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Derive the cache key for a request.
///
/// `params` and `extra` are converted to JSON and written in canonical form
/// (RFC 8785, sorted object keys), so two calls with the same logical values
/// produce the same key on the server and on the client no matter how the
/// maps were built. An absent component and an explicit JSON `null` are the
/// same component.
pub fn derive_key<P, X>(
    resource_type: &str,
    url: &str,
    params: Option<&P>,
    extra: Option<&X>,
) -> Result<CacheKey, EncodingError>
where
    P: Serialize + ?Sized,
    X: Serialize + ?Sized,
{
    let params = to_component("params", params)?;
    let extra = to_component("extra", extra)?;

    let params_text = canonical("params", &params)?;
    let extra_text = canonical("extra", &extra)?;
    let tuple = Value::Array(vec![
        Value::String(resource_type.to_string()),
        Value::String(url.to_string()),
        params,
        extra,
    ]);
    let material = canonical("cache key", &tuple)?;

    let key = format!("{KEY_PREFIX}{}", hex::encode(Sha256::digest(material.as_bytes())));
    tracing::trace!(%key, %material, "derived cache key");

    Ok(CacheKey {
        key,
        components: vec![
            format!("type:{resource_type}"),
            format!("url:{url}"),
            format!("params:{params_text}"),
            format!("extra:{extra_text}"),
        ],
    })
}

fn to_component<T: Serialize + ?Sized>(
    what: &'static str,
    value: Option<&T>,
) -> Result<Value, EncodingError> {
    match value {
        Some(value) => serde_json::to_value(value).map_err(|e| EncodingError::new(what, e)),
        None => Ok(Value::Null),
    }
}

fn canonical(what: &'static str, value: &Value) -> Result<String, EncodingError> {
    serde_jcs::to_string(value).map_err(|e| EncodingError::new(what, e))
}

/// The request tuple a cache key is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestShape {
    /// Request type. The adapter passes the HTTP method here.
    pub resource_type: String,
    /// Request URL.
    pub url: String,
    /// Query parameters or request data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Caller-supplied properties that further distinguish the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl RequestShape {
    /// Create a shape with no params or extra properties.
    pub fn new(resource_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            url: url.into(),
            params: None,
            extra: None,
        }
    }

    /// Set the params component.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the extra-properties component.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Set the params component from any serializable value.
    pub fn try_with_params<T: Serialize + ?Sized>(self, params: &T) -> Result<Self, EncodingError> {
        let value = serde_json::to_value(params).map_err(|e| EncodingError::new("params", e))?;
        Ok(self.with_params(value))
    }

    /// Set the extra-properties component from any serializable value.
    pub fn try_with_extra<T: Serialize + ?Sized>(self, extra: &T) -> Result<Self, EncodingError> {
        let value = serde_json::to_value(extra).map_err(|e| EncodingError::new("extra", e))?;
        Ok(self.with_extra(value))
    }

    /// Derive this shape's cache key.
    pub fn cache_key(&self) -> Result<CacheKey, EncodingError> {
        derive_key(
            &self.resource_type,
            &self.url,
            self.params.as_ref(),
            self.extra.as_ref(),
        )
    }
}
