//! Request construction for adapters.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::FetchError;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Whether request data travels in the query string rather than the body.
    pub fn uses_query_string(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options passed to [`DataAdapter::ajax`](crate::DataAdapter::ajax).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AjaxOptions {
    /// Query parameters (GET/HEAD) or JSON body (other methods).
    pub data: Option<Value>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl AjaxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set request data from any serializable value.
    pub fn try_with_data<T: Serialize + ?Sized>(self, data: &T) -> Result<Self, FetchError> {
        Ok(self.with_data(serde_json::to_value(data)?))
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// A fully built request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct AjaxRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl AjaxRequest {
    /// Create a request with no headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Build the request an adapter sends for `ajax(url, method, options)`.
    pub fn from_options(method: Method, url: &str, options: &AjaxOptions) -> Result<Self, FetchError> {
        let mut request = Self::new(method, url)
            .accept("application/json")
            .headers(options.headers.clone());

        if let Some(data) = &options.data {
            request = if method.uses_query_string() {
                request.query(data)?
            } else {
                request.json(data)?
            };
        }

        Ok(request)
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Append params to the URL's query string.
    ///
    /// Nested objects become `key[sub]=v`, arrays become `key[]=v`, and
    /// `null` becomes an empty value.
    pub fn query(mut self, params: &Value) -> Result<Self, FetchError> {
        let Value::Object(map) = params else {
            return Err(FetchError::InvalidUrl(format!(
                "query params must be an object, got {params}"
            )));
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in map {
            append_param(&mut serializer, key, value);
        }
        let query = serializer.finish();

        if !query.is_empty() {
            let separator = if self.url.contains('?') { '&' } else { '?' };
            self.url.push(separator);
            self.url.push_str(&query);
        }
        Ok(self)
    }
}

fn append_param(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {
            serializer.append_pair(key, "");
        }
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        Value::Bool(_) | Value::Number(_) => {
            serializer.append_pair(key, &value.to_string());
        }
        Value::Array(items) => {
            let nested = format!("{key}[]");
            for item in items {
                append_param(serializer, &nested, item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                append_param(serializer, &format!("{key}[{sub}]"), item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_data_goes_to_query() {
        let options = AjaxOptions::new().with_data(json!({"page": 2, "sort": "-date"}));
        let request = AjaxRequest::from_options(Method::Get, "/posts", &options).unwrap();

        assert_eq!(request.url, "/posts?page=2&sort=-date");
        assert!(request.body.is_none());
        assert_eq!(request.headers.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_post_data_goes_to_body() {
        let options = AjaxOptions::new().with_data(json!({"title": "hi"}));
        let request = AjaxRequest::from_options(Method::Post, "/posts", &options).unwrap();

        assert_eq!(request.url, "/posts");
        assert_eq!(request.body.as_deref(), Some(br#"{"title":"hi"}"#.as_slice()));
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_query_nesting_and_escaping() {
        let request = AjaxRequest::new(Method::Get, "/search?v=1")
            .query(&json!({
                "filter": {"tag": "a&b"},
                "ids": [1, 2],
                "q": "two words",
                "empty": null
            }))
            .unwrap();

        assert_eq!(
            request.url,
            "/search?v=1&empty=&filter%5Btag%5D=a%26b&ids%5B%5D=1&ids%5B%5D=2&q=two+words"
        );
    }

    #[test]
    fn test_query_rejects_non_object() {
        let result = AjaxRequest::new(Method::Get, "/posts").query(&json!([1, 2]));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_empty_query_leaves_url() {
        let request = AjaxRequest::new(Method::Get, "/posts").query(&json!({})).unwrap();
        assert_eq!(request.url, "/posts");
    }

    #[test]
    fn test_option_headers_are_sent() {
        let options = AjaxOptions::new().header("X-Tenant", "eu");
        let request = AjaxRequest::from_options(Method::Delete, "/posts/1", &options).unwrap();
        assert_eq!(request.headers.get("X-Tenant").map(String::as_str), Some("eu"));
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Get.to_string(), "GET");
        assert!(Method::Head.uses_query_string());
        assert!(!Method::Put.uses_query_string());
    }
}
