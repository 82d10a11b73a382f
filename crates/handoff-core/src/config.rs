//! Handoff configuration.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

/// Shoebox namespace used when none is configured.
///
/// This library's own namespace; it plays the role of `ember-data-storefront`
/// in the `{ "<namespace>": { "queries": { ... } } }` shoebox layout.
pub const DEFAULT_NAMESPACE: &str = "handoff-storefront";

/// Errors from loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Configuration consumed by the handoff adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Shoebox namespace holding the payload box.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// URL patterns whose responses are never boxed.
    ///
    /// Entries are exact URLs or `/regex/` strings. A value that is not a
    /// list is treated as absent, and non-string entries are dropped.
    #[serde(
        default,
        deserialize_with = "lenient_patterns",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_from_fastboot_cache: Option<Vec<String>>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn lenient_patterns<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            exclude_from_fastboot_cache: None,
        }
    }
}

impl HandoffConfig {
    /// Create a config with the default namespace and no exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shoebox namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Add an exclusion pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_from_fastboot_cache
            .get_or_insert_with(Vec::new)
            .push(pattern.into());
        self
    }

    /// Configured exclusion patterns (empty when none are set).
    pub fn exclusions(&self) -> &[String] {
        self.exclude_from_fastboot_cache.as_deref().unwrap_or(&[])
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// Load config from a file. `.json` files are parsed as JSON, everything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: display,
                source,
            })
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: display,
                source,
            })
        }
    }

    /// Save config to a file, in the format implied by its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Generate a default `handoff.toml` file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Server-to-client data handoff configuration

# Shoebox namespace that carries boxed responses to the client.
namespace = "{DEFAULT_NAMESPACE}"

# Responses for these URLs are never boxed. Use an exact URL or a
# regular expression wrapped in slashes.
exclude_from_fastboot_cache = [
    # "/session",
    # "/^\\/users\\//",
]
"#
    )
}
