//! Data adapters for server-rendered pages.
//!
//! Wraps any [`DataAdapter`] so that responses fetched during the server
//! render are boxed for the client, and the client's first identical request
//! is answered from the box instead of the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use handoff_cache::{HandoffBridge, Shoebox};
//! use handoff_core::{HandoffConfig, RenderMode};
//! use handoff_data::prelude::*;
//!
//! let config = HandoffConfig::load("handoff.toml")?;
//! let api = HttpAdapter::new(transport).with_base_url("https://api.example.com");
//!
//! // Server render pass
//! let shoebox = Shoebox::new();
//! let server = FastbootAdapter::new(api, HandoffBridge::from_config(RenderMode::Server, shoebox.clone(), &config))
//!     .with_hooks(config.clone());
//! let post = server.ajax("/posts/1", Method::Get, AjaxOptions::new()).await?;
//!
//! // Embed `shoebox.to_script_tags()` in the page. On the client, the same
//! // call is served from the box without touching the transport.
//! ```

mod adapter;
mod error;
mod http;
mod request;
mod response;

pub use adapter::{AdapterHooks, DataAdapter, FastbootAdapter, NoHooks};
pub use error::FetchError;
pub use http::{HttpAdapter, Transport};
pub use request::{AjaxOptions, AjaxRequest, Method};
pub use response::Response;

/// Common imports for adapter users.
pub mod prelude {
    pub use crate::{
        AdapterHooks, AjaxOptions, DataAdapter, FastbootAdapter, FetchError, HttpAdapter, Method,
        Transport,
    };
}
