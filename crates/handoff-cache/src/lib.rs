//! Server-to-client response handoff.
//!
//! This crate provides:
//! - `derive_key` / `RequestShape` - Stable cache keys from request shape
//! - `ExclusionList` - URL patterns whose responses are never boxed
//! - `Shoebox` / `PayloadBox` - The payload store transferred to the client
//! - `HandoffBridge` - Store on the server, consume once on the client
//!
//! # Example
//!
//! ```ignore
//! use handoff_cache::{ExclusionList, HandoffBridge, RequestShape, Shoebox};
//! use handoff_core::RenderMode;
//!
//! // Server render pass
//! let shoebox = Shoebox::new();
//! let server = HandoffBridge::new(RenderMode::Server, shoebox.clone());
//! let shape = RequestShape::new("GET", "/posts/1");
//! let post = server
//!     .fetch_through(&shape, &ExclusionList::empty(), || fetch_post(1))
//!     .await?;
//!
//! // Ship `shoebox.to_script_tags()` with the page, then on the client:
//! let client = HandoffBridge::new(RenderMode::Client, Shoebox::from_json(&transferred)?);
//! let post: Post = client
//!     .fetch_through(&shape, &ExclusionList::empty(), || fetch_post(1))
//!     .await?; // served from the box, no request made
//! ```

mod bridge;
mod error;
mod exclusion;
mod key;
mod shoebox;

pub use bridge::*;
pub use error::*;
pub use exclusion::*;
pub use key::*;
pub use shoebox::*;
