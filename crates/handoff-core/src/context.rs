//! Render context for the current execution pass.

use serde::{Deserialize, Serialize};

/// Which side of the server-to-client handoff the current pass runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Server-side render pass. Responses are boxed for the client.
    Server,
    /// Client boot after the handoff. Boxed responses are consumed.
    Client,
    /// No handoff subsystem is active. Caching is bypassed entirely.
    #[default]
    Detached,
}

impl RenderMode {
    /// Build a render mode from the host's two handoff flags.
    ///
    /// The server flag wins when both are set, since a server render never
    /// consumes its own payloads.
    pub fn from_flags(is_server_rendering: bool, is_client_post_handoff: bool) -> Self {
        if is_server_rendering {
            Self::Server
        } else if is_client_post_handoff {
            Self::Client
        } else {
            Self::Detached
        }
    }

    /// Whether responses should be written to the payload box.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }

    /// Whether boxed payloads should be consumed.
    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client)
    }

    /// Whether a handoff subsystem is participating at all.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Detached)
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Detached => write!(f, "detached"),
        }
    }
}
