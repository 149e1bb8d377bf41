//! Security configuration types.

use super::defaults::{default_cors_origins, default_max_message_size};
use serde::{Deserialize, Serialize};

/// Transport-level policy for the WebSocket endpoint.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins, comma separated. `"*"` (the default) disables
    /// origin checks, which suits a server sitting behind a reverse proxy.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Maximum accepted inbound frame size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            max_message_size: default_max_message_size(),
        }
    }
}
