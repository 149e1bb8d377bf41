//! Root configuration types.

use super::archive::ArchiveConfig;
use super::defaults::{default_host, default_port, default_ws_path};
use super::logging::LoggingConfig;
use super::security::SecurityConfig;
use super::server::ServerConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for the draft server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Path the WebSocket endpoint is served on
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            ws_path: default_ws_path(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl Config {
    /// The socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
