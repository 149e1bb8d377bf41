//! Configuration module for the draft server.
//!
//! Layered configuration: compiled defaults, an optional `config.json`
//! (working directory or `DRAFTROOM_CONFIG_PATH`), `DRAFTROOM__*` environment
//! overrides with `__` as the nesting separator, and finally the original
//! deployment variables `PORT`, `HOST`, and `WS_PATH`.

pub mod archive;
pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;

pub use archive::{ArchiveBackend, ArchiveConfig};

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::validate_config;
