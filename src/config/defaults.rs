//! Default value functions for configuration fields.
//!
//! Referenced by serde's `#[serde(default = ...)]` attributes so that a
//! partial config file and the compiled defaults always agree.

// =============================================================================
// Listener
// =============================================================================

pub const fn default_port() -> u16 {
    8080
}

pub fn default_host() -> String {
    "localhost".to_string()
}

pub fn default_ws_path() -> String {
    "/ws".to_string()
}

// =============================================================================
// Engine
// =============================================================================

/// Seconds a finished room lingers in the registry so the final snapshot can
/// reach every observer before eviction.
pub const fn default_finished_room_grace_secs() -> u64 {
    5
}

pub const fn default_client_queue_capacity() -> usize {
    32
}

// =============================================================================
// Security
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_max_message_size() -> usize {
    65536 // 64KB
}

// =============================================================================
// Logging
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_log_rotation() -> String {
    "daily".to_string()
}
