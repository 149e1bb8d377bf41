//! Server behavior configuration types.

use super::defaults::{default_client_queue_capacity, default_finished_room_grace_secs};
use serde::{Deserialize, Serialize};

/// Configuration for the coordination engine.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Seconds a finished room stays in the registry before eviction, so the
    /// final snapshot can reach every observer
    #[serde(default = "default_finished_room_grace_secs")]
    pub finished_room_grace_secs: u64,
    /// Bound of each client connection's outbound message queue
    #[serde(default = "default_client_queue_capacity")]
    pub client_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            finished_room_grace_secs: default_finished_room_grace_secs(),
            client_queue_capacity: default_client_queue_capacity(),
        }
    }
}
