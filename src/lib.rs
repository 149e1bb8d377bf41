#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools
)]

//! # Draftroom Server
//!
//! An authoritative, in-memory WebSocket coordination server for competitive
//! pick/ban drafts between two teams, with optional spectators.
//!
//! Clients join a room with per-team capability keys and drive a shared state
//! machine of alternating ban and pick steps under a per-step countdown.

/// Finished-draft archive: persisted record, storage trait, in-memory backend
pub mod archive;

/// Server configuration and environment variables
pub mod config;

/// Structured logging configuration
pub mod logging;

/// Wire message schema and draft domain vocabulary
pub mod protocol;

/// The draft coordination engine: rooms, validation, phases, timers
pub mod server;

/// WebSocket session layer
pub mod websocket;
