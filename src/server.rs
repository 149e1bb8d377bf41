use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Duration;

use crate::archive::DraftArchive;
use crate::protocol::{generate_token, ConnId, CreateRequest, ServerMessage, TeamSide};

mod engine;
mod room;
mod timer;

pub use engine::ActionError;
pub use room::{ClientHandle, DraftState, InvalidKey, Room};

/// Runtime configuration for the coordination engine, resolved from the file
/// configuration at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long a finished room stays in the registry so the final snapshot
    /// can reach every observer before eviction.
    pub finished_room_grace: Duration,
    /// Bound of each client's outbound message queue.
    pub client_queue_capacity: usize,
    /// Maximum accepted inbound frame size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            finished_room_grace: Duration::from_secs(5),
            client_queue_capacity: 32,
            max_message_size: 65536,
        }
    }
}

/// Errors surfaced while resolving or joining a room.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("room not found")]
    RoomNotFound,
    #[error("invalid key")]
    InvalidKey,
}

/// The authoritative draft coordination server: owns every live room, the
/// connection-to-room index, and all state fan-out.
pub struct DraftServer {
    config: ServerConfig,
    archive: Arc<dyn DraftArchive>,
    /// Live rooms by id.
    rooms: DashMap<String, Arc<Room>>,
    /// Which room each connection currently observes, for O(1) disconnect
    /// cleanup without back-pointers from connections into rooms.
    conn_rooms: DashMap<ConnId, String>,
}

impl DraftServer {
    pub fn new(config: ServerConfig, archive: Arc<dyn DraftArchive>) -> Arc<Self> {
        Arc::new(Self {
            config,
            archive,
            rooms: DashMap::new(),
            conn_rooms: DashMap::new(),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn archive(&self) -> &dyn DraftArchive {
        self.archive.as_ref()
    }

    /// Mint an id or key that is not already a live room id.
    fn generate_unique_token(&self) -> String {
        loop {
            let token = generate_token();
            if !self.rooms.contains_key(&token) {
                return token;
            }
        }
    }

    /// Create a room from an explicit create request. The returned room
    /// carries the only copy of its capability keys.
    pub fn create_room(&self, request: &CreateRequest) -> Arc<Room> {
        let room_id = self.generate_unique_token();
        let blue_key = generate_token();
        let red_key = generate_token();
        let room = Arc::new(Room::new(room_id.clone(), blue_key, red_key, request));
        self.rooms.insert(room_id.clone(), Arc::clone(&room));
        tracing::info!(
            %room_id,
            blue_team = %request.blue_team_name,
            red_team = %request.red_team_name,
            has_bans = room.has_bans(),
            "room created"
        );
        room
    }

    /// Resolve a room: registry first, then the archive. An archived draft is
    /// installed back into the registry as a read-only replay.
    pub async fn room(&self, room_id: &str) -> Option<Arc<Room>> {
        if let Some(room) = self.rooms.get(room_id) {
            return Some(Arc::clone(&room));
        }

        match self.archive.load_room(room_id).await {
            Ok(Some(record)) => {
                let replayed = Arc::new(Room::from_record(record));
                let room = self
                    .rooms
                    .entry(room_id.to_string())
                    .or_insert(replayed)
                    .clone();
                tracing::info!(%room_id, "room replayed from archive");
                Some(room)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(%room_id, error = %err, "archive lookup failed");
                None
            }
        }
    }

    /// Registry-only lookup, without consulting the archive. Draft actions
    /// use this: an evicted room is gone for acting purposes even when a
    /// replay of it exists.
    pub fn room_in_memory(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|entry| Arc::clone(&entry))
    }

    /// The room a connection is currently in, if any.
    pub fn conn_room(&self, conn: &ConnId) -> Option<String> {
        self.conn_rooms.get(conn).map(|entry| entry.value().clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drop a room from the registry. Archived state, if any, is unaffected.
    pub fn remove_room(&self, room_id: &str) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!(%room_id, "room evicted from registry");
        }
    }

    /// Attach a connection to a room, classifying it by capability key.
    ///
    /// A spectator joining an unknown id materializes an empty shell so the
    /// draft can be observed (or replayed) later; any other miss is an error.
    pub async fn join_room(
        &self,
        room_id: &str,
        conn: ConnId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        key: &str,
    ) -> Result<(Arc<Room>, Option<TeamSide>), JoinError> {
        let room = match self.room(room_id).await {
            Some(room) => room,
            None if key.is_empty() => {
                let shell = self
                    .rooms
                    .entry(room_id.to_string())
                    .or_insert_with(|| Arc::new(Room::spectator_shell(room_id)))
                    .clone();
                tracing::info!(%room_id, "spectator shell materialized");
                shell
            }
            None => return Err(JoinError::RoomNotFound),
        };

        let side = room.classify_key(key).map_err(|_| JoinError::InvalidKey)?;

        // A connection observes at most one room; joining another implicitly
        // leaves the previous one.
        if let Some((_, previous_id)) = self.conn_rooms.remove(&conn) {
            if previous_id != room.id {
                if let Some(previous) = self.rooms.get(&previous_id) {
                    previous.remove_client(&conn).await;
                }
            }
        }

        room.add_client(conn, ClientHandle { sender, side }).await;
        self.conn_rooms.insert(conn, room.id.clone());

        let side_label = match side {
            Some(TeamSide::Blue) => "blue",
            Some(TeamSide::Red) => "red",
            None => "spectator",
        };
        tracing::info!(room_id = %room.id, %conn, side = side_label, "client joined room");
        Ok((room, side))
    }

    /// Remove a connection from its room (if any). The room itself persists
    /// until the draft finishes.
    pub async fn disconnect(&self, conn: &ConnId) {
        let Some((_, room_id)) = self.conn_rooms.remove(conn) else {
            return;
        };
        if let Some(room) = self.rooms.get(&room_id).map(|entry| Arc::clone(&entry)) {
            if room.remove_client(conn).await {
                tracing::info!(%room_id, %conn, "client removed from room");
            }
        }
    }

    /// Fan the current snapshot out to every client of the room.
    ///
    /// Connections whose outbound queue is gone are dropped from the room
    /// mid-iteration; a full queue only costs that client this update.
    pub async fn broadcast_status(&self, room: &Arc<Room>) {
        let snapshot = Arc::new(ServerMessage::Status(room.snapshot().await));

        let mut dead = Vec::new();
        {
            let clients = room.clients.read().await;
            for (conn, handle) in clients.iter() {
                match handle.sender.try_send(Arc::clone(&snapshot)) {
                    Ok(()) => {}
                    Err(TrySendError::Closed(_)) => dead.push(*conn),
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(room_id = %room.id, %conn, "client queue full, snapshot dropped");
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut clients = room.clients.write().await;
            for conn in dead {
                clients.remove(&conn);
                self.conn_rooms.remove(&conn);
                tracing::debug!(room_id = %room.id, %conn, "dropped dead client during broadcast");
            }
        }
    }

    /// Liveness probe for the HTTP health route.
    pub async fn health_check(&self) -> bool {
        self.archive.exists("health-probe").await.is_ok()
    }
}
