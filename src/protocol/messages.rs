use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Minimal first-pass parse of an inbound frame, used only to pick a handler.
///
/// A frame that is not a JSON object fails here ("Invalid message format");
/// an object without a recognized `type` falls through to the unknown-type
/// reply. The full body is re-parsed by the handler for the selected type.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub message_type: String,
}

/// `{"type":"create", ...}` — open a new room and mint its capability keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub blue_team_name: String,
    #[serde(default)]
    pub red_team_name: String,
    #[serde(default)]
    pub blue_team_has_bans: bool,
    #[serde(default)]
    pub red_team_has_bans: bool,
    #[serde(default)]
    pub time_per_pick: u32,
    #[serde(default)]
    pub time_per_ban: u32,
    /// Champions disqualified for the whole draft, neither pickable nor bannable.
    #[serde(default)]
    pub fearless_bans: Vec<String>,
}

/// `{"type":"join", ...}` — attach this connection to a room.
///
/// An empty or absent `key` joins as spectator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub key: String,
}

/// `{"type":"action", ...}` — a draft action within the connection's room.
///
/// The `action` tag stays a plain string so an unrecognized tag is reported
/// as an unknown action rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub champion: String,
}

/// Public view of one team inside a status snapshot. Empty slots are `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatus {
    pub name: String,
    pub bans: Vec<String>,
    pub picks: Vec<String>,
}

/// The full public state of a room, broadcast to every observer after any
/// state change and on every timer tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub current_phase: Phase,
    pub time_per_pick: u32,
    pub time_per_ban: u32,
    pub time_remaining: u32,
    pub timer_active: bool,
    pub blue_team: TeamStatus,
    pub red_team: TeamStatus,
    pub fearless_bans: Vec<String>,
}

/// Every frame the server sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, to the creator only. Keys are never repeated afterwards.
    CreateResponse {
        room_id: String,
        red_team_key: String,
        blue_team_key: String,
    },
    Status(StatusPayload),
    Error { message: String },
}
