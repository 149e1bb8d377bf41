// Protocol module: wire message schema and the draft domain vocabulary

pub mod keys;
pub mod messages;
pub mod phase;
pub mod types;

// Re-export the protocol surface so the rest of the crate can
// `use crate::protocol::*`-style import from one place.

pub use keys::{generate_token, TOKEN_LENGTH};

pub use messages::{
    ActionRequest, CreateRequest, Envelope, JoinRequest, ServerMessage, StatusPayload, TeamStatus,
};

pub use phase::{Phase, PICK_ONLY_SEQUENCE, WITH_BANS_SEQUENCE};

pub use types::{names_match, ChampionSlot, ConnId, TeamSide, TeamSlots, BAN_SLOTS, PICK_SLOTS};
