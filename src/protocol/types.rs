use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a client connection.
pub type ConnId = Uuid;

/// Number of ban slots per team.
pub const BAN_SLOTS: usize = 5;
/// Number of pick slots per team.
pub const PICK_SLOTS: usize = 3;

/// The two competing sides of a draft. Spectators carry no side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Blue,
    Red,
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::Blue => f.write_str("blue"),
            TeamSide::Red => f.write_str("red"),
        }
    }
}

/// Case-insensitive, whitespace-trimmed champion name equality.
///
/// Champion identities are opaque strings owned by an external catalog; the
/// engine only ever compares them.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// One position of a team's ban or pick array.
///
/// An unfilled slot holds no name and serializes as the empty string on the
/// wire and in the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionSlot(Option<String>);

impl ChampionSlot {
    pub const EMPTY: ChampionSlot = ChampionSlot(None);

    pub fn filled(name: impl Into<String>) -> Self {
        ChampionSlot(Some(name.into()))
    }

    /// Map a persisted or wire value back to a slot: empty string means empty.
    pub fn from_wire(name: &str) -> Self {
        if name.is_empty() {
            ChampionSlot::EMPTY
        } else {
            ChampionSlot::filled(name)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Public representation of the slot; empty slots surface as `""`.
    pub fn display_name(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    /// Whether this slot holds the given champion. Empty slots match nothing.
    pub fn matches(&self, name: &str) -> bool {
        self.0
            .as_deref()
            .is_some_and(|held| names_match(held, name))
    }
}

/// One team's mutable share of the draft: a display name plus fixed-length
/// ban and pick arrays whose positions are dictated by the phase order.
#[derive(Debug, Clone)]
pub struct TeamSlots {
    pub name: String,
    pub bans: [ChampionSlot; BAN_SLOTS],
    pub picks: [ChampionSlot; PICK_SLOTS],
}

impl TeamSlots {
    pub fn new(name: impl Into<String>) -> Self {
        TeamSlots {
            name: name.into(),
            bans: Default::default(),
            picks: Default::default(),
        }
    }

    pub fn ban_names(&self) -> Vec<String> {
        self.bans
            .iter()
            .map(|slot| slot.display_name().to_string())
            .collect()
    }

    pub fn pick_names(&self) -> Vec<String> {
        self.picks
            .iter()
            .map(|slot| slot.display_name().to_string())
            .collect()
    }
}
