use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{ArchiveBackend, ArchiveConfig};
use crate::protocol::{ChampionSlot, Phase, TeamSlots, BAN_SLOTS, PICK_SLOTS};

/// Persisted view of one team. Empty slots are stored as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub bans: Vec<String>,
    pub picks: Vec<String>,
}

impl TeamRecord {
    pub fn from_slots(slots: &TeamSlots) -> Self {
        TeamRecord {
            name: slots.name.clone(),
            bans: slots.ban_names(),
            picks: slots.pick_names(),
        }
    }

    /// Rebuild the in-memory team from a persisted record, padding or
    /// truncating to the fixed slot counts.
    pub fn into_slots(self) -> TeamSlots {
        let mut slots = TeamSlots::new(self.name);
        for (slot, name) in slots.bans.iter_mut().zip(self.bans.iter().take(BAN_SLOTS)) {
            *slot = ChampionSlot::from_wire(name);
        }
        for (slot, name) in slots
            .picks
            .iter_mut()
            .zip(self.picks.iter().take(PICK_SLOTS))
        {
            *slot = ChampionSlot::from_wire(name);
        }
        slots
    }
}

/// The record written for a finished draft and read back for replay.
///
/// Capability keys are deliberately absent: a replayed room is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: String,
    pub blue_team_name: String,
    pub red_team_name: String,
    pub blue_team_has_bans: bool,
    pub red_team_has_bans: bool,
    pub time_per_pick: u32,
    pub time_per_ban: u32,
    pub current_phase: Phase,
    pub blue_team: TeamRecord,
    pub red_team: TeamRecord,
    pub fearless_bans: Vec<String>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub completed_at: i64,
}

/// Storage collaborator that archives finished drafts and serves them back
/// for spectator replay.
#[async_trait]
pub trait DraftArchive: Send + Sync {
    /// Persist a finished draft. Called exactly once per room, on entering
    /// the terminal phase.
    async fn save_finished(&self, record: &DraftRecord) -> Result<()>;

    /// Fetch an archived draft by room id.
    async fn load_room(&self, room_id: &str) -> Result<Option<DraftRecord>>;

    /// Whether an archived draft exists for the given room id.
    async fn exists(&self, room_id: &str) -> Result<bool>;

    /// Remove an archived draft.
    async fn delete(&self, room_id: &str) -> Result<()>;
}

/// Process-local archive backend. Records live for the lifetime of the
/// server process.
#[derive(Default)]
pub struct InMemoryArchive {
    records: RwLock<HashMap<String, DraftRecord>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftArchive for InMemoryArchive {
    async fn save_finished(&self, record: &DraftRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record.clone());
        tracing::info!(room_id = %record.id, "archived finished draft");
        Ok(())
    }

    async fn load_room(&self, room_id: &str) -> Result<Option<DraftRecord>> {
        let records = self.records.read().await;
        Ok(records.get(room_id).cloned())
    }

    async fn exists(&self, room_id: &str) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(room_id))
    }

    async fn delete(&self, room_id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(room_id);
        Ok(())
    }
}

/// Build the archive backend selected by configuration.
pub fn create_archive(config: &ArchiveConfig) -> Arc<dyn DraftArchive> {
    match config.backend {
        ArchiveBackend::Memory => {
            if config.credentials_path.is_some() || config.project_id.is_some() {
                tracing::warn!(
                    "archive credentials are configured but only the in-memory backend is \
                     compiled in; finished drafts will not survive a restart"
                );
            }
            Arc::new(InMemoryArchive::new())
        }
    }
}
