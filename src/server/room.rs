use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::archive::{DraftRecord, TeamRecord};
use crate::protocol::{
    ConnId, CreateRequest, Phase, ServerMessage, StatusPayload, TeamSide, TeamSlots, TeamStatus,
};

/// Default display names and timings for rooms materialized without a
/// create request (spectator shells).
const DEFAULT_BLUE_NAME: &str = "Blue Team";
const DEFAULT_RED_NAME: &str = "Red Team";
const DEFAULT_STEP_SECONDS: u32 = 30;

/// A join key that matches neither team of the room it was presented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKey;

/// One connected observer of a room: its outbound queue and which side it
/// authenticated as (`None` = spectator).
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub sender: mpsc::Sender<Arc<ServerMessage>>,
    pub side: Option<TeamSide>,
}

/// Everything about a draft that changes after creation, guarded by the
/// room's write lock: the phase, both teams' slots, and the countdown.
#[derive(Debug)]
pub struct DraftState {
    pub phase: Phase,
    pub blue: TeamSlots,
    pub red: TeamSlots,
    pub time_remaining: u32,
    pub timer_active: bool,
    /// Cancellation signal for the currently running timer task. Replaced on
    /// every timer start, cancelled on every stop.
    pub(crate) timer_token: CancellationToken,
}

impl DraftState {
    fn new(blue_name: &str, red_name: &str, phase: Phase) -> Self {
        DraftState {
            phase,
            blue: TeamSlots::new(blue_name),
            red: TeamSlots::new(red_name),
            time_remaining: 0,
            timer_active: false,
            timer_token: CancellationToken::new(),
        }
    }

    pub fn team(&self, side: TeamSide) -> &TeamSlots {
        match side {
            TeamSide::Blue => &self.blue,
            TeamSide::Red => &self.red,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamSlots {
        match side {
            TeamSide::Blue => &mut self.blue,
            TeamSide::Red => &mut self.red,
        }
    }
}

/// One live draft: immutable creation parameters, the lock-guarded draft
/// state, and the set of subscribed connections.
#[derive(Debug)]
pub struct Room {
    pub id: String,
    /// Capability keys. `None` on spectator shells and replayed rooms, which
    /// can never hand out a team side.
    pub blue_key: Option<String>,
    pub red_key: Option<String>,
    pub blue_has_bans: bool,
    pub red_has_bans: bool,
    pub time_per_pick: u32,
    pub time_per_ban: u32,
    pub fearless_bans: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub state: RwLock<DraftState>,
    pub(crate) clients: RwLock<HashMap<ConnId, ClientHandle>>,
}

impl Room {
    /// A fresh room from an explicit create request, in `NoReady` with every
    /// slot empty and no timer.
    pub fn new(id: String, blue_key: String, red_key: String, request: &CreateRequest) -> Self {
        Room {
            id,
            blue_key: Some(blue_key),
            red_key: Some(red_key),
            blue_has_bans: request.blue_team_has_bans,
            red_has_bans: request.red_team_has_bans,
            time_per_pick: request.time_per_pick,
            time_per_ban: request.time_per_ban,
            fearless_bans: request.fearless_bans.clone(),
            created_at: Utc::now(),
            state: RwLock::new(DraftState::new(
                &request.blue_team_name,
                &request.red_team_name,
                Phase::NoReady,
            )),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// A keyless shell materialized when a spectator joins an unknown id.
    pub fn spectator_shell(id: &str) -> Self {
        Room {
            id: id.to_string(),
            blue_key: None,
            red_key: None,
            blue_has_bans: false,
            red_has_bans: false,
            time_per_pick: DEFAULT_STEP_SECONDS,
            time_per_ban: DEFAULT_STEP_SECONDS,
            fearless_bans: Vec::new(),
            created_at: Utc::now(),
            state: RwLock::new(DraftState::new(
                DEFAULT_BLUE_NAME,
                DEFAULT_RED_NAME,
                Phase::NoReady,
            )),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Rehydrate an archived draft for read-only observation. Keys are never
    /// re-materialized and the timer stays inactive.
    pub fn from_record(record: DraftRecord) -> Self {
        let mut state = DraftState::new("", "", record.current_phase);
        state.blue = record.blue_team.into_slots();
        state.red = record.red_team.into_slots();
        Room {
            id: record.id,
            blue_key: None,
            red_key: None,
            blue_has_bans: record.blue_team_has_bans,
            red_has_bans: record.red_team_has_bans,
            time_per_pick: record.time_per_pick,
            time_per_ban: record.time_per_ban,
            fearless_bans: record.fearless_bans,
            created_at: DateTime::from_timestamp(record.created_at, 0).unwrap_or_else(Utc::now),
            state: RwLock::new(state),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Whether any ban phases exist in this draft at all.
    pub fn has_bans(&self) -> bool {
        self.blue_has_bans || self.red_has_bans
    }

    /// Classify a join key: empty means spectator (checked first, so keyless
    /// replayed rooms never grant a side), otherwise it must match a team key.
    pub fn classify_key(&self, key: &str) -> Result<Option<TeamSide>, InvalidKey> {
        if key.is_empty() {
            return Ok(None);
        }
        if self.blue_key.as_deref() == Some(key) {
            return Ok(Some(TeamSide::Blue));
        }
        if self.red_key.as_deref() == Some(key) {
            return Ok(Some(TeamSide::Red));
        }
        Err(InvalidKey)
    }

    /// Assemble the public snapshot under the read lock.
    pub async fn snapshot(&self) -> StatusPayload {
        let state = self.state.read().await;
        StatusPayload {
            current_phase: state.phase,
            time_per_pick: self.time_per_pick,
            time_per_ban: self.time_per_ban,
            time_remaining: state.time_remaining,
            timer_active: state.timer_active,
            blue_team: TeamStatus {
                name: state.blue.name.clone(),
                bans: state.blue.ban_names(),
                picks: state.blue.pick_names(),
            },
            red_team: TeamStatus {
                name: state.red.name.clone(),
                bans: state.red.ban_names(),
                picks: state.red.pick_names(),
            },
            fearless_bans: self.fearless_bans.clone(),
        }
    }

    /// The persisted form of this room, stamped with the completion time.
    pub fn to_record(&self, state: &DraftState) -> DraftRecord {
        DraftRecord {
            id: self.id.clone(),
            blue_team_name: state.blue.name.clone(),
            red_team_name: state.red.name.clone(),
            blue_team_has_bans: self.blue_has_bans,
            red_team_has_bans: self.red_has_bans,
            time_per_pick: self.time_per_pick,
            time_per_ban: self.time_per_ban,
            current_phase: state.phase,
            blue_team: TeamRecord::from_slots(&state.blue),
            red_team: TeamRecord::from_slots(&state.red),
            fearless_bans: self.fearless_bans.clone(),
            created_at: self.created_at.timestamp(),
            completed_at: Utc::now().timestamp(),
        }
    }

    pub async fn add_client(&self, conn: ConnId, handle: ClientHandle) {
        let mut clients = self.clients.write().await;
        clients.insert(conn, handle);
    }

    pub async fn remove_client(&self, conn: &ConnId) -> bool {
        let mut clients = self.clients.write().await;
        clients.remove(conn).is_some()
    }

    /// The side a connection joined as; `None` if the connection is unknown
    /// to this room.
    pub async fn client_side(&self, conn: &ConnId) -> Option<Option<TeamSide>> {
        let clients = self.clients.read().await;
        clients.get(conn).map(|handle| handle.side)
    }

    pub async fn client_count(&self) -> usize {
        let clients = self.clients.read().await;
        clients.len()
    }
}
