use std::sync::Arc;
use thiserror::Error;

use super::room::{DraftState, Room};
use super::DraftServer;
use crate::protocol::{ActionRequest, ChampionSlot, ConnId, Phase, TeamSide};

/// Why a draft action was rejected. Every variant maps 1:1 onto the error
/// text returned to the acting client; none of them mutate room state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("room not found")]
    RoomNotFound,
    #[error("client not found in room")]
    UnknownClient,
    #[error("spectators cannot perform actions")]
    SpectatorAction,
    #[error("unknown action type: {0}")]
    UnknownAction(String),
    #[error("ready action not allowed in current phase: {0}")]
    ReadyNotAllowed(Phase),
    #[error("champion name is required for {0} action")]
    ChampionRequired(&'static str),
    #[error("team {side} cannot act in phase {phase}")]
    WrongTurn { side: TeamSide, phase: Phase },
    #[error("{action} not allowed in phase {phase}")]
    NotDraftPhase {
        action: &'static str,
        phase: Phase,
    },
    #[error("champion {0} is already banned")]
    AlreadyBanned(String),
    #[error("champion {0} is already picked")]
    AlreadyPicked(String),
    #[error("champion {0} is disabled (fearless ban)")]
    FearlessDisabled(String),
}

/// Scan both teams' ban arrays for the champion, skipping empty slots and
/// the acting team's slot at `except` so an in-flight selection can be
/// rewritten without colliding with itself.
fn is_champion_banned(state: &DraftState, name: &str, except: Option<(TeamSide, usize)>) -> bool {
    for side in [TeamSide::Blue, TeamSide::Red] {
        for (index, slot) in state.team(side).bans.iter().enumerate() {
            if except == Some((side, index)) {
                continue;
            }
            if slot.matches(name) {
                return true;
            }
        }
    }
    false
}

/// Scan both teams' pick arrays for the champion. Same exception rule as
/// the ban scan.
fn is_champion_picked(state: &DraftState, name: &str, except: Option<(TeamSide, usize)>) -> bool {
    for side in [TeamSide::Blue, TeamSide::Red] {
        for (index, slot) in state.team(side).picks.iter().enumerate() {
            if except == Some((side, index)) {
                continue;
            }
            if slot.matches(name) {
                return true;
            }
        }
    }
    false
}

fn is_fearless_banned(room: &Room, name: &str) -> bool {
    room.fearless_bans
        .iter()
        .any(|banned| crate::protocol::names_match(banned, name))
}

impl DraftServer {
    /// Engine entry point: resolve the acting client, reject spectators, and
    /// dispatch on the action tag. On success the caller broadcasts the new
    /// snapshot; on error nothing changed.
    pub async fn process_action(
        self: &Arc<Self>,
        room_id: &str,
        conn: &ConnId,
        action: &ActionRequest,
    ) -> Result<Arc<Room>, ActionError> {
        let room = self
            .room_in_memory(room_id)
            .ok_or(ActionError::RoomNotFound)?;

        let side = room
            .client_side(conn)
            .await
            .ok_or(ActionError::UnknownClient)?
            .ok_or(ActionError::SpectatorAction)?;

        match action.action.as_str() {
            "ready" => self.process_ready(&room, side).await?,
            "champ_select" => {
                self.process_champ_select(&room, side, &action.champion)
                    .await?;
            }
            "champ_pick" => {
                self.process_champ_pick(&room, side, &action.champion)
                    .await?;
            }
            other => return Err(ActionError::UnknownAction(other.to_string())),
        }
        Ok(room)
    }

    /// Ready handshake. The second side to ready up enters the draft:
    /// `BanBlue1` when any ban phases exist, otherwise straight to
    /// `PickBlue1`, with the countdown started.
    async fn process_ready(
        self: &Arc<Self>,
        room: &Arc<Room>,
        side: TeamSide,
    ) -> Result<(), ActionError> {
        let mut state = room.state.write().await;
        match state.phase {
            Phase::NoReady => {
                state.phase = match side {
                    TeamSide::Blue => Phase::BlueReady,
                    TeamSide::Red => Phase::RedReady,
                };
                tracing::info!(room_id = %room.id, %side, phase = %state.phase, "team ready");
            }
            Phase::BlueReady => {
                if side == TeamSide::Red {
                    self.enter_draft(room, &mut state);
                }
            }
            Phase::RedReady => {
                if side == TeamSide::Blue {
                    self.enter_draft(room, &mut state);
                }
            }
            phase => return Err(ActionError::ReadyNotAllowed(phase)),
        }
        Ok(())
    }

    fn enter_draft(self: &Arc<Self>, room: &Arc<Room>, state: &mut DraftState) {
        state.phase = if room.has_bans() {
            Phase::BanBlue1
        } else {
            Phase::PickBlue1
        };
        tracing::info!(room_id = %room.id, phase = %state.phase, "draft started");
        self.start_timer_locked(room, state);
    }

    /// Tentative selection: overwrite the acting slot without advancing the
    /// phase or touching the countdown. Repeats and rewrites are allowed.
    async fn process_champ_select(
        self: &Arc<Self>,
        room: &Arc<Room>,
        side: TeamSide,
        champion: &str,
    ) -> Result<(), ActionError> {
        let mut state = room.state.write().await;
        let position = validate_slot_write(room, &state, side, champion, "champ_select")?;
        write_slot(&mut state, side, position, champion);
        tracing::debug!(
            room_id = %room.id,
            %side,
            champion,
            position,
            "tentative selection"
        );
        Ok(())
    }

    /// Committing selection: overwrite the acting slot, then advance the
    /// phase (which restarts the countdown for the next step, or finishes
    /// the draft).
    async fn process_champ_pick(
        self: &Arc<Self>,
        room: &Arc<Room>,
        side: TeamSide,
        champion: &str,
    ) -> Result<(), ActionError> {
        let mut state = room.state.write().await;
        let position = validate_slot_write(room, &state, side, champion, "champ_pick")?;
        write_slot(&mut state, side, position, champion);
        tracing::info!(
            room_id = %room.id,
            %side,
            champion,
            phase = %state.phase,
            "selection committed"
        );
        self.advance_locked(room, &mut state);
        Ok(())
    }

    /// Move to the next phase of the applicable sequence. Runs entirely under
    /// the caller's write lock so a concurrent timer expiry can never observe
    /// a half-applied transition: the countdown stops, the phase moves, and
    /// either a fresh countdown starts or the room finishes.
    pub(super) fn advance_locked(self: &Arc<Self>, room: &Arc<Room>, state: &mut DraftState) {
        self.stop_timer_locked(state);

        let Some(next) = state.phase.next(room.has_bans()) else {
            return;
        };
        state.phase = next;
        tracing::info!(room_id = %room.id, phase = %next, "advanced to next phase");

        if next == Phase::Finished {
            self.finish_room(room, state);
            return;
        }
        self.start_timer_locked(room, state);
    }

    /// Terminal handling: archive the record, then evict the room after a
    /// grace period so every observer can still receive the final snapshot.
    fn finish_room(self: &Arc<Self>, room: &Arc<Room>, state: &DraftState) {
        let record = room.to_record(state);
        let server = Arc::clone(self);
        let room_id = room.id.clone();
        let grace = self.config().finished_room_grace;
        tokio::spawn(async move {
            if let Err(err) = server.archive().save_finished(&record).await {
                // The room is evicted regardless: an unbounded registry is
                // worse than losing one unarchivable draft.
                tracing::error!(%room_id, error = %err, "failed to archive finished draft");
            }
            tokio::time::sleep(grace).await;
            server.remove_room(&room_id);
        });
    }
}

/// Shared validation for both selection actions: the champion name must be
/// present, the side must own the current phase, and the name must not
/// collide with any other slot or a fearless ban. Returns the slot position
/// to write.
fn validate_slot_write(
    room: &Room,
    state: &DraftState,
    side: TeamSide,
    champion: &str,
    action: &'static str,
) -> Result<usize, ActionError> {
    if champion.is_empty() {
        return Err(ActionError::ChampionRequired(action));
    }

    let phase = state.phase;
    if phase.side() != Some(side) {
        return Err(ActionError::WrongTurn { side, phase });
    }
    let position = phase
        .position()
        .ok_or(ActionError::NotDraftPhase { action, phase })?;

    // The acting slot itself is exempt so a prior tentative selection can be
    // confirmed or replaced.
    let (ban_except, pick_except) = if phase.is_ban() {
        (Some((side, position)), None)
    } else {
        (None, Some((side, position)))
    };

    if is_champion_banned(state, champion, ban_except) {
        return Err(ActionError::AlreadyBanned(champion.to_string()));
    }
    if is_champion_picked(state, champion, pick_except) {
        return Err(ActionError::AlreadyPicked(champion.to_string()));
    }
    if is_fearless_banned(room, champion) {
        return Err(ActionError::FearlessDisabled(champion.to_string()));
    }

    Ok(position)
}

fn write_slot(state: &mut DraftState, side: TeamSide, position: usize, champion: &str) {
    let phase = state.phase;
    let team = state.team_mut(side);
    let slots = if phase.is_ban() {
        &mut team.bans[..]
    } else {
        &mut team.picks[..]
    };
    if let Some(slot) = slots.get_mut(position) {
        *slot = ChampionSlot::filled(champion);
    }
}
