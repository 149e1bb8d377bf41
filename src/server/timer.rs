use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::room::{DraftState, Room};
use super::DraftServer;

impl DraftServer {
    /// Arm the countdown for the current phase and launch its task. Must be
    /// called under the room's write lock; a no-op outside draft phases.
    ///
    /// Each start installs a fresh cancellation token, so at most one timer
    /// task per room can ever pass the active/token check on a tick.
    pub(super) fn start_timer_locked(self: &Arc<Self>, room: &Arc<Room>, state: &mut DraftState) {
        if !state.phase.is_draft() {
            return;
        }

        state.time_remaining = if state.phase.is_ban() {
            room.time_per_ban
        } else {
            room.time_per_pick
        };
        state.timer_active = true;

        let token = CancellationToken::new();
        state.timer_token = token.clone();

        let server = Arc::clone(self);
        let room = Arc::clone(room);
        tracing::debug!(
            room_id = %room.id,
            phase = %state.phase,
            seconds = state.time_remaining,
            "countdown started"
        );
        tokio::spawn(async move {
            server.run_timer(room, token).await;
        });
    }

    /// Deactivate the countdown and signal the running task to exit. Must be
    /// called under the room's write lock; safe when no timer is running.
    pub(super) fn stop_timer_locked(&self, state: &mut DraftState) {
        state.timer_active = false;
        state.timer_token.cancel();
    }

    /// Per-room countdown task at 1-second granularity.
    ///
    /// Each tick re-checks the active flag and this task's own token under
    /// the write lock, so a task left over from a committed pick exits
    /// without touching the successor phase's countdown. Expiry advances the
    /// draft in the same lock scope, then emits the final broadcast of this
    /// phase.
    async fn run_timer(self: Arc<Self>, room: Arc<Room>, token: CancellationToken) {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = token.cancelled() => return,
                _ = ticker.tick() => {
                    let mut state = room.state.write().await;
                    if !state.timer_active || token.is_cancelled() {
                        return;
                    }

                    state.time_remaining = state.time_remaining.saturating_sub(1);
                    if state.time_remaining > 0 {
                        drop(state);
                        self.broadcast_status(&room).await;
                        continue;
                    }

                    state.timer_active = false;
                    tracing::info!(
                        room_id = %room.id,
                        phase = %state.phase,
                        "countdown expired, forcing advance"
                    );
                    self.advance_locked(&room, &mut state);
                    drop(state);
                    self.broadcast_status(&room).await;
                    return;
                }
            }
        }
    }
}
