use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        crisis::CrisisSnapshot,
        minigames::{EnergySnapshot, PumpSnapshot},
        session::{PhaseDto, PlayerSummary, RoleDto},
        sse::{
            CrisisUpdatedEvent, EndVideoFinishedEvent, EnergyUpdatedEvent, PhaseChangedEvent,
            PlayerJoinedEvent, PlayerLeftEvent, PlayerMovedEvent, PumpUpdatedEvent,
            RoleChangedEvent, RoomSolvedEvent, ServerEvent, SessionCompletedEvent,
        },
    },
    state::SseHub,
};

const EVENT_PLAYER_JOINED: &str = "player.joined";
const EVENT_PLAYER_LEFT: &str = "player.left";
const EVENT_ROLE_CHANGED: &str = "role.changed";
const EVENT_PHASE_CHANGED: &str = "phase.changed";
const EVENT_PLAYER_MOVED: &str = "player.moved";
const EVENT_ROOM_SOLVED: &str = "room.solved";
const EVENT_SESSION_COMPLETED: &str = "session.completed";
const EVENT_END_VIDEO: &str = "end_video.finished";
const EVENT_CRISIS_UPDATED: &str = "crisis.updated";
const EVENT_ENERGY_UPDATED: &str = "energy.updated";
const EVENT_PUMP_UPDATED: &str = "pump.updated";

/// Broadcast a newly joined player to the session stream.
pub fn broadcast_player_joined(hub: &SseHub, player: PlayerSummary) {
    let payload = PlayerJoinedEvent { player };
    send_event(hub, EVENT_PLAYER_JOINED, &payload);
}

/// Broadcast a departure, including any host reassignment.
pub fn broadcast_player_left(hub: &SseHub, player_id: Uuid, new_host: Option<Uuid>) {
    let payload = PlayerLeftEvent {
        player_id,
        new_host,
    };
    send_event(hub, EVENT_PLAYER_LEFT, &payload);
}

/// Broadcast a role claim, change, or release.
pub fn broadcast_role_changed(hub: &SseHub, player_id: Uuid, role: Option<RoleDto>) {
    let payload = RoleChangedEvent { player_id, role };
    send_event(hub, EVENT_ROLE_CHANGED, &payload);
}

/// Broadcast a lifecycle phase change along with the shared deadline.
pub fn broadcast_phase_changed(hub: &SseHub, phase: PhaseDto, timer_deadline_ms: Option<i64>) {
    let payload = PhaseChangedEvent {
        phase,
        timer_deadline_ms,
    };
    send_event(hub, EVENT_PHASE_CHANGED, &payload);
}

/// Broadcast a player moving into a room or back to the control room.
pub fn broadcast_player_moved(hub: &SseHub, player_id: Uuid, room: Option<String>) {
    let payload = PlayerMovedEvent { player_id, room };
    send_event(hub, EVENT_PLAYER_MOVED, &payload);
}

/// Broadcast the first completion of a room along with overall progress.
pub fn broadcast_room_solved(
    hub: &SseHub,
    room: String,
    solved: usize,
    total: usize,
    fraction: f64,
    complete: bool,
) {
    let payload = RoomSolvedEvent {
        room,
        solved,
        total,
        fraction,
        complete,
    };
    send_event(hub, EVENT_ROOM_SOLVED, &payload);
}

/// Broadcast that every room on the board is now solved.
pub fn broadcast_session_completed(hub: &SseHub, solved: usize, total: usize) {
    let payload = SessionCompletedEvent { solved, total };
    send_event(hub, EVENT_SESSION_COMPLETED, &payload);
}

/// Broadcast that the host released everyone from the ending video.
pub fn broadcast_end_video_finished(hub: &SseHub) {
    let payload = EndVideoFinishedEvent {
        end_video_finished: true,
    };
    send_event(hub, EVENT_END_VIDEO, &payload);
}

/// Broadcast the current crisis-room state.
pub fn broadcast_crisis_updated(hub: &SseHub, snapshot: CrisisSnapshot) {
    send_event(hub, EVENT_CRISIS_UPDATED, &CrisisUpdatedEvent(snapshot));
}

/// Broadcast the current energy-circuit state.
pub fn broadcast_energy_updated(hub: &SseHub, snapshot: EnergySnapshot) {
    send_event(hub, EVENT_ENERGY_UPDATED, &EnergyUpdatedEvent(snapshot));
}

/// Broadcast the current pump-station state.
pub fn broadcast_pump_updated(hub: &SseHub, snapshot: PumpSnapshot) {
    send_event(hub, EVENT_PUMP_UPDATED, &PumpUpdatedEvent(snapshot));
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
