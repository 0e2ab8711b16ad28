//! Payloads carried over each session's server-sent events stream.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{
    crisis::CrisisSnapshot,
    minigames::{EnergySnapshot, PumpSnapshot},
    session::{PhaseDto, PlayerSummary, RoleDto},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across a session's SSE channel.
pub struct ServerEvent {
    /// SSE event name, if any.
    pub event: Option<String>,
    /// Pre-serialized JSON data field.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from a pre-serialized data field.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Code of the session the stream belongs to.
    pub code: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player joins the session.
pub struct PlayerJoinedEvent {
    /// The freshly joined player.
    pub player: PlayerSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player leaves or is removed.
pub struct PlayerLeftEvent {
    /// The departed player.
    pub player_id: Uuid,
    /// New host, when the departing player held host authority.
    pub new_host: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player claims, changes, or releases a role.
pub struct RoleChangedEvent {
    /// The player whose role changed.
    pub player_id: Uuid,
    /// New role; `null` means the role was released.
    pub role: Option<RoleDto>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the session lifecycle phase changes.
pub struct PhaseChangedEvent {
    /// New lifecycle phase.
    pub phase: PhaseDto,
    /// Shared countdown deadline, set when gameplay starts.
    pub timer_deadline_ms: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player moves between the control room and a room.
pub struct PlayerMovedEvent {
    /// The player who moved.
    pub player_id: Uuid,
    /// Room entered; `null` means back to the control room.
    pub room: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast the first time a room's puzzle is solved.
pub struct RoomSolvedEvent {
    /// The solved room.
    pub room: String,
    /// Number of solved rooms.
    pub solved: usize,
    /// Total number of rooms.
    pub total: usize,
    /// Completion ratio in `[0, 1]`.
    pub fraction: f64,
    /// `true` once every room is solved.
    pub complete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once, when the last remaining room is solved.
pub struct SessionCompletedEvent {
    /// Number of solved rooms, equal to the total.
    pub solved: usize,
    /// Total number of rooms.
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the host releases everyone from the ending video.
pub struct EndVideoFinishedEvent {
    /// Always `true`; the flag never resets.
    pub end_video_finished: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the crisis room changes (phase, choices, score).
pub struct CrisisUpdatedEvent(
    /// Shared crisis snapshot, not personalized to any role.
    pub CrisisSnapshot,
);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the energy circuit changes.
pub struct EnergyUpdatedEvent(
    /// Full energy-circuit snapshot.
    pub EnergySnapshot,
);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast on every pump simulation tick and control change.
pub struct PumpUpdatedEvent(
    /// Full pump-station snapshot.
    pub PumpSnapshot,
);
