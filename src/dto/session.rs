//! Wire types for session lifecycle and membership.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_display_name,
    state::{
        lifecycle::LifecyclePhase,
        session::{Location, Player, Role, Session},
    },
};

/// Wire representation of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleDto {
    /// Water systems specialist.
    Hydrologist,
    /// Power grid specialist.
    Energetician,
    /// Biosphere specialist.
    Biologist,
}

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::Hydrologist => RoleDto::Hydrologist,
            Role::Energetician => RoleDto::Energetician,
            Role::Biologist => RoleDto::Biologist,
        }
    }
}

impl From<RoleDto> for Role {
    fn from(role: RoleDto) -> Self {
        match role {
            RoleDto::Hydrologist => Role::Hydrologist,
            RoleDto::Energetician => Role::Energetician,
            RoleDto::Biologist => Role::Biologist,
        }
    }
}

/// Wire representation of the session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDto {
    /// Players join and choose roles.
    Waiting,
    /// The briefing video is playing.
    Video,
    /// Active gameplay.
    Playing,
}

impl From<LifecyclePhase> for PhaseDto {
    fn from(phase: LifecyclePhase) -> Self {
        match phase {
            LifecyclePhase::Waiting => PhaseDto::Waiting,
            LifecyclePhase::Video => PhaseDto::Video,
            LifecyclePhase::Playing => PhaseDto::Playing,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a player exposed to REST/SSE clients.
///
/// The per-player unlock override stays server-side; it never appears on
/// the wire.
pub struct PlayerSummary {
    /// Player identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Held role, if any.
    pub role: Option<RoleDto>,
    /// Display color derived from the role.
    pub color: Option<String>,
    /// Room the player is in; `null` means the control room.
    pub room: Option<String>,
    /// Whether this player holds host authority.
    pub is_host: bool,
}

impl PlayerSummary {
    fn project(player: &Player, host: Uuid) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            role: player.role.map(Into::into),
            color: player.color().map(str::to_string),
            room: match &player.location {
                Location::ControlRoom => None,
                Location::Room(name) => Some(name.clone()),
            },
            is_host: player.id == host,
        }
    }
}

/// Full session snapshot returned by the read endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Join code of the session.
    pub code: String,
    /// Current lifecycle phase.
    pub phase: PhaseDto,
    /// All players, in join order.
    pub players: Vec<PlayerSummary>,
    /// Shared countdown deadline in epoch milliseconds, once the game started.
    pub timer_deadline_ms: Option<i64>,
    /// Whether the host already released everyone from the ending video.
    pub end_video_finished: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            code: session.code.clone(),
            phase: session.phase().into(),
            players: session
                .players
                .values()
                .map(|player| PlayerSummary::project(player, session.host))
                .collect(),
            timer_deadline_ms: session.timer_deadline_ms,
            end_video_finished: session.end_video_finished,
        }
    }
}

/// Payload used to create a brand-new session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Display name of the creating player, who becomes the host.
    pub name: String,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to join an existing session by code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinSessionRequest {
    /// Display name of the joining player.
    pub name: String,
}

impl Validate for JoinSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response returned after creating or joining a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionJoinedResponse {
    /// Join code of the session.
    pub code: String,
    /// Identifier the client must present on subsequent commands.
    pub player_id: Uuid,
    /// Snapshot taken right after the membership change.
    pub session: SessionSnapshot,
}

/// Payload used to claim, change, or clear a role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChooseRoleRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Role to claim; `null` releases the currently held role.
    pub role: Option<RoleDto>,
}

/// Generic command payload carrying only the acting player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlayerActionRequest {
    /// Acting player.
    pub player_id: Uuid,
}

/// Payload reporting the end of the briefing video.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VideoFinishedRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// `true` when the host skipped instead of letting the video play out.
    #[serde(default)]
    pub skip: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::lifecycle::LifecycleEvent;

    #[test]
    fn snapshot_projects_players_in_join_order() {
        let mut session = Session::new("GV4242".into(), "Ada".into());
        let ben = session.join("Ben".into()).unwrap();
        session
            .choose_role(ben, Some(Role::Energetician))
            .unwrap();

        let snapshot = SessionSnapshot::from(&session);
        assert_eq!(snapshot.code, "GV4242");
        assert_eq!(snapshot.phase, PhaseDto::Waiting);
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[0].name, "Ada");
        assert!(snapshot.players[0].is_host);
        assert!(!snapshot.players[1].is_host);
        assert_eq!(snapshot.players[1].role, Some(RoleDto::Energetician));
        assert_eq!(snapshot.players[1].color.as_deref(), Some("#ffee00"));
    }

    #[test]
    fn snapshot_reports_room_locations() {
        let mut session = Session::new("GV4242".into(), "Ada".into());
        let ada = session.host;
        session
            .rooms
            .initialize(&[("first".into(), "bg".into())]);
        session.enter_room(ada, "first").unwrap();

        let snapshot = SessionSnapshot::from(&session);
        assert_eq!(snapshot.players[0].room.as_deref(), Some("first"));
    }

    #[test]
    fn snapshot_never_exposes_the_unlock_override() {
        let mut session = Session::new("GV4242".into(), "Ada".into());
        let ada = session.host;
        session.players.get_mut(&ada).unwrap().unlock_all = true;

        let json = serde_json::to_value(SessionSnapshot::from(&session)).unwrap();
        assert!(json["players"][0].get("unlock_all").is_none());
        assert!(json["players"][0].get("is_host").is_some());
    }

    #[test]
    fn phase_dto_follows_the_lifecycle() {
        let mut session = Session::new("GV4242".into(), "Ada".into());
        session.apply_lifecycle(LifecycleEvent::StartGame).unwrap();
        assert_eq!(SessionSnapshot::from(&session).phase, PhaseDto::Video);
    }
}
