use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        session::{
            ChooseRoleRequest, CreateSessionRequest, JoinSessionRequest, SessionJoinedResponse,
            SessionSnapshot, VideoFinishedRequest,
        },
        validation::validate_session_code,
    },
    error::ServiceError,
    services::{minigame_service, sse_events},
    state::{
        SharedState, now_ms,
        lifecycle::{LifecycleEvent, LifecyclePhase},
        session::{PlayerRemoval, Session, SessionError},
    },
};

/// Create a fresh session with the requesting player as host.
pub async fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionJoinedResponse, ServiceError> {
    let code = state.allocate_code()?;
    let session = Session::new(code.clone(), request.name);
    let player_id = session.host;
    let snapshot = SessionSnapshot::from(&session);

    state.insert_session(session);
    info!(%code, %player_id, "session created");

    Ok(SessionJoinedResponse {
        code,
        player_id,
        session: snapshot,
    })
}

/// Read the full session snapshot.
pub async fn fetch_session(
    state: &SharedState,
    code: &str,
) -> Result<SessionSnapshot, ServiceError> {
    require_code_shape(code)?;
    let handle = state.session(code)?;
    let session = handle.session().read().await;
    Ok(SessionSnapshot::from(&*session))
}

/// Join an existing session while it waits in the lobby.
pub async fn join_session(
    state: &SharedState,
    code: &str,
    request: JoinSessionRequest,
) -> Result<SessionJoinedResponse, ServiceError> {
    require_code_shape(code)?;
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    let player_id = session.join(request.name)?;
    let snapshot = SessionSnapshot::from(&*session);
    let joined = snapshot
        .players
        .iter()
        .find(|player| player.id == player_id)
        .cloned()
        .ok_or_else(|| ServiceError::InvalidState("joined player missing from snapshot".into()))?;
    drop(session);

    info!(%code, %player_id, "player joined");
    sse_events::broadcast_player_joined(handle.events(), joined);

    Ok(SessionJoinedResponse {
        code: code.to_string(),
        player_id,
        session: snapshot,
    })
}

/// Remove a player, reassigning host authority or dropping the session.
pub async fn leave_session(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<(), ServiceError> {
    let handle = state.session(code)?;
    let removal = {
        let mut session = handle.session().write().await;
        session.remove_player(player_id)?
    };

    match removal {
        PlayerRemoval::Empty => {
            info!(%code, %player_id, "last player left");
            state.remove_session(code).await;
        }
        PlayerRemoval::HostReassigned(new_host) => {
            info!(%code, %player_id, %new_host, "host left, authority reassigned");
            sse_events::broadcast_player_left(handle.events(), player_id, Some(new_host));
        }
        PlayerRemoval::Removed => {
            info!(%code, %player_id, "player left");
            sse_events::broadcast_player_left(handle.events(), player_id, None);
        }
    }

    Ok(())
}

/// Claim, change, or release a role during the lobby phase.
pub async fn choose_role(
    state: &SharedState,
    code: &str,
    request: ChooseRoleRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    session.choose_role(request.player_id, request.role.map(Into::into))?;
    let snapshot = SessionSnapshot::from(&*session);
    drop(session);

    sse_events::broadcast_role_changed(handle.events(), request.player_id, request.role);
    Ok(snapshot)
}

/// Launch the mission: host-only, requires full role coverage.
pub async fn start_game(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, player_id)?;
    if !session.is_host(player_id) {
        return Err(ServiceError::Unauthorized(
            "only the host can start the game".into(),
        ));
    }
    if !session.ready_to_start() {
        return Err(ServiceError::InvalidState(
            "the game needs at least two players, each holding a role".into(),
        ));
    }

    session.apply_lifecycle(LifecycleEvent::StartGame)?;
    if session.rooms.initialize(&state.config().room_catalog()) {
        info!(%code, rooms = session.rooms.order().len(), "room order generated");
    }
    session.timer_deadline_ms = Some(now_ms() + state.config().mission_duration_ms());

    let snapshot = SessionSnapshot::from(&*session);
    drop(session);

    info!(%code, "game started");
    sse_events::broadcast_phase_changed(
        handle.events(),
        snapshot.phase,
        snapshot.timer_deadline_ms,
    );
    Ok(snapshot)
}

/// Report the end of the briefing video, naturally or via a host skip.
///
/// Every client reports the natural end of the video, so a report that
/// arrives after the session already advanced is a no-op success.
pub async fn video_finished(
    state: &SharedState,
    code: &str,
    request: VideoFinishedRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    if request.skip && !session.is_host(request.player_id) {
        return Err(ServiceError::Unauthorized(
            "only the host can skip the video".into(),
        ));
    }

    if session.phase() == LifecyclePhase::Playing {
        return Ok(SessionSnapshot::from(&*session));
    }

    session.apply_lifecycle(LifecycleEvent::VideoFinished)?;
    let snapshot = SessionSnapshot::from(&*session);
    drop(session);

    info!(%code, skip = request.skip, "briefing video finished");
    sse_events::broadcast_phase_changed(
        handle.events(),
        snapshot.phase,
        snapshot.timer_deadline_ms,
    );
    minigame_service::spawn_pump_ticker(state, code).await;

    Ok(snapshot)
}

/// Host-only: release every client from the ending video.
pub async fn finish_end_video(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, player_id)?;
    if !session.is_host(player_id) {
        return Err(ServiceError::Unauthorized(
            "only the host can end the final video".into(),
        ));
    }

    let newly = !session.end_video_finished;
    session.end_video_finished = true;
    let snapshot = SessionSnapshot::from(&*session);
    drop(session);

    if newly {
        sse_events::broadcast_end_video_finished(handle.events());
    }
    Ok(snapshot)
}

pub(crate) fn require_member(session: &Session, player_id: Uuid) -> Result<(), ServiceError> {
    if !session.players.contains_key(&player_id) {
        return Err(SessionError::UnknownPlayer(player_id).into());
    }
    Ok(())
}

/// Reject codes a client could never have been handed out.
fn require_code_shape(code: &str) -> Result<(), ServiceError> {
    validate_session_code(code).map_err(|_| {
        ServiceError::InvalidInput("session codes are `GV` followed by four digits".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::session::{PhaseDto, RoleDto},
        state::AppState,
    };

    fn state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    async fn lobby_with_two_players(state: &SharedState) -> (String, Uuid, Uuid) {
        let created = create_session(
            state,
            CreateSessionRequest { name: "Ada".into() },
        )
        .await
        .unwrap();
        let joined = join_session(
            state,
            &created.code,
            JoinSessionRequest { name: "Ben".into() },
        )
        .await
        .unwrap();

        (created.code, created.player_id, joined.player_id)
    }

    fn role_request(player_id: Uuid, role: RoleDto) -> ChooseRoleRequest {
        ChooseRoleRequest {
            player_id,
            role: Some(role),
        }
    }

    #[tokio::test]
    async fn full_flow_from_lobby_to_gameplay() {
        let state = state();
        let (code, ada, ben) = lobby_with_two_players(&state).await;

        choose_role(&state, &code, role_request(ada, RoleDto::Hydrologist))
            .await
            .unwrap();
        choose_role(&state, &code, role_request(ben, RoleDto::Energetician))
            .await
            .unwrap();

        let snapshot = start_game(&state, &code, ada).await.unwrap();
        assert_eq!(snapshot.phase, PhaseDto::Video);
        assert!(snapshot.timer_deadline_ms.is_some());

        let snapshot = video_finished(
            &state,
            &code,
            VideoFinishedRequest {
                player_id: ada,
                skip: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(snapshot.phase, PhaseDto::Playing);

        // Every client reports the natural end; late reports are no-ops.
        let snapshot = video_finished(
            &state,
            &code,
            VideoFinishedRequest {
                player_id: ben,
                skip: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(snapshot.phase, PhaseDto::Playing);
    }

    #[tokio::test]
    async fn role_conflicts_and_start_gates_are_enforced() {
        let state = state();
        let (code, ada, ben) = lobby_with_two_players(&state).await;

        choose_role(&state, &code, role_request(ada, RoleDto::Biologist))
            .await
            .unwrap();
        let err = choose_role(&state, &code, role_request(ben, RoleDto::Biologist))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Ben still has no role, so the start gate holds.
        let err = start_game(&state, &code, ada).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        // Non-hosts cannot start at all.
        choose_role(&state, &code, role_request(ben, RoleDto::Hydrologist))
            .await
            .unwrap();
        let err = start_game(&state, &code, ben).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn last_player_leaving_drops_the_session() {
        let state = state();
        let (code, ada, ben) = lobby_with_two_players(&state).await;

        leave_session(&state, &code, ada).await.unwrap();
        assert_eq!(state.session_count(), 1);

        leave_session(&state, &code, ben).await.unwrap();
        assert_eq!(state.session_count(), 0);
        assert!(fetch_session(&state, &code).await.is_err());
    }

    #[tokio::test]
    async fn malformed_codes_are_rejected_before_lookup() {
        let state = state();
        let err = fetch_session(&state, "not-a-code").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
