use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::rooms::{OutcomeResponse, RoomActionRequest, RoomBoardResponse, UnlockAllRequest},
    error::ServiceError,
    services::{session_service::require_member, sse_events},
    state::{SharedState, crisis, outcome, session::Session},
};

/// Read the room board from one player's point of view.
///
/// The play order is generated on first access (create-if-absent), so a
/// client that races the start-game command still sees the same order.
pub async fn board(
    state: &SharedState,
    code: &str,
    player_id: Option<Uuid>,
) -> Result<RoomBoardResponse, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    ensure_rooms(state, code, &mut session);
    let unlock_all = unlock_override(&session, player_id)?;
    Ok(RoomBoardResponse::project(&session.rooms, unlock_all))
}

/// Move a player into a room, enforcing the unlock graph.
pub async fn enter_room(
    state: &SharedState,
    code: &str,
    request: RoomActionRequest,
) -> Result<RoomBoardResponse, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    ensure_rooms(state, code, &mut session);
    session.enter_room(request.player_id, &request.room)?;
    let unlock_all = unlock_override(&session, Some(request.player_id))?;
    let view = RoomBoardResponse::project(&session.rooms, unlock_all);
    drop(session);

    sse_events::broadcast_player_moved(handle.events(), request.player_id, Some(request.room));
    Ok(view)
}

/// Return a player to the control room.
pub async fn leave_room(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<RoomBoardResponse, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    session.leave_room(player_id)?;
    let unlock_all = unlock_override(&session, Some(player_id))?;
    let view = RoomBoardResponse::project(&session.rooms, unlock_all);
    drop(session);

    sse_events::broadcast_player_moved(handle.events(), player_id, None);
    Ok(view)
}

/// Record a room's puzzle as solved, broadcasting only the first time.
pub async fn mark_solved(
    state: &SharedState,
    code: &str,
    request: RoomActionRequest,
) -> Result<RoomBoardResponse, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    ensure_rooms(state, code, &mut session);
    let newly = session.rooms.mark_solved(&request.room)?;
    let unlock_all = unlock_override(&session, Some(request.player_id))?;
    let view = RoomBoardResponse::project(&session.rooms, unlock_all);
    drop(session);

    if newly {
        info!(%code, room = %request.room, solved = view.solved, total = view.total, "room solved");
        sse_events::broadcast_room_solved(
            handle.events(),
            request.room,
            view.solved,
            view.total,
            view.fraction,
            view.complete,
        );
        if view.complete {
            info!(%code, "all rooms solved");
            sse_events::broadcast_session_completed(handle.events(), view.solved, view.total);
        }
    }
    Ok(view)
}

/// Toggle the per-player debug override that unlocks every room.
pub async fn set_unlock_all(
    state: &SharedState,
    code: &str,
    request: UnlockAllRequest,
) -> Result<RoomBoardResponse, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    ensure_rooms(state, code, &mut session);
    let player = session
        .players
        .get_mut(&request.player_id)
        .ok_or_else(|| ServiceError::NotFound("player not found".into()))?;
    player.unlock_all = request.enabled;

    warn!(%code, player_id = %request.player_id, enabled = request.enabled, "unlock override toggled");
    Ok(RoomBoardResponse::project(&session.rooms, request.enabled))
}

/// Resolve the end-game narrative band from the crisis global score.
///
/// When the crisis never reached its result phase the score is derived from
/// whatever choices were committed, which yields the neutral baseline when
/// there are none.
pub async fn outcome(state: &SharedState, code: &str) -> Result<OutcomeResponse, ServiceError> {
    let handle = state.session(code)?;
    let session = handle.session().read().await;

    let score = session
        .crisis
        .global_score
        .unwrap_or_else(|| crisis::compute_score(&session.crisis.choices));
    Ok((score, outcome::band(score)).into())
}

fn ensure_rooms(state: &SharedState, code: &str, session: &mut Session) {
    if session.rooms.initialize(&state.config().room_catalog()) {
        info!(%code, rooms = session.rooms.order().len(), "room order generated");
    }
}

fn unlock_override(session: &Session, player_id: Option<Uuid>) -> Result<bool, ServiceError> {
    match player_id {
        None => Ok(false),
        Some(id) => {
            require_member(session, id)?;
            Ok(session.players[&id].unlock_all)
        }
    }
}
