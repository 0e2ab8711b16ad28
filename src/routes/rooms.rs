//! Routes for the room board, movement, and the end-game outcome.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        rooms::{
            OutcomeResponse, RoomActionRequest, RoomBoardQuery, RoomBoardResponse,
            UnlockAllRequest,
        },
        session::PlayerActionRequest,
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes handling the room board, movement, and the end-game outcome.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{code}/rooms", get(board))
        .route("/sessions/{code}/rooms/enter", post(enter_room))
        .route("/sessions/{code}/rooms/leave", post(leave_room))
        .route("/sessions/{code}/rooms/solved", post(mark_solved))
        .route("/sessions/{code}/rooms/unlock-all", post(set_unlock_all))
        .route("/sessions/{code}/outcome", get(outcome))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}/rooms",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Session join code"),
        ("player_id" = Option<Uuid>, Query, description = "Player whose unlock override applies")
    ),
    responses((status = 200, description = "Room board", body = RoomBoardResponse))
)]
/// Read the room board, generating the play order on first access.
pub async fn board(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<RoomBoardQuery>,
) -> Result<Json<RoomBoardResponse>, AppError> {
    Ok(Json(
        room_service::board(&state, &code, query.player_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/rooms/enter",
    tag = "rooms",
    params(("code" = String, Path, description = "Session join code")),
    request_body = RoomActionRequest,
    responses(
        (status = 200, description = "Player entered the room", body = RoomBoardResponse),
        (status = 409, description = "The room is still locked")
    )
)]
/// Enter a room, enforcing the unlock graph.
pub async fn enter_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<RoomActionRequest>,
) -> Result<Json<RoomBoardResponse>, AppError> {
    Ok(Json(
        room_service::enter_room(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/rooms/leave",
    tag = "rooms",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses((status = 200, description = "Player back in the control room", body = RoomBoardResponse))
)]
/// Return to the control room.
pub async fn leave_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<RoomBoardResponse>, AppError> {
    Ok(Json(
        room_service::leave_room(&state, &code, payload.player_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/rooms/solved",
    tag = "rooms",
    params(("code" = String, Path, description = "Session join code")),
    request_body = RoomActionRequest,
    responses(
        (status = 200, description = "Completion recorded", body = RoomBoardResponse),
        (status = 404, description = "Unknown room")
    )
)]
/// Record a room's puzzle as solved (idempotent).
pub async fn mark_solved(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<RoomActionRequest>,
) -> Result<Json<RoomBoardResponse>, AppError> {
    Ok(Json(
        room_service::mark_solved(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/rooms/unlock-all",
    tag = "rooms",
    params(("code" = String, Path, description = "Session join code")),
    request_body = UnlockAllRequest,
    responses((status = 200, description = "Override toggled", body = RoomBoardResponse))
)]
/// Toggle the per-player debug override that unlocks every room.
pub async fn set_unlock_all(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<UnlockAllRequest>,
) -> Result<Json<RoomBoardResponse>, AppError> {
    Ok(Json(
        room_service::set_unlock_all(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}/outcome",
    tag = "rooms",
    params(("code" = String, Path, description = "Session join code")),
    responses((status = 200, description = "End-game narrative band", body = OutcomeResponse))
)]
/// Resolve the end-game narrative band from the crisis score.
pub async fn outcome(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<OutcomeResponse>, AppError> {
    Ok(Json(room_service::outcome(&state, &code).await?))
}
