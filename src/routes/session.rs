//! Routes for session lifecycle and membership.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{
        ChooseRoleRequest, CreateSessionRequest, JoinSessionRequest, PlayerActionRequest,
        SessionJoinedResponse, SessionSnapshot, VideoFinishedRequest,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes handling session lifecycle and membership.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{code}", get(fetch_session))
        .route("/sessions/{code}/players", post(join_session))
        .route("/sessions/{code}/players/{player_id}", delete(leave_session))
        .route("/sessions/{code}/players/{player_id}/role", put(choose_role))
        .route("/sessions/{code}/start", post(start_game))
        .route("/sessions/{code}/video/finished", post(video_finished))
        .route("/sessions/{code}/end-video/finished", post(finish_end_video))
}

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionJoinedResponse)
    )
)]
/// Create a new session with the caller as host.
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionJoinedResponse>, AppError> {
    payload.validate()?;
    Ok(Json(session_service::create_session(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}",
    tag = "session",
    params(("code" = String, Path, description = "Session join code")),
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot)
    )
)]
/// Read the full session snapshot.
pub async fn fetch_session(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::fetch_session(&state, &code).await?))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/players",
    tag = "session",
    params(("code" = String, Path, description = "Session join code")),
    request_body = JoinSessionRequest,
    responses(
        (status = 200, description = "Joined the session", body = SessionJoinedResponse),
        (status = 409, description = "The game already started")
    )
)]
/// Join a session while it waits in the lobby.
pub async fn join_session(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinSessionRequest>,
) -> Result<Json<SessionJoinedResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::join_session(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/sessions/{code}/players/{player_id}",
    tag = "session",
    params(
        ("code" = String, Path, description = "Session join code"),
        ("player_id" = Uuid, Path, description = "Player leaving the session")
    ),
    responses((status = 204, description = "Player removed"))
)]
/// Leave a session, reassigning host authority when needed.
pub async fn leave_session(
    State(state): State<SharedState>,
    Path((code, player_id)): Path<(String, Uuid)>,
) -> Result<axum::http::StatusCode, AppError> {
    session_service::leave_session(&state, &code, player_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/sessions/{code}/players/{player_id}/role",
    tag = "session",
    params(
        ("code" = String, Path, description = "Session join code"),
        ("player_id" = Uuid, Path, description = "Player changing role")
    ),
    request_body = ChooseRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = SessionSnapshot),
        (status = 409, description = "Role already held by another player")
    )
)]
/// Claim, change, or release a role.
pub async fn choose_role(
    State(state): State<SharedState>,
    Path((code, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<ChooseRoleRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if payload.player_id != player_id {
        return Err(AppError::BadRequest(
            "payload player does not match the path".into(),
        ));
    }
    Ok(Json(
        session_service::choose_role(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/start",
    tag = "session",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Game started", body = SessionSnapshot),
        (status = 401, description = "Only the host can start the game"),
        (status = 409, description = "Role coverage incomplete")
    )
)]
/// Launch the mission from the lobby.
pub async fn start_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        session_service::start_game(&state, &code, payload.player_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/video/finished",
    tag = "session",
    params(("code" = String, Path, description = "Session join code")),
    request_body = VideoFinishedRequest,
    responses(
        (status = 200, description = "Session advanced to gameplay", body = SessionSnapshot)
    )
)]
/// Report the end of the briefing video.
pub async fn video_finished(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<VideoFinishedRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        session_service::video_finished(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/end-video/finished",
    tag = "session",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Every client released from the ending video", body = SessionSnapshot),
        (status = 401, description = "Only the host can end the final video")
    )
)]
/// Host-only: release every client from the ending video.
pub async fn finish_end_video(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        session_service::finish_end_video(&state, &code, payload.player_id).await?,
    ))
}
