//! Routes for the crisis decision room.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        crisis::{CrisisChoiceRequest, CrisisQuery, CrisisSnapshot},
        session::PlayerActionRequest,
    },
    error::AppError,
    services::crisis_service,
    state::SharedState,
};

/// Routes handling the crisis decision room.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{code}/crisis", get(snapshot))
        .route("/sessions/{code}/crisis/choice", post(submit_choice))
        .route("/sessions/{code}/crisis/advance", post(advance))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}/crisis",
    tag = "crisis",
    params(
        ("code" = String, Path, description = "Session join code"),
        ("player_id" = Option<Uuid>, Query, description = "Player whose role personalizes the view")
    ),
    responses((status = 200, description = "Crisis room state", body = CrisisSnapshot))
)]
/// Read the crisis room; the first read starts the shared phase clock.
pub async fn snapshot(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<CrisisQuery>,
) -> Result<Json<CrisisSnapshot>, AppError> {
    Ok(Json(
        crisis_service::snapshot(&state, &code, query.player_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/crisis/choice",
    tag = "crisis",
    params(("code" = String, Path, description = "Session join code")),
    request_body = CrisisChoiceRequest,
    responses(
        (status = 200, description = "Choice committed", body = CrisisSnapshot),
        (status = 400, description = "Choice belongs to another role"),
        (status = 409, description = "Not in the decision phase")
    )
)]
/// Commit one decision for the acting player's role.
pub async fn submit_choice(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<CrisisChoiceRequest>,
) -> Result<Json<CrisisSnapshot>, AppError> {
    Ok(Json(
        crisis_service::submit_choice(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/crisis/advance",
    tag = "crisis",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Crisis advanced", body = CrisisSnapshot),
        (status = 401, description = "Only the host can advance the crisis")
    )
)]
/// Host-only: advance the crisis to its next phase.
pub async fn advance(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<CrisisSnapshot>, AppError> {
    Ok(Json(
        crisis_service::advance(&state, &code, payload.player_id).await?,
    ))
}
