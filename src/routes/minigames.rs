//! Routes for the energy and pump mini-games.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::{
        minigames::{
            EnergyConfigRequest, EnergySnapshot, PumpPowerRequest, PumpSnapshot, PumpValveRequest,
        },
        session::PlayerActionRequest,
    },
    error::AppError,
    services::minigame_service,
    state::SharedState,
};

/// Routes handling the energy and pump mini-games.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{code}/energy", get(energy_snapshot))
        .route("/sessions/{code}/energy/config", post(energy_config))
        .route("/sessions/{code}/energy/restart", post(energy_restart))
        .route("/sessions/{code}/pump", get(pump_snapshot))
        .route("/sessions/{code}/pump/valve", post(pump_set_valve))
        .route("/sessions/{code}/pump/power", post(pump_set_power))
        .route("/sessions/{code}/pump/restart", post(pump_restart))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}/energy",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    responses((status = 200, description = "Energy circuit state", body = EnergySnapshot))
)]
/// Read the energy circuit.
pub async fn energy_snapshot(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<EnergySnapshot>, AppError> {
    Ok(Json(minigame_service::energy_snapshot(&state, &code).await?))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/energy/config",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    request_body = EnergyConfigRequest,
    responses((status = 200, description = "Circuit reconfigured", body = EnergySnapshot))
)]
/// Reconfigure the energy circuit (voltage, resistances, connections).
pub async fn energy_config(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<EnergyConfigRequest>,
) -> Result<Json<EnergySnapshot>, AppError> {
    Ok(Json(
        minigame_service::energy_config(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/energy/restart",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses((status = 200, description = "Grid back up", body = EnergySnapshot))
)]
/// Bring the grid back up after a blackout.
pub async fn energy_restart(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<EnergySnapshot>, AppError> {
    Ok(Json(
        minigame_service::energy_restart(&state, &code, payload.player_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/sessions/{code}/pump",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    responses((status = 200, description = "Pump station state", body = PumpSnapshot))
)]
/// Read the pump station.
pub async fn pump_snapshot(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<PumpSnapshot>, AppError> {
    Ok(Json(minigame_service::pump_snapshot(&state, &code).await?))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/pump/valve",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PumpValveRequest,
    responses(
        (status = 200, description = "Valve updated", body = PumpSnapshot),
        (status = 409, description = "Controls locked while crashed or solved")
    )
)]
/// Open or close one section valve.
pub async fn pump_set_valve(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PumpValveRequest>,
) -> Result<Json<PumpSnapshot>, AppError> {
    Ok(Json(
        minigame_service::pump_set_valve(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/pump/power",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PumpPowerRequest,
    responses(
        (status = 200, description = "Pump power updated", body = PumpSnapshot),
        (status = 409, description = "Controls locked while crashed or solved")
    )
)]
/// Set the pump drive power.
pub async fn pump_set_power(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PumpPowerRequest>,
) -> Result<Json<PumpSnapshot>, AppError> {
    Ok(Json(
        minigame_service::pump_set_power(&state, &code, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/pump/restart",
    tag = "minigames",
    params(("code" = String, Path, description = "Session join code")),
    request_body = PlayerActionRequest,
    responses(
        (status = 200, description = "Pump restarted", body = PumpSnapshot),
        (status = 409, description = "The pump is not crashed")
    )
)]
/// Restart the pump after a crash.
pub async fn pump_restart(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<PlayerActionRequest>,
) -> Result<Json<PumpSnapshot>, AppError> {
    Ok(Json(
        minigame_service::pump_restart(&state, &code, payload.player_id).await?,
    ))
}
