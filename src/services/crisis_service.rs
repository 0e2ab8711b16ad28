use tracing::info;
use uuid::Uuid;

use crate::{
    dto::crisis::{CrisisChoiceRequest, CrisisSnapshot},
    error::ServiceError,
    services::{session_service::require_member, sse_events},
    state::{SharedState, now_ms, session::Role},
};

/// Read the crisis room, personalized for the requesting player's role.
///
/// The first read starts the shared phase clock so every client counts down
/// from the same instant.
pub async fn snapshot(
    state: &SharedState,
    code: &str,
    player_id: Option<Uuid>,
) -> Result<CrisisSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    let role = resolve_role(&session, player_id)?;
    let started = session.crisis.ensure_started(now_ms());
    let view = CrisisSnapshot::project(&session.crisis, role);
    let broadcast = started.then(|| CrisisSnapshot::project(&session.crisis, None));
    drop(session);

    if let Some(shared) = broadcast {
        info!(%code, "crisis phase clock started");
        sse_events::broadcast_crisis_updated(handle.events(), shared);
    }
    Ok(view)
}

/// Commit one decision for the acting player's role.
pub async fn submit_choice(
    state: &SharedState,
    code: &str,
    request: CrisisChoiceRequest,
) -> Result<CrisisSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    let role = resolve_role(&session, Some(request.player_id))?;
    session.crisis.submit_choice(role, request.choice)?;
    let view = CrisisSnapshot::project(&session.crisis, role);
    let shared = CrisisSnapshot::project(&session.crisis, None);
    drop(session);

    info!(%code, player_id = %request.player_id, choice = ?request.choice, "crisis choice committed");
    sse_events::broadcast_crisis_updated(handle.events(), shared);
    Ok(view)
}

/// Host-only: advance the crisis to its next phase.
pub async fn advance(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<CrisisSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, player_id)?;
    if !session.is_host(player_id) {
        return Err(ServiceError::Unauthorized(
            "only the host can advance the crisis".into(),
        ));
    }

    let phase = session.crisis.advance(now_ms());
    let role = resolve_role(&session, Some(player_id))?;
    let view = CrisisSnapshot::project(&session.crisis, role);
    let shared = CrisisSnapshot::project(&session.crisis, None);
    let score = session.crisis.global_score;
    drop(session);

    info!(%code, ?phase, ?score, "crisis advanced");
    sse_events::broadcast_crisis_updated(handle.events(), shared);
    Ok(view)
}

fn resolve_role(
    session: &crate::state::session::Session,
    player_id: Option<Uuid>,
) -> Result<Option<Role>, ServiceError> {
    match player_id {
        None => Ok(None),
        Some(id) => {
            require_member(session, id)?;
            Ok(session.players[&id].role)
        }
    }
}
