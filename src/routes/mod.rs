//! HTTP route trees, one module per resource.

use axum::Router;

use crate::state::SharedState;

/// Crisis decision-room routes.
pub mod crisis;
/// Swagger UI and OpenAPI document routes.
pub mod docs;
/// Health check routes.
pub mod health;
/// Energy and pump mini-game routes.
pub mod minigames;
/// Room board, movement, and outcome routes.
pub mod rooms;
/// Session lifecycle and membership routes.
pub mod session;
/// Server-sent events routes.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(rooms::router())
        .merge(crisis::router())
        .merge(minigames::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
