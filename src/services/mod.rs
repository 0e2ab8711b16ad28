//! Service layer: free async functions over the shared state, one module
//! per resource.

/// Crisis-room phase, choice, and scoring logic.
pub mod crisis_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Energy and pump mini-game commands plus the pump ticker task.
pub mod minigame_service;
/// Room board reads, movement, and completion tracking.
pub mod room_service;
/// Session lifecycle, membership, and role management.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Background reaper for abandoned sessions.
pub mod sweeper;
