//! Request, response, and SSE payload types exchanged with clients.

pub mod crisis;
pub mod health;
pub mod minigames;
pub mod rooms;
pub mod session;
pub mod sse;
pub mod validation;
