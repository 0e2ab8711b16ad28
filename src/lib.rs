//! Library crate for svalbard-back, the authoritative backend for the
//! Svalbard escape-game: sessions, roles, room progression, the crisis
//! room, and the energy and pump mini-games.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
