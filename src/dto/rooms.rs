//! Wire types for the room board and the end-game outcome.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{outcome::Outcome, rooms::RoomBoard};

/// One room as seen by a specific player.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomSummary {
    /// Room display name.
    pub name: String,
    /// Background asset key resolved by the frontend.
    pub bg: String,
    /// 1-based position in the play order.
    pub order: u32,
    /// Whether the room's puzzle has been solved.
    pub solved: bool,
    /// Whether the requesting player may enter the room.
    pub unlocked: bool,
}

/// The full room board plus aggregate progress.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomBoardResponse {
    /// Rooms in play order.
    pub rooms: Vec<RoomSummary>,
    /// Number of solved rooms.
    pub solved: usize,
    /// Total number of rooms.
    pub total: usize,
    /// Completion ratio in `[0, 1]`.
    pub fraction: f64,
    /// `true` once every room is solved.
    pub complete: bool,
}

impl RoomBoardResponse {
    /// Project the board from one player's point of view.
    pub fn project(board: &RoomBoard, unlock_all: bool) -> Self {
        let rooms = board
            .order()
            .iter()
            .enumerate()
            .map(|(index, room)| RoomSummary {
                name: room.name.clone(),
                bg: room.bg.clone(),
                order: room.order,
                solved: board.is_solved(&room.name),
                unlocked: board.is_unlocked(index, unlock_all),
            })
            .collect();

        let (solved, total) = board.progress();
        Self {
            rooms,
            solved,
            total,
            fraction: board.fraction(),
            complete: board.is_complete(),
        }
    }
}

/// Query parameters for the room board read endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomBoardQuery {
    /// Player whose unlock override should apply, if any.
    pub player_id: Option<Uuid>,
}

/// Payload naming a room the acting player targets.
///
/// Room names travel in the body rather than the path because the catalog
/// uses accented French names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomActionRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Room display name.
    pub room: String,
}

/// Payload toggling the per-player unlock override.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UnlockAllRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Desired override state.
    pub enabled: bool,
}

/// End-game narrative band plus the score that selected it.
#[derive(Debug, Serialize, ToSchema)]
pub struct OutcomeResponse {
    /// Normalized global score from the crisis room.
    pub score: f64,
    /// Headline diagnostic for the colony.
    pub message: String,
    /// Short epilogue line shown under the headline.
    pub subtitle: String,
    /// Terminal-style flavour line closing the audit report.
    pub flavor_text: String,
}

impl From<(f64, Outcome)> for OutcomeResponse {
    fn from((score, outcome): (f64, Outcome)) -> Self {
        Self {
            score,
            message: outcome.message.to_string(),
            subtitle: outcome.subtitle.to_string(),
            flavor_text: outcome.flavor_text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_reflects_unlock_state_per_player() {
        let mut board = RoomBoard::default();
        board.initialize(&[
            ("a".into(), "bg-a".into()),
            ("b".into(), "bg-b".into()),
        ]);
        board.mark_solved("a").unwrap();

        let plain = RoomBoardResponse::project(&board, false);
        assert_eq!(plain.rooms.len(), 2);
        assert!(plain.rooms[0].solved);
        assert!(plain.rooms[1].unlocked);
        assert_eq!(plain.solved, 1);
        assert!(!plain.complete);

        let mut gated = RoomBoard::default();
        gated.initialize(&[
            ("a".into(), "bg-a".into()),
            ("b".into(), "bg-b".into()),
        ]);
        let view = RoomBoardResponse::project(&gated, false);
        assert!(!view.rooms[1].unlocked);
        let debug_view = RoomBoardResponse::project(&gated, true);
        assert!(debug_view.rooms[1].unlocked);
    }
}
