//! Ordered room board: play order, unlock graph, and completion tracking.

use indexmap::IndexMap;
use thiserror::Error;

/// A room descriptor in the fixed play order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Identifier, unique within the play order.
    pub name: String,
    /// Display asset key used by the frontend for the room background.
    pub bg: String,
    /// 1-based position, immutable after creation.
    pub order: u32,
}

/// Errors raised by room board commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The room name is not part of the play order.
    #[error("unknown room `{0}`")]
    UnknownRoom(String),
    /// The play order has not been initialized yet.
    #[error("rooms order has not been initialized")]
    NotInitialized,
}

/// Ordered room sequence plus the per-room completion tracker.
///
/// The play order is generated exactly once (create-if-absent at the command
/// boundary); afterwards it is read-only. Completion entries are created
/// implicitly: an absent entry means unsolved.
#[derive(Debug, Clone, Default)]
pub struct RoomBoard {
    order: Vec<Room>,
    status: IndexMap<String, bool>,
}

impl RoomBoard {
    /// Whether the play order has been generated.
    pub fn is_initialized(&self) -> bool {
        !self.order.is_empty()
    }

    /// Install the play order from the configured catalog if absent.
    ///
    /// Returns `true` when this call performed the initialization, `false`
    /// when an order already existed (the call is then a no-op).
    pub fn initialize(&mut self, catalog: &[(String, String)]) -> bool {
        if self.is_initialized() {
            return false;
        }

        self.order = catalog
            .iter()
            .enumerate()
            .map(|(index, (name, bg))| Room {
                name: name.clone(),
                bg: bg.clone(),
                order: index as u32 + 1,
            })
            .collect();
        true
    }

    /// The fixed play order.
    pub fn order(&self) -> &[Room] {
        &self.order
    }

    /// Whether the room's puzzle has been solved.
    pub fn is_solved(&self, name: &str) -> bool {
        self.status.get(name).copied().unwrap_or(false)
    }

    /// Whether the room at `index` (0-based) is enterable.
    ///
    /// The first room is always unlocked; every other room requires the
    /// previous room in the order to be solved. `unlock_all` is the
    /// per-player debug override and bypasses the gate entirely.
    pub fn is_unlocked(&self, index: usize, unlock_all: bool) -> bool {
        if unlock_all {
            return true;
        }
        match index {
            0 => true,
            i => self
                .order
                .get(i - 1)
                .is_some_and(|previous| self.is_solved(&previous.name)),
        }
    }

    /// Look up a room's position in the play order by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|room| room.name == name)
    }

    /// Idempotently record the room's puzzle as solved.
    ///
    /// Returns `true` only when the entry flipped from unsolved to solved so
    /// callers can broadcast exactly once. The claim itself is trusted; only
    /// names present in the play order are accepted.
    pub fn mark_solved(&mut self, name: &str) -> Result<bool, RoomError> {
        if !self.is_initialized() {
            return Err(RoomError::NotInitialized);
        }
        if self.index_of(name).is_none() {
            return Err(RoomError::UnknownRoom(name.to_string()));
        }

        let entry = self.status.entry(name.to_string()).or_insert(false);
        let newly_solved = !*entry;
        *entry = true;
        Ok(newly_solved)
    }

    /// Solved and total room counts.
    pub fn progress(&self) -> (usize, usize) {
        let solved = self
            .order
            .iter()
            .filter(|room| self.is_solved(&room.name))
            .count();
        (solved, self.order.len())
    }

    /// Completion ratio in `[0, 1]`; zero while uninitialized.
    pub fn fraction(&self) -> f64 {
        let (solved, total) = self.progress();
        if total == 0 {
            return 0.0;
        }
        solved as f64 / total as f64
    }

    /// End-game condition: a non-empty order with every room solved.
    pub fn is_complete(&self) -> bool {
        !self.order.is_empty() && self.order.iter().all(|room| self.is_solved(&room.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .map(|name| (name.to_string(), format!("bg-{name}")))
            .collect()
    }

    fn board(names: &[&str]) -> RoomBoard {
        let mut board = RoomBoard::default();
        assert!(board.initialize(&catalog(names)));
        board
    }

    #[test]
    fn initialize_is_create_if_absent() {
        let mut board = board(&["a", "b"]);
        assert!(!board.initialize(&catalog(&["x", "y", "z"])));
        assert_eq!(board.order().len(), 2);
        assert_eq!(board.order()[0].order, 1);
        assert_eq!(board.order()[1].order, 2);
    }

    #[test]
    fn first_room_always_unlocked() {
        let board = board(&["a", "b", "c"]);
        assert!(board.is_unlocked(0, false));
        assert!(!board.is_unlocked(1, false));
        assert!(!board.is_unlocked(2, false));
    }

    #[test]
    fn unlock_follows_previous_room_completion() {
        let mut board = board(&["a", "b", "c"]);
        board.mark_solved("a").unwrap();

        assert!(board.is_unlocked(1, false));
        assert!(!board.is_unlocked(2, false));

        board.mark_solved("b").unwrap();
        assert!(board.is_unlocked(2, false));
    }

    #[test]
    fn unlock_all_override_bypasses_gating() {
        let board = board(&["a", "b", "c"]);
        assert!(board.is_unlocked(2, true));
    }

    #[test]
    fn mark_solved_is_idempotent() {
        let mut board = board(&["a", "b"]);
        assert!(board.mark_solved("a").unwrap());
        assert!(!board.mark_solved("a").unwrap());
        assert_eq!(board.progress(), (1, 2));
    }

    #[test]
    fn mark_solved_rejects_unknown_rooms() {
        let mut board = board(&["a"]);
        assert_eq!(
            board.mark_solved("ghost"),
            Err(RoomError::UnknownRoom("ghost".into()))
        );

        let mut empty = RoomBoard::default();
        assert_eq!(empty.mark_solved("a"), Err(RoomError::NotInitialized));
    }

    #[test]
    fn progress_fraction_one_of_six() {
        let mut board = board(&["a", "b", "c", "d", "e", "f"]);
        board.mark_solved("a").unwrap();
        assert!((board.fraction() - 1.0 / 6.0).abs() < f64::EPSILON);
        assert!(!board.is_unlocked(2, false));
    }

    #[test]
    fn completion_requires_every_room_solved() {
        let mut board = board(&["a", "b"]);
        assert!(!board.is_complete());
        board.mark_solved("a").unwrap();
        assert!(!board.is_complete());
        board.mark_solved("b").unwrap();
        assert!(board.is_complete());

        assert!(!RoomBoard::default().is_complete());
    }
}
