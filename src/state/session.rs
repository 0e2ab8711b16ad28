//! Session aggregate: players, roles, movement, and the join code.

use indexmap::IndexMap;
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::state::{
    crisis::CrisisRoom,
    lifecycle::{InvalidTransition, LifecycleEvent, LifecycleMachine, LifecyclePhase},
    minigames::{energy::EnergyBoard, pump::PumpStation},
    rooms::RoomBoard,
};

/// Stable opaque identifier for a connected participant.
pub type PlayerId = Uuid;

/// The three asymmetric specializations players can hold.
///
/// At most one player per role within a session; uniqueness is enforced
/// atomically under the session lock, not cooperatively as in the original
/// client-trusted design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Water systems specialist.
    Hydrologist,
    /// Power grid specialist.
    Energetician,
    /// Biosphere specialist.
    Biologist,
}

impl Role {
    /// Display color associated with the role.
    pub fn color(self) -> &'static str {
        match self {
            Role::Hydrologist => "#00eaff",
            Role::Energetician => "#ffee00",
            Role::Biologist => "#00ff66",
        }
    }

    /// All assignable roles in display order.
    pub const ALL: [Role; 3] = [Role::Hydrologist, Role::Energetician, Role::Biologist];
}

/// Where a player currently is from the server's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    /// The central hub between rooms.
    #[default]
    ControlRoom,
    /// Inside the named room.
    Room(String),
}

/// One connected participant.
#[derive(Debug, Clone)]
pub struct Player {
    /// Client-visible identifier, generated at join time, never reused.
    pub id: PlayerId,
    /// Free-text display name, non-empty.
    pub name: String,
    /// Currently held role, if any.
    pub role: Option<Role>,
    /// Current location in the complex.
    pub location: Location,
    /// Per-player debug override that unlocks every room.
    pub unlock_all: bool,
}

impl Player {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role: None,
            location: Location::default(),
            unlock_all: false,
        }
    }

    /// Derived display color; not semantically load-bearing.
    pub fn color(&self) -> Option<&'static str> {
        self.role.map(Role::color)
    }
}

/// Errors raised by session aggregate commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The referenced player is not part of this session.
    #[error("player `{0}` is not part of this session")]
    UnknownPlayer(PlayerId),
    /// The requested role is already held by another player.
    #[error("role is already held by `{holder}`")]
    RoleTaken {
        /// Name of the player currently holding the role.
        holder: String,
    },
    /// The command is only legal in another lifecycle phase.
    #[error("command not allowed while {0:?}")]
    WrongPhase(LifecyclePhase),
    /// The named room is not part of the play order.
    #[error("unknown room `{0}`")]
    UnknownRoom(String),
    /// The named room is still locked for this player.
    #[error("room `{0}` is locked")]
    LockedRoom(String),
}

/// What happened to the session after removing a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRemoval {
    /// The player left; the host was unchanged.
    Removed,
    /// The departing player was the host; authority passed to this player.
    HostReassigned(PlayerId),
    /// The last player left; the session should be dropped.
    Empty,
}

/// Root aggregate for one game instance.
///
/// All mutation goes through command methods so invariants (host membership,
/// role uniqueness, unlock ordering) hold under the per-session lock.
#[derive(Debug, Clone)]
pub struct Session {
    /// Short human-typable join code (`GV` + 4 digits).
    pub code: String,
    /// Player with authority to start the game and advance phases.
    pub host: PlayerId,
    /// Connected participants, insertion-ordered.
    pub players: IndexMap<PlayerId, Player>,
    /// Room play order and completion tracker.
    pub rooms: RoomBoard,
    /// Shared absolute deadline (epoch milliseconds), advisory display only.
    pub timer_deadline_ms: Option<i64>,
    /// Crisis-room sub-state.
    pub crisis: CrisisRoom,
    /// Energy mini-game sub-state.
    pub energy: EnergyBoard,
    /// Pump mini-game sub-state.
    pub pump: PumpStation,
    /// Host-written flag that lets every client advance past the ending video.
    pub end_video_finished: bool,
    lifecycle: LifecycleMachine,
}

impl Session {
    /// Create a fresh session with its creator as host.
    pub fn new(code: String, host_name: String) -> Self {
        let host = Player::new(host_name);
        let host_id = host.id;
        let mut players = IndexMap::new();
        players.insert(host_id, host);

        Self {
            code,
            host: host_id,
            players,
            rooms: RoomBoard::default(),
            timer_deadline_ms: None,
            crisis: CrisisRoom::default(),
            energy: EnergyBoard::default(),
            pump: PumpStation::default(),
            end_video_finished: false,
            lifecycle: LifecycleMachine::new(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// Apply a lifecycle event; gating is the caller's concern.
    pub fn apply_lifecycle(
        &mut self,
        event: LifecycleEvent,
    ) -> Result<LifecyclePhase, InvalidTransition> {
        self.lifecycle.apply(event)
    }

    /// Whether the given player holds host authority.
    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host == player_id
    }

    /// Add a player while the session is waiting for the game to start.
    pub fn join(&mut self, name: String) -> Result<PlayerId, SessionError> {
        if self.phase() != LifecyclePhase::Waiting {
            return Err(SessionError::WrongPhase(self.phase()));
        }

        let player = Player::new(name);
        let id = player.id;
        self.players.insert(id, player);
        Ok(id)
    }

    /// Remove a player, reassigning host authority when necessary.
    ///
    /// The host never silently stalls the session: when the host leaves,
    /// authority passes to the earliest-joined remaining player.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<PlayerRemoval, SessionError> {
        self.players
            .shift_remove(&player_id)
            .ok_or(SessionError::UnknownPlayer(player_id))?;

        if self.players.is_empty() {
            return Ok(PlayerRemoval::Empty);
        }

        if self.host == player_id {
            let new_host = *self.players.keys().next().expect("players is non-empty");
            self.host = new_host;
            return Ok(PlayerRemoval::HostReassigned(new_host));
        }

        Ok(PlayerRemoval::Removed)
    }

    /// Assign, change, or clear a player's role.
    ///
    /// Clearing (`None`) always succeeds and frees the role for others.
    /// Claiming a role held by a different player is rejected; re-picking
    /// one's own role is a no-op success.
    pub fn choose_role(
        &mut self,
        player_id: PlayerId,
        role: Option<Role>,
    ) -> Result<(), SessionError> {
        if self.phase() != LifecyclePhase::Waiting {
            return Err(SessionError::WrongPhase(self.phase()));
        }
        if !self.players.contains_key(&player_id) {
            return Err(SessionError::UnknownPlayer(player_id));
        }

        if let Some(wanted) = role {
            let holder = self
                .players
                .values()
                .find(|player| player.id != player_id && player.role == Some(wanted));
            if let Some(holder) = holder {
                return Err(SessionError::RoleTaken {
                    holder: holder.name.clone(),
                });
            }
        }

        let player = self
            .players
            .get_mut(&player_id)
            .expect("membership checked above");
        player.role = role;
        Ok(())
    }

    /// Start-game gate: every player holds a named role and at least two
    /// players are present.
    pub fn ready_to_start(&self) -> bool {
        self.players.len() >= 2 && self.players.values().all(|player| player.role.is_some())
    }

    /// Move a player into a room, enforcing the unlock graph.
    pub fn enter_room(&mut self, player_id: PlayerId, room: &str) -> Result<(), SessionError> {
        let unlock_all = self
            .players
            .get(&player_id)
            .ok_or(SessionError::UnknownPlayer(player_id))?
            .unlock_all;

        let index = self
            .rooms
            .index_of(room)
            .ok_or_else(|| SessionError::UnknownRoom(room.to_string()))?;

        if !self.rooms.is_unlocked(index, unlock_all) {
            return Err(SessionError::LockedRoom(room.to_string()));
        }

        let player = self
            .players
            .get_mut(&player_id)
            .expect("membership checked above");
        player.location = Location::Room(room.to_string());
        Ok(())
    }

    /// Return a player to the control room, unconditionally.
    pub fn leave_room(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(SessionError::UnknownPlayer(player_id))?;
        player.location = Location::ControlRoom;
        Ok(())
    }
}

/// Generate a human-typable session code: `GV` followed by four digits.
pub fn make_session_code(rng: &mut impl Rng) -> String {
    format!("GV{}", rng.random_range(1000..10000))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn session() -> Session {
        Session::new("GV1234".into(), "Ada".into())
    }

    #[test]
    fn creator_becomes_host() {
        let session = session();
        assert!(session.players.contains_key(&session.host));
        assert_eq!(session.players.len(), 1);
        assert_eq!(session.phase(), LifecyclePhase::Waiting);
    }

    #[test]
    fn role_uniqueness_is_enforced() {
        let mut session = session();
        let ada = session.host;
        let ben = session.join("Ben".into()).unwrap();

        session.choose_role(ada, Some(Role::Hydrologist)).unwrap();
        let err = session
            .choose_role(ben, Some(Role::Hydrologist))
            .unwrap_err();
        assert_eq!(err, SessionError::RoleTaken { holder: "Ada".into() });

        // Re-picking one's own role is a no-op success.
        session.choose_role(ada, Some(Role::Hydrologist)).unwrap();

        // Clearing frees the role for others.
        session.choose_role(ada, None).unwrap();
        session.choose_role(ben, Some(Role::Hydrologist)).unwrap();
    }

    #[test]
    fn start_gate_requires_two_players_with_roles() {
        let mut session = session();
        let ada = session.host;
        session.choose_role(ada, Some(Role::Biologist)).unwrap();
        assert!(!session.ready_to_start());

        let ben = session.join("Ben".into()).unwrap();
        assert!(!session.ready_to_start());

        session.choose_role(ben, Some(Role::Hydrologist)).unwrap();
        assert!(session.ready_to_start());
    }

    #[test]
    fn host_reassigned_to_earliest_joined_player() {
        let mut session = session();
        let ada = session.host;
        let ben = session.join("Ben".into()).unwrap();
        let cleo = session.join("Cleo".into()).unwrap();

        assert_eq!(
            session.remove_player(ada).unwrap(),
            PlayerRemoval::HostReassigned(ben)
        );
        assert_eq!(session.host, ben);

        assert_eq!(session.remove_player(cleo).unwrap(), PlayerRemoval::Removed);
        assert_eq!(session.remove_player(ben).unwrap(), PlayerRemoval::Empty);
    }

    #[test]
    fn joining_is_waiting_only() {
        let mut session = session();
        let ada = session.host;
        let ben = session.join("Ben".into()).unwrap();
        session.choose_role(ada, Some(Role::Hydrologist)).unwrap();
        session.choose_role(ben, Some(Role::Biologist)).unwrap();

        session.apply_lifecycle(LifecycleEvent::StartGame).unwrap();
        assert!(matches!(
            session.join("Late".into()),
            Err(SessionError::WrongPhase(LifecyclePhase::Video))
        ));
    }

    #[test]
    fn enter_room_respects_unlock_graph() {
        let mut session = session();
        let ada = session.host;
        session.rooms.initialize(&[
            ("first".into(), "bg".into()),
            ("second".into(), "bg".into()),
        ]);

        session.enter_room(ada, "first").unwrap();
        assert_eq!(
            session.players[&ada].location,
            Location::Room("first".into())
        );

        session.leave_room(ada).unwrap();
        assert_eq!(session.players[&ada].location, Location::ControlRoom);

        assert!(session.enter_room(ada, "second").is_err());

        session.players.get_mut(&ada).unwrap().unlock_all = true;
        session.enter_room(ada, "second").unwrap();
    }

    #[test]
    fn session_codes_are_human_typable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let code = make_session_code(&mut rng);
            assert!(code.starts_with("GV"));
            assert_eq!(code.len(), 6);
            assert!(code[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
