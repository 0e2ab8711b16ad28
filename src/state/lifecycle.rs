//! Session lifecycle state machine.

use thiserror::Error;

/// Coarse lifecycle phases a session moves through.
///
/// The progression is strictly forward: once a session is `Playing` it never
/// returns to an earlier phase. Finer progression inside `Playing` (room
/// unlocking, end-game aggregation) lives in the room board and crisis room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Players join the session and choose roles.
    Waiting,
    /// The briefing video plays for every connected client.
    Video,
    /// Active gameplay; terminal at this level.
    Playing,
}

/// Events that can be applied to the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host launches the mission from the waiting room.
    StartGame,
    /// The briefing video ended, either naturally or via a host skip.
    VideoFinished,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: LifecyclePhase,
    /// The event that cannot be applied from this phase.
    pub event: LifecycleEvent,
}

/// State machine implementing the `Waiting -> Video -> Playing` session flow.
#[derive(Debug, Clone)]
pub struct LifecycleMachine {
    phase: LifecyclePhase,
    version: usize,
}

impl Default for LifecycleMachine {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::Waiting,
            version: 0,
        }
    }
}

impl LifecycleMachine {
    /// Create a new state machine initialised in the waiting phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply an event, moving the state machine to the next phase.
    ///
    /// Gating conditions (host authority, role coverage, player count) are the
    /// caller's responsibility; this machine only enforces transition shape.
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<LifecyclePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    fn compute_transition(
        &self,
        event: LifecycleEvent,
    ) -> Result<LifecyclePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (LifecyclePhase::Waiting, LifecycleEvent::StartGame) => LifecyclePhase::Video,
            (LifecyclePhase::Video, LifecycleEvent::VideoFinished) => LifecyclePhase::Playing,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_waiting() {
        let sm = LifecycleMachine::new();
        assert_eq!(sm.phase(), LifecyclePhase::Waiting);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn full_happy_path_through_session() {
        let mut sm = LifecycleMachine::new();

        assert_eq!(
            sm.apply(LifecycleEvent::StartGame).unwrap(),
            LifecyclePhase::Video
        );
        assert_eq!(
            sm.apply(LifecycleEvent::VideoFinished).unwrap(),
            LifecyclePhase::Playing
        );
        assert_eq!(sm.version(), 2);
    }

    #[test]
    fn no_skipped_state() {
        let mut sm = LifecycleMachine::new();
        let err = sm.apply(LifecycleEvent::VideoFinished).unwrap_err();
        assert_eq!(err.from, LifecyclePhase::Waiting);
        assert_eq!(err.event, LifecycleEvent::VideoFinished);
        assert_eq!(sm.phase(), LifecyclePhase::Waiting);
    }

    #[test]
    fn no_reverse_transitions() {
        let mut sm = LifecycleMachine::new();
        sm.apply(LifecycleEvent::StartGame).unwrap();
        sm.apply(LifecycleEvent::VideoFinished).unwrap();

        assert!(sm.apply(LifecycleEvent::StartGame).is_err());
        assert!(sm.apply(LifecycleEvent::VideoFinished).is_err());
        assert_eq!(sm.phase(), LifecyclePhase::Playing);
    }
}
