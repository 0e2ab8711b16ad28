//! Crisis-decision room: timed phases, per-role choices, and the shared
//! global score consumed by the end-game aggregator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::session::Role;

/// Advisory duration of each crisis phase, in milliseconds.
pub const PHASE_DURATION_MS: i64 = 60_000;

/// Phases of the crisis room, advanced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CrisisPhase {
    /// Each role reads its own diagnostic panel.
    Diagnostic,
    /// Each role commits one decision.
    Decision,
    /// The audit report and global score are revealed.
    Result,
}

impl CrisisPhase {
    /// The phase that follows this one; `Result` is terminal.
    pub fn next(self) -> CrisisPhase {
        match self {
            CrisisPhase::Diagnostic => CrisisPhase::Decision,
            CrisisPhase::Decision => CrisisPhase::Result,
            CrisisPhase::Result => CrisisPhase::Result,
        }
    }
}

/// Decisions available in the crisis room, three per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CrisisChoice {
    /// Hydrologist: purify the water reserve.
    PurifierEau,
    /// Hydrologist: fast distribution at the biosphere's expense.
    DistribuerRapide,
    /// Hydrologist: close the hydraulic circuits.
    FermerCircuits,
    /// Energetician: stabilize the grid.
    StabiliserReseau,
    /// Energetician: maximize yield, pollution be damned.
    MaximiserRendement,
    /// Energetician: redirect power to the biosphere.
    RedirigerVersBiosphere,
    /// Biologist: reinforce biodiversity.
    RenforcerBiodiversite,
    /// Biologist: force fast growth.
    CroissanceRapide,
    /// Biologist: filter toxins out of the loop.
    FiltrerToxines,
}

impl CrisisChoice {
    /// The role allowed to commit this choice.
    pub fn role(self) -> Role {
        match self {
            CrisisChoice::PurifierEau
            | CrisisChoice::DistribuerRapide
            | CrisisChoice::FermerCircuits => Role::Hydrologist,
            CrisisChoice::StabiliserReseau
            | CrisisChoice::MaximiserRendement
            | CrisisChoice::RedirigerVersBiosphere => Role::Energetician,
            CrisisChoice::RenforcerBiodiversite
            | CrisisChoice::CroissanceRapide
            | CrisisChoice::FiltrerToxines => Role::Biologist,
        }
    }

    /// Score deltas as `(water, energy, bio)`.
    fn deltas(self) -> (i32, i32, i32) {
        match self {
            CrisisChoice::PurifierEau => (10, -5, 0),
            CrisisChoice::DistribuerRapide => (-5, 5, -5),
            CrisisChoice::FermerCircuits => (5, -5, 0),
            CrisisChoice::StabiliserReseau => (3, 7, 0),
            CrisisChoice::MaximiserRendement => (0, 10, -7),
            CrisisChoice::RedirigerVersBiosphere => (0, -5, 10),
            CrisisChoice::RenforcerBiodiversite => (0, -3, 10),
            CrisisChoice::CroissanceRapide => (-5, -5, 7),
            CrisisChoice::FiltrerToxines => (5, -3, 5),
        }
    }

    /// The three choices offered to a role, in display order.
    pub fn options_for(role: Role) -> [CrisisChoice; 3] {
        match role {
            Role::Hydrologist => [
                CrisisChoice::PurifierEau,
                CrisisChoice::DistribuerRapide,
                CrisisChoice::FermerCircuits,
            ],
            Role::Energetician => [
                CrisisChoice::StabiliserReseau,
                CrisisChoice::MaximiserRendement,
                CrisisChoice::RedirigerVersBiosphere,
            ],
            Role::Biologist => [
                CrisisChoice::RenforcerBiodiversite,
                CrisisChoice::CroissanceRapide,
                CrisisChoice::FiltrerToxines,
            ],
        }
    }
}

/// Read-only diagnostic gauges shown during the first phase.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Indicators {
    /// Water level / pollution / evaporation gauges.
    pub water: [u8; 3],
    /// Production / consumption / yield gauges.
    pub energy: [u8; 3],
    /// Growth / oxygen / toxins gauges.
    pub bio: [u8; 3],
}

impl Default for Indicators {
    fn default() -> Self {
        Self {
            water: [70, 30, 50],
            energy: [60, 40, 80],
            bio: [65, 75, 45],
        }
    }
}

/// Errors raised by crisis room commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrisisError {
    /// Choices can only be committed during the decision phase.
    #[error("choices can only be committed during the decision phase")]
    NotDeciding,
    /// The choice does not belong to the submitting role.
    #[error("choice is reserved for another role")]
    WrongRole,
    /// The submitting player holds no role.
    #[error("a role is required to take part in the crisis")]
    NoRole,
}

/// Shared crisis-room state for one session.
#[derive(Debug, Clone)]
pub struct CrisisRoom {
    /// Current phase.
    pub phase: CrisisPhase,
    /// Epoch milliseconds when the current phase started, once running.
    pub phase_started_ms: Option<i64>,
    /// Advisory phase duration, shared so every client renders the same timer.
    pub phase_duration_ms: i64,
    /// Committed choices, keyed by role (last write per role wins).
    pub choices: IndexMap<Role, CrisisChoice>,
    /// Global score, computed exactly once on entering the result phase.
    pub global_score: Option<f64>,
    /// Diagnostic gauges, fixed for the scenario.
    pub indicators: Indicators,
}

impl Default for CrisisRoom {
    fn default() -> Self {
        Self {
            phase: CrisisPhase::Diagnostic,
            phase_started_ms: None,
            phase_duration_ms: PHASE_DURATION_MS,
            choices: IndexMap::new(),
            global_score: None,
            indicators: Indicators::default(),
        }
    }
}

impl CrisisRoom {
    /// Start the phase clock if it has not been started yet (create-if-absent).
    pub fn ensure_started(&mut self, now_ms: i64) -> bool {
        if self.phase_started_ms.is_some() {
            return false;
        }
        self.phase_started_ms = Some(now_ms);
        true
    }

    /// Commit a role's decision during the decision phase.
    ///
    /// Re-submitting overwrites the role's previous choice; the last decision
    /// before the phase advances is the one scored.
    pub fn submit_choice(
        &mut self,
        role: Option<Role>,
        choice: CrisisChoice,
    ) -> Result<(), CrisisError> {
        let role = role.ok_or(CrisisError::NoRole)?;
        if self.phase != CrisisPhase::Decision {
            return Err(CrisisError::NotDeciding);
        }
        if choice.role() != role {
            return Err(CrisisError::WrongRole);
        }

        self.choices.insert(role, choice);
        Ok(())
    }

    /// Advance to the next phase, restarting the shared clock.
    ///
    /// Entering the result phase computes the global score exactly once;
    /// advancing while already in the result phase is a no-op.
    pub fn advance(&mut self, now_ms: i64) -> CrisisPhase {
        let next = self.phase.next();
        if next != self.phase {
            self.phase = next;
            self.phase_started_ms = Some(now_ms);
        }

        if self.phase == CrisisPhase::Result && self.global_score.is_none() {
            self.global_score = Some(compute_score(&self.choices));
        }

        self.phase
    }
}

/// Aggregate the committed choices into the normalized global score.
///
/// Sums the per-choice water/energy/bio deltas, then maps the raw total into
/// roughly `[-1, 1]` via `(water + energy + bio + 30) / 60`.
pub fn compute_score(choices: &IndexMap<Role, CrisisChoice>) -> f64 {
    let mut water = 0i32;
    let mut energy = 0i32;
    let mut bio = 0i32;

    for choice in choices.values() {
        let (dw, de, db) = choice.deltas();
        water += dw;
        energy += de;
        bio += db;
    }

    f64::from(water + energy + bio + 30) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(entries: &[(Role, CrisisChoice)]) -> IndexMap<Role, CrisisChoice> {
        entries.iter().copied().collect()
    }

    #[test]
    fn no_choices_scores_one_half() {
        assert!((compute_score(&IndexMap::new()) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn best_case_combo_scores_high() {
        // +10 -5 | +3 +7 | +10 -3 => water 13, energy -1, bio 10 => 52/60.
        let score = compute_score(&choices(&[
            (Role::Hydrologist, CrisisChoice::PurifierEau),
            (Role::Energetician, CrisisChoice::StabiliserReseau),
            (Role::Biologist, CrisisChoice::RenforcerBiodiversite),
        ]));
        assert!((score - 52.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn conflicting_combo_scores_low() {
        // water -5-5 = -10, energy 5+10-5 = 10, bio -5-7+7 = -5 => 25/60.
        let score = compute_score(&choices(&[
            (Role::Hydrologist, CrisisChoice::DistribuerRapide),
            (Role::Energetician, CrisisChoice::MaximiserRendement),
            (Role::Biologist, CrisisChoice::CroissanceRapide),
        ]));
        assert!((score - 25.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn choices_only_during_decision_phase() {
        let mut room = CrisisRoom::default();
        assert_eq!(
            room.submit_choice(Some(Role::Hydrologist), CrisisChoice::PurifierEau),
            Err(CrisisError::NotDeciding)
        );

        room.advance(0);
        room.submit_choice(Some(Role::Hydrologist), CrisisChoice::PurifierEau)
            .unwrap();

        assert_eq!(
            room.submit_choice(Some(Role::Hydrologist), CrisisChoice::MaximiserRendement),
            Err(CrisisError::WrongRole)
        );
        assert_eq!(
            room.submit_choice(None, CrisisChoice::PurifierEau),
            Err(CrisisError::NoRole)
        );
    }

    #[test]
    fn resubmitting_overwrites_the_previous_choice() {
        let mut room = CrisisRoom::default();
        room.advance(0);
        room.submit_choice(Some(Role::Hydrologist), CrisisChoice::PurifierEau)
            .unwrap();
        room.submit_choice(Some(Role::Hydrologist), CrisisChoice::FermerCircuits)
            .unwrap();
        assert_eq!(
            room.choices.get(&Role::Hydrologist),
            Some(&CrisisChoice::FermerCircuits)
        );
    }

    #[test]
    fn score_computed_once_on_entering_result() {
        let mut room = CrisisRoom::default();
        room.ensure_started(1_000);
        assert!(!room.ensure_started(2_000));

        assert_eq!(room.advance(2_000), CrisisPhase::Decision);
        room.submit_choice(Some(Role::Biologist), CrisisChoice::FiltrerToxines)
            .unwrap();

        assert_eq!(room.advance(3_000), CrisisPhase::Result);
        let score = room.global_score.expect("score computed");
        // water 5, energy -3, bio 5 => 37/60.
        assert!((score - 37.0 / 60.0).abs() < 1e-12);

        // Advancing again neither moves the phase nor recomputes the score.
        assert_eq!(room.advance(4_000), CrisisPhase::Result);
        assert_eq!(room.phase_started_ms, Some(3_000));
        assert_eq!(room.global_score, Some(score));
    }
}
