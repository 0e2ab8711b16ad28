//! Wire types for the crisis decision room.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::session::RoleDto,
    state::{
        crisis::{CrisisChoice, CrisisPhase, CrisisRoom, Indicators},
        session::Role,
    },
};

/// One selectable decision card.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChoiceCard {
    /// Choice identifier submitted back by the client.
    pub id: CrisisChoice,
    /// Card title.
    pub label: String,
    /// One-line trade-off summary.
    pub desc: String,
}

impl From<CrisisChoice> for ChoiceCard {
    fn from(choice: CrisisChoice) -> Self {
        let (label, desc) = display_strings(choice);
        Self {
            id: choice,
            label: label.to_string(),
            desc: desc.to_string(),
        }
    }
}

/// French display strings for a decision card.
fn display_strings(choice: CrisisChoice) -> (&'static str, &'static str) {
    match choice {
        CrisisChoice::PurifierEau => ("Purifier l'eau", "+eau, -énergie"),
        CrisisChoice::DistribuerRapide => ("Distribution rapide", "+énergie, -biosphère"),
        CrisisChoice::FermerCircuits => ("Fermer circuits", "+sécurité, -souplesse"),
        CrisisChoice::StabiliserReseau => ("Stabiliser réseau", "+fiabilité, -production"),
        CrisisChoice::MaximiserRendement => ("Maximiser rendement", "+énergie, +pollution"),
        CrisisChoice::RedirigerVersBiosphere => ("Rediriger vers biosphère", "+coop, -autonomie"),
        CrisisChoice::RenforcerBiodiversite => ("Renforcer biodiversité", "+résilience, -rendement"),
        CrisisChoice::CroissanceRapide => ("Croissance rapide", "+production, +consommation"),
        CrisisChoice::FiltrerToxines => ("Filtrer toxines", "+pureté, -vitesse"),
    }
}

/// Crisis-room snapshot, optionally personalized for one player's role.
#[derive(Debug, Serialize, ToSchema)]
pub struct CrisisSnapshot {
    /// Current phase.
    pub phase: CrisisPhase,
    /// Epoch milliseconds when the current phase started.
    pub phase_started_ms: Option<i64>,
    /// Advisory phase duration in milliseconds.
    pub phase_duration_ms: i64,
    /// Diagnostic gauges for the scenario.
    pub indicators: Indicators,
    /// Roles that have committed a decision so far.
    pub committed_roles: Vec<RoleDto>,
    /// Decision cards for the requester's role, during the decision phase.
    pub options: Vec<ChoiceCard>,
    /// Global score, present once the result phase has been entered.
    pub global_score: Option<f64>,
}

impl CrisisSnapshot {
    /// Project the crisis room for a player holding `role` (if any).
    pub fn project(room: &CrisisRoom, role: Option<Role>) -> Self {
        let options = match (room.phase, role) {
            (CrisisPhase::Decision, Some(role)) => CrisisChoice::options_for(role)
                .into_iter()
                .map(Into::into)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            phase: room.phase,
            phase_started_ms: room.phase_started_ms,
            phase_duration_ms: room.phase_duration_ms,
            indicators: room.indicators,
            committed_roles: room.choices.keys().copied().map(Into::into).collect(),
            options,
            global_score: room.global_score,
        }
    }
}

/// Query parameters for the crisis read endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CrisisQuery {
    /// Player whose role personalizes the snapshot, if any.
    pub player_id: Option<Uuid>,
}

/// Payload committing one decision.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CrisisChoiceRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Decision to commit for the player's role.
    pub choice: CrisisChoice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_only_during_decision_phase_with_a_role() {
        let mut room = CrisisRoom::default();

        let view = CrisisSnapshot::project(&room, Some(Role::Hydrologist));
        assert!(view.options.is_empty());

        room.advance(0);
        let view = CrisisSnapshot::project(&room, Some(Role::Hydrologist));
        assert_eq!(view.options.len(), 3);
        assert_eq!(view.options[0].label, "Purifier l'eau");

        let view = CrisisSnapshot::project(&room, None);
        assert!(view.options.is_empty());
    }

    #[test]
    fn committed_roles_track_submissions() {
        let mut room = CrisisRoom::default();
        room.advance(0);
        room.submit_choice(Some(Role::Biologist), CrisisChoice::FiltrerToxines)
            .unwrap();

        let view = CrisisSnapshot::project(&room, None);
        assert_eq!(view.committed_roles, vec![RoleDto::Biologist]);
        assert!(view.global_score.is_none());
    }
}
