//! Final narrative outcome derived from the crisis room's global score.

/// Narrative outcome shown once every room has been solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Headline diagnostic for the colony.
    pub message: &'static str,
    /// Short epilogue line shown under the headline.
    pub subtitle: &'static str,
    /// Terminal-style flavour line closing the audit report.
    pub flavor_text: &'static str,
}

/// One band of the score table: applies to every score `>= lower`.
struct Band {
    lower: f64,
    outcome: Outcome,
}

/// Fixed monotonic banding table, highest band first. The final entry is the
/// catch-all for every score below `-0.5`.
const BANDS: &[Band] = &[
    Band {
        lower: 0.8,
        outcome: Outcome {
            message: "Colonie autosuffisante : survie estimée à 200 jours",
            subtitle: "Coordination exemplaire, la mission est un triomphe.",
            flavor_text: "Svalbard 201 transmet : tous les voyants au vert.",
        },
    },
    Band {
        lower: 0.7,
        outcome: Outcome {
            message: "Colonie très stable : survie estimée à 100 jours",
            subtitle: "Excellent travail d'équipe !",
            flavor_text: "Les systèmes vitaux ronronnent, la relève peut venir.",
        },
    },
    Band {
        lower: 0.6,
        outcome: Outcome {
            message: "Colonie stable : survie estimée à 80 jours",
            subtitle: "Beau travail collectif.",
            flavor_text: "Quelques alarmes mineures, rien que l'équipe ne sache gérer.",
        },
    },
    Band {
        lower: 0.5,
        outcome: Outcome {
            message: "Équilibre fragile : survie estimée à 60 jours",
            subtitle: "La station tient, restez attentifs.",
            flavor_text: "Les réserves suffisent, à condition de ne rien casser.",
        },
    },
    Band {
        lower: 0.3,
        outcome: Outcome {
            message: "Système instable : ajustements nécessaires.",
            subtitle: "Les prochains cycles seront décisifs.",
            flavor_text: "Le terminal recommande une révision complète des circuits.",
        },
    },
    Band {
        lower: 0.1,
        outcome: Outcome {
            message: "Déséquilibre marqué : rationnement imposé.",
            subtitle: "La colonie entre en mode économie.",
            flavor_text: "Distribution d'eau et d'énergie réduite de moitié.",
        },
    },
    Band {
        lower: -0.1,
        outcome: Outcome {
            message: "Situation critique : les systèmes vitaux faiblissent.",
            subtitle: "Chaque décision compte désormais.",
            flavor_text: "Le terminal clignote en orange. Ce n'est jamais bon signe.",
        },
    },
    Band {
        lower: -0.5,
        outcome: Outcome {
            message: "Pollution critique : survie compromise.",
            subtitle: "La colonie est en sursis.",
            flavor_text: "Évacuation partielle recommandée par le protocole 201.",
        },
    },
    Band {
        lower: f64::NEG_INFINITY,
        outcome: Outcome {
            message: "Effondrement total du système…",
            subtitle: "Game Over, man ! Game Over !",
            flavor_text: "=== FIN DE TRANSMISSION ===",
        },
    },
];

/// Map a global score to its narrative outcome.
///
/// Pure, deterministic, monotonic step function: the highest band whose lower
/// bound is `<= score` wins. Scores are unbounded even though the crisis room
/// produces values in roughly `[-1, 1]` by construction.
pub fn band(score: f64) -> Outcome {
    BANDS
        .iter()
        .find(|band| score >= band.lower)
        .map(|band| band.outcome)
        // NEG_INFINITY catch-all means this only triggers for NaN scores.
        .unwrap_or(BANDS[BANDS.len() - 1].outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_0_75_lands_in_the_0_7_band() {
        let outcome = band(0.75);
        assert_eq!(
            outcome.message,
            "Colonie très stable : survie estimée à 100 jours"
        );
        assert_eq!(outcome.subtitle, "Excellent travail d'équipe !");
    }

    #[test]
    fn score_minus_0_6_lands_in_the_bottom_band() {
        let outcome = band(-0.6);
        assert_eq!(outcome.message, "Effondrement total du système…");
        assert_eq!(outcome.subtitle, "Game Over, man ! Game Over !");
    }

    #[test]
    fn band_boundaries_are_inclusive_on_the_lower_bound() {
        assert_eq!(band(0.8).message, band(1.5).message);
        assert_eq!(
            band(0.7).message,
            "Colonie très stable : survie estimée à 100 jours"
        );
        assert_eq!(band(0.5).message, "Équilibre fragile : survie estimée à 60 jours");
        assert_eq!(band(-0.5).message, "Pollution critique : survie compromise.");
        assert_ne!(band(-0.500001).message, band(-0.5).message);
    }

    #[test]
    fn banding_is_monotonic() {
        let scores = [-2.0, -0.6, -0.5, -0.1, 0.1, 0.3, 0.5, 0.6, 0.7, 0.8, 2.0];
        let mut last_index = BANDS.len();
        for score in scores {
            let index = BANDS
                .iter()
                .position(|band| score >= band.lower)
                .expect("catch-all band");
            assert!(index <= last_index, "band index regressed at {score}");
            last_index = index;
        }
    }

    #[test]
    fn nan_scores_fall_through_to_the_bottom_band() {
        assert_eq!(band(f64::NAN).message, "Effondrement total du système…");
    }
}
