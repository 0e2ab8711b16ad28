//! Energy circuit mini-game: an ohmic model over four modules fed by a
//! shared voltage rail. Stabilize the grid at exactly 9 kW without tripping
//! the overload blackout.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Target total power, in kW.
const TARGET_TOTAL_KW: f64 = 9.0;
/// Total power above which the grid blacks out, in kW.
const OVERLOAD_KW: f64 = 10.0;
/// Minimum power each critical module must receive when solved, in kW.
const CRITICAL_MIN_KW: f64 = 3.0;
/// Journal entries kept per board, newest first.
const JOURNAL_CAP: usize = 50;

/// The four consumers hanging off the station's power rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Station heating, first priority.
    Heat,
    /// Water pump, second priority.
    Pump,
    /// Greenhouse lighting.
    Serre,
    /// Laboratory equipment.
    Lab,
}

impl ModuleKind {
    /// All modules in display order.
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Heat,
        ModuleKind::Pump,
        ModuleKind::Serre,
        ModuleKind::Lab,
    ];
}

/// One consumer on the rail.
#[derive(Debug, Clone, Copy)]
pub struct EnergyModule {
    /// Resistance in ohms, clamped to `[1, 9]`.
    pub resistance: f64,
    /// Whether the module is wired to the rail.
    pub connected: bool,
}

impl EnergyModule {
    fn new(connected: bool) -> Self {
        Self {
            resistance: 3.0,
            connected,
        }
    }
}

/// Partial reconfiguration of one module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleChange {
    /// New resistance, if changed.
    pub resistance: Option<f64>,
    /// New connection state, if changed.
    pub connected: Option<bool>,
}

/// Shared energy-circuit state for one session.
#[derive(Debug, Clone)]
pub struct EnergyBoard {
    /// Rail voltage in volts, clamped to `[0, 3]`.
    pub voltage: f64,
    /// Consumers keyed by module.
    pub modules: IndexMap<ModuleKind, EnergyModule>,
    /// Last computed per-module power, in kW rounded to 0.1.
    pub power: IndexMap<ModuleKind, f64>,
    /// Last computed total power, in kW rounded to 0.1.
    pub total: f64,
    /// Grid is down; controls are refused until a restart.
    pub blackout: bool,
    /// Win condition reached; latched once true.
    pub solved: bool,
    /// Bounded activity journal, newest first.
    pub journal: Vec<String>,
}

impl Default for EnergyBoard {
    fn default() -> Self {
        let modules: IndexMap<ModuleKind, EnergyModule> = [
            (ModuleKind::Heat, EnergyModule::new(true)),
            (ModuleKind::Pump, EnergyModule::new(true)),
            (ModuleKind::Serre, EnergyModule::new(false)),
            (ModuleKind::Lab, EnergyModule::new(false)),
        ]
        .into_iter()
        .collect();

        let power = ModuleKind::ALL.iter().map(|kind| (*kind, 0.0)).collect();

        // The station starts dark: the crew's first task is to bring the
        // grid back up.
        Self {
            voltage: 0.0,
            modules,
            power,
            total: 0.0,
            blackout: true,
            solved: false,
            journal: Vec::new(),
        }
    }
}

impl EnergyBoard {
    /// Apply a reconfiguration: optional new rail voltage plus any number of
    /// per-module changes. Returns `true` when this call solved the puzzle.
    ///
    /// Touching the controls clears a blackout (the restart switch is the
    /// voltage slider in the original panel, so any interaction revives the
    /// grid), then the board recomputes powers and re-evaluates overload and
    /// win conditions.
    pub fn apply_config(
        &mut self,
        voltage: Option<f64>,
        changes: &IndexMap<ModuleKind, ModuleChange>,
        actor: &str,
    ) -> bool {
        if self.solved {
            return false;
        }

        if let Some(v) = voltage {
            self.voltage = v.clamp(0.0, 3.0);
        }
        for (kind, change) in changes {
            let module = self.modules.get_mut(kind).expect("all kinds pre-seeded");
            if let Some(r) = change.resistance {
                module.resistance = r.clamp(1.0, 9.0);
            }
            if let Some(connected) = change.connected {
                module.connected = connected;
            }
        }

        self.blackout = false;
        self.recompute();
        self.push_log(format!(
            "{actor}: config modifiée (V={:.1}V, total={} kW)",
            self.voltage, self.total
        ));

        if self.total > OVERLOAD_KW {
            self.trip_blackout();
            return false;
        }

        if !self.solved && self.win_condition() {
            self.solved = true;
            self.push_log("Succès : réseau énergétique stabilisé à 9 kW".to_string());
            return true;
        }

        false
    }

    /// Bring the grid back up after a blackout without touching the config.
    pub fn restart(&mut self) {
        if !self.blackout {
            return;
        }
        self.blackout = false;
        self.push_log("Remise en marche : le réseau a été relancé".to_string());
    }

    /// Recompute per-module powers (`P = V² / R`) and the rounded total.
    fn recompute(&mut self) {
        let mut total = 0.0;
        for (kind, module) in &self.modules {
            let power = if module.connected {
                round_tenth(self.voltage * self.voltage / module.resistance.max(1.0))
            } else {
                0.0
            };
            self.power[kind] = power;
            total += power;
        }
        self.total = round_tenth(total);
    }

    fn win_condition(&self) -> bool {
        let at = |kind: ModuleKind| self.power.get(&kind).copied().unwrap_or(0.0);
        tenths(self.total) == tenths(TARGET_TOTAL_KW)
            && at(ModuleKind::Heat) >= CRITICAL_MIN_KW
            && at(ModuleKind::Pump) >= CRITICAL_MIN_KW
            && (at(ModuleKind::Serre) >= CRITICAL_MIN_KW || at(ModuleKind::Lab) >= CRITICAL_MIN_KW)
    }

    fn trip_blackout(&mut self) {
        for power in self.power.values_mut() {
            *power = 0.0;
        }
        self.total = 0.0;
        self.voltage = 0.0;
        self.blackout = true;
        self.push_log("BLACKOUT : surcharge détectée, redémarrage nécessaire".to_string());
    }

    fn push_log(&mut self, line: String) {
        self.journal.insert(0, line);
        self.journal.truncate(JOURNAL_CAP);
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(resistance: Option<f64>, connected: Option<bool>) -> ModuleChange {
        ModuleChange {
            resistance,
            connected,
        }
    }

    fn set_voltage(board: &mut EnergyBoard, voltage: f64) -> bool {
        board.apply_config(Some(voltage), &IndexMap::new(), "test")
    }

    #[test]
    fn starts_dark() {
        let board = EnergyBoard::default();
        assert!(board.blackout);
        assert!(!board.solved);
        assert_eq!(board.total, 0.0);
    }

    #[test]
    fn ohmic_power_is_v_squared_over_r() {
        let mut board = EnergyBoard::default();
        set_voltage(&mut board, 3.0);
        // heat and pump connected at R=3: each 9/3 = 3.0 kW.
        assert_eq!(board.power[&ModuleKind::Heat], 3.0);
        assert_eq!(board.power[&ModuleKind::Pump], 3.0);
        assert_eq!(board.power[&ModuleKind::Serre], 0.0);
        assert_eq!(board.total, 6.0);
        assert!(!board.blackout);
    }

    #[test]
    fn connecting_the_greenhouse_solves_at_nine_kw() {
        let mut board = EnergyBoard::default();
        set_voltage(&mut board, 3.0);

        let changes: IndexMap<_, _> =
            [(ModuleKind::Serre, change(None, Some(true)))].into_iter().collect();
        let solved = board.apply_config(None, &changes, "Biologiste");

        assert!(solved);
        assert!(board.solved);
        assert_eq!(board.total, 9.0);
        assert!(board.journal.iter().any(|l| l.contains("Succès")));
    }

    #[test]
    fn overload_trips_a_blackout() {
        let mut board = EnergyBoard::default();
        let changes: IndexMap<_, _> = [
            (ModuleKind::Serre, change(None, Some(true))),
            (ModuleKind::Lab, change(None, Some(true))),
        ]
        .into_iter()
        .collect();
        // Four modules at R=3 under 3 V: 12 kW > 10 kW.
        let solved = board.apply_config(Some(3.0), &changes, "test");

        assert!(!solved);
        assert!(board.blackout);
        assert_eq!(board.total, 0.0);
        assert_eq!(board.voltage, 0.0);

        board.restart();
        assert!(!board.blackout);
    }

    #[test]
    fn nine_kw_without_a_third_module_is_not_solved() {
        let mut board = EnergyBoard::default();
        // heat R=2 and pump R=2 at 3 V: 4.5 + 4.5 = 9.0 kW but no third module.
        let changes: IndexMap<_, _> = [
            (ModuleKind::Heat, change(Some(2.0), None)),
            (ModuleKind::Pump, change(Some(2.0), None)),
        ]
        .into_iter()
        .collect();
        let solved = board.apply_config(Some(3.0), &changes, "test");

        assert!(!solved);
        assert_eq!(board.total, 9.0);
        assert!(!board.solved);
    }

    #[test]
    fn inputs_are_clamped() {
        let mut board = EnergyBoard::default();
        // Disconnect the pump so heat alone (9/1 = 9 kW) stays under the
        // overload threshold and the clamped values survive.
        let changes: IndexMap<_, _> = [
            (ModuleKind::Heat, change(Some(0.2), None)),
            (ModuleKind::Pump, change(None, Some(false))),
        ]
        .into_iter()
        .collect();
        board.apply_config(Some(99.0), &changes, "test");

        assert!(!board.blackout);
        assert_eq!(board.voltage, 3.0);
        assert_eq!(board.modules[&ModuleKind::Heat].resistance, 1.0);
    }

    #[test]
    fn solved_board_ignores_further_config() {
        let mut board = EnergyBoard::default();
        set_voltage(&mut board, 3.0);
        let changes: IndexMap<_, _> =
            [(ModuleKind::Serre, change(None, Some(true)))].into_iter().collect();
        board.apply_config(None, &changes, "test");
        assert!(board.solved);

        assert!(!set_voltage(&mut board, 0.0));
        assert_eq!(board.voltage, 3.0);
    }
}
