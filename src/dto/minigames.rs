//! Wire types for the energy and pump mini-games.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::minigames::{
    energy::{EnergyBoard, ModuleChange, ModuleKind},
    pump::{PumpStation, Valve, ValveState},
};

/// One consumer on the energy rail, with its last computed power draw.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct EnergyModuleSummary {
    /// Which consumer this entry describes.
    pub module: ModuleKind,
    /// Resistance in ohms.
    pub resistance: f64,
    /// Whether the module is wired to the rail.
    pub connected: bool,
    /// Last computed power in kW.
    pub power: f64,
}

/// Energy-circuit snapshot.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct EnergySnapshot {
    /// Rail voltage in volts.
    pub voltage: f64,
    /// Per-module state and power, in display order.
    pub modules: Vec<EnergyModuleSummary>,
    /// Total power in kW.
    pub total: f64,
    /// Grid is down; controls need a restart.
    pub blackout: bool,
    /// Win condition reached.
    pub solved: bool,
    /// Activity journal, newest first.
    pub journal: Vec<String>,
}

impl From<&EnergyBoard> for EnergySnapshot {
    fn from(board: &EnergyBoard) -> Self {
        let modules = board
            .modules
            .iter()
            .map(|(kind, module)| EnergyModuleSummary {
                module: *kind,
                resistance: module.resistance,
                connected: module.connected,
                power: board.power.get(kind).copied().unwrap_or(0.0),
            })
            .collect();

        Self {
            voltage: board.voltage,
            modules,
            total: board.total,
            blackout: board.blackout,
            solved: board.solved,
            journal: board.journal.clone(),
        }
    }
}

/// Partial reconfiguration of one module in a config request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnergyModuleInput {
    /// Which consumer to change.
    pub module: ModuleKind,
    /// New resistance in ohms, if changed.
    #[serde(default)]
    pub resistance: Option<f64>,
    /// New connection state, if changed.
    #[serde(default)]
    pub connected: Option<bool>,
}

/// Payload reconfiguring the energy circuit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnergyConfigRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// New rail voltage, if changed.
    #[serde(default)]
    pub voltage: Option<f64>,
    /// Per-module changes; later entries win on duplicates.
    #[serde(default)]
    pub modules: Vec<EnergyModuleInput>,
}

impl EnergyConfigRequest {
    /// Collapse the module list into the per-module change map the board applies.
    pub fn module_changes(&self) -> IndexMap<ModuleKind, ModuleChange> {
        let mut changes: IndexMap<ModuleKind, ModuleChange> = IndexMap::new();
        for input in &self.modules {
            let entry = changes.entry(input.module).or_default();
            if input.resistance.is_some() {
                entry.resistance = input.resistance;
            }
            if input.connected.is_some() {
                entry.connected = input.connected;
            }
        }
        changes
    }
}

/// Pump-station snapshot.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PumpSnapshot {
    /// Sensor readings for sections P1..P3.
    pub pressure: [i32; 3],
    /// Valve states for V1..V3.
    pub valves: [ValveState; 3],
    /// Pump power in percent.
    pub pump_power: u8,
    /// System crashed; controls need a restart.
    pub crashed: bool,
    /// Win condition reached.
    pub solved: bool,
}

impl From<&PumpStation> for PumpSnapshot {
    fn from(station: &PumpStation) -> Self {
        Self {
            pressure: station.pressure,
            valves: station.valves,
            pump_power: station.pump_power,
            crashed: station.crashed,
            solved: station.solved,
        }
    }
}

/// Payload toggling one section valve.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PumpValveRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Which valve to move.
    pub valve: Valve,
    /// Requested position.
    pub state: ValveState,
}

/// Payload setting the pump power.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PumpPowerRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Requested power in percent; values above 100 are clamped.
    pub power: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_changes_merge_duplicate_entries() {
        let request = EnergyConfigRequest {
            player_id: Uuid::new_v4(),
            voltage: Some(2.0),
            modules: vec![
                EnergyModuleInput {
                    module: ModuleKind::Heat,
                    resistance: Some(4.0),
                    connected: None,
                },
                EnergyModuleInput {
                    module: ModuleKind::Heat,
                    resistance: None,
                    connected: Some(false),
                },
            ],
        };

        let changes = request.module_changes();
        assert_eq!(changes.len(), 1);
        let change = &changes[&ModuleKind::Heat];
        assert_eq!(change.resistance, Some(4.0));
        assert_eq!(change.connected, Some(false));
    }

    #[test]
    fn energy_snapshot_mirrors_the_board() {
        let mut board = EnergyBoard::default();
        board.apply_config(Some(3.0), &IndexMap::new(), "test");

        let snapshot = EnergySnapshot::from(&board);
        assert_eq!(snapshot.voltage, 3.0);
        assert_eq!(snapshot.total, 6.0);
        assert_eq!(snapshot.modules.len(), 4);
        assert!(!snapshot.blackout);
        assert!(!snapshot.journal.is_empty());
    }

    #[test]
    fn pump_snapshot_mirrors_the_station() {
        let mut station = PumpStation::default();
        station.set_pump_power(80);
        station.set_valve(Valve::V3, ValveState::Closed);

        let snapshot = PumpSnapshot::from(&station);
        assert_eq!(snapshot.pump_power, 80);
        assert_eq!(snapshot.valves[2], ValveState::Closed);
        assert!(!snapshot.crashed);
    }
}
