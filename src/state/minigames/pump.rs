//! Hydraulic pump mini-game: a leak on the P3 section must be isolated and
//! the pressure brought back while keeping the pump out of overload.
//!
//! The simulation advances through [`PumpStation::step`], a pure function of
//! the current state and an injected RNG, driven by a per-session ticker
//! task. Stable operating points are exact values so the win condition is
//! reachable; sensor jitter only applies to sections that are drifting.

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Simulation tick interval used by the session ticker.
pub const TICK_INTERVAL_MS: u64 = 1200;

/// Pressure the healthy sections hold when the pump runs normally.
const NOMINAL_PRESSURE: i32 = 80;
/// Setpoint the leaking section must be brought back to.
const LEAK_SETPOINT: i32 = 50;
/// Pump power above which sections overpressure.
const OVERLOAD_POWER: u8 = 90;
/// Pump power at or above which the system crashes.
const CRASH_POWER: u8 = 100;
/// Band in which the pump can feed the isolated leak section.
const REPAIR_BAND: std::ops::RangeInclusive<u8> = 75..=85;
/// Consecutive overload ticks tolerated before the safety drops the pump.
const OVERLOAD_GRACE_TICKS: u8 = 3;
/// Power the overload safety falls back to.
const SAFETY_POWER: u8 = 50;

/// Open/closed state of a section valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValveState {
    /// Water flows through the section.
    Open,
    /// The section is isolated.
    Closed,
}

/// The three section valves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Valve {
    /// Valve on section P1.
    V1,
    /// Valve on section P2.
    V2,
    /// Valve on section P3 (the leaking one).
    V3,
}

/// What a simulation tick observed, so the caller can broadcast and log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing noteworthy; pressures merely drifted.
    Drift,
    /// The overload safety dropped the pump back to 50%.
    SafetyTriggered,
    /// The pump crashed; a restart is required.
    Crashed,
    /// The leak is isolated and pressures are restored.
    Solved,
}

/// Shared pump-station state for one session.
#[derive(Debug, Clone)]
pub struct PumpStation {
    /// Sensor readings for sections P1..P3.
    pub pressure: [i32; 3],
    /// Valve states for V1..V3.
    pub valves: [ValveState; 3],
    /// Pump power in percent, 0-100.
    pub pump_power: u8,
    /// System crashed; controls are refused until a restart.
    pub crashed: bool,
    /// Win condition reached; latched once true.
    pub solved: bool,
    overload_ticks: u8,
}

impl Default for PumpStation {
    fn default() -> Self {
        Self {
            pressure: [0, 0, 0],
            valves: [ValveState::Open; 3],
            pump_power: 0,
            crashed: false,
            solved: false,
            overload_ticks: 0,
        }
    }
}

impl PumpStation {
    /// Toggle a valve. Refused while crashed or already solved.
    pub fn set_valve(&mut self, valve: Valve, state: ValveState) -> bool {
        if self.crashed || self.solved {
            return false;
        }
        self.valves[valve as usize] = state;
        true
    }

    /// Set the pump power, clamped to 0-100. Refused while crashed or solved.
    pub fn set_pump_power(&mut self, power: u8) -> bool {
        if self.crashed || self.solved {
            return false;
        }
        self.pump_power = power.min(100);
        true
    }

    /// Restart after a crash: pump off, crash flag cleared.
    pub fn restart(&mut self) -> bool {
        if !self.crashed {
            return false;
        }
        self.crashed = false;
        self.pump_power = 0;
        self.overload_ticks = 0;
        true
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self, rng: &mut impl Rng) -> TickOutcome {
        if self.crashed || self.solved {
            return TickOutcome::Drift;
        }

        if self.pump_power >= CRASH_POWER {
            self.pressure = [NOMINAL_PRESSURE, NOMINAL_PRESSURE, 0];
            self.pump_power = 0;
            self.crashed = true;
            self.overload_ticks = 0;
            return TickOutcome::Crashed;
        }

        let overload = self.pump_power > OVERLOAD_POWER;
        let mut safety = false;
        if overload {
            self.overload_ticks += 1;
            if self.overload_ticks >= OVERLOAD_GRACE_TICKS {
                self.pump_power = SAFETY_POWER;
                self.overload_ticks = 0;
                safety = true;
            }
        } else {
            self.overload_ticks = 0;
        }

        self.pressure[0] = Self::healthy_section(self.pressure[0], self.valves[0], overload, rng);
        self.pressure[1] = Self::healthy_section(self.pressure[1], self.valves[1], overload, rng);
        self.pressure[2] = self.leak_section(rng);

        if safety {
            return TickOutcome::SafetyTriggered;
        }

        if self.pressure == [NOMINAL_PRESSURE, NOMINAL_PRESSURE, LEAK_SETPOINT] {
            self.solved = true;
            return TickOutcome::Solved;
        }

        TickOutcome::Drift
    }

    /// P1/P2 dynamics: isolated sections bleed off, overloaded ones climb,
    /// otherwise the pump drives them to the exact nominal plateau.
    fn healthy_section(
        pressure: i32,
        valve: ValveState,
        overload: bool,
        rng: &mut impl Rng,
    ) -> i32 {
        match (valve, overload) {
            (ValveState::Closed, _) => jittered(pressure - 3, rng).clamp(0, NOMINAL_PRESSURE),
            (ValveState::Open, true) => (pressure + 3).min(100),
            (ValveState::Open, false) => {
                if pressure >= NOMINAL_PRESSURE {
                    NOMINAL_PRESSURE
                } else {
                    jittered(pressure + 4, rng).clamp(0, NOMINAL_PRESSURE)
                }
            }
        }
    }

    /// P3 dynamics: while the valve is open the leak drains the section;
    /// isolated and fed within the repair band it converges on the setpoint.
    fn leak_section(&self, rng: &mut impl Rng) -> i32 {
        let p3 = self.pressure[2];
        let isolated = self.valves[2] == ValveState::Closed;
        let in_band = REPAIR_BAND.contains(&self.pump_power);

        if isolated && in_band {
            match p3.cmp(&LEAK_SETPOINT) {
                std::cmp::Ordering::Less => (p3 + 4).min(LEAK_SETPOINT),
                std::cmp::Ordering::Greater => (p3 - 3).max(LEAK_SETPOINT),
                std::cmp::Ordering::Equal => LEAK_SETPOINT,
            }
        } else if isolated {
            jittered(p3 - 3, rng).clamp(0, NOMINAL_PRESSURE)
        } else {
            // Open valve: the leak dominates.
            jittered(p3 - 8, rng).clamp(0, NOMINAL_PRESSURE)
        }
    }
}

/// Sensor noise in `[-2, 2]`, applied only to drifting sections.
fn jittered(value: i32, rng: &mut impl Rng) -> i32 {
    value + rng.random_range(-2..=2)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(201)
    }

    #[test]
    fn crash_at_full_power() {
        let mut station = PumpStation::default();
        let mut rng = rng();
        station.set_pump_power(100);

        assert_eq!(station.step(&mut rng), TickOutcome::Crashed);
        assert!(station.crashed);
        assert_eq!(station.pressure, [80, 80, 0]);
        assert_eq!(station.pump_power, 0);

        // Controls are refused until a restart.
        assert!(!station.set_pump_power(50));
        assert!(station.restart());
        assert!(station.set_pump_power(50));
    }

    #[test]
    fn overload_safety_drops_the_pump() {
        let mut station = PumpStation::default();
        let mut rng = rng();
        station.set_pump_power(95);

        assert_eq!(station.step(&mut rng), TickOutcome::Drift);
        assert_eq!(station.step(&mut rng), TickOutcome::Drift);
        assert_eq!(station.step(&mut rng), TickOutcome::SafetyTriggered);
        assert_eq!(station.pump_power, 50);
    }

    #[test]
    fn open_leak_drains_p3() {
        let mut station = PumpStation::default();
        station.pressure = [80, 80, 80];
        station.set_pump_power(80);
        let mut rng = rng();

        for _ in 0..4 {
            station.step(&mut rng);
        }
        assert!(station.pressure[2] < 80);
        assert_eq!(station.pressure[0], 80);
        assert_eq!(station.pressure[1], 80);
    }

    #[test]
    fn isolating_the_leak_in_band_solves_the_puzzle() {
        let mut station = PumpStation::default();
        let mut rng = rng();
        station.set_pump_power(80);
        station.set_valve(Valve::V3, ValveState::Closed);

        let mut outcome = TickOutcome::Drift;
        for _ in 0..60 {
            outcome = station.step(&mut rng);
            if outcome == TickOutcome::Solved {
                break;
            }
        }

        assert_eq!(outcome, TickOutcome::Solved);
        assert!(station.solved);
        assert_eq!(station.pressure, [80, 80, 50]);

        // Solved stations no longer react.
        assert!(!station.set_pump_power(10));
        assert_eq!(station.step(&mut rng), TickOutcome::Drift);
    }

    #[test]
    fn out_of_band_pump_cannot_repair_p3() {
        let mut station = PumpStation::default();
        let mut rng = rng();
        station.set_pump_power(60);
        station.set_valve(Valve::V3, ValveState::Closed);

        for _ in 0..30 {
            station.step(&mut rng);
        }
        assert!(!station.solved);
        assert!(station.pressure[2] <= 10);
    }
}
