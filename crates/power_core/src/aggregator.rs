//! Aggregate energy queries over every charger-capable unit on a vessel.

use serde::{Deserialize, Serialize};

use crate::reactor::ReactorUnit;
use crate::Constants;

/// Stateless over the live unit set at query time; only cached
/// last-computed totals for display are held here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeAggregator {
    pub last_reserve: f32,
    pub last_capacity: f32,
    producing: bool,
}

impl ChargeAggregator {
    pub fn new() -> Self {
        ChargeAggregator::default()
    }

    /// Sum of charge across every registered unit.
    pub fn total_reserve(units: &[ReactorUnit]) -> f32 {
        units.iter().map(|unit| unit.charge).sum()
    }

    /// Refreshes the cached telemetry. Runs once per tick for every unit,
    /// whether or not a drain request arrives — display state must not go
    /// stale when drains short-circuit.
    pub fn refresh_telemetry(&mut self, units: &[ReactorUnit]) {
        let mut reserve = 0.0_f32;
        let mut capacity = 0.0_f32;
        let mut producing = false;

        for unit in units {
            reserve += unit.charge;
            capacity += unit.capacity;
            producing |= unit.producing_power();
        }

        self.last_reserve = reserve;
        self.last_capacity = capacity;
        self.producing = producing;
    }

    /// Drains up to `requested` from the units in registration order,
    /// stopping early once the request is satisfied. Returns the total
    /// actually removed.
    pub fn drain_reserves(
        units: &mut [ReactorUnit],
        requested: f32,
        dt: f32,
        constants: &Constants,
    ) -> f32 {
        let mut drained = 0.0_f32;
        for unit in units {
            if requested - drained < constants.minimal_power_value {
                break;
            }
            drained += unit.drain(
                constants.battery_drain_rate,
                requested - drained,
                dt,
                constants.minimal_power_value,
            );
        }
        drained
    }

    /// True if any unit reported active production at the last telemetry
    /// refresh. Display only — never used for aggregation correctness.
    pub fn is_producing(&self) -> bool {
        self.producing
    }
}
