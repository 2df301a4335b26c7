//! Type definitions for `power_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::ChargeAggregator;
use crate::reactor::ReactorUnit;
use crate::registry::UpgradeRegistry;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(VesselId);
string_id!(RackId);
string_id!(UnitId);
string_id!(ItemId);
string_id!(SourceId);
string_id!(ModuleId);
string_id!(CommandId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

/// Why an item insertion was refused. Always recoverable — the item is
/// handed back to the external inventory rather than silently absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// An item with the same identity is already in the collection.
    DuplicateIdentity,
    /// The source identity has no entry in the producible-energy table.
    UnsupportedSource,
    /// The external container has no free slot units for an item this size.
    NoRoom,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::DuplicateIdentity => f.write_str("duplicate identity"),
            RejectReason::UnsupportedSource => f.write_str("unsupported source"),
            RejectReason::NoRoom => f.write_str("no room"),
        }
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselState {
    pub id: VesselId,
    pub tick: u64,
    /// Net recharge rating applied by the host power relay. Recomputed
    /// after every scan from the efficiency-family handlers.
    pub power_rating: f32,
    pub racks: HashMap<RackId, ModuleRack>,
    pub units: Vec<ReactorUnit>,
    pub registry: UpgradeRegistry,
    pub aggregator: ChargeAggregator,
    pub counters: Counters,
}

impl VesselState {
    pub fn unit(&self, id: &UnitId) -> Option<&ReactorUnit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn unit_mut(&mut self, id: &UnitId) -> Option<&mut ReactorUnit> {
        self.units.iter_mut().find(|u| &u.id == id)
    }
}

/// One physical bank of upgrade slots. The primary rack is built into the
/// vessel; auxiliary racks are discovered and attached during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRack {
    pub id: RackId,
    pub primary: bool,
    /// Set exactly once, the first time a scan discovers this rack.
    pub attached: bool,
    pub slots: Vec<Option<ModuleId>>,
}

impl ModuleRack {
    pub fn new(id: RackId, primary: bool, slot_count: usize) -> Self {
        ModuleRack {
            id,
            primary,
            attached: primary,
            slots: vec![None; slot_count],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_item_id: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Place an upgrade module into a rack slot. Triggers a scan.
    InsertModule {
        rack: RackId,
        slot: usize,
        module: ModuleId,
    },
    /// Clear a rack slot. Triggers a scan.
    RemoveModule { rack: RackId, slot: usize },
    /// Feed a consumable energy source into a reactor unit.
    InsertFuel {
        unit: UnitId,
        source: SourceId,
        size: u32,
    },
    /// Host power relay requests energy from the shared reserve.
    /// Applied after telemetry refresh, at the end of the tick.
    DrainReserves { requested: f32 },
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A newly discovered auxiliary rack was bound to the vessel.
    RackAttached { rack: RackId },
    /// At least one occupied slot was seen during a scan.
    ModulesChanged { found: Vec<ModuleId> },
    TierChanged { unit: UnitId, tier: u32 },
    PowerRatingChanged { rating: f32 },
    FuelAccepted {
        unit: UnitId,
        item: ItemId,
        source: SourceId,
    },
    FuelRejected {
        unit: UnitId,
        source: SourceId,
        reason: RejectReason,
    },
    ItemDepleted { unit: UnitId, item: ItemId },
    /// An item was pushed out because a tier shrink left too few slots.
    ItemEvicted {
        unit: UnitId,
        item: ItemId,
        size: u32,
    },
    ReserveDrained { requested: f32, drained: f32 },
    /// Aggregation was requested but the registry was never initialized.
    /// Non-fatal: the drain yields zero.
    ManagerUnavailable { vessel: VesselId },
    /// Only emitted at `EventLevel::Debug`.
    PowerProduced { unit: UnitId, amount: f32 },
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerContent {
    pub content_version: String,
    /// Producible-energy table: total energy yielded by one item of each
    /// accepted source. Sources absent from this table are rejected.
    pub energy_values: HashMap<SourceId, f32>,
    /// Engine-efficiency tier → power rating modifier.
    pub efficiency_modifiers: HashMap<u8, f32>,
    pub constants: Constants,
}

impl PowerContent {
    pub fn energy_value(&self, source: &SourceId) -> Option<f32> {
        self.energy_values.get(source).copied().filter(|v| *v > 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Amounts below this are treated as zero power.
    pub minimal_power_value: f32,
    /// Charge per second per item at the tier-0 slot count.
    pub baseline_charge_rate: f32,
    /// Maximum instantaneous discharge rate when draining a unit's charge.
    pub battery_drain_rate: f32,
    /// Base multiplier for the vessel power rating before modifiers.
    pub recharge_penalty: f32,
    /// Hard cap on reactor units attached to one vessel.
    pub max_reactor_units: u32,
}
