//! Format-agnostic save/load records for reactor units.
//!
//! The container format (file layout, framing) is the caller's concern;
//! these records are plain serde values. Saves read post-commit state
//! only — never mid-iteration — and loads fully rebuild the fuel pool
//! before any tick runs against the restored unit.

use serde::{Deserialize, Serialize};

use crate::energy::SlotSink;
use crate::reactor::ReactorUnit;
use crate::{Constants, Counters, PowerContent, SourceId, UnitId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub source: SourceId,
    pub remaining_energy: f32,
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactorRecord {
    pub unit: String,
    pub charge: f32,
    pub tier: u32,
    pub items: Vec<ItemRecord>,
}

/// Snapshots one unit. Call only between ticks, when the staged set is
/// empty and the charge invariant holds.
pub fn save_reactor(unit: &ReactorUnit) -> ReactorRecord {
    ReactorRecord {
        unit: unit.id.0.clone(),
        charge: unit.charge,
        tier: unit.tier,
        items: unit
            .items
            .iter()
            .map(|item| ItemRecord {
                source: item.source.clone(),
                remaining_energy: item.remaining_energy,
                size: item.size,
            })
            .collect(),
    }
}

/// Rebuilds a unit from a record.
///
/// Restore order matters: tier first (capacity and slot layout), then
/// charge clamped to the restored capacity, then each saved item replayed
/// through the same insertion path used at runtime — so rejection rules
/// apply identically. Items that no longer pass (unknown source, no room)
/// are handed to the sink instead of silently dropped.
pub fn load_reactor(
    record: &ReactorRecord,
    content: &PowerContent,
    constants: &Constants,
    sink: &mut dyn SlotSink,
    counters: &mut Counters,
) -> ReactorUnit {
    let mut unit = ReactorUnit::new(UnitId(record.unit.clone()), constants);

    // Out-of-range saved tiers are refused, leaving the tier-0 layout.
    unit.set_tier_loading(record.tier, constants, sink);
    unit.charge = record.charge.clamp(0.0, unit.capacity);

    for item in &record.items {
        match unit.accept_fuel(&item.source, item.size, content, counters) {
            Ok(id) => {
                if let Some(restored) = unit.items.find_mut(&id) {
                    restored.remaining_energy =
                        item.remaining_energy.clamp(0.0, restored.initial_energy);
                }
            }
            Err(_) => sink.reject(&item.source, item.size),
        }
    }

    unit
}
