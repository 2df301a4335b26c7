//! One physical reactor unit: a fuel pool, a bounded charge, and the tier
//! transition logic that reshapes both.

use serde::{Deserialize, Serialize};

use crate::energy::{EnergyItem, SlotSink, StagedCollection};
use crate::tiers::{tier_stats, MAX_TIER};
use crate::{
    Constants, Counters, Event, EventEnvelope, EventLevel, ItemId, PowerContent, RejectReason,
    SourceId, UnitId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactorUnit {
    pub id: UnitId,
    pub tier: u32,
    /// Invariant: `0 <= charge <= capacity` outside of `advance`.
    pub charge: f32,
    pub capacity: f32,
    pub width: u32,
    pub height: u32,
    /// Charge per second contributed by one size-1 item. Derived from the
    /// slot count: at half-full the unit charges near the baseline rate,
    /// at full occupancy it charges nearly double.
    pub per_item_rate: f32,
    pub items: StagedCollection,
}

impl ReactorUnit {
    pub fn new(id: UnitId, constants: &Constants) -> Self {
        let stats = tier_stats(0);
        let mut unit = ReactorUnit {
            id,
            tier: 0,
            charge: 0.0,
            capacity: stats.capacity,
            width: stats.width,
            height: stats.height,
            per_item_rate: 0.0,
            items: StagedCollection::new(),
        };
        unit.recompute_rate(constants);
        unit
    }

    pub fn total_slots(&self) -> u32 {
        self.width * self.height
    }

    /// True while there is anything in the fuel pool to burn.
    pub fn producing_power(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_power(&self) -> bool {
        self.charge > 0.0
    }

    fn recompute_rate(&mut self, constants: &Constants) {
        self.per_item_rate = constants.baseline_charge_rate / self.total_slots() as f32 * 2.0;
    }

    /// Validates and admits one consumable item into the fuel pool.
    ///
    /// Sources not in the producible-energy table are refused — the caller
    /// must hand the item back to the external inventory, never absorb it
    /// with zero effect.
    pub fn accept_fuel(
        &mut self,
        source: &SourceId,
        size: u32,
        content: &PowerContent,
        counters: &mut Counters,
    ) -> Result<ItemId, RejectReason> {
        let Some(energy) = content.energy_value(source) else {
            return Err(RejectReason::UnsupportedSource);
        };
        if self.items.occupied_units() + size > self.total_slots() {
            return Err(RejectReason::NoRoom);
        }

        let id = ItemId(format!("item_{:06}", counters.next_item_id));
        counters.next_item_id += 1;
        self.items.add(EnergyItem {
            id: id.clone(),
            source: source.clone(),
            initial_energy: energy,
            remaining_energy: energy,
            size,
        })?;
        Ok(id)
    }

    /// Advance the fuel pool by `dt` seconds and fold the produced energy
    /// into the charge.
    ///
    /// Order of operations:
    /// 1. Skip entirely if the pool is empty or the unit is already full.
    /// 2. Draw `min(remaining, size * budget)` from each item in sequence
    ///    order, staging any item that hits zero.
    /// 3. Commit staged removals against the sink — after the loop, never
    ///    during it.
    /// 4. Clamp the new charge to capacity.
    ///
    /// Returns the energy produced this tick.
    pub fn advance(
        &mut self,
        dt: f32,
        constants: &Constants,
        sink: &mut dyn SlotSink,
        tick: u64,
        counters: &mut Counters,
        events: &mut Vec<EventEnvelope>,
        event_level: EventLevel,
    ) -> f32 {
        if !self.producing_power() {
            return 0.0;
        }

        let deficit = self.capacity - self.charge;
        if deficit <= constants.minimal_power_value {
            return 0.0;
        }

        let budget_per_item = (self.per_item_rate * dt).min(deficit);
        if budget_per_item <= 0.0 {
            return 0.0;
        }

        let mut produced = 0.0_f32;
        for idx in 0..self.items.len() {
            let Some(item) = self.items.get_mut(idx) else {
                break;
            };
            let draw = item
                .remaining_energy
                .min(item.size as f32 * budget_per_item);
            item.remaining_energy -= draw;
            produced += draw;

            if item.consumed() {
                let depleted = item.id.clone();
                self.items.stage_for_removal(&depleted);
                events.push(crate::emit(
                    counters,
                    tick,
                    Event::ItemDepleted {
                        unit: self.id.clone(),
                        item: depleted,
                    },
                ));
            }
        }

        self.items.commit_removals(sink);
        self.charge = (self.charge + produced).min(self.capacity);

        if event_level == EventLevel::Debug && produced > 0.0 {
            events.push(crate::emit(
                counters,
                tick,
                Event::PowerProduced {
                    unit: self.id.clone(),
                    amount: produced,
                },
            ));
        }

        produced
    }

    /// Battery-style discharge bounded by a maximum instantaneous rate.
    /// Returns the amount actually removed from the charge.
    pub fn drain(&mut self, rate: f32, requested: f32, dt: f32, minimal: f32) -> f32 {
        if requested < minimal || !self.has_power() {
            return 0.0;
        }

        let amount = requested.min(rate * dt);
        if self.charge > amount {
            self.charge -= amount;
            amount
        } else {
            // About to be fully drained: take what's left.
            let remainder = self.charge;
            self.charge = 0.0;
            remainder
        }
    }

    /// Applies a booster tier change. Returns false (no state mutated) when
    /// the tier is out of range or already current.
    ///
    /// Shrinking may leave more occupied slot units than the new layout
    /// holds; the most-depleted items are evicted until the rest fit.
    pub fn set_tier(
        &mut self,
        new_tier: u32,
        constants: &Constants,
        sink: &mut dyn SlotSink,
        tick: u64,
        counters: &mut Counters,
        events: &mut Vec<EventEnvelope>,
    ) -> bool {
        let mut evicted = Vec::new();
        if !self.apply_tier(new_tier, constants, sink, false, &mut evicted) {
            return false;
        }

        for item in evicted {
            events.push(crate::emit(
                counters,
                tick,
                Event::ItemEvicted {
                    unit: self.id.clone(),
                    item: item.id,
                    size: item.size,
                },
            ));
        }
        events.push(crate::emit(
            counters,
            tick,
            Event::TierChanged {
                unit: self.id.clone(),
                tier: new_tier,
            },
        ));
        true
    }

    /// Tier restore during load: capacity and layout only. The saved charge
    /// and item set are authoritative, so no clamping or eviction happens.
    pub(crate) fn set_tier_loading(
        &mut self,
        new_tier: u32,
        constants: &Constants,
        sink: &mut dyn SlotSink,
    ) -> bool {
        self.apply_tier(new_tier, constants, sink, true, &mut Vec::new())
    }

    fn apply_tier(
        &mut self,
        new_tier: u32,
        constants: &Constants,
        sink: &mut dyn SlotSink,
        loading: bool,
        evicted: &mut Vec<EnergyItem>,
    ) -> bool {
        if new_tier > MAX_TIER || new_tier == self.tier {
            return false;
        }

        let stats = tier_stats(new_tier);
        self.capacity = stats.capacity;

        if !loading {
            self.charge = self.charge.min(self.capacity);

            if new_tier < self.tier {
                while self.items.occupied_units() > stats.total_slots() {
                    let Some(candidate) = self.items.candidate_for_removal() else {
                        break;
                    };
                    let id = candidate.id.clone();
                    if let Some(item) = self.items.remove_now(&id, sink) {
                        evicted.push(item);
                    }
                }
            }
        }

        self.width = stats.width;
        self.height = stats.height;
        sink.resize(self.width, self.height);
        self.recompute_rate(constants);
        self.tier = new_tier;
        true
    }
}
