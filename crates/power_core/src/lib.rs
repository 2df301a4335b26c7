//! `power_core` — deterministic vessel power simulation tick.
//!
//! No IO, no clocks, no randomness. Time advances only through the `dt`
//! passed to [`tick`].

mod aggregator;
mod energy;
mod engine;
mod handlers;
mod persist;
mod reactor;
mod registry;
mod tiers;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use aggregator::ChargeAggregator;
pub use energy::{EnergyItem, NullSink, SlotSink, StagedCollection};
pub use engine::{scan, tick};
pub use handlers::{HandlerKind, TierSpec, UpgradeHandler};
pub use persist::{load_reactor, save_reactor, ItemRecord, ReactorRecord};
pub use reactor::ReactorUnit;
pub use registry::{RegistrationContext, UpgradeRegistry};
pub use tiers::{tier_stats, TierStats, CAPACITY_BASELINE, MAX_TIER};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
