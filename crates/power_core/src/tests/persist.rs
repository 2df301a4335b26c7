use super::*;
use crate::energy::NullSink;
use crate::persist::{load_reactor, save_reactor};
use crate::reactor::ReactorUnit;
use crate::tiers::tier_stats;

/// Order-insensitive item fingerprint for round-trip comparison.
fn item_set(unit: &ReactorUnit) -> Vec<(String, u32, u32)> {
    let mut items: Vec<(String, u32, u32)> = unit
        .items
        .iter()
        .map(|i| {
            // Remaining energy compared in milli-units to keep Ord.
            (i.source.0.clone(), (i.remaining_energy * 1000.0) as u32, i.size)
        })
        .collect();
    items.sort();
    items
}

fn populated_unit(content: &PowerContent, counters: &mut Counters) -> ReactorUnit {
    let mut unit = ReactorUnit::new(unit_id(), &content.constants);
    let mut events = Vec::new();
    unit.set_tier(2, &content.constants, &mut NullSink, 0, counters, &mut events);
    unit.accept_fuel(&source(FUEL_ALGAE), 1, content, counters)
        .unwrap();
    unit.accept_fuel(&source(FUEL_KELP), 2, content, counters)
        .unwrap();
    unit.charge = 123.4;

    // Partially burn the pool so remaining != initial.
    unit.advance(
        4.0,
        &content.constants,
        &mut NullSink,
        0,
        counters,
        &mut events,
        EventLevel::Normal,
    );
    unit
}

#[test]
fn save_load_round_trip_preserves_charge_tier_and_items() {
    let content = test_content();
    let mut counters = Counters::default();
    let original = populated_unit(&content, &mut counters);

    let record = save_reactor(&original);
    let mut sink = NullSink;
    let restored = load_reactor(&record, &content, &content.constants, &mut sink, &mut counters);

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.tier, original.tier);
    assert!((restored.charge - original.charge).abs() < 1e-4);
    assert_eq!(item_set(&restored), item_set(&original));
    assert_eq!(restored.total_slots(), original.total_slots());
}

#[test]
fn record_survives_json_round_trip() {
    let content = test_content();
    let mut counters = Counters::default();
    let record = save_reactor(&populated_unit(&content, &mut counters));

    let json = serde_json::to_string(&record).unwrap();
    let parsed: ReactorRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.unit, record.unit);
    assert_eq!(parsed.items.len(), record.items.len());
}

#[test]
fn load_clamps_charge_to_restored_capacity() {
    let content = test_content();
    let mut counters = Counters::default();
    let record = ReactorRecord {
        unit: UNIT.to_string(),
        charge: 9999.0,
        tier: 1,
        items: vec![],
    };

    let restored = load_reactor(
        &record,
        &content,
        &content.constants,
        &mut NullSink,
        &mut counters,
    );
    assert_eq!(restored.tier, 1);
    assert!((restored.charge - tier_stats(1).capacity).abs() < f32::EPSILON);
}

#[test]
fn load_refuses_out_of_range_tier() {
    let content = test_content();
    let mut counters = Counters::default();
    let record = ReactorRecord {
        unit: UNIT.to_string(),
        charge: 300.0,
        tier: MAX_TIER + 5,
        items: vec![],
    };

    let restored = load_reactor(
        &record,
        &content,
        &content.constants,
        &mut NullSink,
        &mut counters,
    );
    assert_eq!(restored.tier, 0, "bad tier falls back to baseline layout");
    assert!(
        (restored.charge - tier_stats(0).capacity).abs() < f32::EPSILON,
        "charge clamped against the fallback capacity"
    );
}

#[test]
fn load_applies_runtime_rejection_rules() {
    let content = test_content();
    let mut counters = Counters::default();
    let record = ReactorRecord {
        unit: UNIT.to_string(),
        charge: 0.0,
        tier: 0,
        items: vec![
            ItemRecord {
                source: source(FUEL_ALGAE),
                remaining_energy: 4.0,
                size: 1,
            },
            // This source was removed from the energy table since the save.
            ItemRecord {
                source: source("fuel_retired"),
                remaining_energy: 50.0,
                size: 1,
            },
        ],
    };

    let mut sink = RecordingSink::default();
    let restored = load_reactor(&record, &content, &content.constants, &mut sink, &mut counters);

    assert_eq!(restored.items.len(), 1);
    assert_eq!(sink.rejected, vec![(source("fuel_retired"), 1)]);
    let item = restored.items.iter().next().unwrap();
    assert!((item.remaining_energy - 4.0).abs() < f32::EPSILON);
    assert!((item.initial_energy - 10.0).abs() < f32::EPSILON);
}

#[test]
fn load_rejects_items_that_no_longer_fit() {
    let content = test_content();
    let mut counters = Counters::default();
    // Five size-1 items against a tier-0 grid of four slots.
    let record = ReactorRecord {
        unit: UNIT.to_string(),
        charge: 0.0,
        tier: 0,
        items: (0..5)
            .map(|_| ItemRecord {
                source: source(FUEL_ALGAE),
                remaining_energy: 10.0,
                size: 1,
            })
            .collect(),
    };

    let mut sink = RecordingSink::default();
    let restored = load_reactor(&record, &content, &content.constants, &mut sink, &mut counters);
    assert_eq!(restored.items.len(), 4);
    assert_eq!(sink.rejected.len(), 1);
}
