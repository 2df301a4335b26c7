//! Simulation tick entry point.

use crate::aggregator::ChargeAggregator;
use crate::energy::NullSink;
use crate::tiers::MAX_TIER;
use crate::{
    Command, CommandEnvelope, Event, EventEnvelope, EventLevel, PowerContent, VesselState,
};

/// Advance the vessel by one tick of `dt` seconds.
///
/// Order of operations:
/// 1. Apply commands scheduled for this tick. Module inserts/removes mark
///    the rack set dirty; drain requests are deferred to step 5.
/// 2. Re-scan slots if any module changed, then apply booster tiers and
///    the power rating.
/// 3. Advance every reactor unit (fuel burn, stage-then-commit removal).
/// 4. Refresh aggregator telemetry — unconditionally, once per tick.
/// 5. Apply deferred drain requests against the shared reserve.
/// 6. Increment the tick counter.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut VesselState,
    commands: &[CommandEnvelope],
    content: &PowerContent,
    dt: f32,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    let drains = apply_commands(state, commands, content, &mut events);

    advance_units(state, content, dt, event_level, &mut events);

    state.aggregator.refresh_telemetry(&state.units);

    for requested in drains {
        apply_drain(state, requested, dt, content, &mut events);
    }

    state.tick += 1;
    events
}

/// Re-scan slots on demand (the host calls this on module-change events
/// that bypass the command stream). Returns the events produced.
pub fn scan(state: &mut VesselState, content: &PowerContent) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    run_scan(state, content, &mut events);
    events
}

fn apply_commands(
    state: &mut VesselState,
    commands: &[CommandEnvelope],
    content: &PowerContent,
    events: &mut Vec<EventEnvelope>,
) -> Vec<f32> {
    let current_tick = state.tick;
    let mut racks_dirty = false;
    let mut drains = Vec::new();

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        match &envelope.command {
            Command::InsertModule { rack, slot, module } => {
                if let Some(rack) = state.racks.get_mut(rack) {
                    if let Some(contents) = rack.slots.get_mut(*slot) {
                        if contents.is_none() {
                            *contents = Some(module.clone());
                            racks_dirty = true;
                        }
                    }
                }
            }
            Command::RemoveModule { rack, slot } => {
                if let Some(rack) = state.racks.get_mut(rack) {
                    if let Some(contents) = rack.slots.get_mut(*slot) {
                        if contents.take().is_some() {
                            racks_dirty = true;
                        }
                    }
                }
            }
            Command::InsertFuel { unit, source, size } => {
                insert_fuel(state, unit, source, *size, content, events);
            }
            Command::DrainReserves { requested } => {
                drains.push(*requested);
            }
        }
    }

    if racks_dirty {
        run_scan(state, content, events);
    }
    drains
}

fn insert_fuel(
    state: &mut VesselState,
    unit_id: &crate::UnitId,
    source: &crate::SourceId,
    size: u32,
    content: &PowerContent,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.tick;
    let Some(unit) = state.units.iter_mut().find(|u| &u.id == unit_id) else {
        return;
    };

    match unit.accept_fuel(source, size, content, &mut state.counters) {
        Ok(item) => {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::FuelAccepted {
                    unit: unit_id.clone(),
                    item,
                    source: source.clone(),
                },
            ));
        }
        Err(reason) => {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::FuelRejected {
                    unit: unit_id.clone(),
                    source: source.clone(),
                    reason,
                },
            ));
        }
    }
}

/// Scan, then fan the results out: booster count reshapes every reactor
/// unit, the efficiency tier reshapes the vessel power rating.
fn run_scan(state: &mut VesselState, content: &PowerContent, events: &mut Vec<EventEnvelope>) {
    let current_tick = state.tick;

    // Enumerate auxiliary racks reachable from the vessel, sorted so the
    // scan order is deterministic.
    let mut discovered: Vec<crate::RackId> = state
        .racks
        .values()
        .filter(|rack| !rack.primary)
        .map(|rack| rack.id.clone())
        .collect();
    discovered.sort_by(|a, b| a.0.cmp(&b.0));

    state.registry.scan(
        &mut state.racks,
        &discovered,
        current_tick,
        &mut state.counters,
        events,
    );

    let booster_tier = state.registry.booster_count().min(MAX_TIER);
    let mut sink = NullSink;
    for unit in &mut state.units {
        unit.set_tier(
            booster_tier,
            &content.constants,
            &mut sink,
            current_tick,
            &mut state.counters,
            events,
        );
    }

    update_power_rating(state, content, events);
}

fn update_power_rating(
    state: &mut VesselState,
    content: &PowerContent,
    events: &mut Vec<EventEnvelope>,
) {
    let tier = state.registry.efficiency_tier();
    let modifier = content
        .efficiency_modifiers
        .get(&tier)
        .copied()
        .unwrap_or(1.0)
        .abs();
    let rating = content.constants.recharge_penalty * modifier;

    if (rating - state.power_rating).abs() > f32::EPSILON {
        state.power_rating = rating;
        events.push(crate::emit(
            &mut state.counters,
            state.tick,
            Event::PowerRatingChanged { rating },
        ));
    }
}

fn advance_units(
    state: &mut VesselState,
    content: &PowerContent,
    dt: f32,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.tick;
    let mut sink = NullSink;
    for unit in &mut state.units {
        unit.advance(
            dt,
            &content.constants,
            &mut sink,
            current_tick,
            &mut state.counters,
            events,
            event_level,
        );
    }
}

fn apply_drain(
    state: &mut VesselState,
    requested: f32,
    dt: f32,
    content: &PowerContent,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.tick;

    if !state.registry.is_initialized() {
        events.push(crate::emit(
            &mut state.counters,
            current_tick,
            Event::ManagerUnavailable {
                vessel: state.id.clone(),
            },
        ));
        return;
    }

    let drained =
        ChargeAggregator::drain_reserves(&mut state.units, requested, dt, &content.constants);
    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::ReserveDrained { requested, drained },
    ));
}
