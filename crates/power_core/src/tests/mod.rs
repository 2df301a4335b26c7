use super::*;
use crate::test_fixtures::{
    base_content, base_vessel, standard_context, RecordingSink, AUX_RACK, FUEL_ALGAE, FUEL_KELP,
    MODULE_BOOSTER, MODULE_EFFICIENCY_MK1, MODULE_EFFICIENCY_MK3, MODULE_SOLAR, MODULE_SPEED,
    PRIMARY_RACK, UNIT,
};

mod energy;
mod persist;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> PowerContent {
    base_content()
}

fn test_vessel(content: &PowerContent) -> VesselState {
    base_vessel(content)
}

fn unit_id() -> UnitId {
    UnitId(UNIT.to_string())
}

fn source(id: &str) -> SourceId {
    SourceId(id.to_string())
}

fn module(id: &str) -> ModuleId {
    ModuleId(id.to_string())
}

fn command(state: &VesselState, n: u64, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{n:06}")),
        issued_tick: state.tick,
        execute_at_tick: state.tick,
        command,
    }
}

fn insert_module_command(
    state: &VesselState,
    n: u64,
    rack: &str,
    slot: usize,
    module_id: &str,
) -> CommandEnvelope {
    command(
        state,
        n,
        Command::InsertModule {
            rack: RackId(rack.to_string()),
            slot,
            module: module(module_id),
        },
    )
}

fn fuel_command(state: &VesselState, n: u64, source_id: &str, size: u32) -> CommandEnvelope {
    command(
        state,
        n,
        Command::InsertFuel {
            unit: unit_id(),
            source: source(source_id),
            size,
        },
    )
}

/// Feed `count` algae items (energy 10, size 1) straight into the fixture
/// vessel's reactor.
fn load_algae(state: &mut VesselState, content: &PowerContent, count: usize) {
    for _ in 0..count {
        let unit = &mut state.units[0];
        unit.accept_fuel(&source(FUEL_ALGAE), 1, content, &mut state.counters)
            .expect("fixture fuel should be accepted");
    }
}
