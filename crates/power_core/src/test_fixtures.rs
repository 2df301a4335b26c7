//! Shared test fixtures for `power_core` and downstream crates.
//!
//! `base_content()` provides a fuel table and constants matching the
//! shipping values. `base_vessel()` builds a one-reactor vessel with a
//! primary rack, one unattached auxiliary rack, and the standard handler
//! set registered.

use std::collections::HashMap;

use crate::energy::{EnergyItem, SlotSink};
use crate::handlers::{HandlerKind, TierSpec};
use crate::reactor::ReactorUnit;
use crate::registry::RegistrationContext;
use crate::{
    ChargeAggregator, Constants, Counters, ModuleId, ModuleRack, PowerContent, RackId, SourceId,
    UnitId, UpgradeRegistry, VesselId, VesselState,
};

pub const PRIMARY_RACK: &str = "rack_main";
pub const AUX_RACK: &str = "rack_aux_0001";
pub const UNIT: &str = "unit_0001";

pub const FUEL_ALGAE: &str = "fuel_algae";
pub const FUEL_KELP: &str = "fuel_kelp";
pub const FUEL_SLIME: &str = "fuel_slime";

pub const MODULE_SPEED: &str = "module_speed_booster";
pub const MODULE_EFFICIENCY_MK1: &str = "module_efficiency_mk1";
pub const MODULE_EFFICIENCY_MK2: &str = "module_efficiency_mk2";
pub const MODULE_EFFICIENCY_MK3: &str = "module_efficiency_mk3";
pub const MODULE_SOLAR: &str = "module_solar_charger";
pub const MODULE_THERMAL_MK2: &str = "module_thermal_charger_mk2";
pub const MODULE_BOOSTER: &str = "module_reactor_booster";

/// Fuel table and constants matching the shipping content: algae is the
/// small test fuel (energy 10), slime is the big one.
pub fn base_content() -> PowerContent {
    PowerContent {
        content_version: "test".to_string(),
        energy_values: HashMap::from([
            (SourceId(FUEL_ALGAE.to_string()), 10.0),
            (SourceId(FUEL_KELP.to_string()), 70.0),
            (SourceId(FUEL_SLIME.to_string()), 200.0),
        ]),
        efficiency_modifiers: HashMap::from([(1, 1.25), (2, 1.5), (3, 1.75)]),
        constants: Constants {
            minimal_power_value: 0.001,
            baseline_charge_rate: 0.75,
            battery_drain_rate: 1.90,
            recharge_penalty: 1.0,
            max_reactor_units: 6,
        },
    }
}

/// The standard handler set: speed counter and solar charger reusable,
/// efficiency family / thermal battery / reactor booster one-time.
pub fn standard_context() -> RegistrationContext {
    let mut ctx = RegistrationContext::new();
    ctx.register_reusable(HandlerKind::SimpleCounter {
        module: ModuleId(MODULE_SPEED.to_string()),
        max_count: 6,
    });
    ctx.register_reusable(HandlerKind::ChargeProducer {
        module: ModuleId(MODULE_SOLAR.to_string()),
    });
    ctx.register_one_time(HandlerKind::TieredCounter {
        family: vec![
            TierSpec {
                module: ModuleId(MODULE_EFFICIENCY_MK1.to_string()),
                tier: 1,
            },
            TierSpec {
                module: ModuleId(MODULE_EFFICIENCY_MK2.to_string()),
                tier: 2,
            },
            TierSpec {
                module: ModuleId(MODULE_EFFICIENCY_MK3.to_string()),
                tier: 3,
            },
        ],
    });
    ctx.register_one_time(HandlerKind::BatteryCharger {
        module: ModuleId(MODULE_THERMAL_MK2.to_string()),
        can_recharge: true,
    });
    ctx.register_one_time(HandlerKind::ReactorBooster {
        module: ModuleId(MODULE_BOOSTER.to_string()),
        max_boosters: 3,
    });
    ctx
}

/// One vessel, one reactor, a 6-slot primary rack, and one auxiliary rack
/// that has not yet been attached.
pub fn base_vessel(content: &PowerContent) -> VesselState {
    let mut registry = UpgradeRegistry::new();
    let mut ctx = standard_context();
    registry.initialize(&mut ctx);

    let primary = ModuleRack::new(RackId(PRIMARY_RACK.to_string()), true, 6);
    let aux = ModuleRack::new(RackId(AUX_RACK.to_string()), false, 6);

    VesselState {
        id: VesselId("vessel_0001".to_string()),
        tick: 0,
        power_rating: content.constants.recharge_penalty,
        racks: HashMap::from([
            (primary.id.clone(), primary),
            (aux.id.clone(), aux),
        ]),
        units: vec![ReactorUnit::new(
            UnitId(UNIT.to_string()),
            &content.constants,
        )],
        registry,
        aggregator: ChargeAggregator::new(),
        counters: Counters::default(),
    }
}

/// Sink that records every notification, for asserting on the external
/// inventory side of the protocol.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub removed: Vec<crate::ItemId>,
    pub rejected: Vec<(SourceId, u32)>,
    pub resizes: Vec<(u32, u32)>,
}

impl SlotSink for RecordingSink {
    fn remove(&mut self, item: &EnergyItem) {
        self.removed.push(item.id.clone());
    }

    fn reject(&mut self, source: &SourceId, size: u32) {
        self.rejected.push((source.clone(), size));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }
}
