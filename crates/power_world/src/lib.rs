//! Content loading and vessel construction shared by the front-end crates.

use anyhow::{Context, Result};
use power_core::{
    ChargeAggregator, Constants, Counters, HandlerKind, ModuleId, ModuleRack, PowerContent,
    RackId, ReactorUnit, RegistrationContext, SourceId, TierSpec, UnitId, UpgradeRegistry,
    VesselId, VesselState, MAX_TIER,
};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Deserialize)]
struct FuelsFile {
    content_version: String,
    energy_values: HashMap<SourceId, f32>,
}

#[derive(Deserialize)]
struct EfficiencyFile {
    efficiency_modifiers: HashMap<u8, f32>,
}

/// Generate a deterministic v4-format UUID from a seeded RNG.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a fuel with zero or negative energy, an
/// efficiency modifier for a tier no module can reach, or constants that
/// would stall the burn loop.
pub fn validate_content(content: &PowerContent) {
    for (source, energy) in &content.energy_values {
        assert!(!source.0.is_empty(), "fuel table contains an empty source id");
        assert!(
            *energy > 0.0,
            "fuel '{}' has non-positive energy value: {energy}",
            source.0,
        );
    }

    for (tier, modifier) in &content.efficiency_modifiers {
        assert!(
            (1..=MAX_TIER as u8).contains(tier),
            "efficiency modifier declared for unreachable tier {tier}",
        );
        assert!(
            *modifier > 0.0,
            "efficiency modifier for tier {tier} is non-positive: {modifier}",
        );
    }

    let c = &content.constants;
    assert!(
        c.minimal_power_value > 0.0,
        "minimal_power_value must be positive, got {}",
        c.minimal_power_value,
    );
    assert!(
        c.baseline_charge_rate > 0.0,
        "baseline_charge_rate must be positive, got {}",
        c.baseline_charge_rate,
    );
    assert!(
        c.battery_drain_rate > 0.0,
        "battery_drain_rate must be positive, got {}",
        c.battery_drain_rate,
    );
    assert!(
        c.recharge_penalty > 0.0,
        "recharge_penalty must be positive, got {}",
        c.recharge_penalty,
    );
    assert!(
        c.max_reactor_units >= 1,
        "a vessel must allow at least one reactor unit",
    );
}

pub fn load_content(content_dir: &str) -> Result<PowerContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let fuels_file: FuelsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("fuels.json")).context("reading fuels.json")?,
    )
    .context("parsing fuels.json")?;
    let efficiency_file: EfficiencyFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("efficiency.json")).context("reading efficiency.json")?,
    )
    .context("parsing efficiency.json")?;
    let content = PowerContent {
        content_version: fuels_file.content_version,
        energy_values: fuels_file.energy_values,
        efficiency_modifiers: efficiency_file.efficiency_modifiers,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// The shipping handler set.
///
/// Chargers and the speed counter survive re-registration across vessels;
/// the efficiency family and the reactor booster are claimed once.
pub fn standard_registration() -> RegistrationContext {
    let mut ctx = RegistrationContext::new();
    ctx.register_reusable(HandlerKind::ChargeProducer {
        module: ModuleId("module_solar_charger".to_string()),
    });
    ctx.register_reusable(HandlerKind::BatteryCharger {
        module: ModuleId("module_solar_charger_mk2".to_string()),
        can_recharge: true,
    });
    ctx.register_reusable(HandlerKind::ChargeProducer {
        module: ModuleId("module_thermal_charger".to_string()),
    });
    ctx.register_reusable(HandlerKind::BatteryCharger {
        module: ModuleId("module_thermal_charger_mk2".to_string()),
        can_recharge: true,
    });
    ctx.register_reusable(HandlerKind::SimpleCounter {
        module: ModuleId("module_speed_booster".to_string()),
        max_count: 6,
    });
    ctx.register_one_time(HandlerKind::TieredCounter {
        family: vec![
            TierSpec {
                module: ModuleId("module_efficiency_mk1".to_string()),
                tier: 1,
            },
            TierSpec {
                module: ModuleId("module_efficiency_mk2".to_string()),
                tier: 2,
            },
            TierSpec {
                module: ModuleId("module_efficiency_mk3".to_string()),
                tier: 3,
            },
        ],
    });
    ctx.register_one_time(HandlerKind::ReactorBooster {
        module: ModuleId("module_reactor_booster".to_string()),
        max_boosters: 3,
    });
    ctx
}

/// Build a fresh vessel: one reactor, a six-slot primary rack, and one
/// auxiliary rack waiting to be discovered on the first scan.
pub fn build_initial_vessel(content: &PowerContent, rng: &mut impl Rng) -> VesselState {
    let mut registry = UpgradeRegistry::new();
    let mut ctx = standard_registration();
    registry.initialize(&mut ctx);

    let vessel_id = VesselId(format!("vessel_{}", generate_uuid(rng)));
    let primary = ModuleRack::new(RackId("rack_main".to_string()), true, 6);
    let aux = ModuleRack::new(RackId(format!("rack_aux_{}", generate_uuid(rng))), false, 6);
    let unit = ReactorUnit::new(
        UnitId(format!("unit_{}", generate_uuid(rng))),
        &content.constants,
    );

    VesselState {
        id: vessel_id,
        tick: 0,
        power_rating: content.constants.recharge_penalty,
        racks: HashMap::from([(primary.id.clone(), primary), (aux.id.clone(), aux)]),
        units: vec![unit],
        registry,
        aggregator: ChargeAggregator::new(),
        counters: Counters::default(),
    }
}
