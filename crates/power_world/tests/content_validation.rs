//! Content/schema validation tests for the shipping JSON data.
//!
//! These tests load the actual `content/*.json` files and validate:
//! 1. Schema validity — all files deserialize without error
//! 2. Range constraints — positive energies, sane constants
//! 3. Content invariants — the modifier table covers every reachable tier
//! 4. Balance sanity checks — flag extreme outliers

use power_core::{PowerContent, MAX_TIER};
use power_world::load_content;
use std::sync::OnceLock;

/// Helper: resolve the content directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

/// Shared content loaded once across all tests in this module.
fn load_test_content() -> &'static PowerContent {
    static CONTENT: OnceLock<PowerContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for production content")
    })
}

#[test]
fn content_loads_successfully() {
    let _content = load_test_content();
}

#[test]
fn content_version_is_non_empty() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
}

#[test]
fn fuel_table_is_non_empty() {
    let content = load_test_content();
    assert!(!content.energy_values.is_empty(), "no fuels defined");
}

#[test]
fn fuel_energies_are_positive() {
    let content = load_test_content();
    for (source, energy) in &content.energy_values {
        assert!(
            *energy > 0.0,
            "fuel '{}' has non-positive energy: {energy}",
            source.0
        );
    }
}

#[test]
fn every_reachable_tier_has_a_modifier() {
    let content = load_test_content();
    for tier in 1..=u8::try_from(MAX_TIER).expect("tier fits in u8") {
        assert!(
            content.efficiency_modifiers.contains_key(&tier),
            "no efficiency modifier for tier {tier}"
        );
    }
}

#[test]
fn modifiers_increase_with_tier() {
    let content = load_test_content();
    let mut previous = 1.0_f32;
    for tier in 1..=u8::try_from(MAX_TIER).expect("tier fits in u8") {
        let modifier = content.efficiency_modifiers[&tier];
        assert!(
            modifier > previous,
            "tier {tier} modifier {modifier} does not improve on {previous}"
        );
        previous = modifier;
    }
}

#[test]
fn constants_are_in_sane_ranges() {
    let c = &load_test_content().constants;
    assert!(c.minimal_power_value > 0.0 && c.minimal_power_value < 0.1);
    assert!(c.baseline_charge_rate > 0.0 && c.baseline_charge_rate < 10.0);
    assert!(c.battery_drain_rate > 0.0 && c.battery_drain_rate < 100.0);
    assert!(c.recharge_penalty > 0.0 && c.recharge_penalty <= 1.0);
    assert!(c.max_reactor_units >= 1 && c.max_reactor_units <= 16);
}

#[test]
fn no_fuel_is_an_extreme_outlier() {
    let content = load_test_content();
    let max = content
        .energy_values
        .values()
        .fold(0.0_f32, |acc, v| acc.max(*v));
    let min = content
        .energy_values
        .values()
        .fold(f32::INFINITY, |acc, v| acc.min(*v));
    assert!(
        max / min <= 100.0,
        "fuel energy spread {min}..{max} is suspiciously wide"
    );
}
