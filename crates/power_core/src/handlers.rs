//! Upgrade handler family — the behavioral object bound to one module-type
//! identity (or, for tiered families, a set of them).
//!
//! Every handler follows the same scan lifecycle: `on_cleared` once before
//! counting, `on_counted` once per occupied slot holding one of its module
//! identities, `on_finished` once after all slots are scanned.

use serde::{Deserialize, Serialize};

use crate::ModuleId;

/// One member of a tiered module family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSpec {
    pub module: ModuleId,
    pub tier: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HandlerKind {
    /// Counts presence up to a cap (e.g. speed boosters).
    SimpleCounter { module: ModuleId, max_count: u32 },
    /// A family of mutually redundant modules where only the highest tier
    /// found matters (e.g. engine efficiency Mk1/Mk2/Mk3).
    TieredCounter { family: Vec<TierSpec> },
    /// Produces charge directly while present (e.g. solar charger).
    ChargeProducer { module: ModuleId },
    /// Producer with a battery reserve of its own.
    BatteryCharger {
        module: ModuleId,
        can_recharge: bool,
    },
    /// Booster that scales reactor unit tiers; not itself a producer.
    ReactorBooster {
        module: ModuleId,
        max_boosters: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeHandler {
    pub kind: HandlerKind,
    /// Occupied slots counted for this handler in the latest scan.
    pub count: u32,
    /// Highest tier seen this scan. Meaningful for `TieredCounter` only.
    pub highest_tier: u8,
    pub enabled: bool,
}

impl UpgradeHandler {
    pub fn new(kind: HandlerKind) -> Self {
        UpgradeHandler {
            kind,
            count: 0,
            highest_tier: 0,
            enabled: false,
        }
    }

    /// Every module identity this handler answers for.
    pub fn module_ids(&self) -> Vec<&ModuleId> {
        match &self.kind {
            HandlerKind::SimpleCounter { module, .. }
            | HandlerKind::ChargeProducer { module }
            | HandlerKind::BatteryCharger { module, .. }
            | HandlerKind::ReactorBooster { module, .. } => vec![module],
            HandlerKind::TieredCounter { family } => {
                family.iter().map(|spec| &spec.module).collect()
            }
        }
    }

    /// Whether the registry should flag the vessel as having charging
    /// modules when this handler counts anything.
    pub fn is_power_producer(&self) -> bool {
        matches!(
            self.kind,
            HandlerKind::ChargeProducer { .. } | HandlerKind::BatteryCharger { .. }
        )
    }

    /// Called once per scan before any counting.
    pub fn on_cleared(&mut self) {
        self.count = 0;
        self.highest_tier = 0;
        self.enabled = false;
    }

    /// Called once per occupied slot resolved to this handler.
    pub fn on_counted(&mut self, module: &ModuleId) {
        match &self.kind {
            HandlerKind::SimpleCounter { max_count, .. }
            | HandlerKind::ReactorBooster {
                max_boosters: max_count,
                ..
            } => {
                self.count = (self.count + 1).min(*max_count);
            }
            HandlerKind::TieredCounter { family } => {
                // Redundant lower tiers found alongside a higher tier are
                // ignored; only the best one counts.
                if let Some(spec) = family.iter().find(|spec| &spec.module == module) {
                    self.highest_tier = self.highest_tier.max(spec.tier);
                }
                self.count += 1;
            }
            HandlerKind::ChargeProducer { .. } | HandlerKind::BatteryCharger { .. } => {
                self.count += 1;
            }
        }
    }

    /// Called once after all slots have been scanned.
    pub fn on_finished(&mut self) {
        self.enabled = self.count > 0;
    }
}
