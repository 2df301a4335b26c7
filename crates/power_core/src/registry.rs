//! Per-vessel upgrade registry: resolves rack slots to handlers and keeps
//! the auxiliary-rack list deduplicated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::handlers::{HandlerKind, UpgradeHandler};
use crate::{Counters, Event, EventEnvelope, ModuleId, ModuleRack, RackId};

type ModuleMap = HashMap<ModuleId, usize, ahash::RandomState>;

/// Explicit registration context passed in at construction time — handler
/// creators are not accumulated in any global state.
///
/// Reusable specs survive for every vessel built from this context; the
/// one-time list is drained on first use so repeated registry
/// initialization does not re-trigger them.
#[derive(Debug, Clone, Default)]
pub struct RegistrationContext {
    reusable: Vec<HandlerKind>,
    one_time: Vec<HandlerKind>,
}

impl RegistrationContext {
    pub fn new() -> Self {
        RegistrationContext::default()
    }

    /// Registers a handler spec reused for every vessel.
    pub fn register_reusable(&mut self, kind: HandlerKind) {
        self.reusable.push(kind);
    }

    /// Registers a handler spec consumed by the first registry that
    /// initializes from this context.
    pub fn register_one_time(&mut self, kind: HandlerKind) {
        self.one_time.push(kind);
    }
}

/// Owns the type-keyed handler map and the deduplicated auxiliary-rack
/// list for one vessel. Never shared across vessels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeRegistry {
    handlers: Vec<UpgradeHandler>,
    /// Module identity → index into `handlers`. A tiered family maps all
    /// of its identities to the same handler.
    by_module: ModuleMap,
    /// No duplicate identities; discovery order preserved.
    aux_racks: Vec<RackId>,
    pub has_charging_modules: bool,
    initialized: bool,
}

impl UpgradeRegistry {
    pub fn new() -> Self {
        UpgradeRegistry::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn handlers(&self) -> &[UpgradeHandler] {
        &self.handlers
    }

    pub fn handler(&self, module: &ModuleId) -> Option<&UpgradeHandler> {
        self.by_module.get(module).map(|idx| &self.handlers[*idx])
    }

    pub fn aux_racks(&self) -> &[RackId] {
        &self.aux_racks
    }

    /// Registers handlers from the context: reusable specs first, then the
    /// one-time specs, which are drained so later registries skip them.
    /// Returns false if this registry was already initialized.
    pub fn initialize(&mut self, ctx: &mut RegistrationContext) -> bool {
        if self.initialized {
            return false;
        }

        for kind in ctx.reusable.clone() {
            self.register(kind);
        }
        for kind in ctx.one_time.drain(..) {
            self.register(kind);
        }

        self.initialized = true;
        true
    }

    /// Adds one handler to the type-keyed map. Registration is idempotent
    /// per module identity: the first registration wins and later ones are
    /// dropped.
    pub fn register(&mut self, kind: HandlerKind) -> bool {
        let handler = UpgradeHandler::new(kind);
        if handler
            .module_ids()
            .iter()
            .any(|module| self.by_module.contains_key(module))
        {
            return false;
        }

        let idx = self.handlers.len();
        let ids: Vec<ModuleId> = handler.module_ids().into_iter().cloned().collect();
        self.handlers.push(handler);
        for module in ids {
            self.by_module.insert(module, idx);
        }
        true
    }

    /// Total boosters counted in the latest scan.
    pub fn booster_count(&self) -> u32 {
        self.handlers
            .iter()
            .filter(|h| matches!(h.kind, HandlerKind::ReactorBooster { .. }))
            .map(|h| h.count)
            .sum()
    }

    /// Highest efficiency tier found in the latest scan, 0 if none.
    pub fn efficiency_tier(&self) -> u8 {
        self.handlers
            .iter()
            .filter(|h| h.enabled && matches!(h.kind, HandlerKind::TieredCounter { .. }))
            .map(|h| h.highest_tier)
            .max()
            .unwrap_or(0)
    }

    /// Full slot scan. Executed on every module-insert/remove event.
    ///
    /// Order of operations:
    /// 1. Deduplicate the discovered auxiliary racks and attach any rack
    ///    not yet bound to this vessel.
    /// 2. `on_cleared` every handler.
    /// 3. Resolve every slot across the primary and auxiliary racks to its
    ///    handler and `on_counted` it, tracking whether any counted
    ///    handler produces power.
    /// 4. If at least one slot was occupied: broadcast `ModulesChanged`
    ///    and `on_finished` every handler.
    ///
    /// Returns true if any occupied slot was seen.
    pub fn scan(
        &mut self,
        racks: &mut HashMap<RackId, ModuleRack>,
        discovered: &[RackId],
        tick: u64,
        counters: &mut Counters,
        events: &mut Vec<EventEnvelope>,
    ) -> bool {
        self.sync_aux_racks(racks, discovered, tick, counters, events);

        for handler in &mut self.handlers {
            handler.on_cleared();
        }

        let mut has_charging = false;
        let mut found: Vec<ModuleId> = Vec::new();

        for rack_id in self.scan_order(racks) {
            let Some(rack) = racks.get(&rack_id) else {
                continue;
            };
            for module in rack.slots.iter().flatten() {
                found.push(module.clone());
                if let Some(&idx) = self.by_module.get(module) {
                    let handler = &mut self.handlers[idx];
                    handler.on_counted(module);
                    if handler.is_power_producer() {
                        has_charging = true;
                    }
                }
            }
        }

        self.has_charging_modules = has_charging;

        if found.is_empty() {
            return false;
        }

        events.push(crate::emit(counters, tick, Event::ModulesChanged { found }));
        for handler in &mut self.handlers {
            handler.on_finished();
        }
        true
    }

    /// Collapses repeated discoveries of the same rack to one entry and
    /// binds newly seen racks to the vessel exactly once.
    fn sync_aux_racks(
        &mut self,
        racks: &mut HashMap<RackId, ModuleRack>,
        discovered: &[RackId],
        tick: u64,
        counters: &mut Counters,
        events: &mut Vec<EventEnvelope>,
    ) {
        let mut deduped: Vec<RackId> = Vec::new();
        for rack_id in discovered {
            if deduped.contains(rack_id) {
                // Enumeration can hand back the same rack through more
                // than one path.
                continue;
            }
            let Some(rack) = racks.get_mut(rack_id) else {
                continue;
            };
            if rack.primary {
                continue;
            }
            deduped.push(rack_id.clone());

            if !rack.attached {
                rack.attached = true;
                events.push(crate::emit(
                    counters,
                    tick,
                    Event::RackAttached {
                        rack: rack_id.clone(),
                    },
                ));
            }
        }
        self.aux_racks = deduped;
    }

    /// Primary racks first (sorted for determinism), then auxiliary racks
    /// in discovery order.
    fn scan_order(&self, racks: &HashMap<RackId, ModuleRack>) -> Vec<RackId> {
        let mut primary: Vec<RackId> = racks
            .values()
            .filter(|rack| rack.primary)
            .map(|rack| rack.id.clone())
            .collect();
        primary.sort_by(|a, b| a.0.cmp(&b.0));
        primary.extend(self.aux_racks.iter().cloned());
        primary
    }
}
