//! Consumable energy items and the stage-then-commit pool that holds them.
//!
//! The per-tick production loop iterates the live item sequence; anything
//! depleted mid-iteration is staged and only removed after the loop by
//! `commit_removals`. Removing mid-iteration would skip elements, so the
//! staged set is the only legal removal path while a tick is in flight.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{ItemId, RejectReason, SourceId};

/// One depletable energy source sitting in a reactor's fuel pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyItem {
    pub id: ItemId,
    pub source: SourceId,
    pub initial_energy: f32,
    pub remaining_energy: f32,
    /// Slot units this item occupies; also the throughput multiplier.
    pub size: u32,
}

impl EnergyItem {
    pub fn consumed(&self) -> bool {
        self.remaining_energy <= 0.0
    }

    /// Remaining fraction in `[0, 1]`. Zero-initial items count as spent.
    pub fn remaining_fraction(&self) -> f32 {
        if self.initial_energy <= 0.0 {
            0.0
        } else {
            self.remaining_energy / self.initial_energy
        }
    }
}

/// Seam to the external inventory/slot widget. The core drives it but does
/// not own it; a headless simulation passes [`NullSink`].
pub trait SlotSink {
    /// The outer container must drop its copy of a removed item.
    fn remove(&mut self, item: &EnergyItem);
    /// An insertion was refused; the outer container keeps or destroys it.
    fn reject(&mut self, source: &SourceId, size: u32);
    /// The physical slot grid changed dimensions after a tier transition.
    fn resize(&mut self, width: u32, height: u32);
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SlotSink for NullSink {
    fn remove(&mut self, _item: &EnergyItem) {}
    fn reject(&mut self, _source: &SourceId, _size: u32) {}
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Ordered pool of [`EnergyItem`]s with deferred removal.
///
/// Invariants: every staged id refers to an item still in the sequence;
/// items are destroyed only inside [`StagedCollection::commit_removals`]
/// (or the explicit shrink-eviction path, which never runs mid-iteration).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagedCollection {
    items: Vec<EnergyItem>,
    staged: SmallVec<[ItemId; 4]>,
}

impl StagedCollection {
    pub fn new() -> Self {
        StagedCollection::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnergyItem> {
        self.items.iter()
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut EnergyItem> {
        self.items.get_mut(idx)
    }

    /// Appends an item. Fails if an item with the same identity is present.
    pub fn add(&mut self, item: EnergyItem) -> Result<(), RejectReason> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(RejectReason::DuplicateIdentity);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn find(&self, id: &ItemId) -> Option<&EnergyItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn find_mut(&mut self, id: &ItemId) -> Option<&mut EnergyItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Marks an item for deferred deletion. No-op if already staged.
    pub fn stage_for_removal(&mut self, id: &ItemId) {
        debug_assert!(
            self.items.iter().any(|item| &item.id == id),
            "staged an item not in the collection: {id}"
        );
        if !self.staged.contains(id) {
            self.staged.push(id.clone());
        }
    }

    /// Removes every staged item in original sequence order, notifying the
    /// sink of each, then clears the staged set. Returns how many were
    /// removed. The sole point items are destroyed during a tick.
    pub fn commit_removals(&mut self, sink: &mut dyn SlotSink) -> usize {
        if self.staged.is_empty() {
            return 0;
        }
        let staged = std::mem::take(&mut self.staged);
        let mut removed = 0;
        self.items.retain(|item| {
            if staged.contains(&item.id) {
                sink.remove(item);
                removed += 1;
                false
            } else {
                true
            }
        });
        debug_assert_eq!(removed, staged.len(), "staged item missing at commit");
        removed
    }

    /// Slot units occupied by items not currently staged for removal.
    pub fn occupied_units(&self) -> u32 {
        self.items
            .iter()
            .filter(|item| !self.staged.contains(&item.id))
            .map(|item| item.size)
            .sum()
    }

    /// The most-depleted item — the eviction candidate when a tier shrink
    /// leaves too few slots. Ties go to the earliest item in the sequence.
    pub fn candidate_for_removal(&self) -> Option<&EnergyItem> {
        self.items.iter().min_by(|a, b| {
            a.remaining_fraction()
                .partial_cmp(&b.remaining_fraction())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Immediate removal, bypassing the staging discipline. Only legal
    /// outside the per-tick iteration (shrink eviction, load rebuild).
    pub fn remove_now(&mut self, id: &ItemId, sink: &mut dyn SlotSink) -> Option<EnergyItem> {
        let idx = self.items.iter().position(|item| &item.id == id)?;
        self.staged.retain(|staged| staged != id);
        let item = self.items.remove(idx);
        sink.remove(&item);
        Some(item)
    }
}
