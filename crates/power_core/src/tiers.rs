//! Capacity tier table — pure function, no mutable state.

/// Highest supported booster tier.
pub const MAX_TIER: u32 = 3;

/// Tier-0 charge capacity.
pub const CAPACITY_BASELINE: f32 = 200.0;

/// Slot layout and charge capacity for one reactor tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierStats {
    pub width: u32,
    pub height: u32,
    pub capacity: f32,
}

impl TierStats {
    pub fn total_slots(&self) -> u32 {
        self.width * self.height
    }
}

/// Returns the stats for a booster tier. Unknown tiers fall back to tier 0;
/// callers gate on [`MAX_TIER`] before getting here.
pub fn tier_stats(tier: u32) -> TierStats {
    match tier {
        1 => TierStats {
            width: 3,
            height: 2,
            capacity: CAPACITY_BASELINE + 50.0, // 6 slots
        },
        2 => TierStats {
            width: 3,
            height: 3,
            capacity: CAPACITY_BASELINE + 100.0, // 9 slots
        },
        3 => TierStats {
            width: 6,
            height: 2,
            capacity: CAPACITY_BASELINE + 150.0, // 12 slots
        },
        _ => TierStats {
            width: 2,
            height: 2,
            capacity: CAPACITY_BASELINE, // 4 slots
        },
    }
}
