//! Simulation statistics collection trait

use serde::{Deserialize, Serialize};

/// Trait for collecting blast simulation statistics
pub trait BlastStats {
    /// Record that a blast was initialized and joined the active set
    fn record_blast_created(&mut self);

    /// Record that two free reactants reacted and requested a blast
    fn record_reaction(&mut self);

    /// Record that one blast absorbed another
    fn record_coalescence(&mut self);

    /// Record that a blast finished and left the active set
    fn record_blast_retired(&mut self);

    /// Record that a part was destroyed by overpressure
    fn record_part_destroyed(&mut self);

    /// Record that a building took damage
    fn record_building_damaged(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl BlastStats for NoopStats {
    fn record_blast_created(&mut self) {}
    fn record_reaction(&mut self) {}
    fn record_coalescence(&mut self) {}
    fn record_blast_retired(&mut self) {}
    fn record_part_destroyed(&mut self) {}
    fn record_building_damaged(&mut self) {}
}

/// Running totals of simulation events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastCounters {
    pub blasts_created: u32,
    pub reactions: u32,
    pub coalescences: u32,
    pub blasts_retired: u32,
    pub parts_destroyed: u32,
    pub buildings_damaged: u32,
}

impl BlastStats for BlastCounters {
    fn record_blast_created(&mut self) {
        self.blasts_created += 1;
    }

    fn record_reaction(&mut self) {
        self.reactions += 1;
    }

    fn record_coalescence(&mut self) {
        self.coalescences += 1;
    }

    fn record_blast_retired(&mut self) {
        self.blasts_retired += 1;
    }

    fn record_part_destroyed(&mut self) {
        self.parts_destroyed += 1;
    }

    fn record_building_damaged(&mut self) {
        self.buildings_damaged += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_stats_all_methods() {
        let mut stats = NoopStats;
        for _ in 0..10 {
            stats.record_blast_created();
            stats.record_reaction();
            stats.record_coalescence();
            stats.record_blast_retired();
            stats.record_part_destroyed();
            stats.record_building_damaged();
        }
    }

    #[test]
    fn test_counters_track_each_event() {
        let mut counters = BlastCounters::default();
        counters.record_blast_created();
        counters.record_reaction();
        counters.record_reaction();
        counters.record_coalescence();
        counters.record_blast_retired();
        counters.record_part_destroyed();
        counters.record_building_damaged();

        assert_eq!(
            counters,
            BlastCounters {
                blasts_created: 1,
                reactions: 2,
                coalescences: 1,
                blasts_retired: 1,
                parts_destroyed: 1,
                buildings_damaged: 1,
            }
        );
    }

    #[test]
    fn test_counters_through_trait_object() {
        let mut counters = BlastCounters::default();
        {
            let stats: &mut dyn BlastStats = &mut counters;
            stats.record_blast_retired();
        }
        assert_eq!(counters.blasts_retired, 1);
    }
}
