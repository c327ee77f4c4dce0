use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Point, UnitSnapshot};

/// One persistently-identified unit, tracked across frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedUnit {
    /// Stable handle, assigned at creation and never reused.
    pub identity: u64,
    /// Last observed position.
    pub position: Point,
    /// Last observed level.
    pub level: u32,
    /// Timestamp (ms) of the frame this unit was last matched in.
    pub last_seen: i64,
    /// Number of frames this unit has been matched or created in.
    pub appearances: u32,
}

impl TrackedUnit {
    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            identity: self.identity,
            position: self.position,
            level: self.level,
        }
    }
}

/// Reconciles noisy per-frame unit detections into persistent identities.
///
/// Matching is nearest-neighbor only: each reading is resolved against the
/// single closest tracked unit, not every unit within the distance
/// threshold. Known limitation kept for compatibility with the tuned
/// behavior: a closer-but-wrong unit can steal a match.
#[derive(Debug)]
pub struct UnitTracker {
    units: Vec<TrackedUnit>,
    next_identity: u64,
    /// A reading only matches a unit strictly closer than this (pixels).
    match_distance: f64,
    /// A matched unit unseen for longer than this (ms) is treated as gone;
    /// the reading starts a fresh identity instead of resurrecting it.
    stale_window_ms: i64,
}

impl UnitTracker {
    pub fn new(match_distance: f64, stale_window_ms: i64) -> Self {
        Self {
            units: Vec::new(),
            next_identity: 0,
            match_distance,
            stale_window_ms,
        }
    }

    /// Currently tracked units, in creation order.
    pub fn units(&self) -> &[TrackedUnit] {
        &self.units
    }

    /// Resolve one composed reading against the tracked set.
    ///
    /// Every reading yields either a merge or a creation, never an error.
    /// Frames must be processed in timestamp order: the staleness rule
    /// relies on `last_seen` being monotonic.
    pub fn reconcile(&mut self, position: Point, level: u32, ts: i64) -> UnitSnapshot {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, unit) in self.units.iter().enumerate() {
            let dist = unit.position.distance(&position);
            if dist < self.match_distance && nearest.map_or(true, |(_, best)| dist < best) {
                nearest = Some((i, dist));
            }
        }

        let merge_idx = match nearest {
            None => None,
            Some((i, _)) => {
                let unit = &self.units[i];
                if ts - unit.last_seen > self.stale_window_ms {
                    debug!(
                        "unit {} unseen for {}ms, not resurrecting",
                        unit.identity,
                        ts - unit.last_seen
                    );
                    None
                } else if level == unit.level || level == unit.level + 1 {
                    Some(i)
                } else {
                    // level dropped or jumped by more than one: a different
                    // unit is standing where the old one was
                    debug!(
                        "level {} -> {} is not a valid transition for unit {}",
                        unit.level, level, unit.identity
                    );
                    None
                }
            }
        };

        match merge_idx {
            Some(i) => {
                let unit = &mut self.units[i];
                if level != unit.level {
                    debug!("unit {} leveled up {} -> {}", unit.identity, unit.level, level);
                } else {
                    debug!("merged reading into unit {}", unit.identity);
                }
                unit.position = position;
                unit.level = level;
                unit.last_seen = ts;
                unit.appearances += 1;
                unit.snapshot()
            }
            None => self.create(position, level, ts),
        }
    }

    fn create(&mut self, position: Point, level: u32, ts: i64) -> UnitSnapshot {
        let unit = TrackedUnit {
            identity: self.next_identity,
            position,
            level,
            last_seen: ts,
            appearances: 1,
        };
        self.next_identity += 1;
        debug!(
            "new unit {} at ({}, {}) level {}",
            unit.identity, position.x, position.y, level
        );
        let snapshot = unit.snapshot();
        self.units.push(unit);
        snapshot
    }

    /// Remove units that are both inactive beyond `inactivity_window_ms`
    /// and below the `min_appearances` floor. Units with enough history
    /// survive temporary occlusion; fleeting false positives are pruned.
    pub fn evict(&mut self, ts: i64, inactivity_window_ms: i64, min_appearances: u32) {
        self.units.retain(|unit| {
            let prune =
                ts - unit.last_seen > inactivity_window_ms && unit.appearances < min_appearances;
            if prune {
                debug!(
                    "evicting unit {} (last seen {}ms ago, {} appearance(s))",
                    unit.identity,
                    ts - unit.last_seen,
                    unit.appearances
                );
            }
            !prune
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> UnitTracker {
        UnitTracker::new(20.0, 3000)
    }

    #[test]
    fn test_first_reading_creates_identity_zero() {
        let mut t = tracker();
        let snap = t.reconcile(Point::new(100, 100), 5, 0);
        assert_eq!(snap.identity, 0);
        assert_eq!(t.units()[0].appearances, 1);
    }

    #[test]
    fn test_same_level_merges() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        let snap = t.reconcile(Point::new(100, 100), 5, 500);
        assert_eq!(snap.identity, 0);
        assert_eq!(t.units().len(), 1);
        assert_eq!(t.units()[0].appearances, 2);
        assert_eq!(t.units()[0].last_seen, 500);
    }

    #[test]
    fn test_level_bump_merges_and_updates_level() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        t.reconcile(Point::new(100, 100), 5, 500);
        let snap = t.reconcile(Point::new(102, 101), 6, 1000);
        assert_eq!(snap.identity, 0);
        assert_eq!(snap.level, 6);
        assert_eq!(t.units()[0].level, 6);
        assert_eq!(t.units()[0].position, Point::new(102, 101));
    }

    #[test]
    fn test_stale_unit_is_not_resurrected() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        t.reconcile(Point::new(100, 100), 5, 500);
        t.reconcile(Point::new(102, 101), 6, 1000);
        // 3200ms of silence: position matches but the identity is gone
        let snap = t.reconcile(Point::new(102, 101), 6, 4200);
        assert_eq!(snap.identity, 1);
        assert_eq!(t.units().len(), 2);
    }

    #[test]
    fn test_level_drop_creates_new_identity() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        let snap = t.reconcile(Point::new(101, 100), 4, 500);
        assert_eq!(snap.identity, 1);
        assert_eq!(t.units().len(), 2);
    }

    #[test]
    fn test_level_jump_creates_new_identity() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        let snap = t.reconcile(Point::new(101, 100), 7, 500);
        assert_eq!(snap.identity, 1);
    }

    #[test]
    fn test_distance_threshold_is_strict() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        // exactly 20px away: not a neighbor
        let snap = t.reconcile(Point::new(120, 100), 5, 500);
        assert_eq!(snap.identity, 1);
        // strictly inside the threshold: merges
        let snap = t.reconcile(Point::new(105, 100), 5, 1000);
        assert_eq!(snap.identity, 0);
    }

    #[test]
    fn test_nearest_unit_wins() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        t.reconcile(Point::new(130, 100), 5, 0);
        let snap = t.reconcile(Point::new(126, 100), 5, 500);
        assert_eq!(snap.identity, 1);
    }

    #[test]
    fn test_identities_are_monotonic() {
        let mut t = tracker();
        for i in 0..4 {
            let snap = t.reconcile(Point::new(i * 100, 0), 1, 0);
            assert_eq!(snap.identity, i as u64);
        }
    }

    #[test]
    fn test_eviction_prunes_low_appearance_units() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        t.evict(1500, 1000, 5);
        assert!(t.units().is_empty());
    }

    #[test]
    fn test_eviction_spares_established_units() {
        let mut t = tracker();
        for ts in 0..10 {
            t.reconcile(Point::new(100, 100), 5, ts * 100);
        }
        assert_eq!(t.units()[0].appearances, 10);
        t.evict(10_000, 1000, 5);
        assert_eq!(t.units().len(), 1);
    }

    #[test]
    fn test_eviction_spares_recently_seen_units() {
        let mut t = tracker();
        t.reconcile(Point::new(100, 100), 5, 0);
        t.evict(500, 1000, 5);
        assert_eq!(t.units().len(), 1);
    }
}
