//! Bounded memoization of routing answers.
//!
//! A fixed table of (source, target) to first-direction slots with a
//! tick-based lifetime. Duty entries, the "return to your post" answers,
//! survive eviction pressure longer than ordinary traffic: whichever tier
//! is being inserted, a normal entry is sacrificed first.

use serde::Serialize;
use tracing::debug;

use crate::world::{Direction, RoomId};

/// Retention tier of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    Duty,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    src: RoomId,
    dst: RoomId,
    dir: Direction,
    stamp: u64,
    tier: Priority,
}

/// Fixed-size routing answer cache. The table never grows; entries expire
/// by tick age and expired slots are reclaimed lazily on insert.
#[derive(Debug)]
pub struct PathCache {
    slots: Vec<Option<Slot>>,
    ttl: u64,
    now: u64,
}

impl PathCache {
    pub fn new(slots: usize, ttl: u64) -> Self {
        Self {
            slots: vec![None; slots],
            ttl,
            now: 0,
        }
    }

    /// Advance the shared tick clock. Entries age against this, never
    /// against wall time.
    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    fn fresh(&self, slot: &Slot) -> bool {
        self.now.saturating_sub(slot.stamp) < self.ttl
    }

    /// Cached direction for the exact (src, dst) pair, if still fresh.
    pub fn lookup(&self, src: RoomId, dst: RoomId) -> Option<Direction> {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.src == src && slot.dst == dst && self.fresh(slot))
            .map(|slot| slot.dir)
    }

    /// Store an answer, evicting when the table is full: an empty or
    /// expired slot first, then the oldest normal entry, then the oldest
    /// entry overall. Only successful Toward answers belong here; negative
    /// results are never cached.
    pub fn insert(&mut self, src: RoomId, dst: RoomId, dir: Direction, tier: Priority) {
        let slot = self.pick_slot();
        self.slots[slot] = Some(Slot {
            src,
            dst,
            dir,
            stamp: self.now,
            tier,
        });
    }

    fn pick_slot(&self) -> usize {
        if let Some(free) = self
            .slots
            .iter()
            .position(|slot| slot.as_ref().is_none_or(|s| !self.fresh(s)))
        {
            return free;
        }
        if let Some(victim) = self.oldest(Some(Priority::Normal)) {
            debug!("cache full; evicting the oldest normal entry in slot {}", victim);
            return victim;
        }
        // Every live entry is duty-tier; age decides.
        let victim = self.oldest(None).unwrap_or(0);
        debug!("cache full of duty entries; evicting slot {}", victim);
        victim
    }

    fn oldest(&self, tier: Option<Priority>) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s)))
            .filter(|(_, s)| tier.is_none_or(|t| s.tier == t))
            .min_by_key(|(_, s)| s.stamp)
            .map(|(i, _)| i)
    }

    /// Drop every entry. Part of the service reset lifecycle.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Live entry count, for reporting and tests.
    pub fn live_entries(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| self.fresh(slot))
            .count()
    }
}
